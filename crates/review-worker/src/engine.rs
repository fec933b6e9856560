//! Engine capability used by the reviewer. The subprocess session implements
//! it; tests substitute an in-memory engine.

use go_core::BoardPoint;
use serde::{Deserialize, Serialize};

use crate::commands::{AnalyzeRequest, CommitRequest};
use crate::error::ReviewError;

/// Search statistics for one candidate, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateStats {
    pub win_rate: f64,
    pub visit_share: f64,
    pub lcb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub point: BoardPoint,
    pub stats: CandidateStats,
}

/// Candidates in the engine's own ranking, preferred move first.
pub type CandidateSet = Vec<Candidate>;

pub fn find_candidate(set: &[Candidate], point: BoardPoint) -> Option<&Candidate> {
    set.iter().find(|c| c.point == point)
}

#[allow(async_fn_in_trait)]
pub trait AnalysisEngine {
    /// Rank candidate moves without changing the engine's board.
    async fn analyze(&mut self, request: &AnalyzeRequest) -> Result<CandidateSet, ReviewError>;

    /// Play a move on the engine's board.
    async fn commit(&mut self, commit: &CommitRequest) -> Result<(), ReviewError>;
}
