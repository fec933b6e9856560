//! Shared helpers: an in-memory engine and small game builders.
#![allow(dead_code)]

use go_core::{BoardPoint, Color, GameMetadata, GameRecord, Move};
use review_worker::commands::{AnalyzeRequest, CommitRequest};
use review_worker::engine::{AnalysisEngine, Candidate, CandidateSet, CandidateStats};
use review_worker::error::ReviewError;

pub fn pt(s: &str) -> BoardPoint {
    s.parse().unwrap()
}

/// Point from 1-based (column, row).
pub fn at(column: u8, row: u8) -> BoardPoint {
    BoardPoint::new(column, row).unwrap()
}

pub fn cand(point: BoardPoint, win_rate: f64, visit_share: f64, lcb: f64) -> Candidate {
    Candidate {
        point,
        stats: CandidateStats {
            win_rate,
            visit_share,
            lcb,
        },
    }
}

pub fn game(moves: Vec<Move>) -> GameRecord {
    GameRecord {
        metadata: GameMetadata {
            black: "Alice".to_string(),
            white: "Bob".to_string(),
            ..GameMetadata::default()
        },
        setup: vec![],
        moves,
    }
}

/// `n` alternating moves on distinct points, Black first.
pub fn long_game(n: usize) -> GameRecord {
    let moves = (0..n)
        .map(|i| {
            let color = if i % 2 == 0 { Color::Black } else { Color::White };
            Move::play(color, at((i % 19) as u8 + 1, (i / 19 % 19) as u8 + 1))
        })
        .collect();
    game(moves)
}

/// What the stub sees when asked to analyze.
pub struct Query<'a> {
    /// Human move of the ply being reviewed.
    pub human: BoardPoint,
    pub request: &'a AnalyzeRequest,
    /// Analyze calls made so far, this one excluded.
    pub call: usize,
}

type Responder = Box<dyn FnMut(&Query<'_>) -> Result<CandidateSet, ReviewError>>;

/// In-memory engine. Knows the game's human moves so responders can
/// include or withhold them; the current ply advances on every commit.
pub struct StubEngine {
    humans: Vec<BoardPoint>,
    respond: Responder,
    setup_left: usize,
    pub ply: usize,
    pub requests: Vec<AnalyzeRequest>,
    pub commits: Vec<CommitRequest>,
}

impl StubEngine {
    pub fn new(
        record: &GameRecord,
        respond: impl FnMut(&Query<'_>) -> Result<CandidateSet, ReviewError> + 'static,
    ) -> Self {
        Self {
            humans: record.moves.iter().filter_map(Move::point).collect(),
            respond: Box::new(respond),
            setup_left: record.setup.len(),
            ply: 0,
            requests: Vec::new(),
            commits: Vec::new(),
        }
    }
}

impl AnalysisEngine for StubEngine {
    async fn analyze(&mut self, request: &AnalyzeRequest) -> Result<CandidateSet, ReviewError> {
        let query = Query {
            human: self.humans[self.ply],
            request,
            call: self.requests.len(),
        };
        let result = (self.respond)(&query);
        self.requests.push(request.clone());
        result
    }

    async fn commit(&mut self, commit: &CommitRequest) -> Result<(), ReviewError> {
        self.commits.push(*commit);
        if self.setup_left > 0 {
            self.setup_left -= 1;
        } else {
            self.ply += 1;
        }
        Ok(())
    }
}
