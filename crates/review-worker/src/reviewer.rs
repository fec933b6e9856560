//! Per-ply review: compare the engine's choice with the move actually played.
//!
//! When the human move is missing from the engine's free ranking it is
//! requeried twice: first with an allow-list of the human move plus the
//! stronger candidates, then with the human move alone.

use go_core::{BoardPoint, Color};
use tracing::{debug, info};

use crate::commands::{CommandPlan, PlyCommands};
use crate::engine::{find_candidate, AnalysisEngine, Candidate, CandidateStats};
use crate::error::ReviewError;
use crate::report::GameReview;

/// Default ply cap, bounding wall-clock time on very long games.
pub const MAX_PLIES: usize = 180;

/// Candidates with the least visit share dropped from the first requery.
const WEAKEST_DROPPED: usize = 2;

/// How the human move's statistics were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Present in the engine's free ranking.
    Direct,
    /// Found by the first (allow-list) requery.
    Requeried,
    /// Only the single-move requery evaluated it.
    Forced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlyRecord {
    pub move_number: u32,
    pub color: Color,
    pub human_move: BoardPoint,
    pub engine_move: BoardPoint,
    pub human: CandidateStats,
    pub engine: CandidateStats,
    pub requery_escalated: bool,
}

/// Allow-list for the first requery: the human move, then every best-move
/// candidate except the two with the lowest visit share.
pub fn first_requery_allow_list(human: BoardPoint, best: &[Candidate]) -> Vec<BoardPoint> {
    let mut ranked: Vec<&Candidate> = best.iter().collect();
    ranked.sort_by(|a, b| a.stats.visit_share.total_cmp(&b.stats.visit_share));
    std::iter::once(human)
        .chain(ranked.iter().skip(WEAKEST_DROPPED).map(|c| c.point))
        .collect()
}

fn lowest_visit_share(set: &[Candidate]) -> Option<f64> {
    set.iter().map(|c| c.stats.visit_share).reduce(f64::min)
}

async fn requery_human<E: AnalysisEngine>(
    engine: &mut E,
    ply: &PlyCommands,
    best: &[Candidate],
) -> Result<(CandidateStats, Resolution), ReviewError> {
    let allow = first_requery_allow_list(ply.human, best);
    debug!(move_number = ply.move_number, allow = ?allow, "Human move not ranked, requerying");
    let forced = engine.analyze(&ply.forced.fill(allow)).await?;
    if let Some(found) = find_candidate(&forced, ply.human) {
        return Ok((found.stats, Resolution::Requeried));
    }

    // An engine held to a single move reports near-total visit share, so the
    // weakest share from the first requery stands in for it.
    let lowest = lowest_visit_share(&forced)
        .or_else(|| lowest_visit_share(best))
        .unwrap_or(0.0);

    let single = engine.analyze(&ply.forced.fill(vec![ply.human])).await?;
    let found = find_candidate(&single, ply.human).ok_or(ReviewError::HumanMoveUnresolvable {
        move_number: ply.move_number,
        point: ply.human,
    })?;
    Ok((
        CandidateStats {
            visit_share: lowest,
            ..found.stats
        },
        Resolution::Forced,
    ))
}

/// Review one ply and commit the human move. Nothing is returned unless
/// every exchange of the ply succeeded.
pub async fn review_ply<E: AnalysisEngine>(
    engine: &mut E,
    ply: &PlyCommands,
) -> Result<PlyRecord, ReviewError> {
    let best = engine.analyze(&ply.best).await?;
    let top = *best
        .first()
        .ok_or(ReviewError::NoCandidates(ply.move_number))?;

    let (human, resolution) = match find_candidate(&best, ply.human) {
        Some(found) => (found.stats, Resolution::Direct),
        None => requery_human(engine, ply, &best).await?,
    };

    engine.commit(&ply.commit).await?;

    info!(
        move_number = ply.move_number,
        color = %ply.color,
        human = %ply.human,
        engine = %top.point,
        human_win_rate = human.win_rate,
        engine_win_rate = top.stats.win_rate,
        resolution = ?resolution,
        "Reviewed move"
    );

    Ok(PlyRecord {
        move_number: ply.move_number,
        color: ply.color,
        human_move: ply.human,
        engine_move: top.point,
        human,
        engine: top.stats,
        requery_escalated: resolution == Resolution::Forced,
    })
}

/// Review a planned game, pushing each finished ply into `review`.
///
/// Stops after `max_plies` records. On error the plies already pushed stay in
/// `review`.
pub async fn review_game<E: AnalysisEngine>(
    engine: &mut E,
    plan: &CommandPlan,
    max_plies: usize,
    review: &mut GameReview,
) -> Result<(), ReviewError> {
    for stone in &plan.setup {
        engine.commit(stone).await?;
    }

    for ply in plan.plies.iter().take(max_plies) {
        let record = review_ply(engine, ply).await?;
        review.push(record);
    }

    if plan.plies.len() > max_plies {
        info!(
            max_plies,
            skipped = plan.plies.len() - max_plies,
            "Ply cap reached"
        );
    }
    Ok(())
}
