//! Command plan for a game: what to say to the engine, built before any
//! engine interaction so it can be logged or replayed on its own.

use go_core::{BoardPoint, Color, GameRecord, Vertex};

/// Stand-in for the allow-list of a forced analysis until dispatch time.
pub const ALLOW_PLACEHOLDER: &str = "{allow}";

/// Pass and resign are never considered by the engine.
const AVOIDED: &str = "pass,resign";

fn analyze_line(color: Color, allow: Option<&str>) -> String {
    let c = color.gtp();
    let mut line = format!("lz-genmove_analyze {c} avoid {c} {AVOIDED} 1");
    if let Some(allow) = allow {
        line.push_str(&format!(" allow {c} {allow} 1"));
    }
    line
}

fn join_points(points: &[BoardPoint]) -> String {
    points
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// A ranked-candidates request for one side to move.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    pub color: Color,
    /// `None` lets the engine choose freely among all legal moves.
    pub allow: Option<Vec<BoardPoint>>,
}

impl AnalyzeRequest {
    pub fn best(color: Color) -> Self {
        Self { color, allow: None }
    }

    pub fn to_gtp(&self) -> String {
        let allow = self.allow.as_deref().map(join_points);
        analyze_line(self.color, allow.as_deref())
    }
}

/// Forced analysis whose allow-list is decided while the ply is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedTemplate {
    pub color: Color,
}

impl ForcedTemplate {
    pub fn fill(&self, allow: Vec<BoardPoint>) -> AnalyzeRequest {
        AnalyzeRequest {
            color: self.color,
            allow: Some(allow),
        }
    }

    pub fn to_gtp(&self) -> String {
        analyze_line(self.color, Some(ALLOW_PLACEHOLDER))
    }
}

/// Places a stone on the engine's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRequest {
    pub color: Color,
    pub point: BoardPoint,
}

impl CommitRequest {
    pub fn to_gtp(&self) -> String {
        format!("play {} {}", self.color.gtp(), self.point)
    }
}

/// The three logical commands issued for one reviewed move.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyCommands {
    /// 1-based position of the move in the game record, passes included.
    pub move_number: u32,
    pub color: Color,
    pub human: BoardPoint,
    pub best: AnalyzeRequest,
    pub forced: ForcedTemplate,
    pub commit: CommitRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandPlan {
    pub board_size: u8,
    pub komi: f64,
    pub setup: Vec<CommitRequest>,
    pub plies: Vec<PlyCommands>,
}

impl CommandPlan {
    /// Build the plan for a whole game. Passes produce no commands.
    pub fn build(record: &GameRecord, komi: f64) -> Self {
        let setup = record
            .setup
            .iter()
            .filter_map(|m| {
                m.point().map(|point| CommitRequest {
                    color: m.player,
                    point,
                })
            })
            .collect();

        let plies = record
            .moves
            .iter()
            .enumerate()
            .filter_map(|(i, m)| match m.vertex {
                Vertex::Pass => None,
                Vertex::Point(point) => Some(PlyCommands {
                    move_number: i as u32 + 1,
                    color: m.player,
                    human: point,
                    best: AnalyzeRequest::best(m.player),
                    forced: ForcedTemplate { color: m.player },
                    commit: CommitRequest {
                        color: m.player,
                        point,
                    },
                }),
            })
            .collect();

        Self {
            board_size: record.metadata.board_size,
            komi,
            setup,
            plies,
        }
    }

    /// Board initialisation sent right after the engine is ready.
    pub fn init_commands(&self) -> Vec<String> {
        vec![
            format!("boardsize {}", self.board_size),
            "clear_board".to_string(),
            format!("komi {}", self.komi),
        ]
    }

    /// Every planned command in order, with forced allow-lists left as
    /// [`ALLOW_PLACEHOLDER`].
    pub fn script(&self) -> Vec<String> {
        let mut lines = self.init_commands();
        lines.extend(self.setup.iter().map(CommitRequest::to_gtp));
        for ply in &self.plies {
            lines.push(ply.best.to_gtp());
            lines.push(ply.forced.to_gtp());
            lines.push(ply.commit.to_gtp());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use go_core::{GameMetadata, Move};

    fn pt(s: &str) -> BoardPoint {
        s.parse().unwrap()
    }

    fn record(moves: Vec<Move>) -> GameRecord {
        GameRecord {
            metadata: GameMetadata::default(),
            setup: vec![],
            moves,
        }
    }

    #[test]
    fn test_passes_are_skipped_but_keep_numbering() {
        let game = record(vec![
            Move::play(Color::Black, pt("d4")),
            Move::pass(Color::White),
            Move::play(Color::Black, pt("q16")),
        ]);
        let plan = CommandPlan::build(&game, 7.5);
        assert_eq!(plan.plies.len(), 2);
        assert_eq!(plan.plies[0].move_number, 1);
        assert_eq!(plan.plies[1].move_number, 3);
        assert_eq!(plan.plies[1].human, pt("q16"));
        assert!(plan.script().iter().all(|l| !l.contains("play w")));
    }

    #[test]
    fn test_script_order() {
        let mut game = record(vec![Move::play(Color::White, pt("c3"))]);
        game.setup.push(Move::play(Color::Black, pt("d4")));
        let plan = CommandPlan::build(&game, 0.5);
        assert_eq!(
            plan.script(),
            vec![
                "boardsize 19",
                "clear_board",
                "komi 0.5",
                "play b d4",
                "lz-genmove_analyze w avoid w pass,resign 1",
                "lz-genmove_analyze w avoid w pass,resign 1 allow w {allow} 1",
                "play w c3",
            ]
        );
    }

    #[test]
    fn test_fill_forced_template() {
        let forced = ForcedTemplate { color: Color::Black };
        let req = forced.fill(vec![pt("q16"), pt("d4")]);
        assert_eq!(
            req.to_gtp(),
            "lz-genmove_analyze b avoid b pass,resign 1 allow b q16,d4 1"
        );
    }
}
