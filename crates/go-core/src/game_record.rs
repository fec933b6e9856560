use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::BoardPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Single-letter form used on the engine wire.
    pub fn gtp(self) -> &'static str {
        match self {
            Color::Black => "b",
            Color::White => "w",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Black => "black",
            Color::White => "white",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vertex {
    Point(BoardPoint),
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: Color,
    pub vertex: Vertex,
}

impl Move {
    pub fn play(player: Color, point: BoardPoint) -> Self {
        Self {
            player,
            vertex: Vertex::Point(point),
        }
    }

    pub fn pass(player: Color) -> Self {
        Self {
            player,
            vertex: Vertex::Pass,
        }
    }

    pub fn point(&self) -> Option<BoardPoint> {
        match self.vertex {
            Vertex::Point(p) => Some(p),
            Vertex::Pass => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub black: String,
    pub white: String,
    pub result: Option<String>, // "B+R", "W+3.5", ...
    pub board_size: u8,
    pub komi: Option<f64>,
    pub date: Option<String>,
    pub event: Option<String>,
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            black: "Unknown".to_string(),
            white: "Unknown".to_string(),
            result: None,
            board_size: 19,
            komi: None,
            date: None,
            event: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameRecord {
    pub metadata: GameMetadata,
    /// Stones placed before the first move (handicap / AB / AW).
    pub setup: Vec<Move>,
    pub moves: Vec<Move>,
}
