//! Board-game primitives shared by the review pipeline: points, moves and
//! game records read from SGF.

pub mod coord;
pub mod game_record;
pub mod sgf;

pub use coord::{BoardPoint, CoordError};
pub use game_record::{Color, GameMetadata, GameRecord, Move, Vertex};
pub use sgf::{parse_sgf, SgfError};
