//! Engine coordinate codec.
//! Columns are lettered `a..h, j..t` (no `i`), rows are numbered from the bottom.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column letters in engine order. `i` is skipped by convention.
const COLUMN_CHARS: &[u8] = b"abcdefghjklmnopqrst";

/// Largest supported board edge.
pub const MAX_BOARD_SIZE: u8 = 19;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("invalid coordinate: row {row}, column {column} (expected 1..={MAX_BOARD_SIZE})")]
    OutOfRange { row: u8, column: u8 },

    #[error("invalid coordinate text: {0:?}")]
    BadText(String),
}

/// A point on the board, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardPoint {
    column: u8,
    row: u8,
}

impl BoardPoint {
    pub fn new(column: u8, row: u8) -> Result<Self, CoordError> {
        if !(1..=MAX_BOARD_SIZE).contains(&row) || !(1..=MAX_BOARD_SIZE).contains(&column) {
            return Err(CoordError::OutOfRange { row, column });
        }
        Ok(Self { column, row })
    }

    pub fn column(self) -> u8 {
        self.column
    }

    pub fn row(self) -> u8 {
        self.row
    }

    fn column_char(self) -> char {
        COLUMN_CHARS[(self.column - 1) as usize] as char
    }
}

impl fmt::Display for BoardPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_char(), self.row)
    }
}

impl FromStr for BoardPoint {
    type Err = CoordError;

    /// Accepts either case, so engine output like `Q16` parses too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, column) = decode(s)?;
        Self::new(column, row)
    }
}

/// Encode a 1-based (row, column) pair as engine text, e.g. `(16, 17)` -> `r16`.
pub fn encode(row: u8, column: u8) -> Result<String, CoordError> {
    BoardPoint::new(column, row).map(|p| p.to_string())
}

/// Inverse of [`encode`]. Returns `(row, column)`.
pub fn decode(text: &str) -> Result<(u8, u8), CoordError> {
    let bad = || CoordError::BadText(text.to_string());
    let text = text.trim();
    let mut chars = text.chars();
    let letter = chars.next().ok_or_else(bad)?.to_ascii_lowercase();
    let column = COLUMN_CHARS
        .iter()
        .position(|&c| c as char == letter)
        .ok_or_else(bad)? as u8
        + 1;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let row: u8 = digits.parse().map_err(|_| bad())?;
    BoardPoint::new(column, row)?;
    Ok((row, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_skips_i() {
        assert_eq!(encode(4, 8).unwrap(), "h4");
        assert_eq!(encode(4, 9).unwrap(), "j4");
        assert_eq!(encode(19, 19).unwrap(), "t19");
        assert_eq!(encode(1, 1).unwrap(), "a1");
    }

    #[test]
    fn test_round_trip_all_points() {
        for row in 1..=MAX_BOARD_SIZE {
            for column in 1..=MAX_BOARD_SIZE {
                let text = encode(row, column).unwrap();
                assert_eq!(decode(&text).unwrap(), (row, column), "{text}");
            }
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            encode(0, 4),
            Err(CoordError::OutOfRange { row: 0, column: 4 })
        );
        assert!(encode(20, 1).is_err());
        assert!(encode(3, 20).is_err());
    }

    #[test]
    fn test_decode_engine_case_and_garbage() {
        assert_eq!("Q16".parse::<BoardPoint>().unwrap().to_string(), "q16");
        assert!(decode("i5").is_err());
        assert!(decode("pass").is_err());
        assert!(decode("z3").is_err());
        assert!(decode("a20").is_err());
        assert!(decode("").is_err());
        assert!(decode("a+3").is_err());
    }
}
