//! Candidate table parser.
//!
//! The engine prints one line per candidate after a search, e.g.
//! `  Q16 ->    1234 (V: 45.67%) (LCB: 44.12%) (N: 23.45%) PV: Q16 D4`.

use std::sync::LazyLock;

use go_core::BoardPoint;
use regex::Regex;

use crate::engine::{Candidate, CandidateSet, CandidateStats};
use crate::error::ReviewError;

/// Substring present on every candidate line and nowhere else.
pub const CANDIDATE_MARKER: &str = " -> ";

static WIN_RATE: LazyLock<Regex> = LazyLock::new(|| field_regex("V"));
static LCB: LazyLock<Regex> = LazyLock::new(|| field_regex("LCB"));
static VISIT_SHARE: LazyLock<Regex> = LazyLock::new(|| field_regex("N"));

fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(r"\({label}:\s*(-?\d+(?:\.\d+)?)%\)")).unwrap()
}

fn field(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

fn parse_line(line: &str) -> Result<Candidate, ReviewError> {
    let malformed = || ReviewError::MalformedCandidateLine(line.to_string());

    let point: BoardPoint = line
        .split_whitespace()
        .next()
        .ok_or_else(malformed)?
        .parse()
        .map_err(|_| malformed())?;

    let stats = CandidateStats {
        win_rate: field(&WIN_RATE, line).ok_or_else(malformed)?,
        visit_share: field(&VISIT_SHARE, line).ok_or_else(malformed)?,
        lcb: field(&LCB, line).ok_or_else(malformed)?,
    };
    Ok(Candidate { point, stats })
}

/// Parse every candidate line of `raw`, in the order they appear.
pub fn extract(raw: &str) -> Result<CandidateSet, ReviewError> {
    raw.lines()
        .filter(|line| line.contains(CANDIDATE_MARKER))
        .map(parse_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Playouts: 58, Win: 45.19%, PV: Q16 D4
NN eval=0.451928
  Q16 ->      40 (V: 55.00%) (LCB: 50.00%) (N: 40.00%) PV: Q16 D4 R4
   D4 ->      12 (V: 48.25%) (LCB: 41.10%) (N: 18.50%) PV: D4
  R17 ->       3 (V: 30.00%) (LCB: -5.25%) (N: 2.10%) PV: R17
58 visits, 58 nodes, 57 playouts, 120 n/s
=3 Q16
";

    #[test]
    fn test_extract_keeps_engine_order() {
        let set = extract(REPORT).unwrap();
        let points: Vec<String> = set.iter().map(|c| c.point.to_string()).collect();
        assert_eq!(points, vec!["q16", "d4", "r17"]);
        assert_eq!(
            set[1].stats,
            CandidateStats {
                win_rate: 48.25,
                visit_share: 18.5,
                lcb: 41.1
            }
        );
        assert_eq!(set[2].stats.lcb, -5.25);
    }

    #[test]
    fn test_no_candidate_lines() {
        assert!(extract("=1\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let raw = "  Q16 ->      40 (V: 55.00%) (N: 40.00%) PV: Q16\n";
        match extract(raw) {
            Err(ReviewError::MalformedCandidateLine(line)) => assert!(line.contains("Q16")),
            other => panic!("expected MalformedCandidateLine, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_coordinate_is_fatal() {
        let raw = " pass ->   4 (V: 1.00%) (LCB: 0.00%) (N: 1.00%) PV: pass\n";
        assert!(matches!(
            extract(raw),
            Err(ReviewError::MalformedCandidateLine(_))
        ));
    }
}
