//! Response framing: read lines until a terminator line or a deadline.
//!
//! Works on any line channel, so canned text can be framed without a
//! process behind it.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Search summary printed after the candidate table.
static REPORT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+ visits, \d+ nodes").unwrap());

/// Id of a GTP reply line (`=7 ...` or `?7 ...`), with its success flag.
pub fn reply_id(line: &str) -> Option<(u32, bool)> {
    let ok = match line.chars().next()? {
        '=' => true,
        '?' => false,
        _ => return None,
    };
    let digits: String = line[1..].chars().take_while(char::is_ascii_digit).collect();
    Some((digits.parse().ok()?, ok))
}

#[derive(Debug, Clone)]
pub enum Terminator {
    /// Reply to the command with this id.
    Ack(u32),
    /// End of a full candidate report, or a failure reply to this id.
    Report(u32),
    /// Any line matching the pattern (startup banner).
    Pattern(Regex),
}

impl Terminator {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Terminator::Ack(id) => reply_id(line).is_some_and(|(n, _)| n == *id),
            Terminator::Report(id) => {
                REPORT_END.is_match(line) || reply_id(line) == Some((*id, false))
            }
            Terminator::Pattern(re) => re.is_match(line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Deadline passed; carries what was read so far.
    TimedOut(String),
    /// The line source closed before the terminator.
    Closed(String),
}

/// Accumulate lines (newline-joined, terminator included) until `terminator`
/// matches or `timeout` elapses.
pub async fn read_until(
    lines: &mut UnboundedReceiver<String>,
    terminator: &Terminator,
    timeout: Duration,
) -> Result<String, FrameError> {
    let mut raw = String::new();
    let found = tokio::time::timeout(timeout, async {
        while let Some(line) = lines.recv().await {
            debug!(line = %line, "GTP >");
            raw.push_str(&line);
            raw.push('\n');
            if terminator.matches(&line) {
                return true;
            }
        }
        false
    })
    .await;

    match found {
        Ok(true) => Ok(raw),
        Ok(false) => Err(FrameError::Closed(raw)),
        Err(_) => Err(FrameError::TimedOut(raw)),
    }
}
