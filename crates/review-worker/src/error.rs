//! Review pipeline error types

use std::time::Duration;

use go_core::{BoardPoint, CoordError, SgfError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Game record error: {0}")]
    GameRecord(#[from] SgfError),

    #[error(transparent)]
    InvalidCoordinate(#[from] CoordError),

    #[error("Failed to spawn engine {program}: {source}")]
    EngineSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine did not print its ready banner within {0:?}")]
    EngineStartTimeout(Duration),

    #[error("Engine timed out after {timeout:?} on {command:?}")]
    EngineTimeout { command: String, timeout: Duration },

    #[error("Engine exited during {command:?}")]
    EngineCrashed { command: String },

    #[error("Engine rejected {command:?}: {message}")]
    EngineRejected { command: String, message: String },

    #[error("Malformed candidate line: {0:?}")]
    MalformedCandidateLine(String),

    #[error("Engine reported no candidates for move {0}")]
    NoCandidates(u32),

    #[error("Could not evaluate human move {point} at move {move_number}")]
    HumanMoveUnresolvable { move_number: u32, point: BoardPoint },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
