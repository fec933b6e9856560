pub use go_core;

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod framing;
pub mod hardware;
pub mod report;
pub mod reviewer;
pub mod session;
pub mod transcript;
