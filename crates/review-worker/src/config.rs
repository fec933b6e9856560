//! Review configuration from command-line flags and environment variables

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use regex::Regex;

use crate::commands::CommandPlan;
use crate::error::ReviewError;
use crate::framing::Terminator;
use crate::hardware::HardwareMode;
use crate::report::OutputFormat;
use crate::reviewer::MAX_PLIES;
use crate::session::EngineLaunch;

/// Komi when neither the flag nor the record sets one.
pub const DEFAULT_KOMI: f64 = 7.5;

/// Compare every move of a Go game record with an engine's choice.
#[derive(Parser, Debug, Clone)]
#[command(name = "go-review", version)]
pub struct Cli {
    /// Game record (SGF)
    #[arg(short, long, env = "REVIEW_SGF")]
    pub sgf: PathBuf,

    /// Output file
    #[arg(short, long, env = "REVIEW_OUTPUT", default_value = "output_file.csv")]
    pub output: PathBuf,

    #[arg(long, env = "REVIEW_FORMAT", value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Engine executable (must speak GTP)
    #[arg(short, long, env = "REVIEW_ENGINE", default_value = "leelaz")]
    pub executable: String,

    /// Network weights file
    #[arg(short, long, env = "REVIEW_WEIGHTS", default_value = "elfv2")]
    pub weights: String,

    /// Playouts per search
    #[arg(short, long, env = "REVIEW_PLAYOUTS", default_value_t = 1)]
    pub playouts: u32,

    #[arg(long, env = "REVIEW_HARDWARE", value_enum, default_value_t = HardwareMode::Auto)]
    pub hardware: HardwareMode,

    /// Override the record's komi
    #[arg(long, env = "REVIEW_KOMI")]
    pub komi: Option<f64>,

    /// Stop after this many reviewed moves
    #[arg(long, env = "REVIEW_MAX_PLIES", default_value_t = MAX_PLIES)]
    pub max_plies: usize,

    /// Per-command timeout
    #[arg(long, env = "REVIEW_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Time allowed for the engine to load its network
    #[arg(long, env = "REVIEW_START_TIMEOUT_SECS", default_value_t = 120)]
    pub start_timeout_secs: u64,

    /// Line printed by the engine once it accepts commands
    #[arg(long, env = "REVIEW_READY_PATTERN", default_value = "Setting max tree size")]
    pub ready_pattern: String,

    /// Write every command sent to the engine to this file
    #[arg(long, env = "REVIEW_TRANSCRIPT")]
    pub transcript: Option<PathBuf>,

    /// Print the planned commands and exit without starting the engine
    #[arg(long)]
    pub print_plan: bool,
}

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    pub sgf: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub executable: String,
    pub weights: String,
    pub playouts: u32,
    pub hardware: HardwareMode,
    pub komi: Option<f64>,
    pub max_plies: usize,
    pub timeout: Duration,
    pub start_timeout: Duration,
    pub ready: Regex,
    pub transcript: Option<PathBuf>,
    pub print_plan: bool,
}

impl ReviewConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ReviewError> {
        if cli.max_plies == 0 {
            return Err(ReviewError::Config("max plies must be at least 1".into()));
        }
        if cli.timeout_secs == 0 || cli.start_timeout_secs == 0 {
            return Err(ReviewError::Config("timeouts must be at least 1 second".into()));
        }
        let ready = Regex::new(&cli.ready_pattern)
            .map_err(|e| ReviewError::Config(format!("invalid ready pattern: {e}")))?;

        Ok(Self {
            sgf: cli.sgf,
            output: cli.output,
            format: cli.format,
            executable: cli.executable,
            weights: cli.weights,
            playouts: cli.playouts,
            hardware: cli.hardware,
            komi: cli.komi,
            max_plies: cli.max_plies,
            timeout: Duration::from_secs(cli.timeout_secs),
            start_timeout: Duration::from_secs(cli.start_timeout_secs),
            ready,
            transcript: cli.transcript,
            print_plan: cli.print_plan,
        })
    }

    /// Engine command line: GTP mode, playouts, weights, no pondering.
    pub fn engine_args(&self, cpu_only: bool) -> Vec<String> {
        let mut args = vec![
            "-g".to_string(),
            "-p".to_string(),
            self.playouts.to_string(),
            "-w".to_string(),
            self.weights.clone(),
            "--noponder".to_string(),
        ];
        if cpu_only {
            args.push("--cpu-only".to_string());
        }
        args
    }

    pub fn launch(&self, cpu_only: bool, plan: &CommandPlan) -> EngineLaunch {
        EngineLaunch {
            program: self.executable.clone(),
            args: self.engine_args(cpu_only),
            ready: Terminator::Pattern(self.ready.clone()),
            start_timeout: self.start_timeout,
            exchange_timeout: self.timeout,
            init: plan.init_commands(),
            transcript: self.transcript.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ReviewConfig, ReviewError> {
        let cli = Cli::try_parse_from(std::iter::once("go-review").chain(args.iter().copied()))
            .expect("cli parses");
        ReviewConfig::from_cli(cli)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--sgf", "game.sgf"]).unwrap();
        assert_eq!(config.max_plies, 180);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.output, PathBuf::from("output_file.csv"));
        assert_eq!(
            config.engine_args(true),
            vec!["-g", "-p", "1", "-w", "elfv2", "--noponder", "--cpu-only"]
        );
        assert_eq!(config.engine_args(false).len(), 6);
    }

    #[test]
    fn test_rejects_zero_cap_and_bad_pattern() {
        assert!(matches!(
            parse(&["--sgf", "g.sgf", "--max-plies", "0"]),
            Err(ReviewError::Config(_))
        ));
        assert!(matches!(
            parse(&["--sgf", "g.sgf", "--ready-pattern", "("]),
            Err(ReviewError::Config(_))
        ));
    }
}
