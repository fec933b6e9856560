//! Go game reviewer
//!
//! Replays an SGF record through a GTP analysis engine and writes, for every
//! move, the engine's preferred move next to the one actually played.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use review_worker::commands::CommandPlan;
use review_worker::config::{Cli, ReviewConfig, DEFAULT_KOMI};
use review_worker::go_core::parse_sgf;
use review_worker::hardware;
use review_worker::report::GameReview;
use review_worker::reviewer;
use review_worker::session::EngineSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file so its variables can fill in flags
    let _ = dotenvy::dotenv();

    let config = ReviewConfig::from_cli(Cli::parse())?;

    let text = tokio::fs::read_to_string(&config.sgf)
        .await
        .with_context(|| format!("reading {}", config.sgf.display()))?;
    let record = parse_sgf(&text)?;
    let meta = &record.metadata;
    info!(
        black = %meta.black,
        white = %meta.white,
        result = meta.result.as_deref().unwrap_or("?"),
        moves = record.moves.len(),
        "Game loaded"
    );

    let komi = config.komi.or(meta.komi).unwrap_or(DEFAULT_KOMI);
    let plan = CommandPlan::build(&record, komi);

    if config.print_plan {
        for line in plan.script() {
            println!("{line}");
        }
        return Ok(());
    }

    let cpu_only = hardware::cpu_only(config.hardware).await;
    let launch = config.launch(cpu_only, &plan);
    info!(program = %launch.program, args = ?launch.args, "Launching engine");

    let mut engine = EngineSession::start(&launch).await?;
    let mut review = GameReview::new(record.metadata.clone());

    let outcome = reviewer::review_game(&mut engine, &plan, config.max_plies, &mut review).await;
    engine.shutdown().await;

    // Whatever finished before a failure is still written out
    review.finish(outcome, &config.output, config.format)?;
    println!("Success! File written to {}", config.output.display());
    Ok(())
}
