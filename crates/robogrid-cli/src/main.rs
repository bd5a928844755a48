//! Headless harness: run a player program against a level file.

use anyhow::{anyhow, bail, Context, Result};
use robogrid_core::{EngineConfig, LevelConfig};
use robogrid_engine::GameEngine;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,robogrid_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(level_path), Some(source_path)) = (args.next(), args.next()) else {
        bail!("usage: robogrid-cli <level.json> <program>");
    };

    let level_json = std::fs::read_to_string(&level_path)
        .with_context(|| format!("reading level file {}", level_path))?;
    let level: LevelConfig =
        serde_json::from_str(&level_json).with_context(|| format!("parsing {}", level_path))?;
    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("reading program {}", source_path))?;

    info!(level = %level.id, "Loaded level");

    let engine = GameEngine::new(level, EngineConfig::default(), || {
        info!("Level complete");
    })?;

    let mut rx = engine.subscribe();
    let run_id = engine
        .run_code(&source)
        .ok_or_else(|| anyhow!("engine refused the run"))?;

    let mut printed = 0usize;
    loop {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.run_id == run_id {
            for line in &snapshot.logs[printed..] {
                info!(target: "robogrid", "{}", line);
            }
            printed = snapshot.logs.len();

            if !snapshot.is_running {
                if let Some(message) = snapshot.error {
                    error!("{}", message);
                    return Err(anyhow!(message));
                }
                info!(
                    success = snapshot.is_success,
                    moves = snapshot.move_count,
                    coins = snapshot.collected.len(),
                    "Run finished"
                );
                return Ok(());
            }
        }

        if rx.changed().await.is_err() {
            bail!("engine state channel closed");
        }
    }
}
