//! Drowsiness Monitor - replay entry point
//!
//! Usage: `drowsiness-monitor [FRAMES.jsonl|-] [SETTINGS.toml]`
//!
//! Reads detector output as JSON Lines (stdin when no file or `-` is given)
//! and writes one JSON frame report per line to stdout.

use std::io::Write;
use std::path::Path;

use alerting::LogActuator;
use anyhow::Context;
use monitor::{init_logging, replay, MonitorSession, Settings};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next();
    let settings_path = args.next();

    let settings = Settings::load(settings_path.as_deref().map(Path::new)).context("loading settings")?;
    init_logging(settings.log_level()?)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let reader: Box<dyn AsyncBufRead + Unpin> = match input.as_deref() {
        None | Some("-") => Box::new(BufReader::new(tokio::io::stdin())),
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {path}"))?;
            Box::new(BufReader::new(file))
        }
    };

    let mut session = MonitorSession::from_settings(&settings, LogActuator::new())?;
    let stdout = std::io::stdout();
    let summary = replay(&mut session, reader, |report| {
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, report)?;
        writeln!(out)?;
        Ok(())
    })
    .await?;

    session.stop();
    info!(
        "Processed {} frames ({} unreadable), alert raised {} times",
        summary.frames, summary.failed, summary.starts
    );

    Ok(())
}
