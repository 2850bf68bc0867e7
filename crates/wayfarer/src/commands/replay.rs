//! Replay command - assemble a captured event stream offline.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use bytes::Bytes;
use clap::Args;
use wayfarer_session::SessionStore;
use wayfarer_stream::{AssemblerConfig, StreamDriver, collect_session};

use super::{Context, output};

/// Network-sized slices the transcript is fed in, so replays exercise the
/// same reassembly paths as a live stream.
const REPLAY_CHUNK_SIZE: usize = 512;

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// File holding a raw `text/event-stream` body
    #[arg(required = true)]
    pub file: PathBuf,

    /// Save the result as the last completed session
    #[arg(long)]
    pub save: bool,
}

/// Run the replay command.
pub async fn run(args: ReplayArgs, ctx: &Context) -> Result<()> {
    let body = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    tracing::debug!(file = %args.file.display(), bytes = body.len(), "Replaying transcript");

    let body = Bytes::from(body);
    let parts: Vec<Result<Bytes, std::io::Error>> = (0..body.len())
        .step_by(REPLAY_CHUNK_SIZE)
        .map(|start| Ok(body.slice(start..(start + REPLAY_CHUNK_SIZE).min(body.len()))))
        .collect();

    let driver = StreamDriver::new(
        AssemblerConfig::new().with_redirect(ctx.loaded.config.stream().redirect),
    );
    let session = collect_session(driver.start(futures::stream::iter(parts))).await?;

    if args.save {
        ctx.store()?.save_completed(&session)?;
        if !ctx.json_output {
            eprintln!("Saved session {}", session.session_id);
        }
    }

    if ctx.json_output {
        output::print_json(&session)?;
    } else {
        output::print_session(&session);
    }

    Ok(())
}
