//! Last command - show a saved session.

use anyhow::Result;
use clap::Args;
use console::Style;
use wayfarer_session::{SessionStore, restore_session};

use super::{Context, output};

/// Arguments for the last command.
#[derive(Args, Debug)]
pub struct LastArgs {
    /// Show this session instead of the most recent one
    #[arg(short, long)]
    pub session: Option<String>,

    /// Delete all saved sessions
    #[arg(long, conflicts_with = "session")]
    pub clear: bool,
}

/// Run the last command.
pub async fn run(args: LastArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;

    if args.clear {
        store.clear()?;
        println!("Cleared saved sessions in {}", store.dir().display());
        return Ok(());
    }

    let session = match &args.session {
        Some(id) => restore_session(id.as_str(), store.load(id)?),
        None => match store.latest()? {
            Some(stored) => {
                if ctx.verbose {
                    let dim = Style::new().dim();
                    eprintln!(
                        "{}",
                        dim.apply_to(format!("Saved {}", stored.timestamp.to_rfc3339()))
                    );
                }
                stored.into_session()
            }
            None => {
                println!("No completed session saved yet");
                return Ok(());
            }
        },
    };

    if ctx.json_output {
        output::print_json(&session)?;
    } else {
        output::print_session(&session);
    }

    Ok(())
}
