//! Config command - show the effective configuration.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Only print the config file paths that were checked
    #[arg(long)]
    pub which: bool,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    if args.which {
        for source in &loaded.sources {
            let status = if source.loaded { "loaded" } else { "not found" };
            println!("{:<10} {:<8} {}", status, source.layer, source.path.display());
        }
        return Ok(());
    }

    let mut config = loaded.config.clone();
    let mut server = config.server();
    server.url = ctx.server_url.clone();
    if server.auth_token.is_some() {
        server.auth_token = Some("********".to_string());
    }
    config.server = Some(server);
    config.rate_limit = Some(config.rate_limit());
    config.stream = Some(config.stream());
    config.storage = Some(wayfarer_config::StorageSection {
        dir: wayfarer_config::storage_dir(&config),
    });

    if ctx.json_output {
        let value = serde_json::json!({
            "server": {
                "url": ctx.server_url,
                "timeout_secs": config.server().timeout_secs,
                "stream_timeout_secs": config.server().stream_timeout_secs,
                "authenticated": loaded.config.server().auth_token.is_some(),
            },
            "rate_limit": {
                "enabled": config.rate_limit().enabled,
                "max_requests": config.rate_limit().max_requests,
                "window_secs": config.rate_limit().window_secs,
            },
            "stream": { "redirect": config.stream().redirect },
            "storage": { "dir": config.storage.as_ref().and_then(|s| s.dir.clone()) },
            "sources": loaded.loaded_from(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# Wayfarer Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)\n");
    } else {
        for source in &sources {
            println!("# from {}", source.display());
        }
        println!();
    }

    print!("{}", config.to_toml()?);

    if !loaded.warnings.is_empty() {
        println!("\n# Warnings:");
        for w in &loaded.warnings {
            println!("#   ⚠ {}", w);
        }
    }

    Ok(())
}
