//! Discover command - stream a discovery from the server.

use anyhow::Result;
use clap::Args;
use console::Style;
use futures::StreamExt;
use wayfarer_client::DiscoverRequest;
use wayfarer_stream::{AssemblyUpdate, Domain, Session};

use super::{Context, output};

/// Arguments for the discover command.
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// What you are looking for, in your own words
    #[arg(required = true)]
    pub message: String,

    /// Search profile to apply
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Continue an existing session
    #[arg(short, long)]
    pub session: Option<String>,

    /// Your latitude, for nearby results
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Your longitude, for nearby results
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl DiscoverArgs {
    fn request(&self) -> DiscoverRequest {
        let mut request = DiscoverRequest::new(&self.message);
        if let Some(profile) = &self.profile {
            request = request.with_profile(profile);
        }
        if let Some(session) = &self.session {
            request = request.with_session(session);
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            request = request.with_location(lat, lon);
        }
        request
    }
}

/// Run the discover command.
pub async fn run(args: DiscoverArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    if ctx.verbose {
        eprintln!("{}", dim.apply_to(format!("Sending to: {}", ctx.server_url)));
        if let Some(ref session) = args.session {
            eprintln!("{}", dim.apply_to(format!("Session: {}", session)));
        }
    }

    let mut updates = client.discover(args.request()).await?;
    let mut milestones = Milestones::default();

    while let Some(update) = updates.next().await {
        match update {
            AssemblyUpdate::Progress(session) => {
                if !ctx.json_output {
                    milestones.report(&session);
                }
            }
            AssemblyUpdate::Complete(session) => {
                if ctx.json_output {
                    output::print_json(&session)?;
                } else {
                    eprintln!();
                    output::print_session(&session);
                }
            }
            AssemblyUpdate::Redirect { domain, .. } => {
                if !ctx.json_output {
                    eprintln!("{}", dim.apply_to(format!("→ open the {} view", domain)));
                }
            }
            AssemblyUpdate::Error { message, session } => {
                let red = Style::new().red();
                eprintln!();
                eprintln!("{} {}", red.apply_to("Error:"), message);
                if session.data.item_count() > 0 && !ctx.json_output {
                    eprintln!("{}", dim.apply_to("Partial results:"));
                    output::print_session(&session);
                }
                return Err(anyhow::anyhow!(message));
            }
        }
    }

    Ok(())
}

/// Tracks what has already been reported so each milestone prints once.
#[derive(Default)]
struct Milestones {
    started: bool,
    domain: Option<Domain>,
    city: bool,
    items: usize,
}

impl Milestones {
    fn report(&mut self, session: &Session) {
        let dim = Style::new().dim();
        let cyan = Style::new().cyan();

        if !self.started {
            self.started = true;
            eprintln!("{}", dim.apply_to(format!("Session {}", session.session_id)));
        }

        if self.domain != Some(session.domain) {
            if self.domain.is_some() {
                eprintln!("{} switched to {}", cyan.apply_to("→"), session.domain);
            }
            self.domain = Some(session.domain);
        }

        let city = session
            .general()
            .and_then(|g| g.general_city_data.as_ref())
            .map(|c| c.city.as_str())
            .filter(|c| !c.is_empty());
        if let Some(city) = city
            && !self.city
        {
            self.city = true;
            eprintln!("{} exploring {}", cyan.apply_to("→"), city);
        }

        let items = session.data.item_count();
        if items != self.items {
            self.items = items;
            eprintln!("{}", dim.apply_to(format!("  {} results", items)));
        }
    }
}
