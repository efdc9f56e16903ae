use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use profetch::config::Config;
use profetch::session;

#[derive(Parser)]
#[command(
    name = "profetch",
    about = "Capture a public profile and its recent posts by intercepting the page's own API calls",
    version
)]
struct Cli {
    /// Profile page URL to capture.
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum number of posts to keep, pinned post included.
    #[arg(long)]
    posts: Option<usize>,

    /// Milliseconds to wait after navigation for background calls.
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Where to write the captured snapshot.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run the browser without a visible window.
    #[arg(long)]
    headless: bool,

    /// Fail a timeline batch on any entry that is not a post, instead of
    /// skipping it.
    #[arg(long)]
    strict_entries: bool,

    /// Path to a config file; defaults to <config dir>/profetch/config.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.profile_url = url;
    }
    if let Some(posts) = cli.posts {
        config.post_cap = posts;
    }
    if let Some(settle_ms) = cli.settle_ms {
        config.settle_ms = settle_ms;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.headless {
        config.headless = true;
    }
    if cli.strict_entries {
        config.strict_entries = true;
    }

    let store = session::run(&config).await?;
    store.save(&config.output)?;
    info!(path = %config.output.display(), "snapshot written");
    Ok(())
}
