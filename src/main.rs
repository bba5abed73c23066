use std::path::PathBuf;

use clap::Parser;
use thicket::{error::CliError, execute, Command, Config, InMemRepo};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thicket")]
#[command(about = "Accounts, posts, comments and endorsements over a snapshot file")]
struct Cli {
    /// Snapshot file to operate on (defaults to THICKET_DATA_DIR/THICKET_SNAPSHOT)
    #[arg(long, short = 's')]
    snapshot: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.snapshot.unwrap_or_else(|| Config::from_env().snapshot_path());
    debug!("using snapshot '{}'", path.display());

    let repo = InMemRepo::with_snapshot(&path)
        .map_err(|e| anyhow::anyhow!("cannot open snapshot '{}': {e}", path.display()))?;

    match execute(&repo, cli.command) {
        Ok(resp) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp.json)?);
            } else {
                println!("{}", resp.text);
            }
            Ok(())
        }
        Err(e) => {
            let err = CliError::from(e);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&err.body())?);
            } else {
                eprintln!("error: {err}");
            }
            std::process::exit(err.exit_code());
        }
    }
}
