use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::Result as EyreResult;

mod endpoint_format;
mod run;

use run::RunCommand;

pub const EXAMPLES: &str = r"
  # Serve the tracker against a local Redis
  $ musterd run --redis-url redis://127.0.0.1:6379/0

  # Short announce windows, peers listed as URLs
  $ musterd run --redis-url redis://127.0.0.1:6379/0 --announce-ttl 5 --endpoint-format url
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  MUSTER_LISTEN    Address the API is served on\n",
    "  REDIS_URL        Redis instance backing the tracker\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    #[command(alias = "up")]
    Run(RunCommand),
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Run(run) => run.run().await,
        }
    }
}
