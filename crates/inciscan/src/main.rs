mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment { file } => cli::segment::run(&file),
        Commands::Analyze {
            file,
            endpoint,
            rate_limit,
            output,
            observations,
        } => {
            cli::analyze::run(
                &file,
                endpoint.as_deref(),
                rate_limit,
                output.as_deref(),
                observations,
            )
            .await
        }
    }
}
