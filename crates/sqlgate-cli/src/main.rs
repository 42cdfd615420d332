use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, serve};

#[derive(Parser, Debug)]
#[command(
    name = "sqlgate",
    version,
    about = "Read-only SQL gate for AI agents, served over MCP"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server exposing the `database-query` tool.
    Serve(serve::ServeArgs),

    /// Classify a query and show how it would be rewritten, without running it.
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the stdio transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve(args) => serve::execute(args).await,
        Command::Check(args) => {
            if !check::execute(args)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
