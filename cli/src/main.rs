//! Port Chaser CLI - Find and stop processes holding network ports
//!
//! A command-line tool for listing listening ports and terminating the
//! processes behind them.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "portchaser")]
#[command(author, version, about = "Find and stop processes holding network ports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Filter by process name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Wait for background enrichment and list again
        #[arg(short, long)]
        refine: bool,
    },

    /// Kill process on a port
    Kill {
        /// Port number to kill
        port: u16,

        /// Grace period before the forced signal, in milliseconds
        #[arg(short, long)]
        grace_ms: Option<u64>,

        /// Allow terminating system processes
        #[arg(long)]
        no_protection: bool,
    },

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("portchaser=debug")
        } else {
            EnvFilter::new("portchaser=info")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::List { port, name, refine }) => {
            commands::list::run(port, name, refine, cli.json).await?;
        }
        Some(Commands::Kill {
            port,
            grace_ms,
            no_protection,
        }) => {
            commands::kill::run(port, grace_ms, no_protection, cli.json).await?;
        }
        Some(Commands::Config) => {
            commands::config::show(cli.json).await?;
        }
        None => {
            commands::list::run(None, None, false, cli.json).await?;
        }
    }

    Ok(())
}
