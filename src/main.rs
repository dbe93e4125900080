mod cli;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plugdex")]
#[command(about = "Discover and inspect plugins for this machine", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List plugins in the index, optionally fuzzy-filtered by keyword
    Search {
        /// Keywords joined into a single fuzzy query
        keywords: Vec<String>,
    },
    /// List installed plugins and their versions
    List,
    /// Show a plugin's manifest and availability on this platform
    Info {
        /// Plugin name
        name: String,
    },
    /// Show what installing a plugin would fetch and where it would be linked
    Plan {
        /// Plugin name
        name: String,
    },
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Version) | None => {
            println!("plugdex {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Search { keywords }) => cli::search::cmd_search(&keywords)?,
        Some(Commands::List) => cli::list::cmd_list()?,
        Some(Commands::Info { name }) => cli::info::cmd_info(&name)?,
        Some(Commands::Plan { name }) => cli::info::cmd_plan(&name)?,
    }

    Ok(())
}

/// Logs go to stderr so that table output on stdout stays parseable.
/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "plugdex=warn",
        1 => "plugdex=debug",
        _ => "plugdex=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
