mod commands;
mod project;

use clap::{Parser, Subcommand};
use stackflow_core::DEFAULT_OWNER;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackflow")]
#[command(about = "Declare cloud resources, wire them by output, realize them in order", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the stack file and check the resource graph
    Validate {
        /// Stack name (dev, prod, ...)
        stack: Option<String>,
        /// Stack name (-s/--stack flag)
        #[arg(short = 's', long = "stack", conflicts_with = "stack", hide = true)]
        stack_flag: Option<String>,
    },
    /// Show the evaluation order and the edges behind it
    Graph {
        /// Stack name (dev, prod, ...)
        stack: Option<String>,
        /// Stack name (-s/--stack flag)
        #[arg(short = 's', long = "stack", conflicts_with = "stack", hide = true)]
        stack_flag: Option<String>,
    },
    /// Realize the stack with the dry-run realizer
    Up {
        /// Stack name (dev, prod, ...)
        stack: Option<String>,
        /// Stack name (-s/--stack flag)
        #[arg(short = 's', long = "stack", conflicts_with = "stack", hide = true)]
        stack_flag: Option<String>,
        /// Resources realized at the same time
        #[arg(short = 'j', long, default_value = "1")]
        concurrency: usize,
        /// Print the realization as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the conventional resource names for a stack
    Names {
        /// Stack name (dev, prod, ...)
        stack: Option<String>,
        /// Stack name (-s/--stack flag)
        #[arg(short = 's', long = "stack", conflicts_with = "stack", hide = true)]
        stack_flag: Option<String>,
        /// Owner token prefixed to every name
        #[arg(long, default_value = DEFAULT_OWNER)]
        owner: String,
        /// Service Bus authorization rule type
        #[arg(long, default_value = "listen")]
        rule: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so `up --json` output stays parseable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { stack, stack_flag } => {
            let stack = project::stack_name(stack, stack_flag);
            commands::validate::handle(&stack)?;
        }
        Commands::Graph { stack, stack_flag } => {
            let stack = project::stack_name(stack, stack_flag);
            commands::graph::handle(&stack)?;
        }
        Commands::Up {
            stack,
            stack_flag,
            concurrency,
            json,
        } => {
            let stack = project::stack_name(stack, stack_flag);
            commands::up::handle(&stack, concurrency, json).await?;
        }
        Commands::Names {
            stack,
            stack_flag,
            owner,
            rule,
        } => {
            let stack = project::stack_name(stack, stack_flag);
            commands::names::handle(&stack, &owner, &rule)?;
        }
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
