mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::token::TokenSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ace-actions",
    about = "Run canvas data actions against an API from the command line",
    version,
    propagate_version = true
)]
struct Cli {
    /// Engine config file (YAML). Missing file means defaults.
    #[arg(long, global = true, env = "ACE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log engine activity at debug level
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one action from a JSON or YAML file
    Run {
        file: PathBuf,
        /// Execution context as a JSON object
        #[arg(long)]
        context: Option<String>,
    },

    /// Execute a list of actions and report each outcome
    Batch {
        file: PathBuf,
        /// Start every action at once instead of one after another
        #[arg(long)]
        parallel: bool,
        /// Execution context as a JSON object
        #[arg(long)]
        context: Option<String>,
    },

    /// List the action templates for a component type
    Templates { component_type: String },

    /// Bind an element, run its mount actions and print the binding state
    Mount {
        file: PathBuf,
        /// Bind without running anything on mount
        #[arg(long)]
        no_auto: bool,
    },

    /// Manage the persisted auth token
    Token {
        #[command(subcommand)]
        subcommand: TokenSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run { file, context } => {
            cmd::run::run(config, &file, context.as_deref(), cli.json)
        }
        Commands::Batch {
            file,
            parallel,
            context,
        } => cmd::batch::run(config, &file, parallel, context.as_deref(), cli.json),
        Commands::Templates { component_type } => {
            cmd::templates::run(config, &component_type, cli.json)
        }
        Commands::Mount { file, no_auto } => cmd::mount::run(config, &file, no_auto, cli.json),
        Commands::Token { subcommand } => cmd::token::run(config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
