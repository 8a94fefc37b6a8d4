//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands;
use gradle_runner::output::OutputMode;

/// gradle-runner - Run a Gradle build and deploy its artifacts
#[derive(Parser, Debug)]
#[command(
    name = "gradle-runner",
    version,
    about = "Run a Gradle build and deploy its artifacts",
    long_about = "Runs the Gradle wrapper with inputs read from environment variables.\n\n\
                  Build outputs matching the configured patterns are copied into the\n\
                  deploy directory and exported for later steps."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Print exported variables as KEY=VALUE instead of calling envman
    #[arg(long, global = true)]
    pub print_env: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the build, collect caches and deploy artifacts
    Run,

    /// Deploy artifacts of a build that already ran
    Collect {
        /// Skip artifacts modified before this time (RFC 3339)
        #[arg(long)]
        since: Option<String>,
    },

    /// List files under a directory that match patterns
    Find {
        /// Directory to search
        root: PathBuf,

        /// Include pattern (repeatable)
        #[arg(short, long = "include")]
        include: Vec<String>,

        /// Exclude pattern (repeatable)
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,

        /// Match patterns against absolute paths
        #[arg(long)]
        absolute: bool,
    },

    /// Show version
    Version,
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Run) => commands::run(cli.print_env, output_mode),
        Some(Command::Collect { since }) => {
            commands::collect(since.as_deref(), cli.print_env, output_mode)
        },
        Some(Command::Find {
            root,
            include,
            exclude,
            absolute,
        }) => commands::find(&root, include, exclude, absolute, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": gradle_runner::VERSION
                    })
                );
            } else {
                println!("gradle-runner v{}", gradle_runner::VERSION);
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": gradle_runner::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("gradle-runner v{}", gradle_runner::VERSION);
                println!("\nRun 'gradle-runner --help' for usage");
                println!("Run 'gradle-runner run' inside a CI step to build and deploy");
            }
            Ok(())
        },
    }
}
