/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * modcss CLI - Main entry point.
 */

//! modcss CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "modcss")]
#[command(version)]
#[command(about = "Convert SCSS component stylesheets to CSS modules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert stylesheets to `.module.css` files
    Convert {
        /// Input stylesheets
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Transform configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write outputs to DIR instead of next to each input
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the converted stylesheets instead of writing files
        #[arg(long, conflicts_with = "out_dir")]
        stdout: bool,
    },

    /// Print the imports and exports of a stylesheet as JSON
    Inspect {
        /// Input stylesheet
        input: PathBuf,

        /// Transform configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so that --stdout output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modcss=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            config,
            out_dir,
            stdout,
        } => commands::convert::execute(commands::convert::ConvertArgs {
            inputs,
            config,
            out_dir,
            stdout,
        }),
        Commands::Inspect { input, config } => {
            commands::inspect::execute(commands::inspect::InspectArgs { input, config })
        }
    }
}
