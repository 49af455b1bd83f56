// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # bagbridge CLI
//!
//! Inspect and replay ROS1 bags through the rosbag_v2 bridge.
//!
//! ## Usage
//!
//! ```sh
//! # Bag summary, as ros2 bag info prints it
//! bagbridge info recording.bag
//!
//! # Replayable topics
//! bagbridge topics recording.bag --mapping extra_types.toml
//!
//! # Decoded messages as JSON lines
//! bagbridge echo recording.bag --topic /odom --limit 10
//! ```

mod cmd;
mod common;

use std::io::IsTerminal as _;
use std::process;

use clap::{Parser, Subcommand};
use cmd::{EchoCmd, InfoCmd, TopicsCmd};
use common::Result;

/// bagbridge - replay legacy ROS1 bags
///
/// Only topics whose message type maps to a ROS2 type are replayed.
#[derive(Parser, Clone)]
#[command(name = "bagbridge")]
#[command(about = "Read ROS1 bag v2.0 files through the rosbag_v2 bridge", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Show bag metadata (duration, counts, replayable topics)
    Info(InfoCmd),

    /// List replayable topics with their ROS2 types
    Topics(TopicsCmd),

    /// Print decoded messages as JSON lines
    Echo(EchoCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info(cmd) => cmd.run(),
        Commands::Topics(cmd) => cmd.run(),
        Commands::Echo(cmd) => cmd.run(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
