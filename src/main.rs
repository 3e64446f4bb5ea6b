// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stripscan::constants::{capture, serial};

mod cli;

#[derive(Parser)]
#[command(name = "stripscan")]
#[command(about = "Quad test-strip reader: cyclic region scan with serial reporting")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scan loop (the default when no command is given)
    Run {
        /// Video device to capture from
        #[arg(short, long, default_value = capture::DEFAULT_DEVICE)]
        device: String,

        /// Serial port the report packets go out on
        #[arg(short, long, default_value = serial::DEFAULT_PORT)]
        port: String,

        /// Print packets to stdout instead of opening the serial port
        #[arg(long)]
        stdout: bool,

        /// Scan the built-in test pattern instead of a camera
        #[arg(long)]
        simulate: bool,

        /// Scan a still image file instead of a camera
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Stop after this many completed cycles
        #[arg(short, long)]
        cycles: Option<u64>,

        /// Sensor mounting rotation in degrees (0, 90, 180 or 270)
        #[arg(short, long, default_value = "0")]
        rotate: i32,

        /// Measure blob areas instead of mean intensity
        #[arg(long)]
        blobs: bool,
    },

    /// List serial ports usable as report links
    Ports,

    /// Scan one cycle without hardware and print a JSON summary
    Probe {
        /// Measure a still image instead of the built-in pattern
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Measure blob areas instead of mean intensity
        #[arg(long)]
        blobs: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=stripscan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            device,
            port,
            stdout,
            simulate,
            image,
            cycles,
            rotate,
            blobs,
        }) => cli::run(cli::RunOptions {
            device,
            port,
            stdout,
            simulate,
            image,
            cycles,
            rotate,
            blobs,
        }),
        Some(Commands::Ports) => cli::list_ports(),
        Some(Commands::Probe { image, blobs }) => cli::probe(image.as_deref(), blobs),
        None => cli::run(cli::RunOptions::default()),
    }
}
