// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `sketchbridge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sketchbridge",
    version,
    about = "Drive the Arduino toolchain: list boards, compile, upload and watch serial output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SKETCHBRIDGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print results as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List connected boards (or every known board with --all).
    Boards {
        #[arg(long)]
        all: bool,
    },
    /// List installed cores.
    Cores,
    /// List installed libraries.
    Libs,
    /// Install a library by name.
    LibInstall { library: String },
    /// Print the toolchain version.
    Version,
    /// Check that the toolchain responds.
    Health,
    /// Show toolchain config and the resolved sketch directory.
    Config,
    /// Compile a sketch from the local sketch folder.
    Compile(BuildArgs),
    /// Upload a sketch to a board.
    Upload {
        #[command(flatten)]
        build: BuildArgs,

        /// Serial port of the board, e.g. /dev/ttyUSB0 or COM3.
        #[arg(long, short = 'p')]
        port: String,
    },
    /// Capture serial output for a fixed window.
    Monitor {
        port: String,

        #[arg(long)]
        baud: Option<u32>,

        /// Capture window in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Keep every chunk, including toolchain banners.
        #[arg(long)]
        raw: bool,
    },
    /// Save a sketch from a source file.
    Save {
        name: String,

        /// File holding the sketch source.
        #[arg(long, value_name = "PATH")]
        file: String,

        /// Save into the sketchbook / Documents folder instead of the local folder.
        #[arg(long)]
        preferred: bool,
    },
    /// List saved sketches, newest first.
    Sketches,
    /// Print a saved sketch.
    Show { name: String },
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Fully qualified board name, e.g. arduino:avr:uno.
    #[arg(long)]
    pub fqbn: String,

    /// Sketch name.
    #[arg(long, default_value = "sketch")]
    pub name: String,

    /// Write this file into the sketch before building.
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
