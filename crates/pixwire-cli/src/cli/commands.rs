//! CLI command definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pixwire_graphics::PixelFormat;

/// Print raw pixel buffers to terminals that speak the Kitty graphics protocol
#[derive(Parser, Debug)]
#[command(name = "pixwire", version, about)]
pub struct CliArgs {
    /// Config file (default: $PIXWIRE_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Send a raw 32-bit pixel file to the terminal
    Show {
        /// File holding width*height native-endian 32-bit pixels
        file: PathBuf,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Image height in pixels
        #[arg(long)]
        height: u32,

        /// Channel order of the input: rgba, argb or abgr
        #[arg(long)]
        format: Option<PixelFormat>,

        /// Ask the terminal to suppress responses (q=2)
        #[arg(long, conflicts_with = "no_quiet")]
        quiet: bool,

        /// Let the terminal respond even if the config sets quiet
        #[arg(long)]
        no_quiet: bool,
    },

    /// Send a generated RGBA gradient
    Pattern {
        /// Image width in pixels
        #[arg(long, default_value_t = 256)]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value_t = 256)]
        height: u32,

        /// Ask the terminal to suppress responses (q=2)
        #[arg(long, conflicts_with = "no_quiet")]
        quiet: bool,

        /// Let the terminal respond even if the config sets quiet
        #[arg(long)]
        no_quiet: bool,
    },

    /// List the graphics frames in a captured stream and verify them
    Inspect {
        /// Captured output (reads stdin if not provided)
        file: Option<PathBuf>,
    },
}

/// Resolve `--quiet` / `--no-quiet` into an override of the config value.
pub fn quiet_override(quiet: bool, no_quiet: bool) -> Option<bool> {
    match (quiet, no_quiet) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
