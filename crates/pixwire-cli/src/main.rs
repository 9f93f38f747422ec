use std::io::{self, BufWriter, Read, Write};

use anyhow::Context;
use clap::Parser;

use pixwire_config::PixwireConfig;

mod cli;

use cli::commands::{quiet_override, CliArgs, CliCommand};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => PixwireConfig::load_from(path),
        None => PixwireConfig::load(),
    }
    .context("failed to load configuration")?;

    // Frames go to stdout; logs stay on stderr.
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        CliCommand::Show {
            file,
            width,
            height,
            format,
            quiet,
            no_quiet,
        } => {
            let quiet = quiet_override(quiet, no_quiet);
            let frames =
                cli::run::show_file(&mut out, &config, &file, width, height, format, quiet)?;
            log::info!("sent {width}x{height} image in {frames} frames");
        }
        CliCommand::Pattern {
            width,
            height,
            quiet,
            no_quiet,
        } => {
            let quiet = quiet_override(quiet, no_quiet);
            let frames = cli::run::show_pattern(&mut out, &config, width, height, quiet)?;
            log::info!("sent {width}x{height} pattern in {frames} frames");
        }
        CliCommand::Inspect { file } => {
            let stream = match file {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = Vec::new();
                    io::stdin()
                        .lock()
                        .read_to_end(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };
            cli::run::inspect(&mut out, &stream)?;
        }
    }

    out.flush()?;
    Ok(())
}
