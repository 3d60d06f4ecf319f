//! nitrous - NDS/GBA emulator
//!
//! Command line frontend for the initialization core: loads the
//! settings store, runs the pipeline for one ROM and exits with the
//! legacy status code (0 ready, 1 missing BIOS/firmware, 2 unreadable
//! ROM, 3 missing save).

use anyhow::{bail, Context};
use nitro_core::Settings;
use nitro_loader::RomImage;
use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    rom: PathBuf,
    settings_root: Option<PathBuf>,
    info: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut rom = None;
    let mut settings_root = None;
    let mut info = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                settings_root = Some(PathBuf::from(
                    args.next().context("--settings requires a directory")?,
                ));
            }
            "--info" => info = true,
            "--help" | "-h" => {
                println!("usage: nitrous [--settings <dir>] [--info] <rom>");
                std::process::exit(0);
            }
            _ if rom.is_none() => rom = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument: {}", other),
        }
    }

    Ok(Args {
        rom: rom.context("usage: nitrous [--settings <dir>] [--info] <rom>")?,
        settings_root,
        info,
    })
}

fn run() -> anyhow::Result<ExitCode> {
    let args = parse_args()?;

    // Header summary only; no assets or save required
    if args.info {
        let rom = RomImage::load(&args.rom).context("failed to read ROM header")?;
        println!("{}", serde_json::to_string_pretty(&rom.info())?);
        return Ok(ExitCode::SUCCESS);
    }

    let settings_root = args.settings_root.unwrap_or_else(Settings::default_root);
    let settings = Settings::load(&settings_root)
        .with_context(|| format!("failed to load settings from {:?}", settings_root))?;

    match nitro_integration::initialize(&args.rom, &settings) {
        Ok(machine) => {
            println!(
                "ready: {} \"{}\" [{}], {} save ({} bytes)",
                machine.console(),
                machine.rom().header().title,
                machine.rom().header().game_code,
                machine.save().kind(),
                machine.save().len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(e.status_code() as u8))
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("starting nitrous");

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
