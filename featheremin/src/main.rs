//! featheremin — instrument entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use feather_synth::MidiSynth;
use featheremin::{run, Hardware, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Two-sensor theremin with a swipe-gesture menu")]
struct Args {
    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of menu lines on the panel
    #[arg(long)]
    window_size: Option<usize>,

    /// Substring of the MIDI output port to use
    #[arg(long)]
    port: Option<String>,

    /// Start with whole-note pitch
    #[arg(long)]
    chromatic: bool,

    /// Log filter, e.g. `info` or `featheremin=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Featheremin — two-sensor gesture theremin             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hand tracking (falls back to the panel)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Panel simulation  (use --features leap for hand tracking)");
    println!();

    if let Err(e) = try_main(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn try_main(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None       => Settings::default(),
    };

    if let Some(w) = args.window_size {
        settings.menu.window_size = w;
    }
    if let Some(port) = args.port {
        settings.synth.port = Some(port);
    }
    if args.chromatic {
        settings.start_chromatic();
    }
    settings.validate().context("after command-line overrides")?;

    let synth = MidiSynth::open(settings.synth.clone()).context("opening the synth")?;
    let hardware = Hardware::discover(settings.menu.window_size, settings.menu.focus_offset);

    run(&settings, hardware, synth)
}
