//! CLI interface for toneforge

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Procedural sound effects for game units
#[derive(Parser)]
#[command(name = "toneforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the sound to play
#[derive(Args)]
pub struct SoundArgs {
    /// Name of a sound in the config (or in the unit with --unit)
    #[arg(short, long, conflicts_with = "params")]
    pub sound: Option<String>,

    /// Parameter vector or record as JSON
    #[arg(short, long)]
    pub params: Option<String>,

    /// Look the sound up in this unit from the catalog
    #[arg(short, long, requires = "sound")]
    pub unit: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a sound on the output device
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "toneforge.yaml")]
        config: PathBuf,

        #[command(flatten)]
        sound: SoundArgs,

        /// Set and persist the output volume (0.0-1.0) before playing
        #[arg(long)]
        volume: Option<f64>,
    },

    /// Render a sound to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "toneforge.yaml")]
        config: PathBuf,

        #[command(flatten)]
        sound: SoundArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// RNG seed for chaos (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show or change the stored output volume
    Volume {
        /// Configuration file path
        #[arg(short, long, default_value = "toneforge.yaml")]
        config: PathBuf,

        /// New volume in percent
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        set: Option<u8>,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file and its sounds
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "toneforge.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
