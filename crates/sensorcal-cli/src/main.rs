mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensorcal", about = "Camera sensor calibration tools")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: sensorcal.toml in the calibration root, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header of an NPY array file
    Info(commands::info::InfoArgs),
    /// Print or save the default config as TOML
    Config(commands::config::ConfigArgs),
    /// Stack the RAW and JPEG images of an images/... folder
    Stack(commands::stack::StackArgs),
    /// Save the lowest-ISO bias standard deviation as the read-noise map
    Readnoise(commands::readnoise::ReadnoiseArgs),
    /// Statistics and figures of ISO-normalised read noise
    ReadnoiseNormalised(commands::readnoise::ReadnoiseArgs),
    /// Build flat-field correction maps and fit the vignetting model
    Flatfield(commands::flatfield::FlatfieldArgs),
    /// Compare two flat-field correction maps
    FlatfieldCompare(commands::flatfield::CompareArgs),
    /// Maps and histograms of a gain map
    Gain(commands::gain::GainArgs),
    /// Per-channel maps and histograms of several gain maps
    GainMultiple(commands::gain::GainMultipleArgs),
    /// Per-pixel linearity from polariser series
    Linearity(commands::linearity::LinearityArgs),
    /// Effective spectral bandwidths from response curves
    Spectral(commands::spectral::SpectralArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let global = &cli.global;
    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Stack(args) => commands::stack::run(args),
        Commands::Readnoise(args) => commands::readnoise::run(args),
        Commands::ReadnoiseNormalised(args) => commands::readnoise::run_normalised(args, global),
        Commands::Flatfield(args) => commands::flatfield::run(args, global),
        Commands::FlatfieldCompare(args) => commands::flatfield::run_compare(args, global),
        Commands::Gain(args) => commands::gain::run(args, global),
        Commands::GainMultiple(args) => commands::gain::run_multiple(args, global),
        Commands::Linearity(args) => commands::linearity::run(args, global),
        Commands::Spectral(args) => commands::spectral::run(args),
    }
}
