use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sensorcal_core::analyse::spectral::{read_spectral_responses, write_spectral_bandwidths};
use sensorcal_core::consts::RGBG2_LABELS;
use sensorcal_core::io::CalibrationFolders;

#[derive(Args)]
pub struct SpectralArgs {
    /// Calibration root folder
    pub root: PathBuf,
}

pub fn run(args: &SpectralArgs) -> Result<()> {
    let folders = CalibrationFolders::from_root(&args.root);
    let response = read_spectral_responses(&folders.results)
        .context("Failed to load spectral response curves")?;
    println!("Loaded spectral responses from '{}'", response.source.display());

    let bandwidths = response.bandwidths();
    for (label, bandwidth) in RGBG2_LABELS.iter().zip(&bandwidths) {
        println!("{label:>2}: {bandwidth:.1} nm");
    }

    let path = write_spectral_bandwidths(&folders.products, &bandwidths)?;
    println!("Saved effective bandwidths to '{}'", path.display());
    Ok(())
}
