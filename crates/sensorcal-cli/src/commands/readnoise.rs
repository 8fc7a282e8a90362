use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sensorcal_core::analyse::{Statistics, StatisticsTable};
use sensorcal_core::calibrate::{load_iso_lookup_table, normalise_iso, save_readnoise_map};
use sensorcal_core::io::filename::split_iso;
use sensorcal_core::io::{load_colour, load_stds, CalibrationFolders};
use sensorcal_core::plot::{gauss_maps_figure, rgb_histogram_figure, save_figure};

use super::load_config;
use crate::GlobalArgs;

#[derive(Args)]
pub struct ReadnoiseArgs {
    /// Folder of stacked bias data (`*_stds.npy`, one per ISO speed)
    pub folder: PathBuf,
}

pub fn run(args: &ReadnoiseArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.folder)?;
    let (isos, stds) = load_stds(&args.folder, split_iso)
        .with_context(|| format!("Failed to load bias stacks from {}", args.folder.display()))?;
    println!(
        "Loaded bias data for {} ISO values from '{}'",
        isos.len(),
        args.folder.display()
    );

    let (iso, path) = save_readnoise_map(&folders.products, &isos, &stds)?;
    println!("Saved read noise map at ISO {} to '{}'", iso, path.display());
    Ok(())
}

pub fn run_normalised(args: &ReadnoiseArgs, global: &GlobalArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.folder)?;
    let config = load_config(global, &folders.root)?;
    let save_to = folders.results_dir("readnoise")?;

    let colours = load_colour(&folders.stacks)?;
    let (isos, stds) = load_stds(&args.folder, split_iso)
        .with_context(|| format!("Failed to load bias stacks from {}", args.folder.display()))?;

    let table = load_iso_lookup_table(&folders.products)
        .context("Failed to load the ISO normalisation lookup table")?;
    let stds_normalised = normalise_iso(&table, &stds, &isos)?;

    let mut stats = StatisticsTable::new("ISO");
    for (iso, std) in isos.iter().zip(&stds_normalised) {
        stats.push(iso.to_string(), Statistics::from_values(std.iter())?);
    }
    println!("{}", stats);

    for (iso, std) in isos.iter().zip(&stds_normalised) {
        let histogram = rgb_histogram_figure(
            &std.view(),
            &colours.view(),
            config.display.readnoise_range,
            config.display.histogram_bins,
        )?;
        save_figure(
            &histogram,
            &save_to.join(format!("readnoise_normalised_histogram_iso{iso}.png")),
        )?;

        let maps = gauss_maps_figure(
            &std.view(),
            &colours.view(),
            config.smoothing.map_sigma,
            config.display.percentile,
        )?;
        save_figure(&maps, &save_to.join(format!("readnoise_normalised_map_iso{iso}.png")))?;

        println!("Saved plots for ISO speed {iso}");
    }
    Ok(())
}
