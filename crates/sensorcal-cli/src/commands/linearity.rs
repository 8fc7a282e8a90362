use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ndarray::Axis;
use sensorcal_core::analyse::linearity::{linearity_r2, malus, malus_error};
use sensorcal_core::consts::RGBG2_LABELS;
use sensorcal_core::filters::nan_percentile;
use sensorcal_core::io::filename::split_pol_angle;
use sensorcal_core::io::loaders::load_angle;
use sensorcal_core::io::{load_colour, load_means, write_npy, CalibrationFolders};
use sensorcal_core::plot::{grid_2x2, render_histogram, save_figure, Histogram};

use super::load_config;
use crate::GlobalArgs;

const CHANNEL_COLOURS: [[u8; 3]; 4] = [[214, 39, 40], [44, 160, 44], [31, 119, 180], [23, 190, 207]];

#[derive(Args)]
pub struct LinearityArgs {
    /// Folder of polariser stacks (`pol<N>_mean.npy`)
    pub folder: PathBuf,
}

pub fn run(args: &LinearityArgs, global: &GlobalArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.folder)?;
    let config = load_config(global, &folders.root)?;
    let save_to = folders.results_dir("linearity")?;

    let colours = load_colour(&folders.stacks)?;
    let offset = load_angle(&folders.stacks).context("Failed to load the polariser offset angle")?;
    let (angles, means) = load_means(&args.folder, split_pol_angle)
        .with_context(|| format!("Failed to load polariser stacks from {}", args.folder.display()))?;
    println!("Loaded {} polariser angles (offset {offset}°)", angles.len());

    for &angle in &angles {
        println!(
            "{angle:>6.1}°: I = {:.3} ± {:.3}",
            malus(angle, offset),
            malus_error(angle, offset, config.linearity.polariser_sigma)
        );
    }

    let r2 = linearity_r2(&angles, offset, &means, &colours.view(), config.saturation)?;
    let path = save_to.join("linearity_r2.npy");
    write_npy(&path, &r2)?;
    println!("Saved R² values to '{}'", path.display());

    let mut panels = Vec::with_capacity(RGBG2_LABELS.len());
    for ((label, colour), channel) in RGBG2_LABELS
        .iter()
        .zip(CHANNEL_COLOURS)
        .zip(r2.axis_iter(Axis(0)))
    {
        let median = nan_percentile(channel.iter(), 50.0)?;
        println!("{label:>2}: median R² = {median:.6}");
        let hist = Histogram::new(channel.iter(), (config.linearity.r2_min, 1.0), config.display.histogram_bins)?;
        panels.push(render_histogram(&hist, colour, 2, 120));
    }
    let panels: [_; 4] = panels
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected four colour channels"))?;
    let path = save_to.join("R2.png");
    save_figure(&grid_2x2(&panels, 8), &path)?;
    println!("Saved R² histograms to '{}'", path.display());
    Ok(())
}
