use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ndarray::{Axis, Ix2};
use sensorcal_core::analyse::gain::GainAnalysis;
use sensorcal_core::consts::RGBG2_LABELS;
use sensorcal_core::io::filename::split_iso;
use sensorcal_core::io::{load_colour, read_npy, CalibrationFolders};
use sensorcal_core::plot::{
    hstack, map_figure, rgb_histograms, rgbg_panels, save_figure, ColorScale, Colormap,
};
use sensorcal_core::CalibrationConfig;

use super::load_config;
use crate::GlobalArgs;

#[derive(Args)]
pub struct GainArgs {
    /// Gain map (`*iso<N>*.npy`, ADU per electron)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct GainMultipleArgs {
    /// Gain maps, possibly from different cameras or ISO speeds
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}

fn analyse_file(path: &Path, config: &CalibrationConfig) -> Result<(u32, GainAnalysis)> {
    let folders = CalibrationFolders::from_path(path)?;
    let iso = split_iso(path)?;
    let colours = load_colour(&folders.stacks)?;
    let gains = read_npy(path)
        .with_context(|| format!("Failed to load {}", path.display()))?
        .into_dimensionality::<Ix2>()?;
    let analysis = GainAnalysis::new(&gains.view(), &colours.view(), config)?;
    Ok((iso, analysis))
}

pub fn run(args: &GainArgs, global: &GlobalArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.file)?;
    let config = load_config(global, &folders.root)?;
    let save_to = folders.results_dir("gain")?;

    let (iso, analysis) = analyse_file(&args.file, &config)?;
    println!("Loaded information");

    let histogram = rgb_histograms(
        &analysis.rgb_values(),
        config.display.gain_range,
        config.display.histogram_bins,
    )?;
    save_figure(&histogram, &save_to.join(format!("hist_iso{iso}_RGB.png")))?;
    println!("Made RGB histogram");

    let (vmin, vmax) = analysis.display_range;
    let maps = rgbg_panels(&analysis.rgbg_smoothed.view(), Some(ColorScale::new(vmin, vmax)));
    save_figure(&maps, &save_to.join(format!("map_iso{iso}.png")))?;

    let combined = map_figure(
        &analysis.combined_smoothed.view(),
        ColorScale::from_finite(analysis.combined_smoothed.iter()),
        Colormap::Viridis,
    );
    save_figure(&combined, &save_to.join(format!("gain_map_iso{iso}.png")))?;
    println!("Made maps");
    Ok(())
}

pub fn run_multiple(args: &GainMultipleArgs, global: &GlobalArgs) -> Result<()> {
    let first = CalibrationFolders::from_path(&args.files[0])?;
    let config = load_config(global, &first.root)?;
    let save_to = first.results_dir("gain")?;

    let mut analyses = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let root = CalibrationFolders::from_path(file)?.root;
        let camera = load_config(global, &root)?.camera;
        let (iso, analysis) = analyse_file(file, &config)?;
        let range = analysis.value_range(config.display.percentile)?;
        analyses.push((camera, iso, analysis, range));
    }
    println!("Loaded and smoothed {} gain maps", analyses.len());

    for (j, label) in RGBG2_LABELS.iter().enumerate() {
        let mut panels = Vec::with_capacity(analyses.len());
        for (camera, iso, analysis, range) in &analyses {
            let channel = analysis.rgbg_smoothed.index_axis(Axis(0), j);
            panels.push(map_figure(
                &channel,
                ColorScale::from_finite(channel.iter()),
                Colormap::for_channel(j),
            ));

            let (low, high) = *range;
            println!("{camera:<10}: ISO {iso:>4}");
            println!("{label:>2}: {low:.2} -- {high:.2}");
        }
        let path = save_to.join(format!("gain_map_{label}.png"));
        save_figure(&hstack(&panels, 8), &path)?;
        println!("Saved gain map for the {label} channel to '{}'", path.display());
    }

    let mut columns = Vec::with_capacity(analyses.len());
    for (_, _, analysis, _) in &analyses {
        columns.push(rgb_histograms(
            &analysis.rgb_values(),
            config.display.gain_comparison_range,
            config.display.histogram_bins,
        )?);
    }
    let path = save_to.join("gain_histogram.png");
    save_figure(&hstack(&columns, 8), &path)?;
    println!("Saved RGB histogram to '{}'", path.display());
    Ok(())
}
