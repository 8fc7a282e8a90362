use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ndarray::{Array2, Ix2};
use sensorcal_core::analyse::rms;
use sensorcal_core::calibrate::load_bias_map;
use sensorcal_core::filters::symmetric_percentiles;
use sensorcal_core::flat::{build_flat_field, MapComparison};
use sensorcal_core::io::filename::stack_label;
use sensorcal_core::io::{load_colour, read_npy, CalibrationFolders};
use sensorcal_core::plot::{
    gauss_maps_figure, histogram_figure, hstack, map_figure, rgb_histogram_figure, save_figure,
    ColorScale, Colormap,
};

use super::load_config;
use crate::summary::{print_flatfield_settings, print_vignette_fit};
use crate::GlobalArgs;

#[derive(Args)]
pub struct FlatfieldArgs {
    /// Mean flat-field stack (`<label>_mean.npy`); the matching `_stds.npy` is read too
    pub mean_file: PathBuf,

    /// Skip bias subtraction (no `products/bias.npy` needed)
    #[arg(long)]
    pub no_bias: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    /// First flat-field correction map
    pub map1: PathBuf,
    /// Second flat-field correction map
    pub map2: PathBuf,
}

fn load_map(path: &std::path::Path) -> Result<Array2<f64>> {
    Ok(read_npy(path)
        .with_context(|| format!("Failed to load {}", path.display()))?
        .into_dimensionality::<Ix2>()?)
}

pub fn run(args: &FlatfieldArgs, global: &GlobalArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.mean_file)?;
    let config = load_config(global, &folders.root)?;
    let label = stack_label(&args.mean_file).to_string();

    print_flatfield_settings(&config, &label);

    let colours = load_colour(&folders.stacks)?;
    println!("Loaded metadata");

    let file_name = args
        .mean_file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Mean file has no name")?;
    let stds_file = args.mean_file.with_file_name(file_name.replace("mean", "stds"));
    let mean = load_map(&args.mean_file)?;
    let stds = load_map(&stds_file)?;
    println!("Loaded data");

    let bias = if args.no_bias {
        None
    } else {
        let (bias, path) = load_bias_map(&folders.products).context("Failed to load bias map")?;
        println!("Bias correction using '{}'", path.display());
        Some(bias)
    };

    println!("Fitting...");
    let products = build_flat_field(
        &mean.view(),
        &stds.view(),
        bias.as_ref().map(|b| b.view()).as_ref(),
        &colours.view(),
        &config,
    )?;

    for path in products.save(folders.products_dir()?, &label)? {
        println!("Saved '{}'", path.display());
    }
    print_vignette_fit(&products.fit);
    Ok(())
}

pub fn run_compare(args: &CompareArgs, global: &GlobalArgs) -> Result<()> {
    let folders = CalibrationFolders::from_path(&args.map1)?;
    let config = load_config(global, &folders.root)?;
    let save_to = folders.results_dir("flatfield")?;
    let stem = |p: &PathBuf| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    };
    let label = format!("comparison_{}_X_{}", stem(&args.map1), stem(&args.map2));

    let colours = load_colour(&folders.stacks)?;
    let map1 = load_map(&args.map1)?;
    let map2 = load_map(&args.map2)?;
    println!("Loaded data");

    let MapComparison {
        map1,
        map2,
        difference,
    } = MapComparison::new(&map1.view(), &map2.view(), config.clip_border)
        .context("Mis-match in shape of maps")?;
    println!("Calculated difference map");
    println!("RMS difference: {:.3}", rms(difference.iter())?);

    let full_range = ColorScale::from_finite(difference.iter());
    let histogram = histogram_figure(
        difference.iter(),
        (full_range.vmin, full_range.vmax),
        config.display.histogram_bins,
    )?;
    let path = save_to.join(format!("{label}_histogram.png"));
    save_figure(&histogram, &path)?;
    println!("Saved histogram to '{}'", path.display());

    let range = symmetric_percentiles(difference.iter(), config.display.percentile)?;
    let histogram_rgb =
        rgb_histogram_figure(&difference.view(), &colours.view(), range, config.display.histogram_bins)?;
    let path = save_to.join(format!("{label}_histogram_RGB.png"));
    save_figure(&histogram_rgb, &path)?;
    println!("Saved RGB histogram to '{}'", path.display());

    let maps = gauss_maps_figure(
        &difference.view(),
        &colours.view(),
        config.smoothing.map_sigma,
        config.display.percentile,
    )?;
    let path = save_to.join(format!("{label}_map.png"));
    save_figure(&maps, &path)?;
    println!("Saved Gaussian maps to '{}'", path.display());

    let diff_max = difference
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    let shared_max = ColorScale::from_finite(map1.iter().chain(map2.iter())).vmax;
    let map_scale = ColorScale::new(1.0, shared_max);
    let combined = hstack(
        &[
            map_figure(&map1.view(), map_scale, Colormap::Viridis),
            map_figure(&map2.view(), map_scale, Colormap::Viridis),
            map_figure(&difference.view(), ColorScale::symmetric(diff_max), Colormap::Diverging),
        ],
        8,
    );
    let path = save_to.join(format!("{label}_map_combined.png"));
    save_figure(&combined, &path)?;
    println!("Saved combined map to '{}'", path.display());
    Ok(())
}
