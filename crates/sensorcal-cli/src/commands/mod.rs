pub mod config;
pub mod flatfield;
pub mod gain;
pub mod info;
pub mod linearity;
pub mod readnoise;
pub mod spectral;
pub mod stack;

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sensorcal_core::CalibrationConfig;

use crate::GlobalArgs;

/// Config from `--config`, else from the calibration root.
pub fn load_config(global: &GlobalArgs, root: &Path) -> Result<CalibrationConfig> {
    match &global.config {
        Some(path) => CalibrationConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => CalibrationConfig::for_root(root)
            .with_context(|| format!("Failed to read config in {}", root.display())),
    }
}

pub fn progress_bar(len: usize, label: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!("{label} [{{bar:40}}] {{pos}}/{{len}}"))?
            .progress_chars("=> "),
    );
    Ok(pb)
}
