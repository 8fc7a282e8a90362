//! Metadata encoded in calibration filenames.
//!
//! Stacks and products carry their acquisition settings in the file stem:
//! `iso<N>` for the ISO speed, `pol<N>` for the polariser angle, and
//! `t_<N>` / `t_<N>_<M>` for the exposure time (`N` or `N/M` seconds).

use std::path::Path;

use crate::error::{CalibrationError, Result};

/// Characters stripped from both ends of a stem before reading an exposure time:
/// the leading `t_` and trailing `_mean`, `_stds`, `_jmean`, `_jstds` suffixes.
const EXPOSURE_STRIP_CHARS: &[char] = &['t', '_', 'j', 'm', 'e', 'a', 'n', 's', 'd'];

fn stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default()
}

/// Text between `split_on` and the next underscore in the file stem.
pub fn split_path<'a>(path: &'a Path, split_on: &str) -> Option<&'a str> {
    let (_, after) = stem(path).split_once(split_on)?;
    after.split('_').next()
}

/// ISO speed from an `iso<N>` stem component, e.g. `bias_iso800_mean.npy` → 800.
pub fn split_iso(path: &Path) -> Result<u32> {
    split_path(path, "iso")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CalibrationError::FilenameParse {
            what: "ISO speed",
            name: path.display().to_string(),
        })
}

/// Polariser angle (degrees) from a `pol<N>` stem component.
pub fn split_pol_angle(path: &Path) -> Result<f64> {
    split_path(path, "pol")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CalibrationError::FilenameParse {
            what: "polariser angle",
            name: path.display().to_string(),
        })
}

/// Exposure time in seconds: `t_5.dng` → 5.0, `t_1_1000.dng` → 0.001.
pub fn split_exposure_time(path: &Path) -> Result<f64> {
    let err = || CalibrationError::FilenameParse {
        what: "exposure time",
        name: path.display().to_string(),
    };

    let trimmed = stem(path).trim_matches(EXPOSURE_STRIP_CHARS);
    match trimmed.split_once('_') {
        Some((numerator, denominator)) => {
            let n: f64 = numerator.parse().map_err(|_| err())?;
            let d: f64 = denominator.parse().map_err(|_| err())?;
            Ok(n / d)
        }
        None => trimmed.parse().map_err(|_| err()),
    }
}

/// Label of a statistics file: the stem before `_mean` (or `_stds`).
pub fn stack_label(path: &Path) -> &str {
    let s = stem(path);
    s.split("_mean")
        .next()
        .and_then(|s| s.split("_stds").next())
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_path_stops_at_underscore() {
        assert_eq!(split_path(Path::new("a/iso100_t_5.npy"), "iso"), Some("100"));
        assert_eq!(split_path(Path::new("a/mean.npy"), "iso"), None);
    }

    #[test]
    fn stack_label_drops_statistic_suffix() {
        assert_eq!(stack_label(Path::new("flat_iso100_mean.npy")), "flat_iso100");
        assert_eq!(stack_label(Path::new("flat_iso100_stds.npy")), "flat_iso100");
    }
}
