use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3};
use tracing::{debug, info};

use crate::color::bayer::BayerPattern;
use crate::error::{CalibrationError, Result};
use crate::io::image_io::{is_jpeg_file, load_rgb_image};
use crate::io::layout::{replace_word_in_path, CalibrationFolders, IMAGES_DIR, STACKS_DIR};
use crate::io::loaders::COLOUR_FILE;
use crate::io::npy::write_npy;
use crate::io::raw::{is_raw_file, load_raw_frame};
use crate::stack::mean::stack_mean_std;

/// Stacking of one `images/...` folder into the matching `stacks/...` folder.
#[derive(Clone, Debug)]
pub struct StackJob {
    /// Output file prefix: the image folder's name.
    pub label: String,
    pub raw_files: Vec<PathBuf>,
    pub jpeg_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Where the Bayer colour mask is written.
    pub colour_path: PathBuf,
}

impl StackJob {
    pub fn from_images_folder(folder: &Path) -> Result<Self> {
        let folders = CalibrationFolders::from_path(folder)?;
        let label = folder
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CalibrationError::EmptyInput(format!("no folder name in {}", folder.display())))?
            .to_string();
        let parent = folder.parent().unwrap_or(folder);
        let output_dir = replace_word_in_path(parent, IMAGES_DIR, STACKS_DIR)
            .ok_or_else(|| CalibrationError::NotInCalibrationFolder(folder.to_path_buf()))?;

        let mut raw_files = Vec::new();
        let mut jpeg_files = Vec::new();
        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            if is_raw_file(&path) {
                raw_files.push(path);
            } else if is_jpeg_file(&path) {
                jpeg_files.push(path);
            }
        }
        raw_files.sort();
        jpeg_files.sort();
        if raw_files.is_empty() && jpeg_files.is_empty() {
            return Err(CalibrationError::NoMatchingFiles {
                folder: folder.to_path_buf(),
                pattern: ".dng/.jpg".into(),
            });
        }

        Ok(Self {
            label,
            raw_files,
            jpeg_files,
            output_dir,
            colour_path: folders.stacks.join(COLOUR_FILE),
        })
    }

    pub fn file_count(&self) -> usize {
        self.raw_files.len() + self.jpeg_files.len()
    }

    /// Load, stack and save. `on_file` is called once per loaded file.
    pub fn run(&self, mut on_file: impl FnMut()) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::new();

        if !self.raw_files.is_empty() {
            let mut frames: Vec<Array2<u16>> = Vec::with_capacity(self.raw_files.len());
            let mut pattern: Option<BayerPattern> = None;
            for path in &self.raw_files {
                let frame = load_raw_frame(path)?;
                match pattern {
                    Some(p) if p != frame.pattern => {
                        return Err(CalibrationError::InvalidBayerMask(format!(
                            "{} is {}, earlier frames are {}",
                            path.display(),
                            frame.pattern.name(),
                            p.name()
                        )))
                    }
                    _ => pattern = Some(frame.pattern),
                }
                frames.push(frame.data);
                on_file();
            }
            let stats = stack_mean_std(&frames)?;
            written.push(self.save("_mean.npy", &stats.mean)?);
            written.push(self.save("_stds.npy", &stats.stds)?);
            info!("Stacked {} RAW frames for '{}'", stats.count, self.label);

            if let Some(pattern) = pattern {
                let (h, w) = stats.mean.dim();
                if let Some(parent) = self.colour_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                write_npy(&self.colour_path, &pattern.mask(h, w))?;
                written.push(self.colour_path.clone());
            }
        }

        if !self.jpeg_files.is_empty() {
            let mut frames: Vec<Array3<u8>> = Vec::with_capacity(self.jpeg_files.len());
            for path in &self.jpeg_files {
                frames.push(load_rgb_image(path)?);
                on_file();
            }
            let stats = stack_mean_std(&frames)?;
            written.push(self.save("_jmean.npy", &stats.mean)?);
            written.push(self.save("_jstds.npy", &stats.stds)?);
            info!("Stacked {} JPEG frames for '{}'", stats.count, self.label);
        }

        Ok(written)
    }

    fn save<D: ndarray::Dimension>(&self, suffix: &str, array: &ndarray::Array<f32, D>) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}{}", self.label, suffix));
        write_npy(&path, array)?;
        debug!("Saved {}", path.display());
        Ok(path)
    }
}
