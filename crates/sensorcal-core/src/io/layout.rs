use std::path::{Component, Path, PathBuf};

use crate::error::{CalibrationError, Result};

pub const IMAGES_DIR: &str = "images";
pub const STACKS_DIR: &str = "stacks";
pub const PRODUCTS_DIR: &str = "products";
pub const RESULTS_DIR: &str = "results";

const SUBFOLDERS: [&str; 4] = [IMAGES_DIR, STACKS_DIR, PRODUCTS_DIR, RESULTS_DIR];

/// Standard sub-folders of a calibration root.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationFolders {
    pub root: PathBuf,
    pub images: PathBuf,
    pub stacks: PathBuf,
    pub products: PathBuf,
    pub results: PathBuf,
}

impl CalibrationFolders {
    pub fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            images: root.join(IMAGES_DIR),
            stacks: root.join(STACKS_DIR),
            products: root.join(PRODUCTS_DIR),
            results: root.join(RESULTS_DIR),
        }
    }

    /// Locate the calibration root of any path inside it.
    pub fn from_path(path: &Path) -> Result<Self> {
        find_root_folder(path).map(|root| Self::from_root(&root))
    }

    /// Directory under `results`, created if missing.
    pub fn results_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.results.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// The `products` directory, created if missing.
    pub fn products_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.products)?;
        Ok(&self.products)
    }
}

/// The calibration root containing `path`: the parent of the nearest ancestor
/// named `images`, `stacks`, `products` or `results`.
pub fn find_root_folder(path: &Path) -> Result<PathBuf> {
    path.ancestors()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SUBFOLDERS.contains(&n))
        })
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| CalibrationError::NotInCalibrationFolder(path.to_path_buf()))
}

/// Replace the path component `old` with `new`, e.g. `images` → `stacks`.
pub fn replace_word_in_path(path: &Path, old: &str, new: &str) -> Option<PathBuf> {
    let components: Vec<Component> = path.components().collect();
    let index = components.iter().position(|c| c.as_os_str() == old)?;

    let mut out = PathBuf::new();
    for (i, c) in components.iter().enumerate() {
        if i == index {
            out.push(new);
        } else {
            out.push(c.as_os_str());
        }
    }
    Some(out)
}

/// Files in `folder` whose names end in `suffix`, sorted by name.
pub fn files_with_suffix(folder: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.ends_with(suffix));
        if matches && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
