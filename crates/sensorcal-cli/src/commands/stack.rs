use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sensorcal_core::stack::StackJob;

use super::progress_bar;

#[derive(Args)]
pub struct StackArgs {
    /// Folder of RAW and/or JPEG images, inside `images`
    pub folder: PathBuf,
}

pub fn run(args: &StackArgs) -> Result<()> {
    let job = StackJob::from_images_folder(&args.folder)
        .with_context(|| format!("Cannot stack {}", args.folder.display()))?;
    println!(
        "Stacking '{}': {} RAW and {} JPEG files",
        job.label,
        job.raw_files.len(),
        job.jpeg_files.len()
    );

    let pb = progress_bar(job.file_count(), "Loading")?;
    let written = job.run(|| pb.inc(1))?;
    pb.finish();

    for path in written {
        println!("Saved to {}", path.display());
    }
    Ok(())
}
