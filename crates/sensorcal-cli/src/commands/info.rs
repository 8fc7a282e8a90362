use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sensorcal_core::io::npy::NpyReader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input NPY file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = NpyReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let header = &reader.header;

    println!("File:        {}", args.file.display());
    println!("Format:      NPY v{}.{}", header.version.0, header.version.1);
    println!("Dtype:       {}", header.dtype);
    println!(
        "Byte order:  {}",
        if header.little_endian { "little-endian" } else { "big-endian" }
    );
    println!("Shape:       {:?}", header.shape);
    println!("Elements:    {}", header.element_count());

    let total_mb = header.data_byte_size() as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);

    Ok(())
}
