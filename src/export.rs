use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

pub fn write_parquet(df: &mut DataFrame, file_path: impl AsRef<Path>) -> Result<()> {
    let file_path = file_path.as_ref();
    let mut file = File::create(file_path)
        .with_context(|| format!("could not create {}", file_path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(df)
        .context("could not write to file")?;

    info!(path = %file_path.display(), rows = df.height(), "exported aggregated table");

    Ok(())
}
