pub mod aggregate;
pub mod chart;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod render;
pub mod summary;

use anyhow::Result;
use polars::prelude::*;
use tracing::info;

use crate::aggregate::{aggregate, RollingSpec};
use crate::chart::Figure;
use crate::cleaner::clean;
use crate::config::Config;
use crate::summary::IpoSummary;

pub const YEAR_FOUNDED: &str = "Year Founded";
pub const IPO_YEAR: &str = "IPO Year";
pub const ELAPSED: &str = "Elapsed Time to IPO";
pub const ROLLING: &str = "Median Elapsed Time";

/// Clean, aggregate and summarize a raw frame. Returns the aggregated table
/// alongside the chart input built from it.
pub fn process(df: DataFrame, spec: &RollingSpec) -> Result<(DataFrame, IpoSummary)> {
    let df = clean(df)?;
    let df = aggregate(df, spec)?;
    let summary = IpoSummary::from_frame(&df)?;

    Ok((df, summary))
}

pub fn run(config: &Config) -> Result<Figure> {
    let raw = loader::load(&config.source)?;
    let (mut df, summary) = process(raw, &config.rolling)?;
    info!(
        companies = summary.company_count(),
        founding_years = summary.groups.len(),
        min_founded = summary.min_founded,
        max_ipo = summary.max_ipo,
        "built summary"
    );

    if let Some(path) = &config.export {
        export::write_parquet(&mut df, path)?;
    }

    let fig = render::build_figure(&summary);
    render::write_html(&fig, &config.output)?;
    if config.open {
        render::show(&config.output)?;
    }

    Ok(fig)
}
