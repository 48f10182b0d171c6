use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

use crate::error::PipelineError;
use crate::{ELAPSED, IPO_YEAR, ROLLING, YEAR_FOUNDED};

const LAST_IPO: &str = "Last IPO Year";
const COMPANIES: &str = "Companies";

/// Everything the chart needs about one founding year.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundingYearGroup {
    pub year: i32,
    pub last_ipo: i32,
    /// IPO year -> number of companies going public that year.
    pub ipo_counts: BTreeMap<i32, usize>,
    /// Rolling value at the first row of this founding year.
    pub trailing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IpoSummary {
    pub groups: Vec<FoundingYearGroup>,
    pub min_founded: i32,
    pub max_ipo: i32,
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .with_context(|| format!("column {name} not found"))
}

fn i32_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Int32Chunked> {
    column(df, name)?
        .i32()
        .with_context(|| format!("column {name} is not i32"))
}

impl IpoSummary {
    /// Expects the aggregated frame: cleaned `Int32` years, sorted by founding
    /// year, rolling column present.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        if df.height() == 0 {
            return Err(PipelineError::EmptyDataset.into());
        }

        let per_year = df
            .clone()
            .lazy()
            .group_by_stable([col(YEAR_FOUNDED)])
            .agg([
                col(IPO_YEAR).max().alias(LAST_IPO),
                col(ROLLING).first(),
            ])
            .sort(YEAR_FOUNDED, SortOptions::default())
            .collect()
            .context("could not group by founding year")?;

        let per_ipo = df
            .clone()
            .lazy()
            .group_by([col(YEAR_FOUNDED), col(IPO_YEAR)])
            .agg([col(ELAPSED).count().cast(DataType::Int64).alias(COMPANIES)])
            .collect()
            .context("could not count ipos per year")?;

        let mut counts: BTreeMap<i32, BTreeMap<i32, usize>> = BTreeMap::new();
        let founded = i32_column(&per_ipo, YEAR_FOUNDED)?;
        let ipo = i32_column(&per_ipo, IPO_YEAR)?;
        let companies = column(&per_ipo, COMPANIES)?
            .i64()
            .with_context(|| format!("column {COMPANIES} is not i64"))?;
        for ((f, i), n) in founded
            .into_no_null_iter()
            .zip(ipo.into_no_null_iter())
            .zip(companies.into_no_null_iter())
        {
            counts.entry(f).or_default().insert(i, n as usize);
        }

        let years = i32_column(&per_year, YEAR_FOUNDED)?;
        let last_ipo = i32_column(&per_year, LAST_IPO)?;
        let trailing = column(&per_year, ROLLING)?
            .f64()
            .with_context(|| format!("column {ROLLING} is not f64"))?;

        let groups = years
            .into_no_null_iter()
            .zip(last_ipo.into_no_null_iter())
            .zip(trailing.into_iter())
            .map(|((year, last_ipo), trailing)| FoundingYearGroup {
                year,
                last_ipo,
                ipo_counts: counts.remove(&year).unwrap_or_default(),
                trailing,
            })
            .collect::<Vec<_>>();

        let min_founded = i32_column(df, YEAR_FOUNDED)?
            .min()
            .ok_or(PipelineError::EmptyDataset)?;
        let max_ipo = i32_column(df, IPO_YEAR)?
            .max()
            .ok_or(PipelineError::EmptyDataset)?;

        debug!(groups = groups.len(), min_founded, max_ipo, "summarized dataset");

        Ok(Self {
            groups,
            min_founded,
            max_ipo,
        })
    }

    pub fn company_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.ipo_counts.values())
            .sum()
    }
}
