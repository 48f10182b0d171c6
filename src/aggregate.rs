use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use crate::error::PipelineError;
use crate::{ELAPSED, IPO_YEAR, ROLLING, YEAR_FOUNDED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Median,
    Mean,
}

/// Whether the trailing window spans the whole sorted table or restarts at
/// every founding year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Group,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollingSpec {
    pub window: usize,
    pub min_periods: usize,
    pub statistic: Statistic,
    pub scope: Scope,
}

impl Default for RollingSpec {
    fn default() -> Self {
        Self {
            window: 5,
            min_periods: 1,
            statistic: Statistic::Median,
            scope: Scope::Global,
        }
    }
}

impl RollingSpec {
    fn validate(&self) -> Result<(), PipelineError> {
        if self.window == 0 || self.min_periods == 0 || self.min_periods > self.window {
            return Err(PipelineError::InvalidWindow {
                window: self.window,
                min_periods: self.min_periods,
            });
        }

        Ok(())
    }
}

/// Adds the elapsed-time column and sorts by founding year. The sort is
/// stable so rows sharing a founding year keep their input order.
pub fn elapsed_and_sort(df: DataFrame) -> Result<DataFrame> {
    let df = df
        .lazy()
        .with_column(
            (col(IPO_YEAR) - col(YEAR_FOUNDED))
                .cast(DataType::Float64)
                .alias(ELAPSED),
        )
        .sort(
            YEAR_FOUNDED,
            SortOptions {
                maintain_order: true,
                ..Default::default()
            },
        )
        .collect()
        .context("could not compute elapsed time")?;

    Ok(df)
}

/// Trailing window over the last `window` rows up to and including each row.
/// Rows with fewer than `min_periods` rows in the window are null. Under
/// `Scope::Group` the window restarts at every founding year.
pub fn rolling_expr(spec: &RollingSpec) -> Expr {
    let options = RollingOptions {
        window_size: Duration::new(spec.window as i64),
        min_periods: spec.min_periods,
        ..Default::default()
    };

    let expr = match spec.statistic {
        Statistic::Median => col(ELAPSED).rolling_median(options),
        Statistic::Mean => col(ELAPSED).rolling_mean(options),
    };
    let expr = match spec.scope {
        Scope::Global => expr,
        Scope::Group => expr.over([col(YEAR_FOUNDED)]),
    };

    expr.alias(ROLLING)
}

pub fn aggregate(df: DataFrame, spec: &RollingSpec) -> Result<DataFrame> {
    spec.validate()?;

    let df = elapsed_and_sort(df)?
        .lazy()
        .with_column(rolling_expr(spec))
        .collect()
        .context("could not compute rolling elapsed time")?;

    info!(
        rows = df.height(),
        window = spec.window,
        statistic = ?spec.statistic,
        scope = ?spec.scope,
        "aggregated elapsed time"
    );

    Ok(df)
}
