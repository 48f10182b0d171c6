use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::aggregate::{RollingSpec, Scope, Statistic};
use crate::loader::Source;

pub const DEFAULT_URL: &str = "https://raw.githubusercontent.com/plotly/Figure-Friday/refs/heads/main/2024/week-52/SaaS-businesses-NYSE-NASDAQ.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatisticArg {
    Median,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Window slides across every row after sorting by founding year
    Global,
    /// Window restarts for each founding year
    Group,
}

#[derive(Debug, Parser)]
#[command(
    name = "saas-ipo-trends",
    about = "Chart how long SaaS companies take from founding to IPO"
)]
pub struct Cli {
    /// CSV dataset to download.
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Read a local CSV instead of downloading.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where to write the HTML chart.
    #[arg(long, short, default_value = "saas_ipo_trends.html")]
    pub output: PathBuf,

    /// Open the chart in the default browser once written.
    #[arg(long, default_value_t = false)]
    pub open: bool,

    /// Trailing window size, in rows.
    #[arg(long, default_value_t = 5)]
    pub window: usize,

    /// Minimum rows in the window before a value is produced.
    #[arg(long, default_value_t = 1)]
    pub min_periods: usize,

    #[arg(long, value_enum, default_value_t = StatisticArg::Median)]
    pub statistic: StatisticArg,

    #[arg(long, value_enum, default_value_t = ScopeArg::Global)]
    pub scope: ScopeArg,

    /// Also dump the aggregated table as parquet.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: Source,
    pub output: PathBuf,
    pub open: bool,
    pub rolling: RollingSpec,
    pub export: Option<PathBuf>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let source = match cli.input {
            Some(path) => Source::File(path),
            None => Source::Url(cli.url),
        };
        let statistic = match cli.statistic {
            StatisticArg::Median => Statistic::Median,
            StatisticArg::Mean => Statistic::Mean,
        };
        let scope = match cli.scope {
            ScopeArg::Global => Scope::Global,
            ScopeArg::Group => Scope::Group,
        };

        Self {
            source,
            output: cli.output,
            open: cli.open,
            rolling: RollingSpec {
                window: cli.window,
                min_periods: cli.min_periods,
                statistic,
                scope,
            },
            export: cli.export,
        }
    }
}
