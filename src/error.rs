use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("column {0:?} not found in dataset")]
    MissingColumn(String),

    #[error("no rows left after cleaning")]
    EmptyDataset,

    #[error("invalid rolling window: window={window}, min_periods={min_periods}")]
    InvalidWindow { window: usize, min_periods: usize },

    #[error("request to {url} failed with status {status}")]
    BadStatus { url: String, status: u16 },
}
