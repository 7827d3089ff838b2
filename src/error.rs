// ⚠️ Error types shared by the fixture reader, builders, feed and bundles

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    /// A cell outside the extension rows did not hold a number
    #[error("Non-numeric cell in sheet {sheet} at row {row}, column {col}")]
    NonNumericCell {
        sheet: String,
        row: usize,
        col: usize,
    },

    #[error("Row {row} out of range for sheet {sheet} ({rows} rows)")]
    RowOutOfRange {
        sheet: String,
        row: usize,
        rows: usize,
    },

    /// Region or local-government group missing from the membership table
    #[error("Unknown organisation group: {0}")]
    UnknownOrganisationGroup(String),

    #[error("Invalid fixture data: {0}")]
    InvalidFixture(String),

    #[error("Invalid query parameter {key}={value}")]
    InvalidQuery { key: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl FeedError {
    /// True for errors caused by the caller rather than by the bundled data
    pub fn is_client_error(&self) -> bool {
        matches!(self, FeedError::InvalidQuery { .. })
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
