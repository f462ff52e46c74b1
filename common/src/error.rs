use thiserror::Error;

/// Failures of the file-backed stores (job status, results, reports, uploads).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read upload: {0}")]
    Upload(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition { job_id: String, from: &'static str, to: &'static str },

    #[error("report already exists: {0}")]
    ReportExists(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("could not read pdf: {0}")]
    Pdf(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no provider records were extracted")]
    EmptyBatch,

    #[error("validator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("validator rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("could not serialize validation outcome: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that ends a background job in the `failed` state.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("processing panicked: {0}")]
    Panicked(String),
}
