use serde_json::Value;

use crate::{error::ValidationError, models::ProviderRecord};

mod http;
pub use http::*;

mod structural;
pub use structural::*;

/// Whatever the validator returns is stored as-is; its shape is owned by the validator.
pub type ValidationOutcome = Value;

#[async_trait::async_trait]
pub trait IBatchValidator: Send + Sync {
    /// Validates the whole batch in one call.
    async fn process_batch(&self, records: Vec<ProviderRecord>) -> Result<ValidationOutcome, ValidationError>;
}
