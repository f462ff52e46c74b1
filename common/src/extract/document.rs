use std::path::Path;

use tracing::info;

use super::{run_blocking, IExtractor};
use crate::{error::ExtractError, models::ProviderRecord};

/// PDF sources: every non-blank line of extracted text becomes a record with a `text` field.
pub struct PdfExtractor;

#[async_trait::async_trait]
impl IExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<ProviderRecord>, ExtractError> {
        let path = path.to_path_buf();
        let records = run_blocking(move || {
            let data = std::fs::read(&path)?;
            let text = pdf_extract::extract_text_from_mem(&data).map_err(|err| ExtractError::Pdf(err.to_string()))?;
            let records = text_records(&text);
            if records.is_empty() {
                return Err(ExtractError::Pdf("document contains no text".to_string()));
            }
            Ok(records)
        })
        .await?;
        info!("Extracted {} lines", records.len());
        Ok(records)
    }
}

pub fn text_records(text: &str) -> Vec<ProviderRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let mut record = ProviderRecord::new(index + 1);
            record.insert("text", line);
            record
        })
        .collect()
}
