use std::{path::Path, sync::Arc};

use crate::{error::ExtractError, models::{FileKind, ProviderRecord}};

mod document;
pub use document::*;

mod spreadsheet;
pub use spreadsheet::*;

/// Turns a stored source file into provider records.
#[async_trait::async_trait]
pub trait IExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Vec<ProviderRecord>, ExtractError>;
}

/// One extractor for document sources and one for tabular sources.
#[derive(Clone)]
pub struct ExtractionStrategies {
    pub document: Arc<dyn IExtractor>,
    pub spreadsheet: Arc<dyn IExtractor>,
}

impl ExtractionStrategies {
    pub fn new(document: Arc<dyn IExtractor>, spreadsheet: Arc<dyn IExtractor>) -> Self {
        ExtractionStrategies { document, spreadsheet }
    }

    pub fn select(&self, kind: FileKind) -> Arc<dyn IExtractor> {
        if kind.is_document() {
            self.document.clone()
        } else {
            self.spreadsheet.clone()
        }
    }
}

impl Default for ExtractionStrategies {
    fn default() -> Self {
        ExtractionStrategies::new(Arc::new(PdfExtractor), Arc::new(SpreadsheetExtractor))
    }
}

async fn run_blocking<F>(task: F) -> Result<Vec<ProviderRecord>, ExtractError>
where
    F: FnOnce() -> Result<Vec<ProviderRecord>, ExtractError> + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| ExtractError::Task(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait::async_trait]
    impl IExtractor for Named {
        async fn extract(&self, _path: &Path) -> Result<Vec<ProviderRecord>, ExtractError> {
            let mut record = ProviderRecord::new(1);
            record.insert("strategy", self.0);
            Ok(vec![record])
        }
    }

    #[tokio::test]
    async fn strategy_is_chosen_by_kind() {
        let strategies = ExtractionStrategies::new(Arc::new(Named("document")), Arc::new(Named("spreadsheet")));
        let path = Path::new("unused");

        for (kind, expected) in [(FileKind::Pdf, "document"), (FileKind::Csv, "spreadsheet"), (FileKind::Xlsx, "spreadsheet"), (FileKind::Xls, "spreadsheet")] {
            let records = strategies.select(kind).extract(path).await.unwrap();
            assert_eq!(records[0].get("strategy"), Some(expected));
        }
    }
}
