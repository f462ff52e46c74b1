use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One provider row (or document line) as produced by an extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// 1-based row or line in the source file.
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl ProviderRecord {
    pub fn new(row: usize) -> Self {
        ProviderRecord { row, fields: BTreeMap::new() }
    }

    /// Column names are normalized, so `First Name` and `first-name` both land on `first_name`.
    pub fn insert(&mut self, column: &str, value: impl Into<String>) {
        let key = normalize_column(column);
        if key.is_empty() {
            return;
        }
        self.fields.insert(key, value.into().trim().to_string());
    }

    /// Returns the value for `column` if it is present and not blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(&normalize_column(column)).map(String::as_str).filter(|value| !value.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|value| value.is_empty())
    }
}

fn normalize_column(column: &str) -> String {
    column
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
