use serde::{Deserialize, Serialize};

use super::{IBatchValidator, ValidationOutcome};
use crate::{error::ValidationError, models::ProviderRecord};

const NPI_LENGTH: usize = 10;
const NPI_PREFIX: &str = "80840";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Valid,
    Flagged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub row: usize,
    pub npi: Option<String>,
    pub status: RecordStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub flagged: usize,
    pub records: Vec<RecordOutcome>,
}

/// Local checks that need no external registry: NPI shape and check digit, and a provider name.
#[derive(Debug, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn summarize(&self, records: &[ProviderRecord]) -> BatchSummary {
        let outcomes: Vec<RecordOutcome> = records.iter().map(check_record).collect();
        let valid = outcomes.iter().filter(|outcome| outcome.status == RecordStatus::Valid).count();
        BatchSummary {
            total: outcomes.len(),
            valid,
            flagged: outcomes.len() - valid,
            records: outcomes,
        }
    }
}

#[async_trait::async_trait]
impl IBatchValidator for StructuralValidator {
    async fn process_batch(&self, records: Vec<ProviderRecord>) -> Result<ValidationOutcome, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        Ok(serde_json::to_value(self.summarize(&records))?)
    }
}

fn check_record(record: &ProviderRecord) -> RecordOutcome {
    let mut issues = Vec::new();
    let npi = record.get("npi").map(str::to_string).or_else(|| record.get("text").and_then(find_npi_candidate));
    match &npi {
        None => issues.push("missing npi".to_string()),
        Some(npi) if npi.len() != NPI_LENGTH || !npi.chars().all(|c| c.is_ascii_digit()) => issues.push("npi must be 10 digits".to_string()),
        Some(npi) if !npi_check_digit_matches(npi) => issues.push("npi check digit mismatch".to_string()),
        Some(_) => {}
    }
    if !has_name(record) {
        issues.push("missing provider name".to_string());
    }
    RecordOutcome {
        row: record.row,
        npi,
        status: if issues.is_empty() { RecordStatus::Valid } else { RecordStatus::Flagged },
        issues,
    }
}

fn has_name(record: &ProviderRecord) -> bool {
    record.get("full_name").is_some()
        || record.get("provider_name").is_some()
        || record.get("name").is_some()
        || (record.get("first_name").is_some() && record.get("last_name").is_some())
        || record.get("text").map_or(false, |text| text.chars().any(char::is_alphabetic))
}

fn find_npi_candidate(text: &str) -> Option<String> {
    text.split(|c: char| !c.is_ascii_digit()).find(|run| run.len() == NPI_LENGTH).map(str::to_string)
}

/// Luhn check over the NPI prefixed with the card issuer identifier `80840`.
pub fn npi_check_digit_matches(npi: &str) -> bool {
    let mut sum = 0;
    for (index, c) in NPI_PREFIX.chars().chain(npi.chars()).rev().enumerate() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, fields: &[(&str, &str)]) -> ProviderRecord {
        let mut record = ProviderRecord::new(row);
        for (column, value) in fields {
            record.insert(column, *value);
        }
        record
    }

    #[test]
    fn npi_check_digit() {
        assert!(npi_check_digit_matches("1234567893"));
        assert!(!npi_check_digit_matches("1234567890"));
        assert!(!npi_check_digit_matches("12345678x3"));
    }

    #[test]
    fn flags_each_kind_of_problem() {
        let records = vec![
            record(2, &[("npi", "1234567893"), ("first_name", "Ada"), ("last_name", "Lovelace")]),
            record(3, &[("npi", "1234567890"), ("full_name", "Grace Hopper")]),
            record(4, &[("npi", "12345"), ("full_name", "Alan Turing")]),
            record(5, &[("full_name", "No Number")]),
            record(6, &[("npi", "1234567893")]),
        ];

        let summary = StructuralValidator.summarize(&records);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.flagged, 4);
        assert_eq!(summary.records[0].status, RecordStatus::Valid);
        assert_eq!(summary.records[1].issues, vec!["npi check digit mismatch"]);
        assert_eq!(summary.records[2].issues, vec!["npi must be 10 digits"]);
        assert_eq!(summary.records[3].issues, vec!["missing npi"]);
        assert_eq!(summary.records[4].issues, vec!["missing provider name"]);
    }

    #[test]
    fn text_records_carry_npi_inline() {
        let summary = StructuralValidator.summarize(&[record(1, &[("text", "Dr. Ada Lovelace NPI 1234567893 Cardiology")])]);

        assert_eq!(summary.records[0].npi.as_deref(), Some("1234567893"));
        assert_eq!(summary.records[0].status, RecordStatus::Valid);
    }

    #[tokio::test]
    async fn empty_batches_are_rejected() {
        assert!(matches!(StructuralValidator.process_batch(vec![]).await, Err(ValidationError::EmptyBatch)));
    }

    #[tokio::test]
    async fn outcome_is_serialized_summary() {
        let outcome = StructuralValidator.process_batch(vec![record(2, &[("npi", "1234567893"), ("name", "Ada")])]).await.unwrap();

        assert_eq!(outcome["total"], 1);
        assert_eq!(outcome["valid"], 1);
        assert_eq!(outcome["records"][0]["status"], "valid");
    }
}
