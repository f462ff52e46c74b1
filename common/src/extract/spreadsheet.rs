use std::{io::Read, path::Path};

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use super::{run_blocking, IExtractor};
use crate::{error::ExtractError, models::{FileKind, ProviderRecord}};

/// Tabular sources: the first non-empty row names the columns, every later row is one provider.
pub struct SpreadsheetExtractor;

#[async_trait::async_trait]
impl IExtractor for SpreadsheetExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<ProviderRecord>, ExtractError> {
        let path = path.to_path_buf();
        let records = run_blocking(move || match FileKind::from_filename(&path.to_string_lossy()) {
            Some(FileKind::Csv) => read_csv(std::fs::File::open(&path)?),
            _ => read_workbook(&path),
        })
        .await?;
        info!("Extracted {} rows", records.len());
        Ok(records)
    }
}

pub fn read_csv<R: Read>(source: R) -> Result<Vec<ProviderRecord>, ExtractError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(source);
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let mut record = ProviderRecord::new(index + 2);
        for (column, value) in headers.iter().zip(row.iter()) {
            record.insert(column, value);
        }
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

fn read_workbook(path: &Path) -> Result<Vec<ProviderRecord>, ExtractError> {
    let mut workbook = open_workbook_auto(path).map_err(|err| ExtractError::Spreadsheet(err.to_string()))?;
    let mut records = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|err| ExtractError::Spreadsheet(err.to_string()))?;
        let mut rows = range.rows().enumerate().map(|(index, row)| (index + 1, row.iter().map(cell_text).collect::<Vec<_>>()));
        let Some((_, headers)) = rows.by_ref().find(|(_, row)| row.iter().any(|cell| !cell.is_empty())) else {
            continue;
        };
        for (row_number, row) in rows {
            let mut record = ProviderRecord::new(row_number);
            for (column, value) in headers.iter().zip(row) {
                record.insert(column, value);
            }
            if !record.is_blank() {
                records.push(record);
            }
        }
    }
    Ok(records)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}
