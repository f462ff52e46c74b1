use mime::Mime;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

pub const ALLOWED_EXTENSIONS: [&str; 4] = [".csv", ".xlsx", ".xls", ".pdf"];

/// Kind of an uploaded source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
    Pdf,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?;
        Self::from_extension(extension)
    }

    /// Accepts the extension with or without the leading dot, in any case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            "pdf" => Some(FileKind::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Csv => ".csv",
            FileKind::Xlsx => ".xlsx",
            FileKind::Xls => ".xls",
            FileKind::Pdf => ".pdf",
        }
    }

    /// Document sources go through text extraction, everything else is tabular.
    pub fn is_document(&self) -> bool {
        matches!(self, FileKind::Pdf)
    }

    pub fn content_type(&self) -> Mime {
        match self {
            FileKind::Csv => mime::TEXT_CSV,
            FileKind::Pdf => mime::APPLICATION_PDF,
            FileKind::Xlsx => Mime::from_str("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet").unwrap_or(mime::APPLICATION_OCTET_STREAM),
            FileKind::Xls => Mime::from_str("application/vnd.ms-excel").unwrap_or(mime::APPLICATION_OCTET_STREAM),
        }
    }
}

pub fn allowed_extensions() -> String {
    ALLOWED_EXTENSIONS.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_filename_is_case_insensitive() {
        assert_eq!(FileKind::from_filename("provider_list.csv"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_filename("Roster.XLSX"), Some(FileKind::Xlsx));
        assert_eq!(FileKind::from_filename("old.Xls"), Some(FileKind::Xls));
        assert_eq!(FileKind::from_filename("scan.pdf"), Some(FileKind::Pdf));
    }

    #[test]
    fn unsupported_or_missing_extensions_are_rejected() {
        assert_eq!(FileKind::from_filename("notes.txt"), None);
        assert_eq!(FileKind::from_filename("providers"), None);
        assert_eq!(FileKind::from_filename(".csv"), None);
        assert_eq!(FileKind::from_filename("archive.csv.zip"), None);
    }

    #[test]
    fn extension_round_trips_through_from_extension() {
        for extension in ALLOWED_EXTENSIONS {
            let kind = FileKind::from_extension(extension).unwrap();
            assert_eq!(kind.extension(), extension);
        }
    }

    #[test]
    fn only_pdf_is_a_document() {
        assert!(FileKind::Pdf.is_document());
        assert!(!FileKind::Csv.is_document());
        assert!(!FileKind::Xlsx.is_document());
        assert!(!FileKind::Xls.is_document());
    }

    #[test]
    fn allowed_extensions_lists_every_kind() {
        assert_eq!(allowed_extensions(), ".csv, .xlsx, .xls, .pdf");
    }
}
