//! Report building: status classification, date display, row assembly and
//! export.
//!
//! # Key Concepts
//! - Status: `Completed` / `Overdue` / `Pending`, derived from task dates
//! - Dates: ISO-8601 in, `DD/MM/YYYY` out, unparseable values kept as-is
//! - Rows: one per fetched task, sorted by owner name
//! - Export: XLSX workbook or CSV file, plus an optional raw JSON dump

mod dates;
mod export;
mod rows;
mod status;

pub use dates::{
    format_date, is_blank, parse_iso_date, DateParseError, FormattedDate, DISPLAY_FORMAT,
};
pub use export::{
    ExportError, ExportOutcome, Exporter, CSV_FILE_NAME, RAW_DUMP_FILE_NAME, SHEET_NAME,
    XLSX_FILE_NAME,
};
pub use rows::{build_rows_at, ReportRow};
pub use status::{classify, classify_at, TaskStatus};

use std::str::FromStr;

use crate::api::TaskCategory;

/// Output file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Single-sheet workbook with the full column set.
    #[default]
    Xlsx,
    /// Delimited file with the narrower column set.
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("expected 'xlsx' or 'csv', got '{}'", s)),
        }
    }
}

/// Language of headers and labels in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLanguage {
    #[default]
    English,
    /// Brazilian Portuguese, the labels the back-office spreadsheets use.
    Portuguese,
}

impl FromStr for ReportLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Self::English),
            "pt" | "pt-br" | "pt_br" | "portuguese" => Ok(Self::Portuguese),
            _ => Err(format!("expected 'en' or 'pt-BR', got '{}'", s)),
        }
    }
}

impl ReportLanguage {
    pub fn status_label(&self, status: TaskStatus) -> &'static str {
        match (self, status) {
            (Self::English, TaskStatus::Completed) => "Completed",
            (Self::English, TaskStatus::Overdue) => "Overdue",
            (Self::English, TaskStatus::Pending) => "Pending",
            (Self::Portuguese, TaskStatus::Completed) => "Concluída",
            (Self::Portuguese, TaskStatus::Overdue) => "Atrasada",
            (Self::Portuguese, TaskStatus::Pending) => "Pendente",
        }
    }

    pub fn category_label(&self, category: TaskCategory) -> &'static str {
        match (self, category) {
            (Self::English, TaskCategory::Obligation) => "Obligation",
            (Self::English, TaskCategory::Request) => "Request",
            (Self::Portuguese, c) => c.query_value(),
        }
    }

    /// Column headers of the XLSX sheet.
    pub fn xlsx_headers(&self) -> [&'static str; 9] {
        match self {
            Self::English => [
                "ID",
                "Type",
                "Status",
                "ActionDate",
                "CompletionDate",
                "DueDate",
                "OwnerID",
                "OwnerName",
                "CreationDate",
            ],
            Self::Portuguese => [
                "ID",
                "Tipo",
                "Status",
                "Data_Acao",
                "Data_Conclusao",
                "Data_Vencimento",
                "Responsavel_ID",
                "Responsavel_Nome",
                "Data_Criacao",
            ],
        }
    }

    /// Column headers of the CSV file.
    pub fn csv_headers(&self) -> [&'static str; 6] {
        match self {
            Self::English => ["Action", "Completion", "DueDate", "Owner", "Type", "ID"],
            Self::Portuguese => ["Ação", "Conclusão", "Vencimento", "Responsáveis", "Tipo", "ID"],
        }
    }
}
