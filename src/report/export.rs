//! Report output: XLSX workbook, CSV file and the raw JSON dump.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use thiserror::Error;

use super::rows::ReportRow;
use super::{ReportFormat, ReportLanguage};
use crate::api::{OwnedTask, Task};

pub const XLSX_FILE_NAME: &str = "planilha_tarefas.xlsx";
pub const CSV_FILE_NAME: &str = "planilha_tarefas.csv";
pub const RAW_DUMP_FILE_NAME: &str = "tarefas_usuario.json";
pub const SHEET_NAME: &str = "Tarefas";

/// Errors raised while writing output files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Report written to this path.
    Written(PathBuf),
    /// Nothing to report; no file was written.
    NoTasks,
}

/// Raw dump entry: the task as received plus its owner linkage.
#[derive(Serialize)]
struct RawDumpEntry<'a> {
    #[serde(flatten)]
    task: &'a Task,
    usuario: i64,
    nome: &'a str,
    tipo: &'static str,
}

/// Writes report files into an output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    format: ReportFormat,
    language: ReportLanguage,
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(
        format: ReportFormat,
        language: ReportLanguage,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            format,
            language,
            output_dir: output_dir.into(),
        }
    }

    /// Path the report is written to.
    pub fn report_path(&self) -> PathBuf {
        let name = match self.format {
            ReportFormat::Xlsx => XLSX_FILE_NAME,
            ReportFormat::Csv => CSV_FILE_NAME,
        };
        self.output_dir.join(name)
    }

    /// Write the report. An empty row set writes nothing.
    pub fn export(&self, rows: &[ReportRow]) -> Result<ExportOutcome, ExportError> {
        if rows.is_empty() {
            return Ok(ExportOutcome::NoTasks);
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.report_path();
        match self.format {
            ReportFormat::Xlsx => self.write_xlsx(rows, &path)?,
            ReportFormat::Csv => self.write_csv(rows, &path)?,
        }

        tracing::info!("Report with {} rows saved to {}", rows.len(), path.display());
        Ok(ExportOutcome::Written(path))
    }

    fn write_xlsx(&self, rows: &[ReportRow], path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in self.language.xlsx_headers().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;

            match row.id.as_f64() {
                Some(n) => worksheet.write_number(r, 0, n)?,
                None => worksheet.write_string(r, 0, row.id_text())?,
            };
            worksheet.write_string(r, 1, self.language.category_label(row.category))?;
            worksheet.write_string(r, 2, self.language.status_label(row.status))?;
            worksheet.write_string(r, 3, &row.action_date)?;
            worksheet.write_string(r, 4, &row.completion_date)?;
            worksheet.write_string(r, 5, &row.due_date)?;
            worksheet.write_number(r, 6, row.owner_id as f64)?;
            worksheet.write_string(r, 7, &row.owner_name)?;
            worksheet.write_string(r, 8, &row.creation_date)?;
        }

        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofit();

        workbook.save(path)?;
        Ok(())
    }

    fn write_csv(&self, rows: &[ReportRow], path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.language.csv_headers())?;

        for row in rows {
            let id = row.id_text();
            writer.write_record([
                row.action_date.as_str(),
                row.completion_date.as_str(),
                row.due_date.as_str(),
                row.owner_name.as_str(),
                self.language.category_label(row.category),
                id.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Dump every fetched task, before formatting, as pretty JSON.
    ///
    /// Returns `None` without touching the filesystem when there are no tasks.
    pub fn write_raw_dump(&self, tasks: &[OwnedTask]) -> Result<Option<PathBuf>, ExportError> {
        if tasks.is_empty() {
            return Ok(None);
        }

        let entries: Vec<RawDumpEntry<'_>> = tasks
            .iter()
            .map(|owned| RawDumpEntry {
                task: &owned.task,
                usuario: owned.owner.id,
                nome: &owned.owner.name,
                tipo: owned.category.query_value(),
            })
            .collect();

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(RAW_DUMP_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(&entries)?)?;

        tracing::info!("Raw tasks saved to {}", path.display());
        Ok(Some(path))
    }
}
