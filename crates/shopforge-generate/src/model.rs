use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shopforge_core::records::Dataset;

/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory where CSV files and run artifacts are written.
    pub out_dir: PathBuf,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data"),
        }
    }
}

/// Summary of one written CSV file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
    pub bytes_written: u64,
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub base_date: NaiveDate,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub dataset: Dataset,
    pub report: GenerationReport,
}
