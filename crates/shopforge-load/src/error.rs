use std::path::PathBuf;

use thiserror::Error;

use shopforge_core::CatalogError;
use shopforge_core::catalog::Entity;

use crate::loader::LoadState;

/// Errors emitted while loading CSV data into SQLite.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing csv for table '{table}' at {}", .path.display())]
    MissingCsv { table: Entity, path: PathBuf },
    #[error("csv error for table '{table}': {source}")]
    Csv {
        table: Entity,
        #[source]
        source: csv::Error,
    },
    #[error("constraint violation on '{table}' row {row}: {message}")]
    Constraint {
        table: Entity,
        row: i64,
        message: String,
    },
    #[error("loader already ran (state {0})")]
    AlreadyRan(LoadState),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
