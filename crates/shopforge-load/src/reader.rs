//! CSV input for the loader.

use std::path::Path;

use serde::de::DeserializeOwned;
use shopforge_core::catalog::Entity;

use crate::error::LoadError;

/// Read every row of `path` into typed records.
///
/// Header names must match the record's field names, which both follow the
/// catalog column order.
pub fn read_rows<T: DeserializeOwned>(entity: Entity, path: &Path) -> Result<Vec<T>, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingCsv {
            table: entity,
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        table: entity,
        source,
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| LoadError::Csv {
            table: entity,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
