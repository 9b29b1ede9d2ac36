//! Catalog consistency checks.
//!
//! Covers the mistakes a catalog edit can introduce: duplicate table, column
//! or index names, a primary key that is not a declared column, foreign keys
//! pointing at missing tables or at non-key columns, and indexes over columns
//! that do not exist.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Table;
use crate::error::{CatalogError, Result};

/// Validate internal consistency of a table catalog.
pub fn validate_catalog(tables: &[Table]) -> Result<()> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for table in tables {
        if !names.insert(table.name) {
            return Err(CatalogError::Invalid(format!(
                "duplicate table '{}'",
                table.name
            )));
        }
    }

    let by_name: BTreeMap<&str, &Table> = tables.iter().map(|table| (table.name, table)).collect();
    let mut index_names: BTreeSet<&str> = BTreeSet::new();

    for table in tables {
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate column '{}' on table '{}'",
                    column.name, table.name
                )));
            }
        }

        if !columns.contains(table.primary_key) {
            return Err(CatalogError::Invalid(format!(
                "primary key '{}' is not a column of table '{}'",
                table.primary_key, table.name
            )));
        }

        for fk in &table.foreign_keys {
            if !columns.contains(fk.column) {
                return Err(CatalogError::Invalid(format!(
                    "foreign key column '{}' is not a column of table '{}'",
                    fk.column, table.name
                )));
            }
            let Some(referenced) = by_name.get(fk.referenced_table) else {
                return Err(CatalogError::Invalid(format!(
                    "table '{}' references missing table '{}'",
                    table.name, fk.referenced_table
                )));
            };
            if referenced.primary_key != fk.referenced_column {
                return Err(CatalogError::Invalid(format!(
                    "foreign key on '{}' must reference the primary key of '{}', got '{}'",
                    table.name, fk.referenced_table, fk.referenced_column
                )));
            }
        }

        for index in &table.indexes {
            if !columns.contains(index.column) {
                return Err(CatalogError::Invalid(format!(
                    "index '{}' covers missing column '{}' on table '{}'",
                    index.name, index.column, table.name
                )));
            }
            if !index_names.insert(index.name) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate index name '{}'",
                    index.name
                )));
            }
        }
    }

    Ok(())
}
