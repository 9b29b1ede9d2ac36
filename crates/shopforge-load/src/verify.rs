//! Post-load verification queries.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use shopforge_core::catalog::Table;

use crate::error::LoadError;

/// Committed row count for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// One probe per foreign key edge: child rows whose parent row is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanProbe {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub orphans: i64,
}

/// Verification summary computed against the committed database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub counts: Vec<TableCount>,
    pub orphan_probes: Vec<OrphanProbe>,
}

/// Count every table and probe every foreign key for orphans.
///
/// With foreign keys enforced at insert time every probe should come back
/// zero; a nonzero count means the database was written outside the loader.
pub async fn verify_dataset(
    pool: &SqlitePool,
    tables: &[Table],
) -> Result<VerifyReport, LoadError> {
    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name);
        let rows = sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?;
        counts.push(TableCount {
            table: table.name.to_string(),
            rows: rows as u64,
        });
    }

    let mut orphan_probes = Vec::new();
    for table in tables {
        for fk in &table.foreign_keys {
            let sql = format!(
                "SELECT COUNT(*) FROM {child} AS child \
                 LEFT JOIN {parent} AS parent ON child.{column} = parent.{referenced} \
                 WHERE parent.{referenced} IS NULL",
                child = table.name,
                parent = fk.referenced_table,
                column = fk.column,
                referenced = fk.referenced_column,
            );
            let orphans = sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?;
            orphan_probes.push(OrphanProbe {
                table: table.name.to_string(),
                column: fk.column.to_string(),
                referenced_table: fk.referenced_table.to_string(),
                orphans,
            });
        }
    }

    Ok(VerifyReport {
        counts,
        orphan_probes,
    })
}
