//! CSV output with byte accounting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use shopforge_core::catalog::Entity;
use shopforge_core::records::Dataset;

use crate::errors::GenerateError;
use crate::model::TableReport;

/// Write one CSV file per entity into `out_dir`.
///
/// Existing files with the same names are overwritten. Headers come from the
/// record structs, whose field order mirrors the catalog column order.
pub fn write_dataset(dataset: &Dataset, out_dir: &Path) -> Result<Vec<TableReport>, GenerateError> {
    let mut tables = Vec::with_capacity(Entity::ALL.len());
    for entity in Entity::ALL {
        let path = out_dir.join(entity.csv_file());
        let bytes_written = match entity {
            Entity::Users => write_csv(&path, &dataset.users)?,
            Entity::Products => write_csv(&path, &dataset.products)?,
            Entity::Orders => write_csv(&path, &dataset.orders)?,
            Entity::OrderItems => write_csv(&path, &dataset.order_items)?,
            Entity::Reviews => write_csv(&path, &dataset.reviews)?,
        };
        let rows = dataset.rows(entity) as u64;
        info!(table = %entity, rows, bytes_written, "csv written");
        tables.push(TableReport {
            table: entity.table().to_string(),
            rows,
            bytes_written,
        });
    }
    Ok(tables)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<u64, GenerateError> {
    let writer = BufWriter::new(File::create(path)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::Writer::from_writer(counting);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
