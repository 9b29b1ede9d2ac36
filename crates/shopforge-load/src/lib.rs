//! SQLite ingestion for generated datasets.
//!
//! Renders the schema from the shared catalog, loads the five CSV files in
//! dependency order inside one transaction and verifies the committed
//! database afterwards.

pub mod error;
pub mod fetch;
pub mod loader;
pub mod reader;
pub mod schema;
pub mod verify;

pub use error::LoadError;
pub use fetch::fetch_dataset;
pub use loader::{LoadOptions, LoadReport, LoadState, Loader};
pub use reader::read_rows;
pub use schema::{create_table_sql, index_statements, insert_sql, schema_statements};
pub use verify::{OrphanProbe, TableCount, VerifyReport, verify_dataset};
