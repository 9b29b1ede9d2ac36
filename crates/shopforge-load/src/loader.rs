//! The SQLite loader.
//!
//! Loads the five CSV files into a SQLite database in dependency order,
//! inside a single transaction. Schema creation, inserts and index creation
//! either all land or none do; verification runs against the committed
//! database afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{info, warn};

use shopforge_core::catalog::{Entity, Table, catalog};
use shopforge_core::error::CatalogError;
use shopforge_core::graph::load_order;
use shopforge_core::records::{Order, OrderItem, Product, Review, User};
use shopforge_core::validation::validate_catalog;

use crate::error::LoadError;
use crate::reader::read_rows;
use crate::schema::{index_statements, insert_sql, schema_statements};
use crate::verify::{TableCount, VerifyReport, verify_dataset};

/// Options for a load run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// SQLite database file, created when missing.
    pub database: PathBuf,
    /// Directory holding the five CSV files.
    pub csv_dir: PathBuf,
    /// Keep existing tables and rows instead of dropping and recreating.
    pub append: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            database: PathBuf::from("ecom.db"),
            csv_dir: PathBuf::from("data"),
            append: false,
        }
    }
}

/// Progress of a load run. Advances monotonically; a loader that reached
/// `Complete` or `Failed` refuses to run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    SchemaCreated,
    /// The named table and every table before it in load order are in.
    TableLoaded(Entity),
    Complete,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::NotStarted => f.write_str("not_started"),
            LoadState::SchemaCreated => f.write_str("schema_created"),
            LoadState::TableLoaded(entity) => write!(f, "{}_loaded", entity.table()),
            LoadState::Complete => f.write_str("complete"),
            LoadState::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of a completed load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub tables: Vec<TableCount>,
    pub verification: VerifyReport,
    pub duration_ms: u64,
}

impl LoadReport {
    /// Rows inserted across all tables.
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|count| count.rows).sum()
    }
}

/// Loads a generated dataset into SQLite.
#[derive(Debug)]
pub struct Loader {
    pool: SqlitePool,
    options: LoadOptions,
    state: LoadState,
}

impl Loader {
    /// Open the database file (creating it when missing, with foreign key
    /// enforcement on) and prepare a loader.
    pub async fn connect(options: LoadOptions) -> Result<Self, LoadError> {
        let connect_options = SqliteConnectOptions::new()
            .filename(&options.database)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;
        Ok(Self {
            pool,
            options,
            state: LoadState::NotStarted,
        })
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The underlying pool, for queries against the loaded database.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run the full load: schema, the five tables in dependency order,
    /// indexes, then post-commit verification.
    ///
    /// Any failure before the commit rolls the database back to its pre-run
    /// state and leaves the loader in `Failed`.
    pub async fn run(&mut self) -> Result<LoadReport, LoadError> {
        if self.state != LoadState::NotStarted {
            return Err(LoadError::AlreadyRan(self.state));
        }

        let start = Instant::now();
        let tables = catalog();
        validate_catalog(&tables)?;
        let order = load_order(&tables)?;

        info!(
            database = %self.options.database.display(),
            csv_dir = %self.options.csv_dir.display(),
            append = self.options.append,
            "load started"
        );

        let mut tx = self.pool.begin().await?;
        let counts = match self.load_all(&mut tx, &tables, &order).await {
            Ok(counts) => counts,
            Err(err) => {
                self.state = LoadState::Failed;
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                warn!(error = %err, "load aborted, database rolled back");
                return Err(err);
            }
        };
        if let Err(err) = tx.commit().await {
            self.state = LoadState::Failed;
            return Err(err.into());
        }

        let verification = match verify_dataset(&self.pool, &tables).await {
            Ok(verification) => verification,
            Err(err) => {
                self.state = LoadState::Failed;
                return Err(err);
            }
        };
        for probe in &verification.orphan_probes {
            if probe.orphans > 0 {
                warn!(
                    table = probe.table,
                    column = probe.column,
                    orphans = probe.orphans,
                    "orphaned foreign key values"
                );
            }
        }

        self.state = LoadState::Complete;
        let report = LoadReport {
            tables: counts,
            verification,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            duration_ms = report.duration_ms,
            total_rows = report.total_rows(),
            "load completed"
        );
        Ok(report)
    }

    async fn load_all(
        &mut self,
        tx: &mut Transaction<'_, Sqlite>,
        tables: &[Table],
        order: &[Entity],
    ) -> Result<Vec<TableCount>, LoadError> {
        for statement in schema_statements(tables, order, self.options.append) {
            sqlx::query(&statement).execute(&mut **tx).await?;
        }
        self.state = LoadState::SchemaCreated;
        info!(append = self.options.append, "schema ready");

        let mut counts = Vec::with_capacity(order.len());
        for entity in order {
            let table = tables
                .iter()
                .find(|table| table.name == entity.table())
                .ok_or_else(|| {
                    CatalogError::Invalid(format!("no table definition for '{entity}'"))
                })?;
            let path = self.options.csv_dir.join(entity.csv_file());
            let rows = insert_entity(tx, table, *entity, &path).await?;
            self.state = LoadState::TableLoaded(*entity);
            info!(table = %entity, rows, "table loaded");
            counts.push(TableCount {
                table: entity.table().to_string(),
                rows,
            });
        }

        for statement in index_statements(tables) {
            sqlx::query(&statement).execute(&mut **tx).await?;
        }
        Ok(counts)
    }
}

async fn insert_entity(
    tx: &mut Transaction<'_, Sqlite>,
    table: &Table,
    entity: Entity,
    path: &Path,
) -> Result<u64, LoadError> {
    let sql = insert_sql(table);
    match entity {
        Entity::Users => insert_users(tx, &sql, read_rows(entity, path)?).await,
        Entity::Products => insert_products(tx, &sql, read_rows(entity, path)?).await,
        Entity::Orders => insert_orders(tx, &sql, read_rows(entity, path)?).await,
        Entity::OrderItems => insert_order_items(tx, &sql, read_rows(entity, path)?).await,
        Entity::Reviews => insert_reviews(tx, &sql, read_rows(entity, path)?).await,
    }
}

async fn insert_users(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    rows: Vec<User>,
) -> Result<u64, LoadError> {
    for row in &rows {
        sqlx::query(sql)
            .bind(row.user_id)
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(&row.email)
            .bind(&row.phone_number)
            .bind(&row.address)
            .bind(&row.city)
            .bind(&row.state)
            .bind(&row.postal_code)
            .bind(&row.country)
            .bind(row.signup_date)
            .bind(row.is_active)
            .execute(&mut **tx)
            .await
            .map_err(|err| constraint_error(Entity::Users, row.user_id, err))?;
    }
    Ok(rows.len() as u64)
}

async fn insert_products(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    rows: Vec<Product>,
) -> Result<u64, LoadError> {
    for row in &rows {
        sqlx::query(sql)
            .bind(row.product_id)
            .bind(&row.name)
            .bind(&row.category)
            .bind(&row.brand)
            .bind(row.price)
            .bind(row.cost)
            .bind(row.inventory)
            .bind(&row.sku)
            .bind(row.created_at)
            .execute(&mut **tx)
            .await
            .map_err(|err| constraint_error(Entity::Products, row.product_id, err))?;
    }
    Ok(rows.len() as u64)
}

async fn insert_orders(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    rows: Vec<Order>,
) -> Result<u64, LoadError> {
    for row in &rows {
        sqlx::query(sql)
            .bind(row.order_id)
            .bind(row.user_id)
            .bind(row.order_date)
            .bind(row.ship_date)
            .bind(row.delivery_date)
            .bind(&row.status)
            .bind(&row.shipping_method)
            .bind(row.shipping_cost)
            .bind(&row.payment_method)
            .bind(row.subtotal)
            .bind(row.total)
            .execute(&mut **tx)
            .await
            .map_err(|err| constraint_error(Entity::Orders, row.order_id, err))?;
    }
    Ok(rows.len() as u64)
}

async fn insert_order_items(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    rows: Vec<OrderItem>,
) -> Result<u64, LoadError> {
    for row in &rows {
        sqlx::query(sql)
            .bind(row.order_item_id)
            .bind(row.order_id)
            .bind(row.product_id)
            .bind(row.quantity)
            .bind(row.unit_price)
            .bind(row.discount)
            .execute(&mut **tx)
            .await
            .map_err(|err| constraint_error(Entity::OrderItems, row.order_item_id, err))?;
    }
    Ok(rows.len() as u64)
}

async fn insert_reviews(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    rows: Vec<Review>,
) -> Result<u64, LoadError> {
    for row in &rows {
        sqlx::query(sql)
            .bind(row.review_id)
            .bind(row.user_id)
            .bind(row.product_id)
            .bind(row.rating)
            .bind(&row.title)
            .bind(&row.review_text)
            .bind(row.review_date)
            .bind(row.verified_purchase)
            .execute(&mut **tx)
            .await
            .map_err(|err| constraint_error(Entity::Reviews, row.review_id, err))?;
    }
    Ok(rows.len() as u64)
}

/// Pin database-reported constraint failures to the offending row; other
/// database errors pass through unchanged.
fn constraint_error(table: Entity, row: i64, err: sqlx::Error) -> LoadError {
    if let sqlx::Error::Database(db) = &err
        && matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        )
    {
        return LoadError::Constraint {
            table,
            row,
            message: db.message().to_string(),
        };
    }
    LoadError::Db(err)
}
