//! DDL rendering from the entity catalog.
//!
//! All SQL text the loader executes is rendered here: drop/create statements,
//! secondary index statements and per-table insert statements. Rendering from
//! the catalog keeps the database layout and the CSV layout tied to the same
//! definition.

use shopforge_core::catalog::{Column, Entity, Table};

/// Schema statements for a load run: drops (reverse dependency order, unless
/// appending) followed by creates (dependency order).
pub fn schema_statements(tables: &[Table], order: &[Entity], append: bool) -> Vec<String> {
    let mut statements = Vec::new();
    if !append {
        for entity in order.iter().rev() {
            statements.push(format!("DROP TABLE IF EXISTS {}", entity.table()));
        }
    }
    for entity in order {
        if let Some(table) = tables.iter().find(|table| table.name == entity.table()) {
            statements.push(create_table_sql(table, append));
        }
    }
    statements
}

/// Render the CREATE TABLE statement for one catalog table.
///
/// `if_not_exists` is set in append mode so reruns against an existing
/// database are no-ops.
pub fn create_table_sql(table: &Table, if_not_exists: bool) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| column_sql(table, column))
        .collect();

    for fk in &table.foreign_keys {
        lines.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            fk.column,
            fk.referenced_table,
            fk.referenced_column,
            fk.on_update.as_sql(),
            fk.on_delete.as_sql()
        ));
    }

    let clause = if if_not_exists {
        "CREATE TABLE IF NOT EXISTS"
    } else {
        "CREATE TABLE"
    };
    format!("{} {} (\n    {}\n)", clause, table.name, lines.join(",\n    "))
}

fn column_sql(table: &Table, column: &Column) -> String {
    if column.name == table.primary_key {
        return format!("{} INTEGER PRIMARY KEY", column.name);
    }
    let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(check) = column.check {
        sql.push_str(&format!(" CHECK ({check})"));
    }
    sql
}

/// Index statements, executed after the data load.
pub fn index_statements(tables: &[Table]) -> Vec<String> {
    let mut statements = Vec::new();
    for table in tables {
        for index in &table.indexes {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                index.name, table.name, index.column
            ));
        }
    }
    statements
}

/// Positional insert statement covering every column of `table`.
pub fn insert_sql(table: &Table) -> String {
    let columns = table.column_names();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopforge_core::catalog::catalog;
    use shopforge_core::graph::load_order;

    fn table<'a>(tables: &'a [Table], name: &str) -> &'a Table {
        tables
            .iter()
            .find(|table| table.name == name)
            .unwrap_or_else(|| panic!("missing table {name}"))
    }

    #[test]
    fn create_table_renders_constraints() {
        let tables = catalog();
        let sql = create_table_sql(table(&tables, "users"), false);
        assert!(sql.starts_with("CREATE TABLE users"));
        assert!(sql.contains("user_id INTEGER PRIMARY KEY"));
        assert!(sql.contains("email TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("phone_number TEXT,"));
        assert!(sql.contains("is_active INTEGER NOT NULL CHECK (is_active IN (0, 1))"));
    }

    #[test]
    fn create_table_renders_referential_actions() {
        let tables = catalog();
        let sql = create_table_sql(table(&tables, "order_items"), false);
        assert!(sql.contains(
            "FOREIGN KEY (order_id) REFERENCES orders (order_id) ON UPDATE CASCADE ON DELETE CASCADE"
        ));
        assert!(sql.contains(
            "FOREIGN KEY (product_id) REFERENCES products (product_id) ON UPDATE CASCADE ON DELETE RESTRICT"
        ));
    }

    #[test]
    fn append_mode_skips_drops_and_guards_creates() {
        let tables = catalog();
        let order = load_order(&tables).expect("load order");

        let fresh = schema_statements(&tables, &order, false);
        assert_eq!(fresh.len(), 10);
        assert_eq!(fresh[0], "DROP TABLE IF EXISTS reviews");
        assert_eq!(fresh[4], "DROP TABLE IF EXISTS products");
        assert!(fresh[5].starts_with("CREATE TABLE products"));

        let append = schema_statements(&tables, &order, true);
        assert_eq!(append.len(), 5);
        assert!(
            append
                .iter()
                .all(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS"))
        );
    }

    #[test]
    fn index_statements_cover_every_fk_column() {
        let tables = catalog();
        let statements = index_statements(&tables);
        assert_eq!(statements.len(), 5);
        assert!(
            statements
                .contains(&"CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)".to_string())
        );
    }

    #[test]
    fn insert_sql_binds_every_column() {
        let tables = catalog();
        let sql = insert_sql(table(&tables, "orders"));
        assert!(sql.starts_with("INSERT INTO orders (order_id, user_id, order_date"));
        assert_eq!(sql.matches('?').count(), 11);
    }
}
