//! Entity catalog for the e-commerce schema.
//!
//! The catalog is the single source of truth for table layout: column order,
//! storage classes, nullability, uniqueness, CHECK expressions, foreign keys
//! and secondary indexes. The loader renders DDL and insert statements from
//! it, and tests hold the CSV layout of [`crate::records`] against it.

use std::fmt;

/// The five entities of the dataset, in declaration order.
///
/// Declaration order is not load order; the loader asks
/// [`crate::graph::load_order`] for a dependency-safe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    Users,
    Products,
    Orders,
    OrderItems,
    Reviews,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Users,
        Entity::Products,
        Entity::Orders,
        Entity::OrderItems,
        Entity::Reviews,
    ];

    /// SQL table name.
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::OrderItems => "order_items",
            Entity::Reviews => "reviews",
        }
    }

    /// File name of the CSV interchange file for this entity.
    pub fn csv_file(&self) -> &'static str {
        match self {
            Entity::Users => "users.csv",
            Entity::Products => "products.csv",
            Entity::Orders => "orders.csv",
            Entity::OrderItems => "order_items.csv",
            Entity::Reviews => "reviews.csv",
        }
    }

    pub fn from_table(name: &str) -> Option<Entity> {
        Entity::ALL
            .iter()
            .copied()
            .find(|entity| entity.table() == name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// SQLite storage class used in rendered DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

/// Referential action attached to a foreign key clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    Cascade,
    Restrict,
}

impl FkAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FkAction::Cascade => "CASCADE",
            FkAction::Restrict => "RESTRICT",
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub unique: bool,
    /// Raw CHECK expression, without the `CHECK (...)` wrapper.
    pub check: Option<&'static str>,
}

impl Column {
    fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            unique: false,
            check: None,
        }
    }

    fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn check(mut self, expr: &'static str) -> Self {
        self.check = Some(expr);
        self
    }
}

fn integer(name: &'static str) -> Column {
    Column::new(name, SqlType::Integer)
}

fn real(name: &'static str) -> Column {
    Column::new(name, SqlType::Real)
}

fn text(name: &'static str) -> Column {
    Column::new(name, SqlType::Text)
}

/// Single-column foreign key edge.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub referenced_table: &'static str,
    pub referenced_column: &'static str,
    pub on_update: FkAction,
    pub on_delete: FkAction,
}

impl ForeignKey {
    fn cascade(
        column: &'static str,
        referenced_table: &'static str,
        referenced_column: &'static str,
    ) -> Self {
        Self {
            column,
            referenced_table,
            referenced_column,
            on_update: FkAction::Cascade,
            on_delete: FkAction::Cascade,
        }
    }

    fn restrict_delete(
        column: &'static str,
        referenced_table: &'static str,
        referenced_column: &'static str,
    ) -> Self {
        Self {
            column,
            referenced_table,
            referenced_column,
            on_update: FkAction::Cascade,
            on_delete: FkAction::Restrict,
        }
    }
}

/// Secondary single-column index, created after the bulk load.
#[derive(Debug, Clone)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

/// A table definition with a single-column INTEGER primary key.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Column definition lookup by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

/// Build the full table catalog.
pub fn catalog() -> Vec<Table> {
    vec![users(), products(), orders(), order_items(), reviews()]
}

fn users() -> Table {
    Table {
        name: "users",
        primary_key: "user_id",
        columns: vec![
            integer("user_id"),
            text("first_name"),
            text("last_name"),
            text("email").unique(),
            text("phone_number").nullable(),
            text("address").nullable(),
            text("city").nullable(),
            text("state").nullable(),
            text("postal_code").nullable(),
            text("country").nullable(),
            text("signup_date"),
            integer("is_active").check("is_active IN (0, 1)"),
        ],
        foreign_keys: vec![],
        indexes: vec![],
    }
}

fn products() -> Table {
    Table {
        name: "products",
        primary_key: "product_id",
        columns: vec![
            integer("product_id"),
            text("name"),
            text("category"),
            text("brand"),
            real("price"),
            real("cost"),
            integer("inventory"),
            text("sku").unique(),
            text("created_at"),
        ],
        foreign_keys: vec![],
        indexes: vec![],
    }
}

fn orders() -> Table {
    Table {
        name: "orders",
        primary_key: "order_id",
        columns: vec![
            integer("order_id"),
            integer("user_id"),
            text("order_date"),
            text("ship_date").nullable(),
            text("delivery_date").nullable(),
            text("status"),
            text("shipping_method"),
            real("shipping_cost"),
            text("payment_method"),
            real("subtotal"),
            real("total"),
        ],
        foreign_keys: vec![ForeignKey::cascade("user_id", "users", "user_id")],
        indexes: vec![Index {
            name: "idx_orders_user_id",
            column: "user_id",
        }],
    }
}

fn order_items() -> Table {
    Table {
        name: "order_items",
        primary_key: "order_item_id",
        columns: vec![
            integer("order_item_id"),
            integer("order_id"),
            integer("product_id"),
            integer("quantity").check("quantity > 0"),
            real("unit_price"),
            real("discount").check("discount >= 0"),
        ],
        foreign_keys: vec![
            ForeignKey::cascade("order_id", "orders", "order_id"),
            // Products stay deletable only while no order line references them.
            ForeignKey::restrict_delete("product_id", "products", "product_id"),
        ],
        indexes: vec![
            Index {
                name: "idx_order_items_order_id",
                column: "order_id",
            },
            Index {
                name: "idx_order_items_product_id",
                column: "product_id",
            },
        ],
    }
}

fn reviews() -> Table {
    Table {
        name: "reviews",
        primary_key: "review_id",
        columns: vec![
            integer("review_id"),
            integer("user_id"),
            integer("product_id"),
            integer("rating").check("rating BETWEEN 1 AND 5"),
            text("title"),
            text("review_text").nullable(),
            text("review_date"),
            integer("verified_purchase").check("verified_purchase IN (0, 1)"),
        ],
        foreign_keys: vec![
            ForeignKey::cascade("user_id", "users", "user_id"),
            ForeignKey::cascade("product_id", "products", "product_id"),
        ],
        indexes: vec![
            Index {
                name: "idx_reviews_user_id",
                column: "user_id",
            },
            Index {
                name: "idx_reviews_product_id",
                column: "product_id",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_table_names_round_trip() {
        for entity in Entity::ALL {
            assert_eq!(Entity::from_table(entity.table()), Some(entity));
        }
        assert_eq!(Entity::from_table("invoices"), None);
    }

    #[test]
    fn catalog_has_one_table_per_entity() {
        let tables = catalog();
        assert_eq!(tables.len(), Entity::ALL.len());
        for entity in Entity::ALL {
            assert!(tables.iter().any(|table| table.name == entity.table()));
        }
    }

    #[test]
    fn primary_keys_are_integer_columns() {
        for table in catalog() {
            let pk = table
                .column(table.primary_key)
                .unwrap_or_else(|| panic!("missing pk column on {}", table.name));
            assert_eq!(pk.sql_type, SqlType::Integer);
        }
    }

    #[test]
    fn order_items_restrict_product_deletes() {
        let tables = catalog();
        let order_items = tables
            .iter()
            .find(|table| table.name == "order_items")
            .expect("order_items table");
        let product_fk = order_items
            .foreign_keys
            .iter()
            .find(|fk| fk.column == "product_id")
            .expect("product fk");
        assert_eq!(product_fk.on_delete, FkAction::Restrict);
        assert_eq!(product_fk.on_update, FkAction::Cascade);
    }
}
