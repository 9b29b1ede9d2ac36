//! Core contracts shared by the shopforge generator and loader.
//!
//! This crate owns the entity catalog (table layout, constraints, foreign
//! keys), the typed row structs that travel through CSV and SQLite, and the
//! dependency graph that decides a safe load order.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod records;
pub mod validation;

pub use catalog::{Column, Entity, FkAction, ForeignKey, Index, SqlType, Table, catalog};
pub use error::{CatalogError, Result};
pub use graph::load_order;
pub use records::{Dataset, Order, OrderItem, Product, Review, User};
pub use validation::validate_catalog;
