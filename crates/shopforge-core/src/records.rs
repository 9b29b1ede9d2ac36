//! Typed rows for the five entities.
//!
//! Field order matches the column order in [`crate::catalog`], so serializing
//! a row through `csv` produces the interchange layout directly. Timestamps
//! are `NaiveDateTime` and serialize as `2024-06-01T12:34:56`; optional
//! timestamps serialize as the empty field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::Entity;

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub signup_date: NaiveDateTime,
    pub is_active: bool,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub cost: f64,
    pub inventory: i64,
    pub sku: String,
    pub created_at: NaiveDateTime,
}

/// An order header. `subtotal` and `total` are reconciled against the order's
/// line items after item generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub order_date: NaiveDateTime,
    /// Unset while the order is cancelled.
    pub ship_date: Option<NaiveDateTime>,
    /// Unset while the order is cancelled or returned.
    pub delivery_date: Option<NaiveDateTime>,
    pub status: String,
    pub shipping_method: String,
    pub shipping_cost: f64,
    pub payment_method: String,
    pub subtotal: f64,
    pub total: f64,
}

/// A single order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
}

/// A product review. Verified reviews point at a real purchase pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: i64,
    pub title: String,
    pub review_text: String,
    pub review_date: NaiveDateTime,
    pub verified_purchase: bool,
}

/// A complete generated dataset, rows ordered by primary key per entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub reviews: Vec<Review>,
}

impl Dataset {
    /// Row count for one entity.
    pub fn rows(&self, entity: Entity) -> usize {
        match entity {
            Entity::Users => self.users.len(),
            Entity::Products => self.products.len(),
            Entity::Orders => self.orders.len(),
            Entity::OrderItems => self.order_items.len(),
            Entity::Reviews => self.reviews.len(),
        }
    }

    /// Total rows across all entities.
    pub fn total_rows(&self) -> usize {
        Entity::ALL
            .iter()
            .map(|entity| self.rows(*entity))
            .sum()
    }
}
