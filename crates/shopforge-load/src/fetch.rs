//! Read a loaded database back into typed records.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use shopforge_core::records::{Dataset, Order, OrderItem, Product, Review, User};

use crate::error::LoadError;

/// Fetch the complete dataset back out of a loaded database, rows ordered by
/// primary key per table.
pub async fn fetch_dataset(pool: &SqlitePool) -> Result<Dataset, LoadError> {
    Ok(Dataset {
        users: fetch_users(pool).await?,
        products: fetch_products(pool).await?,
        orders: fetch_orders(pool).await?,
        order_items: fetch_order_items(pool).await?,
        reviews: fetch_reviews(pool).await?,
    })
}

async fn fetch_users(pool: &SqlitePool) -> Result<Vec<User>, LoadError> {
    let rows = sqlx::query("SELECT * FROM users ORDER BY user_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(user_from_row).collect()
}

async fn fetch_products(pool: &SqlitePool) -> Result<Vec<Product>, LoadError> {
    let rows = sqlx::query("SELECT * FROM products ORDER BY product_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(product_from_row).collect()
}

async fn fetch_orders(pool: &SqlitePool) -> Result<Vec<Order>, LoadError> {
    let rows = sqlx::query("SELECT * FROM orders ORDER BY order_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(order_from_row).collect()
}

async fn fetch_order_items(pool: &SqlitePool) -> Result<Vec<OrderItem>, LoadError> {
    let rows = sqlx::query("SELECT * FROM order_items ORDER BY order_item_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(order_item_from_row).collect()
}

async fn fetch_reviews(pool: &SqlitePool) -> Result<Vec<Review>, LoadError> {
    let rows = sqlx::query("SELECT * FROM reviews ORDER BY review_id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(review_from_row).collect()
}

fn user_from_row(row: &SqliteRow) -> Result<User, LoadError> {
    Ok(User {
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        postal_code: row.try_get("postal_code")?,
        country: row.try_get("country")?,
        signup_date: row.try_get("signup_date")?,
        is_active: row.try_get("is_active")?,
    })
}

fn product_from_row(row: &SqliteRow) -> Result<Product, LoadError> {
    Ok(Product {
        product_id: row.try_get("product_id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        brand: row.try_get("brand")?,
        price: row.try_get("price")?,
        cost: row.try_get("cost")?,
        inventory: row.try_get("inventory")?,
        sku: row.try_get("sku")?,
        created_at: row.try_get("created_at")?,
    })
}

fn order_from_row(row: &SqliteRow) -> Result<Order, LoadError> {
    Ok(Order {
        order_id: row.try_get("order_id")?,
        user_id: row.try_get("user_id")?,
        order_date: row.try_get("order_date")?,
        ship_date: row.try_get("ship_date")?,
        delivery_date: row.try_get("delivery_date")?,
        status: row.try_get("status")?,
        shipping_method: row.try_get("shipping_method")?,
        shipping_cost: row.try_get("shipping_cost")?,
        payment_method: row.try_get("payment_method")?,
        subtotal: row.try_get("subtotal")?,
        total: row.try_get("total")?,
    })
}

fn order_item_from_row(row: &SqliteRow) -> Result<OrderItem, LoadError> {
    Ok(OrderItem {
        order_item_id: row.try_get("order_item_id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        discount: row.try_get("discount")?,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<Review, LoadError> {
    Ok(Review {
        review_id: row.try_get("review_id")?,
        user_id: row.try_get("user_id")?,
        product_id: row.try_get("product_id")?,
        rating: row.try_get("rating")?,
        title: row.try_get("title")?,
        review_text: row.try_get("review_text")?,
        review_date: row.try_get("review_date")?,
        verified_purchase: row.try_get("verified_purchase")?,
    })
}
