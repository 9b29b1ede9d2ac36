//! The generation engine.
//!
//! Builds the five entity collections parents-first, writes them as CSV and
//! records a run report. Every value is drawn from a per-table `ChaCha8Rng`
//! seeded as `hash(seed, table_name)`, so adding rows to one table never
//! perturbs another table's stream and a run's byte output is a pure
//! function of its profile.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::address::en::{
    BuildingNumber, CityName, StateAbbr, StreetName, StreetSuffix, ZipCode,
};
use fake::faker::lorem::en::{Sentence, Sentences, Word};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use shopforge_core::records::{Dataset, Order, OrderItem, Product, Review, User};

use crate::errors::GenerateError;
use crate::model::{GenerateOptions, GenerationReport, GenerationResult};
use crate::output::write_dataset;
use crate::profile::{Bounds, Profile, ResolvedProfile};

const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Home & Kitchen",
    "Beauty",
    "Sports",
    "Books",
    "Toys",
    "Health",
    "Clothing",
];

const BRANDS: [&str; 8] = [
    "Acme", "Globex", "Innova", "Zenith", "Nimbus", "Vertex", "Pulse", "Voyage",
];

const ORDER_STATUSES: [(&str, u32); 5] = [
    ("Processing", 25),
    ("Shipped", 25),
    ("Delivered", 35),
    ("Cancelled", 5),
    ("Returned", 10),
];

const SHIPPING_METHODS: [(&str, u32); 4] = [
    ("Standard", 50),
    ("Expedited", 20),
    ("Two-Day", 20),
    ("Overnight", 10),
];

const PAYMENT_METHODS: [&str; 4] = ["Credit Card", "PayPal", "Gift Card", "Apple Pay"];

/// Entry point for dataset generation.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Resolve the profile, generate the dataset and write the run artifacts
    /// (five CSV files, `generation_report.json`, `resolved_profile.toml`).
    ///
    /// A rejected profile fails before the output directory is created.
    pub fn run(&self, profile: &Profile) -> Result<GenerationResult, GenerateError> {
        let start = Instant::now();
        let resolved = profile.resolve()?;

        info!(
            seed = resolved.seed,
            base_date = %resolved.base_date,
            users = resolved.counts.users,
            products = resolved.counts.products,
            orders = resolved.counts.orders,
            order_items = resolved.counts.order_items,
            reviews = resolved.counts.reviews,
            "generation started"
        );

        let dataset = build_dataset(&resolved);

        std::fs::create_dir_all(&self.options.out_dir)?;
        let tables = write_dataset(&dataset, &self.options.out_dir)?;

        let report = GenerationReport {
            seed: resolved.seed,
            base_date: resolved.base_date,
            tables,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        std::fs::write(
            self.options.out_dir.join("generation_report.json"),
            serde_json::to_vec_pretty(&report)?,
        )?;
        std::fs::write(
            self.options.out_dir.join("resolved_profile.toml"),
            toml::to_string_pretty(&resolved)?,
        )?;

        info!(
            duration_ms = report.duration_ms,
            total_rows = dataset.total_rows(),
            "generation completed"
        );

        Ok(GenerationResult { dataset, report })
    }
}

/// Build the full dataset in memory, parents before children.
///
/// Foreign key values are only ever copied from parent rows already
/// generated, never synthesized.
pub fn build_dataset(profile: &ResolvedProfile) -> Dataset {
    let counts = profile.counts;
    let base = profile.base_date.and_time(NaiveTime::MIN);

    let users = generate_users(counts.users, base, &mut table_rng(profile.seed, "users"));
    let products = generate_products(
        counts.products,
        &profile.bounds,
        base,
        &mut table_rng(profile.seed, "products"),
    );
    let mut orders = generate_orders(
        counts.orders,
        &users,
        base,
        &mut table_rng(profile.seed, "orders"),
    );
    let order_items = generate_order_items(
        counts.order_items,
        &orders,
        &products,
        &mut table_rng(profile.seed, "order_items"),
    );
    reconcile_order_totals(&mut orders, &order_items);

    let mut dataset = Dataset {
        users,
        products,
        orders,
        order_items,
        reviews: Vec::new(),
    };
    let reviews = generate_reviews(
        counts.reviews,
        &dataset,
        &profile.bounds,
        base,
        &mut table_rng(profile.seed, "reviews"),
    );
    dataset.reviews = reviews;
    dataset
}

/// Derive the RNG for one table from the run seed.
pub(crate) fn table_rng(seed: u64, table: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, table))
}

/// FNV-style mix of the run seed with a table key.
fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn generate_users(count: u64, base: NaiveDateTime, rng: &mut ChaCha8Rng) -> Vec<User> {
    let start = Instant::now();
    let mut users = Vec::with_capacity(count as usize);
    for user_id in 1..=count as i64 {
        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let email = format!(
            "{}.{}{}@example.com",
            email_slug(&first_name),
            email_slug(&last_name),
            user_id
        );
        let building: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        let suffix: String = StreetSuffix().fake_with_rng(rng);
        users.push(User {
            user_id,
            first_name,
            last_name,
            email,
            phone_number: PhoneNumber().fake_with_rng(rng),
            address: format!("{building} {street} {suffix}"),
            city: CityName().fake_with_rng(rng),
            state: StateAbbr().fake_with_rng(rng),
            postal_code: ZipCode().fake_with_rng(rng),
            country: "USA".to_string(),
            signup_date: datetime_back(rng, base, 0, 730),
            is_active: rng.random_bool(0.75),
        });
    }
    info!(
        table = "users",
        rows = users.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "table generated"
    );
    users
}

fn generate_products(
    count: u64,
    bounds: &Bounds,
    base: NaiveDateTime,
    rng: &mut ChaCha8Rng,
) -> Vec<Product> {
    let start = Instant::now();
    let mut products = Vec::with_capacity(count as usize);
    for product_id in 1..=count as i64 {
        let word: String = Word().fake_with_rng(rng);
        let base_price = rng.random_range(bounds.price_min..=bounds.price_max);
        let price = round2(base_price + rng.random_range(-5.0..=25.0)).max(0.0);
        products.push(Product {
            product_id,
            name: format!(
                "{} {}",
                BRANDS[rng.random_range(0..BRANDS.len())],
                title_case(&word)
            ),
            category: CATEGORIES[rng.random_range(0..CATEGORIES.len())].to_string(),
            brand: BRANDS[rng.random_range(0..BRANDS.len())].to_string(),
            price,
            cost: round2(price * rng.random_range(0.4..=0.7)),
            inventory: rng.random_range(25..500),
            sku: format!("SKU-{product_id:05}"),
            created_at: datetime_back(rng, base, 365, 730),
        });
    }
    info!(
        table = "products",
        rows = products.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "table generated"
    );
    products
}

fn generate_orders(
    count: u64,
    users: &[User],
    base: NaiveDateTime,
    rng: &mut ChaCha8Rng,
) -> Vec<Order> {
    let start = Instant::now();
    let mut orders = Vec::with_capacity(count as usize);
    for order_id in 1..=count as i64 {
        let user = &users[rng.random_range(0..users.len())];
        let order_date = datetime_back(rng, base, 0, 365);
        let ship_date = order_date + Duration::days(rng.random_range(1..10));
        let delivery_date = ship_date + Duration::days(rng.random_range(1..7));
        let status = pick_weighted(rng, &ORDER_STATUSES);
        orders.push(Order {
            order_id,
            user_id: user.user_id,
            order_date,
            ship_date: (status != "Cancelled").then_some(ship_date),
            delivery_date: (status != "Cancelled" && status != "Returned")
                .then_some(delivery_date),
            status: status.to_string(),
            shipping_method: pick_weighted(rng, &SHIPPING_METHODS).to_string(),
            shipping_cost: round2(rng.random_range(0.0..=25.0)),
            payment_method: PAYMENT_METHODS[rng.random_range(0..PAYMENT_METHODS.len())]
                .to_string(),
            subtotal: 0.0,
            total: 0.0,
        });
    }
    info!(
        table = "orders",
        rows = orders.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "table generated"
    );
    orders
}

fn generate_order_items(
    count: u64,
    orders: &[Order],
    products: &[Product],
    rng: &mut ChaCha8Rng,
) -> Vec<OrderItem> {
    let start = Instant::now();
    // One guaranteed item per order, the surplus scattered uniformly.
    let mut per_order = vec![1_u64; orders.len()];
    for _ in orders.len() as u64..count {
        per_order[rng.random_range(0..orders.len())] += 1;
    }

    let mut items = Vec::with_capacity(count as usize);
    let mut item_id = 1_i64;
    for (order, line_count) in orders.iter().zip(&per_order) {
        for product_index in pick_product_indexes(products.len(), *line_count as usize, rng) {
            let product = &products[product_index];
            let quantity: i64 = rng.random_range(1..=4);
            let unit_price = round2(product.price * rng.random_range(0.95..=1.05));
            items.push(OrderItem {
                order_item_id: item_id,
                order_id: order.order_id,
                product_id: product.product_id,
                quantity,
                unit_price,
                discount: round2(unit_price * quantity as f64 * rng.random_range(0.0..=0.15)),
            });
            item_id += 1;
        }
    }
    info!(
        table = "order_items",
        rows = items.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "table generated"
    );
    items
}

/// Distinct products within an order whenever the catalog is large enough.
fn pick_product_indexes(pool: usize, count: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    if count <= pool {
        index::sample(rng, pool, count).into_vec()
    } else {
        (0..count).map(|_| rng.random_range(0..pool)).collect()
    }
}

/// Fold line values back into the order headers.
fn reconcile_order_totals(orders: &mut [Order], items: &[OrderItem]) {
    let mut line_totals: HashMap<i64, f64> = HashMap::new();
    for item in items {
        *line_totals.entry(item.order_id).or_insert(0.0) +=
            item.unit_price * item.quantity as f64 - item.discount;
    }
    for order in orders.iter_mut() {
        let subtotal = round2(line_totals.get(&order.order_id).copied().unwrap_or(0.0));
        order.subtotal = subtotal;
        order.total = round2(subtotal + order.shipping_cost);
    }
}

fn generate_reviews(
    count: u64,
    dataset: &Dataset,
    bounds: &Bounds,
    base: NaiveDateTime,
    rng: &mut ChaCha8Rng,
) -> Vec<Review> {
    let start = Instant::now();
    let order_info: HashMap<i64, (i64, NaiveDateTime)> = dataset
        .orders
        .iter()
        .map(|order| (order.order_id, (order.user_id, order.order_date)))
        .collect();

    // Distinct purchase pairs in first-occurrence order.
    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut pairs: Vec<(i64, i64, NaiveDateTime)> = Vec::new();
    for item in &dataset.order_items {
        if let Some(&(user_id, order_date)) = order_info.get(&item.order_id)
            && seen.insert((user_id, item.product_id))
        {
            pairs.push((user_id, item.product_id, order_date));
        }
    }

    let verified = count.min(pairs.len() as u64) as usize;
    let mut reviews = Vec::with_capacity(count as usize);
    for pair_index in index::sample(rng, pairs.len(), verified) {
        let (user_id, product_id, order_date) = pairs[pair_index];
        reviews.push(Review {
            review_id: reviews.len() as i64 + 1,
            user_id,
            product_id,
            rating: rng.random_range(bounds.rating_min..=bounds.rating_max),
            title: Sentence(4..9).fake_with_rng(rng),
            review_text: review_body(rng),
            review_date: order_date + Duration::days(rng.random_range(3..30)),
            verified_purchase: true,
        });
    }

    // More reviews requested than purchase pairs exist: pad with random
    // user/product pairs flagged unverified.
    while reviews.len() < count as usize {
        let user = &dataset.users[rng.random_range(0..dataset.users.len())];
        let product = &dataset.products[rng.random_range(0..dataset.products.len())];
        reviews.push(Review {
            review_id: reviews.len() as i64 + 1,
            user_id: user.user_id,
            product_id: product.product_id,
            rating: rng.random_range(bounds.rating_min..=bounds.rating_max),
            title: Sentence(4..9).fake_with_rng(rng),
            review_text: review_body(rng),
            review_date: datetime_back(rng, base, 0, 365),
            verified_purchase: false,
        });
    }
    info!(
        table = "reviews",
        rows = reviews.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "table generated"
    );
    reviews
}

fn review_body(rng: &mut ChaCha8Rng) -> String {
    let sentences: Vec<String> = Sentences(2..5).fake_with_rng(rng);
    sentences.join(" ")
}

/// A timestamp between `max_days` and `min_days` days before `base`.
fn datetime_back(
    rng: &mut ChaCha8Rng,
    base: NaiveDateTime,
    min_days: i64,
    max_days: i64,
) -> NaiveDateTime {
    let seconds = rng.random_range(min_days * 86_400..max_days * 86_400);
    base - Duration::seconds(seconds)
}

fn pick_weighted<'a>(rng: &mut ChaCha8Rng, choices: &[(&'a str, u32)]) -> &'a str {
    let total: u32 = choices.iter().map(|(_, weight)| *weight).sum();
    let mut roll = rng.random_range(0..total);
    for (value, weight) in choices.iter().copied() {
        if roll < weight {
            return value;
        }
        roll -= weight;
    }
    choices[0].0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn email_slug(name: &str) -> String {
    name.chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_seed_is_stable_and_key_sensitive() {
        assert_eq!(hash_seed(42, "users"), hash_seed(42, "users"));
        assert_ne!(hash_seed(42, "users"), hash_seed(42, "orders"));
        assert_ne!(hash_seed(42, "users"), hash_seed(43, "users"));
    }

    #[test]
    fn pick_weighted_only_returns_members() {
        let mut rng = table_rng(1, "weights");
        let choices = [("a", 1), ("b", 3), ("c", 6)];
        for _ in 0..200 {
            let picked = pick_weighted(&mut rng, &choices);
            assert!(choices.iter().any(|(value, _)| *value == picked));
        }
    }

    #[test]
    fn datetime_back_stays_in_window() {
        let mut rng = table_rng(9, "dates");
        let base = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .expect("valid date")
            .and_time(NaiveTime::MIN);
        for _ in 0..200 {
            let sampled = datetime_back(&mut rng, base, 365, 730);
            assert!(sampled < base - Duration::days(364));
            assert!(sampled >= base - Duration::days(730));
        }
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(19.994), 19.99);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }

    #[test]
    fn title_case_capitalizes_first_letter() {
        assert_eq!(title_case("widget"), "Widget");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn email_slug_strips_punctuation() {
        assert_eq!(email_slug("O'Brien"), "obrien");
        assert_eq!(email_slug("Del Toro"), "deltoro");
    }
}
