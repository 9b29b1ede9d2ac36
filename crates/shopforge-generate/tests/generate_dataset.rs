use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use chrono::Duration;
use shopforge_core::catalog::{Entity, catalog};
use shopforge_core::records::Dataset;
use shopforge_generate::{
    Bounds, CountSpec, Counts, GenerateError, GenerateOptions, GenerationEngine, Profile,
    ResolvedProfile, build_dataset,
};

fn fixed_profile(users: u64, products: u64, orders: u64, items: u64, reviews: u64) -> Profile {
    Profile {
        counts: Counts {
            users: CountSpec::Fixed(users),
            products: CountSpec::Fixed(products),
            orders: CountSpec::Fixed(orders),
            order_items: Some(CountSpec::Fixed(items)),
            reviews: CountSpec::Fixed(reviews),
        },
        ..Profile::default()
    }
}

fn small_dataset() -> Dataset {
    let resolved = fixed_profile(10, 5, 20, 40, 15)
        .resolve()
        .expect("profile resolves");
    build_dataset(&resolved)
}

#[test]
fn generated_counts_match_profile() {
    let dataset = small_dataset();
    assert_eq!(dataset.users.len(), 10);
    assert_eq!(dataset.products.len(), 5);
    assert_eq!(dataset.orders.len(), 20);
    assert_eq!(dataset.order_items.len(), 40);
    assert_eq!(dataset.reviews.len(), 15);
}

#[test]
fn primary_keys_are_sequential() {
    let dataset = small_dataset();
    for (index, user) in dataset.users.iter().enumerate() {
        assert_eq!(user.user_id, index as i64 + 1);
    }
    for (index, order) in dataset.orders.iter().enumerate() {
        assert_eq!(order.order_id, index as i64 + 1);
    }
    for (index, item) in dataset.order_items.iter().enumerate() {
        assert_eq!(item.order_item_id, index as i64 + 1);
    }
    for (index, review) in dataset.reviews.iter().enumerate() {
        assert_eq!(review.review_id, index as i64 + 1);
    }
}

#[test]
fn foreign_keys_reference_generated_parents() {
    let dataset = small_dataset();
    let user_ids: HashSet<i64> = dataset.users.iter().map(|user| user.user_id).collect();
    let product_ids: HashSet<i64> = dataset
        .products
        .iter()
        .map(|product| product.product_id)
        .collect();
    let order_ids: HashSet<i64> = dataset.orders.iter().map(|order| order.order_id).collect();

    for order in &dataset.orders {
        assert!(user_ids.contains(&order.user_id), "orphan order user");
    }
    for item in &dataset.order_items {
        assert!(order_ids.contains(&item.order_id), "orphan item order");
        assert!(product_ids.contains(&item.product_id), "orphan item product");
    }
    for review in &dataset.reviews {
        assert!(user_ids.contains(&review.user_id), "orphan review user");
        assert!(
            product_ids.contains(&review.product_id),
            "orphan review product"
        );
    }
}

#[test]
fn every_order_has_items_and_reconciled_totals() {
    let dataset = small_dataset();
    let mut line_totals: HashMap<i64, f64> = HashMap::new();
    let mut items_per_order: HashMap<i64, usize> = HashMap::new();
    for item in &dataset.order_items {
        *line_totals.entry(item.order_id).or_insert(0.0) +=
            item.unit_price * item.quantity as f64 - item.discount;
        *items_per_order.entry(item.order_id).or_insert(0) += 1;
    }

    for order in &dataset.orders {
        let lines = items_per_order.get(&order.order_id).copied().unwrap_or(0);
        assert!(lines >= 1, "order {} has no items", order.order_id);

        let expected_subtotal =
            (line_totals.get(&order.order_id).copied().unwrap_or(0.0) * 100.0).round() / 100.0;
        assert!(
            (order.subtotal - expected_subtotal).abs() < 1e-9,
            "order {} subtotal {} != {}",
            order.order_id,
            order.subtotal,
            expected_subtotal
        );

        let expected_total = ((order.subtotal + order.shipping_cost) * 100.0).round() / 100.0;
        assert!(
            (order.total - expected_total).abs() < 1e-9,
            "order {} total {} != {}",
            order.order_id,
            order.total,
            expected_total
        );
    }
}

#[test]
fn verified_reviews_come_from_purchases() {
    let dataset = small_dataset();
    let order_dates: HashMap<i64, (i64, chrono::NaiveDateTime)> = dataset
        .orders
        .iter()
        .map(|order| (order.order_id, (order.user_id, order.order_date)))
        .collect();

    let mut purchase_dates: HashMap<(i64, i64), Vec<chrono::NaiveDateTime>> = HashMap::new();
    for item in &dataset.order_items {
        let (user_id, order_date) = order_dates[&item.order_id];
        purchase_dates
            .entry((user_id, item.product_id))
            .or_default()
            .push(order_date);
    }

    for review in &dataset.reviews {
        if !review.verified_purchase {
            continue;
        }
        let dates = purchase_dates
            .get(&(review.user_id, review.product_id))
            .unwrap_or_else(|| {
                panic!(
                    "verified review {} has no matching purchase",
                    review.review_id
                )
            });
        assert!(
            dates.iter().any(|order_date| {
                let offset = review.review_date - *order_date;
                offset >= Duration::days(3) && offset <= Duration::days(29)
            }),
            "verified review {} dated outside the purchase window",
            review.review_id
        );
    }
}

#[test]
fn surplus_reviews_are_unverified() {
    // 3 users x 2 products bound the distinct purchase pairs well below 50.
    let resolved = fixed_profile(3, 2, 3, 6, 50)
        .resolve()
        .expect("profile resolves");
    let dataset = build_dataset(&resolved);

    let verified = dataset
        .reviews
        .iter()
        .filter(|review| review.verified_purchase)
        .count();
    let unverified = dataset.reviews.len() - verified;
    assert!(verified <= 6, "at most one review per distinct pair");
    assert!(unverified > 0, "surplus reviews must be unverified");
}

#[test]
fn domain_bounds_hold() {
    let dataset = small_dataset();
    let statuses = [
        "Processing",
        "Shipped",
        "Delivered",
        "Cancelled",
        "Returned",
    ];
    let methods = ["Standard", "Expedited", "Two-Day", "Overnight"];
    let payments = ["Credit Card", "PayPal", "Gift Card", "Apple Pay"];

    for product in &dataset.products {
        assert!(product.price >= 0.0);
        assert!(product.cost >= 0.0);
        assert!((25..500).contains(&product.inventory));
        assert_eq!(product.sku, format!("SKU-{:05}", product.product_id));
    }
    for user in &dataset.users {
        assert_eq!(user.country, "USA");
        assert!(user.email.ends_with("@example.com"));
    }
    for order in &dataset.orders {
        assert!(statuses.contains(&order.status.as_str()));
        assert!(methods.contains(&order.shipping_method.as_str()));
        assert!(payments.contains(&order.payment_method.as_str()));
        assert!((0.0..=25.0).contains(&order.shipping_cost));
        if order.status == "Cancelled" {
            assert!(order.ship_date.is_none());
            assert!(order.delivery_date.is_none());
        }
        if order.status == "Returned" {
            assert!(order.delivery_date.is_none());
        }
    }
    for item in &dataset.order_items {
        assert!((1..=4).contains(&item.quantity));
        assert!(item.unit_price >= 0.0);
        assert!(item.discount >= 0.0);
    }
    for review in &dataset.reviews {
        assert!((1..=5).contains(&review.rating));
    }
}

#[test]
fn distinct_products_within_an_order_when_possible() {
    // 40 items over 20 orders with 5 products: a single order line count can
    // exceed the catalog only past 5 items, which the allocation rarely does;
    // distinctness must hold whenever the line count fits the catalog.
    let dataset = small_dataset();
    let mut per_order: HashMap<i64, Vec<i64>> = HashMap::new();
    for item in &dataset.order_items {
        per_order
            .entry(item.order_id)
            .or_default()
            .push(item.product_id);
    }
    for (order_id, products) in per_order {
        if products.len() <= 5 {
            let distinct: HashSet<&i64> = products.iter().collect();
            assert_eq!(
                distinct.len(),
                products.len(),
                "order {order_id} repeats a product"
            );
        }
    }
}

#[test]
fn dataset_and_csv_output_are_deterministic() {
    let profile = fixed_profile(10, 5, 20, 40, 15);
    let resolved_a = profile.resolve().expect("resolve A");
    let resolved_b = profile.resolve().expect("resolve B");
    assert_eq!(build_dataset(&resolved_a), build_dataset(&resolved_b));

    let out_dir_a = temp_out_dir("determinism_a");
    let out_dir_b = temp_out_dir("determinism_b");

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir_a.clone(),
    });
    engine.run(&profile).expect("run generation A");

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir_b.clone(),
    });
    engine.run(&profile).expect("run generation B");

    for entity in Entity::ALL {
        let csv_a = fs::read_to_string(out_dir_a.join(entity.csv_file())).expect("read csv A");
        let csv_b = fs::read_to_string(out_dir_b.join(entity.csv_file())).expect("read csv B");
        assert_eq!(csv_a, csv_b, "{} should be byte-identical", entity);
    }
}

#[test]
fn csv_headers_match_catalog_columns() {
    let out_dir = temp_out_dir("headers");
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir.clone(),
    });
    engine
        .run(&fixed_profile(10, 5, 20, 40, 15))
        .expect("run generation");

    for table in catalog() {
        let entity = Entity::from_table(table.name).expect("catalog entity");
        let contents = fs::read_to_string(out_dir.join(entity.csv_file())).expect("read csv");
        let header = contents.lines().next().expect("header line");
        assert_eq!(header, table.column_names().join(","), "{}", table.name);
    }
}

#[test]
fn run_writes_report_and_resolved_profile() {
    let out_dir = temp_out_dir("report");
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir.clone(),
    });
    let result = engine
        .run(&fixed_profile(10, 5, 20, 40, 15))
        .expect("run generation");

    assert_eq!(result.report.tables.len(), 5);
    for table in &result.report.tables {
        assert!(table.bytes_written > 0, "{} wrote no bytes", table.table);
    }

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("generation_report.json")).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report.get("seed").and_then(|v| v.as_u64()), Some(42));

    let resolved: ResolvedProfile = toml::from_str(
        &fs::read_to_string(out_dir.join("resolved_profile.toml")).expect("read resolved profile"),
    )
    .expect("parse resolved profile");
    assert_eq!(resolved.counts.users, 10);
    assert_eq!(resolved.counts.order_items, 40);
}

#[test]
fn rejected_profile_creates_no_output() {
    let out_dir = std::env::temp_dir().join(format!(
        "shopforge_generate_rejected_{}",
        uuid::Uuid::new_v4()
    ));
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir.clone(),
    });

    let err = engine
        .run(&fixed_profile(0, 5, 20, 40, 15))
        .expect_err("zero users with orders must fail");
    match err {
        GenerateError::Config(message) => {
            assert!(message.contains("zero users"), "got: {message}");
        }
        other => panic!("expected config error, got {other:?}"),
    }
    assert!(!out_dir.exists(), "no output directory for a rejected run");
}

#[test]
fn custom_bounds_flow_into_values() {
    let profile = Profile {
        bounds: Bounds {
            price_min: 50.0,
            price_max: 60.0,
            rating_min: 4,
            rating_max: 5,
        },
        ..fixed_profile(10, 5, 20, 40, 15)
    };
    let dataset = build_dataset(&profile.resolve().expect("profile resolves"));

    for product in &dataset.products {
        // Base price 50..=60 plus jitter in -5..=25.
        assert!((45.0..=85.0).contains(&product.price), "{}", product.price);
    }
    for review in &dataset.reviews {
        assert!((4..=5).contains(&review.rating));
    }
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "shopforge_generate_{label}_{}",
        uuid::Uuid::new_v4()
    ));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
