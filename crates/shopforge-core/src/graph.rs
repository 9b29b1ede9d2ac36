//! Foreign key dependency ordering.
//!
//! Load order is computed, not declared: a Kahn topological sort over the FK
//! graph with an ordered ready set, so equal catalogs always produce the same
//! sequence.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Entity, Table};
use crate::error::{CatalogError, Result};

/// Dependency-safe insert order for the catalog: parents before children.
pub fn load_order(tables: &[Table]) -> Result<Vec<Entity>> {
    let graph = build_adjacency(tables);
    let order = toposort(&graph)
        .map_err(|cycle| CatalogError::Cycle(cycle.into_iter().map(str::to_string).collect()))?;

    order
        .into_iter()
        .map(|name| {
            Entity::from_table(name).ok_or_else(|| {
                CatalogError::Invalid(format!("unknown table '{name}' in foreign key graph"))
            })
        })
        .collect()
}

/// Adjacency map from referenced table to its dependents.
fn build_adjacency(tables: &[Table]) -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    let mut graph: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();

    for table in tables {
        graph.entry(table.name).or_default();
        for fk in &table.foreign_keys {
            graph
                .entry(fk.referenced_table)
                .or_default()
                .insert(table.name);
        }
    }

    graph
}

fn toposort<'a>(
    graph: &BTreeMap<&'a str, BTreeSet<&'a str>>,
) -> std::result::Result<Vec<&'a str>, Vec<&'a str>> {
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();

    for node in graph.keys() {
        indegree.entry(node).or_insert(0);
    }

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.iter().next().copied() {
        ready.remove(node);
        order.push(node);

        if let Some(targets) = graph.get(node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle: Vec<&str> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle)
    }
}
