//! Demo data: random but valid supply chains for local development.
//!
//! Chains are planned up front from an injected RNG (so tests can seed it)
//! and then written through [`NetworkService`], which runs the usual
//! validation on every node.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

use tradenet_core::{ContactId, NodeId};
use tradenet_network::{ContactDetails, CreateNode, NodeType, ProductSpec};

use crate::service::{NetworkService, ServiceError};

const PRODUCT_NAMES: &[&str] = &[
    "Smartphone",
    "Laptop",
    "Monitor",
    "Tablet",
    "Speakers",
    "Iron",
    "Vacuum cleaner",
    "Microwave oven",
    "Toaster",
    "Coffee machine",
    "Washing machine",
    "TV set",
];

const COUNTRIES: &[&str] = &["Russia", "Belarus", "Kazakhstan"];

const COMPANIES: &[&str] = &[
    "Vector", "Orbita", "Polyus", "Signal", "Rassvet", "Zenit", "Meridian", "Progress", "Volna", "Almaz",
];

const SURNAMES: &[&str] = &[
    "Ivanov", "Petrov", "Sidorova", "Kuznetsov", "Smirnova", "Popov", "Volkova", "Sokolov",
];

const CITIES: &[&str] = &["Moscow", "Minsk", "Almaty", "Kazan", "Gomel", "Astana", "Samara"];

const STREETS: &[&str] = &["Lenina", "Sadovaya", "Mira", "Pushkina", "Gagarina", "Central"];

/// Release dates fall within this many days before today.
const RELEASE_WINDOW_DAYS: i64 = 3 * 365;

/// Debt of non-factory nodes, in cents.
const DEBT_CENTS: std::ops::RangeInclusive<i64> = 1_000_000..=30_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub chains: usize,
    pub nodes: usize,
}

/// Plan one chain: a factory with 2..=4 products, one level-1 client and,
/// two times out of three, a level-2 client. Every node carries the full
/// product set.
pub fn plan_chain<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<CreateNode> {
    let products: Vec<ProductSpec> = (0..rng.gen_range(2..=4))
        .map(|_| {
            let name = pick(rng, PRODUCT_NAMES);
            let model = format!("MDL-{}", rng.gen_range(1..=999));
            let released = now.date_naive() - Duration::days(rng.gen_range(0..=RELEASE_WINDOW_DAYS));
            ProductSpec::new(name, model, released)
        })
        .collect();

    let factory = node(rng, NodeType::Factory, None, &products, now);
    let level1_type = if rng.gen_bool(0.5) {
        NodeType::Retail
    } else {
        NodeType::Entrepreneur
    };
    let level1 = node(rng, level1_type, Some(factory.node_id), &products, now);

    let mut plan = vec![factory];
    let level1_id = level1.node_id;
    plan.push(level1);

    if rng.gen_ratio(2, 3) {
        let level2_type = if rng.gen_bool(0.5) {
            NodeType::Retail
        } else {
            NodeType::Entrepreneur
        };
        plan.push(node(rng, level2_type, Some(level1_id), &products, now));
    }
    plan
}

/// Create `count` chains, optionally wiping the network first.
pub async fn seed<R: Rng>(
    service: &NetworkService,
    rng: &mut R,
    count: usize,
    clear: bool,
) -> Result<DemoSummary, ServiceError> {
    if clear {
        let revision = service.store().clear().await?;
        tracing::info!(revision, "cleared network data");
    }

    let mut summary = DemoSummary::default();
    for chain in 0..count {
        let plan = plan_chain(rng, Utc::now());
        for cmd in plan {
            service.create_node(cmd).await?;
            summary.nodes += 1;
        }
        summary.chains += 1;
        if (chain + 1) % 5 == 0 {
            tracing::info!(done = chain + 1, total = count, "demo chains created");
        }
    }
    Ok(summary)
}

fn node<R: Rng>(
    rng: &mut R,
    node_type: NodeType,
    supplier: Option<NodeId>,
    products: &[ProductSpec],
    now: DateTime<Utc>,
) -> CreateNode {
    let name = match node_type {
        NodeType::Factory => format!("Plant {}", pick(rng, COMPANIES)),
        NodeType::Retail => format!("Network {}", pick(rng, COMPANIES)),
        NodeType::Entrepreneur => format!("IE {}", pick(rng, SURNAMES)),
    };
    let supplier_debt = (!node_type.is_factory()).then(|| Decimal::new(rng.gen_range(DEBT_CENTS), 2));
    let login = name.to_lowercase().replace(' ', ".");

    CreateNode {
        node_id: NodeId::new(),
        contact_id: ContactId::new(),
        name,
        node_type,
        supplier,
        supplier_debt,
        contact: ContactDetails {
            email: format!("{login}{}@example.com", rng.gen_range(1..=999)),
            country: pick(rng, COUNTRIES).to_string(),
            city: pick(rng, CITIES).to_string(),
            street: pick(rng, STREETS).to_string(),
            building_number: rng.gen_range(1..=200).to_string(),
        },
        products: products.to_vec(),
        occurred_at: now,
    }
}

fn pick<R: Rng>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tradenet_network::NodeFilter;

    use crate::store::InMemoryNetworkStore;

    #[test]
    fn planned_chain_is_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let plan = plan_chain(&mut rng, Utc::now());
            assert!((2..=3).contains(&plan.len()));
            assert_eq!(plan[0].node_type, NodeType::Factory);
            assert!(plan[0].supplier_debt.is_none());
            assert_eq!(plan[1].supplier, Some(plan[0].node_id));
            for cmd in &plan[1..] {
                let debt = cmd.supplier_debt.unwrap();
                assert!(debt >= Decimal::from(10_000) && debt <= Decimal::from(300_000));
                assert!((2..=4).contains(&cmd.products.len()));
            }
        }
    }

    #[tokio::test]
    async fn seeding_writes_valid_chains_and_clear_resets() {
        let service = NetworkService::new(Arc::new(InMemoryNetworkStore::new()));
        let mut rng = StdRng::seed_from_u64(42);

        let summary = seed(&service, &mut rng, 4, false).await.unwrap();
        assert_eq!(summary.chains, 4);
        let nodes = service.list_nodes(&NodeFilter::default()).await.unwrap();
        assert_eq!(nodes.len(), summary.nodes);
        assert!(nodes.iter().all(|d| d.node.level <= 2));

        let summary = seed(&service, &mut rng, 1, true).await.unwrap();
        let nodes = service.list_nodes(&NodeFilter::default()).await.unwrap();
        assert_eq!(nodes.len(), summary.nodes);
    }
}
