//! Shared fixtures for unit tests.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use tradenet_core::{ContactId, NodeId, ProductId};

use crate::contact::{Contact, ContactDetails};
use crate::node::{NetworkNode, NodeType};
use crate::product::{Product, ProductSpec};
use crate::snapshot::NetworkSnapshot;

/// factory -> retail -> entrepreneur, all stored in `snapshot`.
///
/// The factory sells three products, the retail network two of them and the
/// entrepreneur one; so the retail network carries one product its client
/// does not.
pub struct Chain {
    pub snapshot: NetworkSnapshot,
    pub factory: NetworkNode,
    pub retail: NetworkNode,
    pub entrepreneur: NetworkNode,
}

pub fn release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default()
}

pub fn spec(name: &str) -> ProductSpec {
    ProductSpec::new(name, "Model X", release_date())
}

pub fn product(name: &str) -> Product {
    spec(name).into_product(ProductId::new())
}

pub fn contact_details() -> ContactDetails {
    ContactDetails {
        email: "test@mail.com".to_string(),
        country: "Russia".to_string(),
        city: "Moscow".to_string(),
        street: "Test".to_string(),
        building_number: "1".to_string(),
    }
}

pub fn node_under(node_type: NodeType, supplier: Option<NodeId>, level: u8) -> NetworkNode {
    NetworkNode {
        id: NodeId::new(),
        name: format!("{} {}", node_type.display_name(), level),
        node_type,
        supplier,
        supplier_debt: Decimal::ZERO,
        level,
        created_at: Utc::now(),
        contact: Contact::from_details(ContactId::new(), contact_details()),
        products: BTreeSet::new(),
    }
}

pub fn chain() -> Chain {
    let mut snapshot = NetworkSnapshot::default();
    let catalog: Vec<Product> = ["Smartphone", "Laptop", "Tablet"].into_iter().map(product).collect();
    for p in &catalog {
        snapshot.insert_product(p.clone());
    }

    let started = Utc::now();

    let mut factory = node_under(NodeType::Factory, None, 0);
    factory.name = "Plant 1".to_string();
    factory.created_at = started;
    factory.products = catalog.iter().map(|p| p.id).collect();

    let mut retail = node_under(NodeType::Retail, Some(factory.id), 1);
    retail.name = "Electronics store".to_string();
    retail.created_at = started + Duration::seconds(1);
    retail.supplier_debt = Decimal::from(100_000);
    retail.products = catalog[..2].iter().map(|p| p.id).collect();

    let mut entrepreneur = node_under(NodeType::Entrepreneur, Some(retail.id), 2);
    entrepreneur.name = "Ivanov".to_string();
    entrepreneur.created_at = started + Duration::seconds(2);
    entrepreneur.supplier_debt = Decimal::from(10_000);
    entrepreneur.products = BTreeSet::from([catalog[0].id]);

    snapshot.insert_node(factory.clone());
    snapshot.insert_node(retail.clone());
    snapshot.insert_node(entrepreneur.clone());

    Chain {
        snapshot,
        factory,
        retail,
        entrepreneur,
    }
}
