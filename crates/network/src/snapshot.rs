//! Point-in-time view of the whole trade network, and the change sets that
//! move it forward.

use std::collections::BTreeMap;

use tradenet_core::{NodeId, ProductId};

use crate::node::NetworkNode;
use crate::product::{Product, ProductSpec};

/// Read access to the network graph, as needed by the hierarchy rules.
pub trait NetworkView {
    fn node(&self, id: NodeId) -> Option<&NetworkNode>;

    /// Nodes whose supplier is `id`.
    fn clients_of(&self, id: NodeId) -> Vec<&NetworkNode>;

    fn product(&self, id: ProductId) -> Option<&Product>;
}

/// The whole network as loaded from a store, tagged with the store revision
/// it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSnapshot {
    revision: u64,
    nodes: BTreeMap<NodeId, NetworkNode>,
    products: BTreeMap<ProductId, Product>,
}

impl NetworkSnapshot {
    pub fn new(revision: u64) -> Self {
        Self {
            revision,
            ..Self::default()
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn insert_node(&mut self, node: NetworkNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.values()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Existing catalog entry with the same name, model and release date.
    pub fn find_product(&self, spec: &ProductSpec) -> Option<&Product> {
        self.products.values().find(|p| p.matches(spec))
    }

    /// Apply a committed change set and advance the revision.
    pub fn apply(&mut self, changes: &ChangeSet) {
        for product in &changes.new_products {
            self.insert_product(product.clone());
        }
        for id in &changes.deleted_nodes {
            self.nodes.remove(id);
        }
        for node in &changes.upserted_nodes {
            self.insert_node(node.clone());
        }
        self.revision += 1;
    }

    /// Drop everything (demo data reset); the revision still advances.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.products.clear();
        self.revision += 1;
    }
}

impl NetworkView for NetworkSnapshot {
    fn node(&self, id: NodeId) -> Option<&NetworkNode> {
        self.nodes.get(&id)
    }

    fn clients_of(&self, id: NodeId) -> Vec<&NetworkNode> {
        self.nodes
            .values()
            .filter(|n| n.supplier == Some(id))
            .collect()
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }
}

/// Everything a single write decided to persist.
///
/// Stores apply a change set atomically: products first, then deletions,
/// then node upserts (a node's contact and product links travel with it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub new_products: Vec<Product>,
    pub upserted_nodes: Vec<NetworkNode>,
    pub deleted_nodes: Vec<NodeId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.new_products.is_empty() && self.upserted_nodes.is_empty() && self.deleted_nodes.is_empty()
    }

    /// The upserted record for `id`, if this change set writes it.
    pub fn node(&self, id: NodeId) -> Option<&NetworkNode> {
        self.upserted_nodes.iter().find(|n| n.id == id)
    }
}
