//! Read-side helpers over a snapshot.

use tradenet_core::NodeId;

use crate::contact::Contact;
use crate::node::NetworkNode;
use crate::product::Product;
use crate::snapshot::{NetworkSnapshot, NetworkView};

/// Listing filter. A blank country means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub country: Option<String>,
}

impl NodeFilter {
    pub fn by_country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
        }
    }

    pub fn matches(&self, node: &NetworkNode) -> bool {
        match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => node.contact.is_in_country(country),
            _ => true,
        }
    }
}

/// A node together with what its read representation needs from the rest of
/// the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub node: NetworkNode,
    /// Display string of the supplier (`"Factory: Plant 1"`).
    pub supplier: Option<String>,
    /// Carried products, ordered by name then model.
    pub products: Vec<Product>,
}

pub fn node_details<V: NetworkView>(view: &V, node: &NetworkNode) -> NodeDetails {
    let supplier = node
        .supplier
        .and_then(|id| view.node(id))
        .map(ToString::to_string);
    let mut products: Vec<Product> = node
        .products
        .iter()
        .filter_map(|id| view.product(*id).cloned())
        .collect();
    sort_products(&mut products);

    NodeDetails {
        node: node.clone(),
        supplier,
        products,
    }
}

/// Nodes matching `filter`, oldest first.
pub fn list_nodes(snapshot: &NetworkSnapshot, filter: &NodeFilter) -> Vec<NodeDetails> {
    let mut nodes: Vec<&NetworkNode> = snapshot.nodes().filter(|n| filter.matches(n)).collect();
    nodes.sort_by_key(|n| (n.created_at, n.id));
    nodes.into_iter().map(|n| node_details(snapshot, n)).collect()
}

pub fn get_node(snapshot: &NetworkSnapshot, id: NodeId) -> Option<NodeDetails> {
    snapshot.node(id).map(|n| node_details(snapshot, n))
}

/// The product catalog, ordered by name then model.
pub fn list_products(snapshot: &NetworkSnapshot) -> Vec<Product> {
    let mut products: Vec<Product> = snapshot.products().cloned().collect();
    sort_products(&mut products);
    products
}

/// Every contact with the node it belongs to, in node listing order.
pub fn list_contacts(snapshot: &NetworkSnapshot, filter: &NodeFilter) -> Vec<(NodeId, Contact)> {
    let mut nodes: Vec<&NetworkNode> = snapshot.nodes().filter(|n| filter.matches(n)).collect();
    nodes.sort_by_key(|n| (n.created_at, n.id));
    nodes.into_iter().map(|n| (n.id, n.contact.clone())).collect()
}

fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| {
        (a.name.as_str(), a.model.as_str(), a.release_date, a.id)
            .cmp(&(b.name.as_str(), b.model.as_str(), b.release_date, b.id))
    });
}
