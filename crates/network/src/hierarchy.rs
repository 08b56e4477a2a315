//! Hierarchy and catalog consistency rules.
//!
//! All checks are pure functions over a [`NetworkView`] plus the candidate
//! state of the node being written. They record problems into
//! [`FieldErrors`] instead of failing fast, so one response can report every
//! broken rule of a field group.

use std::collections::{BTreeSet, HashSet};

use tradenet_core::{DomainError, DomainResult, FieldErrors, NodeId, ProductId};

use crate::node::{MAX_LEVEL, NetworkNode, NodeType};
use crate::snapshot::NetworkView;

/// Candidate state of a node as it would be persisted.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub id: NodeId,
    pub node_type: NodeType,
    pub supplier: Option<NodeId>,
    pub products: &'a BTreeSet<ProductId>,
}

impl<'a> Candidate<'a> {
    pub fn of(node: &'a NetworkNode) -> Self {
        Self {
            id: node.id,
            node_type: node.node_type,
            supplier: node.supplier,
            products: &node.products,
        }
    }
}

/// Validate the supplier link of `candidate` and return its resulting level.
///
/// `stored` is the node as currently persisted (`None` on creation); supplier
/// *changes* are additionally gated on debt, subtree depth and the new
/// supplier's catalog.
pub fn check_supplier<V: NetworkView>(
    view: &V,
    candidate: Candidate<'_>,
    stored: Option<&NetworkNode>,
    errors: &mut FieldErrors,
) -> Option<u8> {
    let level = match (candidate.node_type.is_factory(), candidate.supplier) {
        (true, Some(_)) => {
            errors.add("supplier", "a factory cannot have a supplier");
            return None;
        }
        (false, None) => {
            errors.add("supplier", "specify a supplier");
            return None;
        }
        (true, None) => 0,
        (false, Some(supplier_id)) => {
            if supplier_id == candidate.id {
                errors.add("supplier", "a node cannot be its own supplier");
                return None;
            }
            let Some(supplier) = view.node(supplier_id) else {
                errors.add(
                    "supplier",
                    format!("invalid supplier {supplier_id}: node does not exist"),
                );
                return None;
            };
            if chain_reaches(view, supplier_id, candidate.id) {
                errors.add(
                    "supplier",
                    format!("{supplier} is downstream of this node; the supply chain cannot form a cycle"),
                );
                return None;
            }
            let level = supplier.level + 1;
            if level > MAX_LEVEL {
                errors.add(
                    "supplier",
                    format!(
                        "the network with supplier {supplier} already has 3 levels; choose another supplier"
                    ),
                );
                return None;
            }
            level
        }
    };

    let Some(stored) = stored else {
        return Some(level);
    };
    if stored.supplier == candidate.supplier {
        return Some(level);
    }

    let mut ok = true;
    if stored.has_debt() {
        errors.add(
            "supplier",
            "cannot change the supplier while there is outstanding debt to the current one",
        );
        ok = false;
    }

    let depth = subtree_depth(view, candidate.id);
    if level + depth > MAX_LEVEL {
        errors.add(
            "supplier",
            format!(
                "cannot change the supplier: this leads to exceeding the depth of the 3-level hierarchy \
                 (new level {level}, clients {depth} level(s) below)"
            ),
        );
        ok = false;
    }

    if let Some(supplier) = candidate.supplier.and_then(|id| view.node(id)) {
        let missing = missing_products(view, candidate.products, supplier);
        if !missing.is_empty() {
            errors.add(
                "supplier",
                format!(
                    "the new supplier {supplier} does not have the required products: {}",
                    missing.join(", ")
                ),
            );
            ok = false;
        }
    }

    ok.then_some(level)
}

/// A node may only carry products its supplier carries.
///
/// Skipped when the supplier itself is being changed: that case is reported
/// against `supplier` by [`check_supplier`].
pub fn check_catalog_subset<V: NetworkView>(
    view: &V,
    candidate: Candidate<'_>,
    errors: &mut FieldErrors,
) {
    let Some(supplier) = candidate.supplier.and_then(|id| view.node(id)) else {
        return;
    };
    let missing = missing_products(view, candidate.products, supplier);
    if !missing.is_empty() {
        errors.add(
            "products",
            format!(
                "the following products are missing at the supplier {supplier}: {}",
                missing.join(", ")
            ),
        );
    }
}

/// A product cannot be dropped from a node while one of its direct clients
/// still carries it.
pub fn check_product_removal<V: NetworkView>(
    view: &V,
    node_id: NodeId,
    before: &BTreeSet<ProductId>,
    after: &BTreeSet<ProductId>,
    errors: &mut FieldErrors,
) {
    let removed: BTreeSet<ProductId> = before.difference(after).copied().collect();
    if removed.is_empty() {
        return;
    }
    for client in view.clients_of(node_id) {
        let problematic: Vec<String> = client
            .products
            .intersection(&removed)
            .map(|id| product_label(view, *id))
            .collect();
        if !problematic.is_empty() {
            errors.add(
                "products",
                format!(
                    "cannot remove products: {}. They must be supplied to the client '{}'.",
                    problematic.join(", "),
                    client.name
                ),
            );
        }
    }
}

/// A node that supplies other nodes cannot be deleted.
pub fn ensure_deletable<V: NetworkView>(view: &V, id: NodeId) -> DomainResult<()> {
    let clients = view.clients_of(id);
    if clients.is_empty() {
        Ok(())
    } else {
        Err(DomainError::protected(format!(
            "cannot delete a node that is the supplier of other nodes ({} client(s))",
            clients.len()
        )))
    }
}

/// Number of levels below `id` (0 for a node without clients).
pub fn subtree_depth<V: NetworkView>(view: &V, id: NodeId) -> u8 {
    fn walk<V: NetworkView>(view: &V, id: NodeId, seen: &mut HashSet<NodeId>) -> u8 {
        if !seen.insert(id) {
            return 0;
        }
        view.clients_of(id)
            .into_iter()
            .map(|client| 1 + walk(view, client.id, seen))
            .max()
            .unwrap_or(0)
    }
    walk(view, id, &mut HashSet::new())
}

/// Every node strictly below `id`, each with the level it gets when `id`
/// sits at `level`. Parents come before their clients.
pub fn relevel_subtree<V: NetworkView>(view: &V, id: NodeId, level: u8) -> Vec<(NodeId, u8)> {
    let mut out = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut frontier = vec![(id, level)];
    while let Some((parent, parent_level)) = frontier.pop() {
        for client in view.clients_of(parent) {
            if seen.insert(client.id) {
                out.push((client.id, parent_level + 1));
                frontier.push((client.id, parent_level + 1));
            }
        }
    }
    out
}

/// Whether walking supplier links upwards from `start` reaches `target`.
fn chain_reaches<V: NetworkView>(view: &V, start: NodeId, target: NodeId) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = view.node(id).and_then(|n| n.supplier);
    }
    false
}

fn missing_products<V: NetworkView>(
    view: &V,
    products: &BTreeSet<ProductId>,
    supplier: &NetworkNode,
) -> Vec<String> {
    products
        .iter()
        .filter(|id| !supplier.carries(**id))
        .map(|id| product_label(view, *id))
        .collect()
}

fn product_label<V: NetworkView>(view: &V, id: ProductId) -> String {
    view.product(id)
        .map(|p| p.to_string())
        .unwrap_or_else(|| id.to_string())
}
