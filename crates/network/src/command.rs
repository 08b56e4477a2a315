//! Write commands and the pure decision step that turns them into change sets.
//!
//! `decide` never mutates the snapshot and performs no IO: it validates the
//! candidate state against the current network and, when every rule holds,
//! returns what the store must persist.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradenet_core::{ContactId, DomainError, DomainResult, FieldErrors, NodeId, ProductId};

use crate::contact::{Contact, ContactDetails, ContactPatch};
use crate::hierarchy::{
    Candidate, check_catalog_subset, check_product_removal, check_supplier, ensure_deletable,
    relevel_subtree,
};
use crate::node::{NetworkNode, NodeType};
use crate::product::{Product, ProductSpec};
use crate::snapshot::{ChangeSet, NetworkSnapshot, NetworkView};

/// Command: CreateNode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNode {
    pub node_id: NodeId,
    pub contact_id: ContactId,
    pub name: String,
    pub node_type: NodeType,
    pub supplier: Option<NodeId>,
    /// Opening debt; defaults to zero.
    pub supplier_debt: Option<Decimal>,
    pub contact: ContactDetails,
    pub products: Vec<ProductSpec>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateNode (partial; `None` keeps the stored value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNode {
    pub node_id: NodeId,
    pub name: Option<String>,
    pub node_type: Option<NodeType>,
    /// `Some(None)` detaches the node from its supplier.
    pub supplier: Option<Option<NodeId>>,
    /// Always rejected; debt only changes through [`ClearDebt`].
    pub supplier_debt: Option<Decimal>,
    pub contact: Option<ContactPatch>,
    /// Replaces the node's product set when present.
    pub products: Option<Vec<ProductSpec>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteNode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteNode {
    pub node_id: NodeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearDebt (admin action over a selection of nodes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearDebt {
    pub node_ids: Vec<NodeId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkCommand {
    CreateNode(CreateNode),
    UpdateNode(UpdateNode),
    DeleteNode(DeleteNode),
    ClearDebt(ClearDebt),
}

impl NetworkCommand {
    /// Stable name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkCommand::CreateNode(_) => "network.node.create",
            NetworkCommand::UpdateNode(_) => "network.node.update",
            NetworkCommand::DeleteNode(_) => "network.node.delete",
            NetworkCommand::ClearDebt(_) => "network.node.clear_debt",
        }
    }
}

/// Decide what a command writes, given the current network.
pub fn decide(snapshot: &NetworkSnapshot, command: &NetworkCommand) -> DomainResult<ChangeSet> {
    match command {
        NetworkCommand::CreateNode(cmd) => decide_create(snapshot, cmd),
        NetworkCommand::UpdateNode(cmd) => decide_update(snapshot, cmd),
        NetworkCommand::DeleteNode(cmd) => decide_delete(snapshot, cmd),
        NetworkCommand::ClearDebt(cmd) => Ok(decide_clear_debt(snapshot, cmd)),
    }
}

fn decide_create(snapshot: &NetworkSnapshot, cmd: &CreateNode) -> DomainResult<ChangeSet> {
    if snapshot.node(cmd.node_id).is_some() {
        return Err(DomainError::conflict("network node already exists"));
    }

    let mut errors = FieldErrors::new();
    let mut new_products = Vec::new();
    let products = resolve_products(
        snapshot,
        &cmd.products,
        cmd.occurred_at.date_naive(),
        &mut new_products,
        &mut errors,
    );

    let mut node = NetworkNode {
        id: cmd.node_id,
        name: cmd.name.trim().to_string(),
        node_type: cmd.node_type,
        supplier: cmd.supplier,
        supplier_debt: cmd.supplier_debt.unwrap_or(Decimal::ZERO),
        level: 0,
        created_at: cmd.occurred_at,
        contact: Contact::from_details(cmd.contact_id, cmd.contact.clone()),
        products,
    };

    node.validate_fields(&mut errors);
    let level = check_supplier(snapshot, Candidate::of(&node), None, &mut errors);
    check_catalog_subset(snapshot, Candidate::of(&node), &mut errors);
    errors.into_result()?;

    node.level = level.ok_or_else(|| DomainError::field("supplier", "invalid supplier"))?;

    Ok(ChangeSet {
        new_products,
        upserted_nodes: vec![node],
        deleted_nodes: Vec::new(),
    })
}

fn decide_update(snapshot: &NetworkSnapshot, cmd: &UpdateNode) -> DomainResult<ChangeSet> {
    let stored = snapshot
        .node(cmd.node_id)
        .ok_or(DomainError::not_found("network node"))?;

    if cmd.supplier_debt.is_some() {
        return Err(DomainError::field(
            "supplier_debt",
            "changing the debt to the supplier through the API is forbidden",
        ));
    }

    let mut node = stored.clone();
    if let Some(name) = &cmd.name {
        node.name = name.trim().to_string();
    }
    if let Some(node_type) = cmd.node_type {
        node.node_type = node_type;
    }
    if let Some(supplier) = cmd.supplier {
        node.supplier = supplier;
    }
    if let Some(patch) = &cmd.contact {
        node.contact.apply_patch(patch.clone());
    }

    let mut errors = FieldErrors::new();
    let mut new_products = Vec::new();
    if let Some(specs) = &cmd.products {
        node.products = resolve_products(
            snapshot,
            specs,
            cmd.occurred_at.date_naive(),
            &mut new_products,
            &mut errors,
        );
    }

    node.validate_fields(&mut errors);
    let level = check_supplier(snapshot, Candidate::of(&node), Some(stored), &mut errors);
    if node.supplier == stored.supplier {
        check_catalog_subset(snapshot, Candidate::of(&node), &mut errors);
    }
    if cmd.products.is_some() {
        check_product_removal(snapshot, node.id, &stored.products, &node.products, &mut errors);
    }
    errors.into_result()?;

    node.level = level.ok_or_else(|| DomainError::field("supplier", "invalid supplier"))?;

    let mut upserted_nodes = Vec::new();
    if node.level != stored.level {
        for (client_id, level) in relevel_subtree(snapshot, node.id, node.level) {
            if let Some(client) = snapshot.node(client_id) {
                let mut client = client.clone();
                client.level = level;
                upserted_nodes.push(client);
            }
        }
    }
    upserted_nodes.insert(0, node);

    Ok(ChangeSet {
        new_products,
        upserted_nodes,
        deleted_nodes: Vec::new(),
    })
}

fn decide_delete(snapshot: &NetworkSnapshot, cmd: &DeleteNode) -> DomainResult<ChangeSet> {
    if snapshot.node(cmd.node_id).is_none() {
        return Err(DomainError::not_found("network node"));
    }
    ensure_deletable(snapshot, cmd.node_id)?;

    Ok(ChangeSet {
        deleted_nodes: vec![cmd.node_id],
        ..ChangeSet::default()
    })
}

fn decide_clear_debt(snapshot: &NetworkSnapshot, cmd: &ClearDebt) -> ChangeSet {
    let ids: BTreeSet<NodeId> = cmd.node_ids.iter().copied().collect();
    let upserted_nodes = ids
        .into_iter()
        .filter_map(|id| snapshot.node(id))
        .map(|node| NetworkNode {
            supplier_debt: Decimal::ZERO,
            ..node.clone()
        })
        .collect();

    ChangeSet {
        upserted_nodes,
        ..ChangeSet::default()
    }
}

/// Get-or-create each spec against the catalog (and against products created
/// earlier in the same request).
fn resolve_products(
    snapshot: &NetworkSnapshot,
    specs: &[ProductSpec],
    today: NaiveDate,
    new_products: &mut Vec<Product>,
    errors: &mut FieldErrors,
) -> BTreeSet<ProductId> {
    let mut ids = BTreeSet::new();
    for (index, spec) in specs.iter().enumerate() {
        let mut spec_errors = FieldErrors::new();
        spec.validate(today, &format!("products[{index}]"), &mut spec_errors);
        if !spec_errors.is_empty() {
            errors.merge(spec_errors);
            continue;
        }

        let existing = snapshot
            .find_product(spec)
            .or_else(|| new_products.iter().find(|p| p.matches(spec)))
            .map(|p| p.id);
        let id = match existing {
            Some(id) => id,
            None => {
                let product = spec.clone().into_product(ProductId::new());
                let id = product.id;
                new_products.push(product);
                id
            }
        };
        ids.insert(id);
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Chain, chain, contact_details, spec};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn create(name: &str, node_type: NodeType, supplier: Option<NodeId>, products: Vec<ProductSpec>) -> CreateNode {
        CreateNode {
            node_id: NodeId::new(),
            contact_id: ContactId::new(),
            name: name.to_string(),
            node_type,
            supplier,
            supplier_debt: None,
            contact: contact_details(),
            products,
            occurred_at: now(),
        }
    }

    fn update(node_id: NodeId) -> UpdateNode {
        UpdateNode {
            node_id,
            name: None,
            node_type: None,
            supplier: None,
            supplier_debt: None,
            contact: None,
            products: None,
            occurred_at: now(),
        }
    }

    fn field_error(err: DomainError, field: &str) -> String {
        err.field_errors()
            .and_then(|e| e.get(field))
            .map(|m| m.join(" | "))
            .unwrap_or_else(|| panic!("expected field error on {field}, got {err:?}"))
    }

    fn apply(net: &mut Chain, command: NetworkCommand) -> ChangeSet {
        let changes = decide(&net.snapshot, &command).unwrap();
        net.snapshot.apply(&changes);
        changes
    }

    #[test]
    fn create_factory_with_products_creates_catalog_entries() {
        let snapshot = NetworkSnapshot::default();
        let cmd = create("Plant", NodeType::Factory, None, vec![spec("Smartphone"), spec("Laptop")]);

        let changes = decide(&snapshot, &NetworkCommand::CreateNode(cmd.clone())).unwrap();
        assert_eq!(changes.new_products.len(), 2);
        let node = changes.node(cmd.node_id).unwrap();
        assert_eq!(node.level, 0);
        assert_eq!(node.supplier_debt, Decimal::ZERO);
        assert_eq!(node.products.len(), 2);
        assert_eq!(node.contact.id, cmd.contact_id);
        assert_eq!(node.created_at, cmd.occurred_at);
    }

    #[test]
    fn create_reuses_existing_products() {
        let mut net = chain();
        let existing = net.snapshot.products().next().unwrap().clone();
        let existing_spec = ProductSpec::new(existing.name.clone(), existing.model.clone(), existing.release_date);
        let cmd = create("Plant 2", NodeType::Factory, None, vec![existing_spec.clone(), existing_spec]);

        let changes = apply(&mut net, NetworkCommand::CreateNode(cmd.clone()));
        assert!(changes.new_products.is_empty());
        assert_eq!(changes.node(cmd.node_id).unwrap().products, BTreeSet::from([existing.id]));
    }

    #[test]
    fn create_under_level_two_supplier_fails() {
        let net = chain();
        let cmd = create("Retail", NodeType::Retail, Some(net.entrepreneur.id), vec![]);
        let err = decide(&net.snapshot, &NetworkCommand::CreateNode(cmd)).unwrap_err();
        assert!(field_error(err, "supplier").contains("already has 3 levels"));
    }

    #[test]
    fn create_with_unknown_supplier_fails_on_supplier_field() {
        let net = chain();
        let cmd = create("Retail", NodeType::Retail, Some(NodeId::new()), vec![]);
        let err = decide(&net.snapshot, &NetworkCommand::CreateNode(cmd)).unwrap_err();
        assert!(field_error(err, "supplier").contains("does not exist"));
    }

    #[test]
    fn create_reseller_with_product_unknown_to_supplier_fails() {
        let net = chain();
        let cmd = create("Retail 2", NodeType::Retail, Some(net.factory.id), vec![spec("Hoover")]);
        let err = decide(&net.snapshot, &NetworkCommand::CreateNode(cmd)).unwrap_err();
        assert!(field_error(err, "products").contains("missing at the supplier"));
    }

    #[test]
    fn create_with_future_product_fails() {
        let snapshot = NetworkSnapshot::default();
        let mut future = spec("Tablet");
        future.release_date = now().date_naive().succ_opt().unwrap();
        let cmd = create("Plant", NodeType::Factory, None, vec![future]);

        let err = decide(&snapshot, &NetworkCommand::CreateNode(cmd)).unwrap_err();
        assert!(err.field_errors().unwrap().contains("products[0].release_date"));
    }

    #[test]
    fn create_duplicate_id_conflicts() {
        let net = chain();
        let mut cmd = create("Plant", NodeType::Factory, None, vec![]);
        cmd.node_id = net.factory.id;
        assert!(matches!(
            decide(&net.snapshot, &NetworkCommand::CreateNode(cmd)),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn update_rejects_debt_changes() {
        let net = chain();
        let mut cmd = update(net.retail.id);
        cmd.supplier_debt = Some(Decimal::ZERO);
        let err = decide(&net.snapshot, &NetworkCommand::UpdateNode(cmd)).unwrap_err();
        assert!(field_error(err, "supplier_debt").contains("forbidden"));
    }

    #[test]
    fn update_unknown_node_is_not_found() {
        let net = chain();
        let err = decide(&net.snapshot, &NetworkCommand::UpdateNode(update(NodeId::new()))).unwrap_err();
        assert_eq!(err, DomainError::NotFound("network node"));
    }

    #[test]
    fn update_name_and_contact_keeps_identity() {
        let mut net = chain();
        let mut cmd = update(net.factory.id);
        cmd.name = Some("New plant".to_string());
        cmd.contact = Some(ContactPatch {
            email: Some("new@mail.com".to_string()),
            ..ContactPatch::default()
        });

        let changes = apply(&mut net, NetworkCommand::UpdateNode(cmd));
        let node = changes.node(net.factory.id).unwrap();
        assert_eq!(node.name, "New plant");
        assert_eq!(node.contact.id, net.factory.contact.id);
        assert_eq!(node.contact.email, "new@mail.com");
        assert_eq!(node.created_at, net.factory.created_at);
    }

    #[test]
    fn update_adds_new_products_to_factory() {
        let mut net = chain();
        let current: Vec<ProductSpec> = net
            .factory
            .products
            .iter()
            .map(|id| {
                let p = net.snapshot.product(*id).unwrap();
                ProductSpec::new(p.name.clone(), p.model.clone(), p.release_date)
            })
            .collect();
        let mut specs = current.clone();
        specs.push(spec("Coffee machine"));

        let mut cmd = update(net.factory.id);
        cmd.products = Some(specs);
        let changes = apply(&mut net, NetworkCommand::UpdateNode(cmd));

        assert_eq!(changes.new_products.len(), 1);
        assert_eq!(changes.node(net.factory.id).unwrap().products.len(), current.len() + 1);
    }

    #[test]
    fn update_cannot_drop_product_carried_downstream() {
        let net = chain();
        let mut cmd = update(net.factory.id);
        cmd.products = Some(vec![]);

        let err = decide(&net.snapshot, &NetworkCommand::UpdateNode(cmd)).unwrap_err();
        let message = field_error(err, "products");
        assert!(message.contains("cannot remove products"));
        assert!(message.contains(&net.retail.name));
    }

    #[test]
    fn update_reseller_with_foreign_product_fails() {
        let net = chain();
        let mut cmd = update(net.retail.id);
        cmd.products = Some(vec![spec("new_product")]);
        let err = decide(&net.snapshot, &NetworkCommand::UpdateNode(cmd)).unwrap_err();
        assert!(field_error(err, "products").contains("missing at the supplier"));
    }

    #[test]
    fn supplier_change_relevels_the_subtree() {
        let mut net = chain();
        // Second chain: factory2 -> retail2 -> client2, debts cleared.
        let factory2 = create("Plant 2", NodeType::Factory, None, vec![]);
        apply(&mut net, NetworkCommand::CreateNode(factory2.clone()));
        let retail2 = create("Retail 2", NodeType::Retail, Some(factory2.node_id), vec![]);
        apply(&mut net, NetworkCommand::CreateNode(retail2.clone()));
        let client2 = create("Client 2", NodeType::Entrepreneur, Some(retail2.node_id), vec![]);
        apply(&mut net, NetworkCommand::CreateNode(client2.clone()));

        // Move retail2 (zero debt, no products) under the first factory.
        let mut cmd = update(retail2.node_id);
        cmd.supplier = Some(Some(net.factory.id));
        let changes = apply(&mut net, NetworkCommand::UpdateNode(cmd));
        assert_eq!(changes.node(retail2.node_id).unwrap().level, 1);
        assert!(changes.node(client2.node_id).is_none(), "levels unchanged, no relevel");

        // Turn retail2 into a factory: it and its client move up one level.
        let mut cmd = update(retail2.node_id);
        cmd.node_type = Some(NodeType::Factory);
        cmd.supplier = Some(None);
        let changes = apply(&mut net, NetworkCommand::UpdateNode(cmd));
        assert_eq!(changes.node(retail2.node_id).unwrap().level, 0);
        assert_eq!(changes.node(client2.node_id).unwrap().level, 1);
        assert_eq!(net.snapshot.node(client2.node_id).unwrap().level, 1);
    }

    #[test]
    fn delete_is_blocked_for_suppliers() {
        let net = chain();
        let cmd = DeleteNode { node_id: net.factory.id, occurred_at: now() };
        assert!(matches!(
            decide(&net.snapshot, &NetworkCommand::DeleteNode(cmd)),
            Err(DomainError::Protected(_))
        ));
    }

    #[test]
    fn delete_leaf_removes_node() {
        let mut net = chain();
        let cmd = DeleteNode { node_id: net.entrepreneur.id, occurred_at: now() };
        apply(&mut net, NetworkCommand::DeleteNode(cmd));
        assert!(net.snapshot.node(net.entrepreneur.id).is_none());
        assert_eq!(net.snapshot.node_count(), 2);
    }

    #[test]
    fn clear_debt_zeroes_selected_nodes_only() {
        let mut net = chain();
        let cmd = ClearDebt {
            node_ids: vec![net.retail.id, net.retail.id, NodeId::new()],
            occurred_at: now(),
        };
        let changes = apply(&mut net, NetworkCommand::ClearDebt(cmd));
        assert_eq!(changes.upserted_nodes.len(), 1);
        assert!(!net.snapshot.node(net.retail.id).unwrap().has_debt());
        assert!(net.snapshot.node(net.entrepreneur.id).unwrap().has_debt());
    }

    #[test]
    fn failed_decision_does_not_touch_snapshot() {
        let net = chain();
        let before = net.snapshot.clone();
        let mut cmd = update(net.factory.id);
        cmd.products = Some(vec![]);
        assert!(decide(&net.snapshot, &NetworkCommand::UpdateNode(cmd)).is_err());
        assert_eq!(net.snapshot, before);
    }

    mod proptest_tests {
        use super::*;
        use crate::node::MAX_LEVEL;
        use proptest::prelude::*;

        const CATALOG: [&str; 4] = ["Smartphone", "Laptop", "Tablet", "Router"];

        #[derive(Debug, Clone)]
        enum Op {
            Create { kind: u8, supplier: Option<usize>, mask: u8 },
            Move { node: usize, supplier: usize },
            Promote { node: usize },
            SetProducts { node: usize, mask: u8 },
            Delete { node: usize },
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..3, proptest::option::of(0usize..16), 0u8..16)
                    .prop_map(|(kind, supplier, mask)| Op::Create { kind, supplier, mask }),
                (0usize..16, 0usize..16).prop_map(|(node, supplier)| Op::Move { node, supplier }),
                (0usize..16).prop_map(|node| Op::Promote { node }),
                (0usize..16, 0u8..16).prop_map(|(node, mask)| Op::SetProducts { node, mask }),
                (0usize..16).prop_map(|node| Op::Delete { node }),
            ]
        }

        fn specs(mask: u8) -> Vec<ProductSpec> {
            CATALOG
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| spec(name))
                .collect()
        }

        fn pick(snapshot: &NetworkSnapshot, index: usize) -> Option<NodeId> {
            let ids: Vec<NodeId> = snapshot.nodes().map(|n| n.id).collect();
            (!ids.is_empty()).then(|| ids[index % ids.len()])
        }

        fn to_command(snapshot: &NetworkSnapshot, op: &Op) -> Option<NetworkCommand> {
            let command = match op {
                Op::Create { kind, supplier, mask } => NetworkCommand::CreateNode(create(
                    "node",
                    NodeType::ALL[*kind as usize],
                    supplier.and_then(|i| pick(snapshot, i)),
                    specs(*mask),
                )),
                Op::Move { node, supplier } => {
                    let mut cmd = update(pick(snapshot, *node)?);
                    cmd.supplier = Some(pick(snapshot, *supplier));
                    NetworkCommand::UpdateNode(cmd)
                }
                Op::Promote { node } => {
                    let mut cmd = update(pick(snapshot, *node)?);
                    cmd.node_type = Some(NodeType::Factory);
                    cmd.supplier = Some(None);
                    NetworkCommand::UpdateNode(cmd)
                }
                Op::SetProducts { node, mask } => {
                    let mut cmd = update(pick(snapshot, *node)?);
                    cmd.products = Some(specs(*mask));
                    NetworkCommand::UpdateNode(cmd)
                }
                Op::Delete { node } => NetworkCommand::DeleteNode(DeleteNode {
                    node_id: pick(snapshot, *node)?,
                    occurred_at: now(),
                }),
            };
            Some(command)
        }

        fn assert_consistent(snapshot: &NetworkSnapshot) {
            for node in snapshot.nodes() {
                match node.supplier {
                    None => {
                        assert!(node.node_type.is_factory());
                        assert_eq!(node.level, 0);
                    }
                    Some(supplier_id) => {
                        assert!(!node.node_type.is_factory());
                        let supplier = snapshot.node(supplier_id).expect("dangling supplier");
                        assert_eq!(node.level, supplier.level + 1);
                        assert!(node.level <= MAX_LEVEL);
                        assert!(node.products.is_subset(&supplier.products));
                    }
                }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: accepted commands never break the hierarchy.
            #[test]
            fn accepted_commands_keep_network_consistent(ops in proptest::collection::vec(op(), 1..40)) {
                let mut snapshot = NetworkSnapshot::default();
                for op in &ops {
                    let Some(command) = to_command(&snapshot, op) else { continue };
                    if let Ok(changes) = decide(&snapshot, &command) {
                        snapshot.apply(&changes);
                    }
                    assert_consistent(&snapshot);
                }
            }

            /// Property: decide is deterministic for a fixed snapshot.
            #[test]
            fn decide_is_deterministic(ops in proptest::collection::vec(op(), 1..10)) {
                let net = chain();
                for op in &ops {
                    let Some(command) = to_command(&net.snapshot, op) else { continue };
                    let first = decide(&net.snapshot, &command);
                    let second = decide(&net.snapshot, &command);
                    match (first, second) {
                        (Ok(a), Ok(b)) => {
                            // Fresh catalog entries get fresh ids; compare the shape.
                            let shape = |c: &ChangeSet| -> Vec<(NodeId, Option<NodeId>, u8)> {
                                c.upserted_nodes.iter().map(|n| (n.id, n.supplier, n.level)).collect()
                            };
                            prop_assert_eq!(shape(&a), shape(&b));
                            prop_assert_eq!(a.deleted_nodes, b.deleted_nodes);
                            prop_assert_eq!(a.new_products.len(), b.new_products.len());
                        }
                        (Err(a), Err(b)) => prop_assert_eq!(a, b),
                        _ => prop_assert!(false, "outcome changed between calls"),
                    }
                }
            }
        }
    }
}
