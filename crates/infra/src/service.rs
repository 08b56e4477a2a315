//! Application service for the trade network.
//!
//! Every write runs the same pipeline:
//!
//! ```text
//! 1. Load a snapshot (whole network + revision)
//! 2. decide(snapshot, command) -> ChangeSet   (pure, no IO)
//! 3. Commit the change set with ExpectedVersion::Exact(revision)
//! ```
//!
//! A commit that loses a race is retried from step 1 a bounded number of
//! times; the final conflict is surfaced to the caller.

use std::sync::Arc;

use thiserror::Error;

use tradenet_core::{DomainError, ExpectedVersion, NodeId};
use tradenet_network::{
    ChangeSet, ClearDebt, Contact, CreateNode, DeleteNode, NetworkCommand, NetworkSnapshot, NodeDetails,
    NodeFilter, Product, UpdateNode, decide, query,
};

use crate::store::{NetworkStore, StoreError};

const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct NetworkService {
    store: Arc<dyn NetworkStore>,
}

impl NetworkService {
    pub fn new(store: Arc<dyn NetworkStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn NetworkStore> {
        &self.store
    }

    pub async fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeDetails>, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        Ok(query::list_nodes(&snapshot, filter))
    }

    pub async fn get_node(&self, id: NodeId) -> Result<NodeDetails, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        query::get_node(&snapshot, id).ok_or_else(|| DomainError::not_found("network node").into())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        Ok(query::list_products(&snapshot))
    }

    pub async fn list_contacts(&self, filter: &NodeFilter) -> Result<Vec<(NodeId, Contact)>, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        Ok(query::list_contacts(&snapshot, filter))
    }

    pub async fn create_node(&self, cmd: CreateNode) -> Result<NodeDetails, ServiceError> {
        let id = cmd.node_id;
        let snapshot = self.execute(NetworkCommand::CreateNode(cmd)).await?.0;
        query::get_node(&snapshot, id).ok_or_else(|| DomainError::not_found("network node").into())
    }

    pub async fn update_node(&self, cmd: UpdateNode) -> Result<NodeDetails, ServiceError> {
        let id = cmd.node_id;
        let snapshot = self.execute(NetworkCommand::UpdateNode(cmd)).await?.0;
        query::get_node(&snapshot, id).ok_or_else(|| DomainError::not_found("network node").into())
    }

    pub async fn delete_node(&self, cmd: DeleteNode) -> Result<(), ServiceError> {
        self.execute(NetworkCommand::DeleteNode(cmd)).await?;
        Ok(())
    }

    /// Zero the debt of the listed nodes; returns how many nodes matched.
    pub async fn clear_debt(&self, cmd: ClearDebt) -> Result<usize, ServiceError> {
        let (_, changes) = self.execute(NetworkCommand::ClearDebt(cmd)).await?;
        Ok(changes.upserted_nodes.len())
    }

    /// Run a command; returns the snapshot as of the commit plus what was
    /// written.
    async fn execute(&self, command: NetworkCommand) -> Result<(NetworkSnapshot, ChangeSet), ServiceError> {
        let kind = command.kind();
        let mut attempt = 1;
        loop {
            let mut snapshot = self.store.snapshot().await?;
            let changes = match decide(&snapshot, &command) {
                Ok(changes) => changes,
                Err(err) => {
                    tracing::info!(command = kind, error = %err, "command rejected");
                    return Err(err.into());
                }
            };
            if changes.is_empty() {
                return Ok((snapshot, changes));
            }

            let expected = ExpectedVersion::Exact(snapshot.revision());
            match self.store.commit(expected, changes.clone()).await {
                Ok(revision) => {
                    snapshot.apply(&changes);
                    tracing::info!(
                        command = kind,
                        revision,
                        upserted = changes.upserted_nodes.len(),
                        deleted = changes.deleted_nodes.len(),
                        new_products = changes.new_products.len(),
                        "command committed"
                    );
                    return Ok((snapshot, changes));
                }
                Err(StoreError::Conflict(msg)) if attempt < MAX_ATTEMPTS => {
                    tracing::debug!(command = kind, attempt, %msg, "revision moved; retrying");
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(command = kind, error = %err, "commit failed");
                    return Err(err.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use tradenet_core::ContactId;
    use tradenet_network::{ContactDetails, NodeType, ProductSpec};

    use crate::store::InMemoryNetworkStore;

    fn service() -> NetworkService {
        NetworkService::new(Arc::new(InMemoryNetworkStore::new()))
    }

    fn contact(country: &str) -> ContactDetails {
        ContactDetails {
            email: "node@mail.com".to_string(),
            country: country.to_string(),
            city: "City".to_string(),
            street: "Main".to_string(),
            building_number: "1".to_string(),
        }
    }

    fn create(name: &str, node_type: NodeType, supplier: Option<NodeId>, country: &str) -> CreateNode {
        CreateNode {
            node_id: NodeId::new(),
            contact_id: ContactId::new(),
            name: name.to_string(),
            node_type,
            supplier,
            supplier_debt: supplier.map(|_| Decimal::from(5_000)),
            contact: contact(country),
            products: vec![ProductSpec::new(
                "Smartphone",
                "X1",
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            )],
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_list_and_delete() {
        let svc = service();
        let factory = svc.create_node(create("Plant", NodeType::Factory, None, "Russia")).await.unwrap();
        let retail = svc
            .create_node(create("Shop", NodeType::Retail, Some(factory.node.id), "Germany"))
            .await
            .unwrap();
        assert_eq!(retail.node.level, 1);
        assert_eq!(retail.supplier.as_deref(), Some("Factory: Plant"));
        assert_eq!(svc.list_products().await.unwrap().len(), 1);

        let germans = svc.list_nodes(&NodeFilter::by_country("GERMANY")).await.unwrap();
        assert_eq!(germans.len(), 1);

        let err = svc
            .delete_node(DeleteNode { node_id: factory.node.id, occurred_at: Utc::now() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Protected(_))));

        svc.delete_node(DeleteNode { node_id: retail.node.id, occurred_at: Utc::now() })
            .await
            .unwrap();
        assert_eq!(svc.list_nodes(&NodeFilter::default()).await.unwrap().len(), 1);
        assert_eq!(svc.list_contacts(&NodeFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_debt_reports_matches() {
        let svc = service();
        let factory = svc.create_node(create("Plant", NodeType::Factory, None, "Russia")).await.unwrap();
        let retail = svc
            .create_node(create("Shop", NodeType::Retail, Some(factory.node.id), "Russia"))
            .await
            .unwrap();
        assert!(retail.node.has_debt());

        let cleared = svc
            .clear_debt(ClearDebt { node_ids: vec![retail.node.id, NodeId::new()], occurred_at: Utc::now() })
            .await
            .unwrap();
        assert_eq!(cleared, 1);
        assert!(!svc.get_node(retail.node.id).await.unwrap().node.has_debt());

        let none = svc
            .clear_debt(ClearDebt { node_ids: vec![NodeId::new()], occurred_at: Utc::now() })
            .await
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn missing_node_is_not_found() {
        let err = service().get_node(NodeId::new()).await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::NotFound("network node")));
    }

    /// Store whose first `conflicts` commits fail as if another writer won.
    struct RacingStore {
        inner: InMemoryNetworkStore,
        conflicts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl NetworkStore for RacingStore {
        async fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
            self.inner.snapshot().await
        }

        async fn commit(&self, expected: ExpectedVersion, changes: ChangeSet) -> Result<u64, StoreError> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::Conflict("lost the race".to_string()));
            }
            self.inner.commit(expected, changes).await
        }

        async fn clear(&self) -> Result<u64, StoreError> {
            self.inner.clear().await
        }
    }

    fn racing(conflicts: usize) -> NetworkService {
        NetworkService::new(Arc::new(RacingStore {
            inner: InMemoryNetworkStore::new(),
            conflicts: AtomicUsize::new(conflicts),
        }))
    }

    #[tokio::test]
    async fn transient_conflicts_are_retried() {
        let svc = racing(MAX_ATTEMPTS - 1);
        assert!(svc.create_node(create("Plant", NodeType::Factory, None, "Russia")).await.is_ok());
    }

    #[tokio::test]
    async fn persistent_conflict_is_surfaced() {
        let svc = racing(MAX_ATTEMPTS);
        let err = svc
            .create_node(create("Plant", NodeType::Factory, None, "Russia"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Conflict(_))));
    }
}
