//! Postgres-backed network store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Integrity` |
//! | Database (check constraint violation) | `23514` | `Integrity` |
//! | Database (serialization failure) | `40001` | `Conflict` |
//! | anything else | | `Backend` |
//!
//! ## Optimistic Concurrency
//!
//! A single-row `network_revision` table is locked (`FOR UPDATE`) at the
//! start of every commit, compared with the expected revision and bumped in
//! the same transaction. Commits are therefore serialized, and a writer that
//! decided against a stale snapshot gets `Conflict`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use tradenet_core::{ContactId, ExpectedVersion, NodeId, ProductId};
use tradenet_network::{ChangeSet, Contact, NetworkNode, NetworkSnapshot, NodeType, Product};

use super::{NetworkStore, StoreError};

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Clone)]
pub struct PostgresNetworkStore {
    pool: Arc<PgPool>,
}

impl PostgresNetworkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Create tables and seed the revision row if missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn lock_revision(tx: &mut Transaction<'_, Postgres>) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT revision FROM network_revision WHERE id = TRUE FOR UPDATE")
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_revision", e))?;
        let revision: i64 = row.try_get("revision").map_err(decode_error)?;
        Ok(revision as u64)
    }

    async fn bump_revision(tx: &mut Transaction<'_, Postgres>) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "UPDATE network_revision SET revision = revision + 1 WHERE id = TRUE RETURNING revision",
        )
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("bump_revision", e))?;
        let revision: i64 = row.try_get("revision").map_err(decode_error)?;
        Ok(revision as u64)
    }

    async fn upsert_node(tx: &mut Transaction<'_, Postgres>, node: &NetworkNode) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO network_nodes (id, name, node_type, supplier_id, supplier_debt, level, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                node_type = EXCLUDED.node_type,
                supplier_id = EXCLUDED.supplier_id,
                supplier_debt = EXCLUDED.supplier_debt,
                level = EXCLUDED.level
            "#,
        )
        .bind(node.id.as_uuid())
        .bind(&node.name)
        .bind(node.node_type.as_str())
        .bind(node.supplier.map(Uuid::from))
        .bind(node.supplier_debt)
        .bind(i16::from(node.level))
        .bind(node.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_node", e))?;

        let contact = &node.contact;
        sqlx::query(
            r#"
            INSERT INTO contacts (id, node_id, email, country, city, street, building_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                country = EXCLUDED.country,
                city = EXCLUDED.city,
                street = EXCLUDED.street,
                building_number = EXCLUDED.building_number
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(node.id.as_uuid())
        .bind(&contact.email)
        .bind(&contact.country)
        .bind(&contact.city)
        .bind(&contact.street)
        .bind(&contact.building_number)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_contact", e))?;

        sqlx::query("DELETE FROM node_products WHERE node_id = $1")
            .bind(node.id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("unlink_products", e))?;

        let product_ids: Vec<Uuid> = node.products.iter().map(|id| Uuid::from(*id)).collect();
        if !product_ids.is_empty() {
            sqlx::query(
                "INSERT INTO node_products (node_id, product_id) SELECT $1, UNNEST($2::uuid[])",
            )
            .bind(node.id.as_uuid())
            .bind(&product_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("link_products", e))?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl NetworkStore for PostgresNetworkStore {
    #[instrument(skip(self), err)]
    async fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // One consistent view across the four reads below.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let row = sqlx::query("SELECT revision FROM network_revision WHERE id = TRUE")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_revision", e))?;
        let revision: i64 = row.try_get("revision").map_err(decode_error)?;
        let mut snapshot = NetworkSnapshot::new(revision as u64);

        let rows = sqlx::query("SELECT id, name, model, release_date FROM products")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_products", e))?;
        for row in rows {
            snapshot.insert_product(product_from_row(&row)?);
        }

        let rows = sqlx::query("SELECT node_id, product_id FROM node_products")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("load_node_products", e))?;
        let mut links: BTreeMap<NodeId, BTreeSet<ProductId>> = BTreeMap::new();
        for row in rows {
            let node_id: Uuid = row.try_get("node_id").map_err(decode_error)?;
            let product_id: Uuid = row.try_get("product_id").map_err(decode_error)?;
            links
                .entry(NodeId::from_uuid(node_id))
                .or_default()
                .insert(ProductId::from_uuid(product_id));
        }

        let rows = sqlx::query(
            r#"
            SELECT
                n.id, n.name, n.node_type, n.supplier_id, n.supplier_debt, n.level, n.created_at,
                c.id AS contact_id, c.email, c.country, c.city, c.street, c.building_number
            FROM network_nodes n
            JOIN contacts c ON c.node_id = n.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("load_nodes", e))?;
        for row in rows {
            let mut node = node_from_row(&row)?;
            node.products = links.remove(&node.id).unwrap_or_default();
            snapshot.insert_node(node);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(revision = snapshot.revision(), nodes = snapshot.node_count(), "loaded network snapshot");
        Ok(snapshot)
    }

    #[instrument(
        skip(self, changes),
        fields(
            new_products = changes.new_products.len(),
            upserted = changes.upserted_nodes.len(),
            deleted = changes.deleted_nodes.len()
        ),
        err
    )]
    async fn commit(&self, expected: ExpectedVersion, changes: ChangeSet) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = Self::lock_revision(&mut tx).await?;
        if !expected.matches(current) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Conflict(format!(
                "optimistic concurrency check failed: expected {expected:?}, found {current}"
            )));
        }

        for product in &changes.new_products {
            sqlx::query("INSERT INTO products (id, name, model, release_date) VALUES ($1, $2, $3, $4)")
                .bind(product.id.as_uuid())
                .bind(&product.name)
                .bind(&product.model)
                .bind(product.release_date)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_product", e))?;
        }

        for id in &changes.deleted_nodes {
            sqlx::query("DELETE FROM network_nodes WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_node", e))?;
        }

        for node in &changes.upserted_nodes {
            Self::upsert_node(&mut tx, node).await?;
        }

        let revision = Self::bump_revision(&mut tx).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(revision)
    }

    #[instrument(skip(self), err)]
    async fn clear(&self) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        Self::lock_revision(&mut tx).await?;
        sqlx::query("TRUNCATE node_products, contacts, network_nodes, products")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("truncate", e))?;
        let revision = Self::bump_revision(&mut tx).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(revision)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let id: Uuid = row.try_get("id").map_err(decode_error)?;
    let release_date: NaiveDate = row.try_get("release_date").map_err(decode_error)?;
    Ok(Product {
        id: ProductId::from_uuid(id),
        name: row.try_get("name").map_err(decode_error)?,
        model: row.try_get("model").map_err(decode_error)?,
        release_date,
    })
}

fn node_from_row(row: &PgRow) -> Result<NetworkNode, StoreError> {
    let id: Uuid = row.try_get("id").map_err(decode_error)?;
    let node_type: String = row.try_get("node_type").map_err(decode_error)?;
    let node_type: NodeType = node_type
        .parse()
        .map_err(|e| StoreError::Backend(format!("bad node_type in row {id}: {e}")))?;
    let supplier: Option<Uuid> = row.try_get("supplier_id").map_err(decode_error)?;
    let supplier_debt: Decimal = row.try_get("supplier_debt").map_err(decode_error)?;
    let level: i16 = row.try_get("level").map_err(decode_error)?;
    let level = u8::try_from(level)
        .map_err(|_| StoreError::Backend(format!("bad level {level} in row {id}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_error)?;
    let contact_id: Uuid = row.try_get("contact_id").map_err(decode_error)?;

    Ok(NetworkNode {
        id: NodeId::from_uuid(id),
        name: row.try_get("name").map_err(decode_error)?,
        node_type,
        supplier: supplier.map(NodeId::from_uuid),
        supplier_debt,
        level,
        created_at,
        contact: Contact {
            id: ContactId::from_uuid(contact_id),
            email: row.try_get("email").map_err(decode_error)?,
            country: row.try_get("country").map_err(decode_error)?,
            city: row.try_get("city").map_err(decode_error)?,
            street: row.try_get("street").map_err(decode_error)?,
            building_number: row.try_get("building_number").map_err(decode_error)?,
        },
        products: BTreeSet::new(),
    })
}

pub(crate) fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row: {err}"))
}

/// Map SQLx errors to `StoreError` (see the table in the module docs).
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("40001") => StoreError::Conflict(msg),
                Some("23503") | Some("23514") => StoreError::Integrity(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(format!("unexpected row not found in {operation}")),
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
