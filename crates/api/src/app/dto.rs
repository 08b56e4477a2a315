use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use tradenet_core::{ContactId, NodeId};
use tradenet_network::{
    ClearDebt, Contact, ContactDetails, ContactPatch, CreateNode, NodeDetails, NodeFilter, NodeType,
    Product, ProductSpec, UpdateNode, format_debt,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct NodeListQuery {
    pub country: Option<String>,
}

impl NodeListQuery {
    pub fn into_filter(self) -> NodeFilter {
        NodeFilter { country: self.country }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub name: String,
    pub node_type: NodeType,
    #[serde(default, alias = "supplier_id")]
    pub supplier: Option<NodeId>,
    #[serde(default)]
    pub supplier_debt: Option<Decimal>,
    pub contact: ContactDetails,
    #[serde(default)]
    pub products: Vec<ProductSpec>,
}

impl CreateNodeRequest {
    pub fn into_command(self, now: DateTime<Utc>) -> CreateNode {
        CreateNode {
            node_id: NodeId::new(),
            contact_id: ContactId::new(),
            name: self.name,
            node_type: self.node_type,
            supplier: self.supplier,
            supplier_debt: self.supplier_debt,
            contact: self.contact,
            products: self.products,
            occurred_at: now,
        }
    }
}

/// PUT body: name, type and the full contact are required; omitted optional
/// fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct ReplaceNodeRequest {
    pub name: String,
    pub node_type: NodeType,
    #[serde(default, alias = "supplier_id", deserialize_with = "double_option")]
    pub supplier: Option<Option<NodeId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_debt: Option<Option<Decimal>>,
    pub contact: ContactDetails,
    #[serde(default)]
    pub products: Option<Vec<ProductSpec>>,
}

impl ReplaceNodeRequest {
    pub fn into_command(self, node_id: NodeId, now: DateTime<Utc>) -> UpdateNode {
        UpdateNode {
            node_id,
            name: Some(self.name),
            node_type: Some(self.node_type),
            supplier: self.supplier,
            supplier_debt: debt_attempt(self.supplier_debt),
            contact: Some(ContactPatch::from(self.contact)),
            products: self.products,
            occurred_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PatchNodeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default, alias = "supplier_id", deserialize_with = "double_option")]
    pub supplier: Option<Option<NodeId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_debt: Option<Option<Decimal>>,
    #[serde(default)]
    pub contact: Option<ContactPatch>,
    #[serde(default)]
    pub products: Option<Vec<ProductSpec>>,
}

impl PatchNodeRequest {
    pub fn into_command(self, node_id: NodeId, now: DateTime<Utc>) -> UpdateNode {
        UpdateNode {
            node_id,
            name: self.name,
            node_type: self.node_type,
            supplier: self.supplier,
            supplier_debt: debt_attempt(self.supplier_debt),
            contact: self.contact,
            products: self.products,
            occurred_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearDebtRequest {
    pub ids: Vec<NodeId>,
}

impl ClearDebtRequest {
    pub fn into_command(self, now: DateTime<Utc>) -> ClearDebt {
        ClearDebt {
            node_ids: self.ids,
            occurred_at: now,
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Any `supplier_debt` key in an update body counts as an attempt to change
/// it, `null` included.
fn debt_attempt(value: Option<Option<Decimal>>) -> Option<Decimal> {
    value.map(Option::unwrap_or_default)
}

// -------------------------
// Response mapping
// -------------------------

pub fn node_to_json(details: NodeDetails) -> Value {
    let NodeDetails { node, supplier, products } = details;
    json!({
        "id": node.id.to_string(),
        "name": node.name,
        "node_type": node.node_type.as_str(),
        "supplier": supplier,
        "supplier_id": node.supplier.map(|id| id.to_string()),
        "supplier_debt": format_debt(node.supplier_debt),
        "level": node.level,
        "created_at": node.created_at.to_rfc3339(),
        "contact": contact_to_json(&node.contact),
        "products": products.iter().map(product_to_json).collect::<Vec<_>>(),
    })
}

pub fn contact_to_json(contact: &Contact) -> Value {
    json!({
        "id": contact.id.to_string(),
        "email": contact.email,
        "country": contact.country,
        "city": contact.city,
        "street": contact.street,
        "building_number": contact.building_number,
    })
}

pub fn node_contact_to_json(node_id: NodeId, contact: &Contact) -> Value {
    let mut value = contact_to_json(contact);
    value["node_id"] = json!(node_id.to_string());
    value
}

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id.to_string(),
        "name": product.name,
        "model": product.model,
        "release_date": product.release_date.to_string(),
    })
}

pub fn items(items: Vec<Value>) -> Value {
    json!({ "items": items })
}
