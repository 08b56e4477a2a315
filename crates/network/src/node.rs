//! Network node: a participant of the three-tier trade network.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradenet_core::{DomainError, Entity, FieldErrors, NodeId, ProductId};

use crate::contact::{Contact, check_text};

/// Deepest allowed level (factory = 0, its clients = 1, theirs = 2).
pub const MAX_LEVEL: u8 = 2;

pub const NAME_MAX_LEN: usize = 200;

/// Largest debt representable in the storage column (`NUMERIC(12, 2)`).
const MAX_DEBT_INTEGER_DIGITS: u32 = 10;

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Factory,
    Retail,
    Entrepreneur,
}

impl NodeType {
    pub const ALL: [NodeType; 3] = [NodeType::Factory, NodeType::Retail, NodeType::Entrepreneur];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Factory => "factory",
            NodeType::Retail => "retail",
            NodeType::Entrepreneur => "entrepreneur",
        }
    }

    /// Human-readable name used in display strings.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeType::Factory => "Factory",
            NodeType::Retail => "Retail network",
            NodeType::Entrepreneur => "Individual entrepreneur",
        }
    }

    pub fn is_factory(self) -> bool {
        self == NodeType::Factory
    }
}

impl core::fmt::Display for NodeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for NodeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "factory" => Ok(NodeType::Factory),
            "retail" => Ok(NodeType::Retail),
            "entrepreneur" => Ok(NodeType::Entrepreneur),
            other => Err(DomainError::field(
                "node_type",
                format!("\"{other}\" is not a valid choice (factory, retail, entrepreneur)"),
            )),
        }
    }
}

/// Stored node state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub supplier: Option<NodeId>,
    pub supplier_debt: Decimal,
    /// Derived from the supplier chain; recomputed on every supplier change.
    pub level: u8,
    pub created_at: DateTime<Utc>,
    pub contact: Contact,
    pub products: BTreeSet<ProductId>,
}

impl NetworkNode {
    pub fn carries(&self, product: ProductId) -> bool {
        self.products.contains(&product)
    }

    pub fn has_debt(&self) -> bool {
        !self.supplier_debt.is_zero()
    }

    /// Field-level rules that need no knowledge of the rest of the network.
    pub fn validate_fields(&self, errors: &mut FieldErrors) {
        check_text(&self.name, NAME_MAX_LEN, "name", errors);
        if let Err(msg) = validate_debt(self.supplier_debt) {
            errors.add("supplier_debt", msg);
        }
        self.contact.validate("contact", errors);
    }
}

impl Entity for NetworkNode {
    type Id = NodeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for NetworkNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.node_type.display_name(), self.name)
    }
}

/// Debt is a non-negative amount with cent precision.
pub fn validate_debt(debt: Decimal) -> Result<(), String> {
    if debt.is_sign_negative() && !debt.is_zero() {
        return Err("debt to the supplier cannot be negative".to_string());
    }
    if debt.normalize().scale() > 2 {
        return Err("ensure that there are no more than 2 decimal places".to_string());
    }
    if debt.trunc() >= Decimal::from(10_i64.pow(MAX_DEBT_INTEGER_DIGITS)) {
        return Err(format!(
            "ensure that there are no more than {MAX_DEBT_INTEGER_DIGITS} digits before the decimal point"
        ));
    }
    Ok(())
}

/// Render a debt with exactly two fractional digits (`100000.00`).
pub fn format_debt(debt: Decimal) -> String {
    let mut rounded = debt.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}
