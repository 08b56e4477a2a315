//! Trade network domain: nodes, their contacts and products, and the rules
//! that keep the three-level supply hierarchy consistent.

pub mod command;
pub mod contact;
pub mod hierarchy;
pub mod node;
pub mod product;
pub mod query;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use command::{ClearDebt, CreateNode, DeleteNode, NetworkCommand, UpdateNode, decide};
pub use contact::{Contact, ContactDetails, ContactPatch};
pub use node::{MAX_LEVEL, NetworkNode, NodeType, format_debt, validate_debt};
pub use product::{Product, ProductSpec};
pub use query::{NodeDetails, NodeFilter, get_node, list_contacts, list_nodes, list_products, node_details};
pub use snapshot::{ChangeSet, NetworkSnapshot, NetworkView};
