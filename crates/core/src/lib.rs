//! `tradenet-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors, NON_FIELD_ERRORS};
pub use id::{ContactId, EmployeeId, NodeId, ProductId};
pub use version::ExpectedVersion;
