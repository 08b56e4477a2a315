//! `tradenet-auth`: authentication and authorization boundary.
//!
//! Token handling and permission checks only; this crate knows nothing about
//! HTTP or storage.

pub mod authorize;
pub mod claims;
pub mod employee;
pub mod jwt;
pub mod permissions;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize, permissions_for};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use employee::{Employee, EmployeeStatus};
pub use jwt::{AuthError, Hs256JwtValidator, JwtValidator, issue_token};
pub use permissions::Permission;
pub use roles::Role;
