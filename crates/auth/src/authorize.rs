use std::collections::HashSet;

use thiserror::Error;

use tradenet_core::EmployeeId;

use crate::{Employee, Permission, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub employee_id: EmployeeId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Principal for a directory record; inactive employees get no permissions.
    pub fn from_employee(employee: &Employee) -> Self {
        let permissions = if employee.is_active() {
            permissions_for(&employee.roles)
        } else {
            Vec::new()
        };
        Self {
            employee_id: employee.id,
            roles: employee.roles.clone(),
            permissions,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Role to permission mapping.
///
/// Every active employee may read and edit the network; `admin` grants all
/// permissions.
pub fn permissions_for(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(Role::is_admin) {
        return vec![Permission::WILDCARD];
    }
    vec![Permission::NETWORK_READ, Permission::NETWORK_WRITE]
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
