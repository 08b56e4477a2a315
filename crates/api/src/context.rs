use tradenet_auth::Principal;
use tradenet_core::EmployeeId;

/// Authenticated employee for a request, resolved from the token subject and
/// the employee directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    username: String,
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(username: String, principal: Principal) -> Self {
        Self { username, principal }
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.principal.employee_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
