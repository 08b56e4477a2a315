//! Employees: the only people allowed to use the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradenet_core::{DomainError, DomainResult, EmployeeId};

use crate::Role;

pub const USERNAME_MAX_LEN: usize = 150;

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    /// Can authenticate and use the API.
    #[default]
    Active,
    /// Tokens are still verifiable, but every request is refused.
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl core::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EmployeeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(DomainError::field("status", format!("unknown employee status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub username: String,
    pub roles: Vec<Role>,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// A new active employee; the username must be 1..=150 characters of
    /// letters, digits and `@.+-_`.
    pub fn new(username: &str, roles: Vec<Role>, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::field("username", "may not be blank"));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(DomainError::field(
                "username",
                format!("ensure this field has no more than {USERNAME_MAX_LEN} characters"),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(DomainError::field(
                "username",
                "may contain only letters, digits and @/./+/-/_ characters",
            ));
        }

        Ok(Self {
            id: EmployeeId::new(),
            username: username.to_string(),
            roles,
            status: EmployeeStatus::Active,
            created_at,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    pub fn deactivate(&mut self) {
        self.status = EmployeeStatus::Inactive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_employee_is_active() {
        let e = Employee::new(" manager ", vec![], Utc::now()).unwrap();
        assert_eq!(e.username, "manager");
        assert!(e.is_active());
        assert!(!e.is_admin());
    }

    #[test]
    fn username_rules() {
        assert!(Employee::new("", vec![], Utc::now()).is_err());
        assert!(Employee::new("has space", vec![], Utc::now()).is_err());
        assert!(Employee::new(&"x".repeat(151), vec![], Utc::now()).is_err());
        assert!(Employee::new("a.b+c@d-e_f", vec![], Utc::now()).is_ok());
    }

    #[test]
    fn deactivation_and_status_parsing() {
        let mut e = Employee::new("clerk", vec![Role::ADMIN], Utc::now()).unwrap();
        assert!(e.is_admin());
        e.deactivate();
        assert!(!e.is_active());
        assert_eq!(e.status.to_string().parse::<EmployeeStatus>().unwrap(), EmployeeStatus::Inactive);
        assert!("suspended".parse::<EmployeeStatus>().is_err());
    }
}
