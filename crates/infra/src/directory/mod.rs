//! Employee directory: who may use the API.

use std::collections::HashMap;
use std::sync::RwLock;

use tradenet_auth::Employee;
use tradenet_core::EmployeeId;

use crate::store::StoreError;

pub mod postgres;

pub use postgres::PostgresEmployeeDirectory;

#[async_trait::async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError>;

    /// Insert or replace by id. Usernames are unique.
    async fn save(&self, employee: Employee) -> Result<(), StoreError>;

    /// All employees, ordered by username.
    async fn list(&self) -> Result<Vec<Employee>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    inner: RwLock<HashMap<EmployeeId, Employee>>,
}

impl InMemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(inner.get(&id).cloned())
    }

    async fn save(&self, employee: Employee) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if inner
            .values()
            .any(|e| e.id != employee.id && e.username == employee.username)
        {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                employee.username
            )));
        }
        inner.insert(employee.id, employee);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let mut all: Vec<Employee> = inner.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }
}
