//! Postgres-backed employee directory (table `employees`, created by the
//! network store schema).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use tradenet_auth::{Employee, EmployeeStatus, Role};
use tradenet_core::EmployeeId;

use super::EmployeeDirectory;
use crate::store::StoreError;
use crate::store::postgres::{decode_error, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresEmployeeDirectory {
    pool: Arc<PgPool>,
}

impl PostgresEmployeeDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for PostgresEmployeeDirectory {
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query("SELECT id, username, roles, status, created_at FROM employees WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_employee", e))?;
        row.as_ref().map(employee_from_row).transpose()
    }

    async fn save(&self, employee: Employee) -> Result<(), StoreError> {
        let roles: Vec<String> = employee.roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO employees (id, username, roles, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                roles = EXCLUDED.roles,
                status = EXCLUDED.status
            "#,
        )
        .bind(employee.id.as_uuid())
        .bind(&employee.username)
        .bind(&roles)
        .bind(employee.status.as_str())
        .bind(employee.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_employee", e))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query("SELECT id, username, roles, status, created_at FROM employees ORDER BY username")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_employees", e))?;
        rows.iter().map(employee_from_row).collect()
    }
}

fn employee_from_row(row: &PgRow) -> Result<Employee, StoreError> {
    let id: Uuid = row.try_get("id").map_err(decode_error)?;
    let roles: Vec<String> = row.try_get("roles").map_err(decode_error)?;
    let status: String = row.try_get("status").map_err(decode_error)?;
    let status: EmployeeStatus = status
        .parse()
        .map_err(|e| StoreError::Backend(format!("bad status for employee {id}: {e}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_error)?;

    Ok(Employee {
        id: EmployeeId::from_uuid(id),
        username: row.try_get("username").map_err(decode_error)?,
        roles: roles.into_iter().map(Role::new).collect(),
        status,
        created_at,
    })
}
