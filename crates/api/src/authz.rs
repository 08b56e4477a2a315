//! API-side authorization guard.
//!
//! Handlers call [`require`] before touching the service.

use axum::http::StatusCode;
use axum::response::Response;

use tradenet_auth::{Permission, authorize};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// `Err` carries a ready 403 response.
pub fn require(principal: &PrincipalContext, permission: &Permission) -> Result<(), Response> {
    authorize(principal.principal(), permission).map_err(|e| {
        tracing::info!(
            employee_id = %principal.employee_id(),
            username = principal.username(),
            permission = %permission,
            "request forbidden"
        );
        json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
