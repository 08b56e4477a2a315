use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use tradenet_auth::{JwtValidator, Principal};
use tradenet_infra::EmployeeDirectory;

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub employees: Arc<dyn EmployeeDirectory>,
}

/// Bearer token -> active employee.
///
/// 401 when the token is missing or invalid, 403 when its subject is not an
/// active employee.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication credentials were not provided"))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid or expired token")
    })?;

    let employee = state.employees.find(claims.sub).await.map_err(|e| {
        tracing::error!(error = %e, "employee lookup failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
    })?;

    let employee = match employee {
        Some(employee) if employee.is_active() => employee,
        _ => {
            return Err(json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "only active employees may use the API",
            ));
        }
    };

    req.extensions_mut().insert(PrincipalContext::new(
        employee.username.clone(),
        Principal::from_employee(&employee),
    ));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
