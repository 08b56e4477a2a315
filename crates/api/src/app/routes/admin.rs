//! Admin routes: full listings and bulk actions, restricted to the `admin`
//! role.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;

use tradenet_auth::Permission;

use crate::app::routes::parse_body;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/network-nodes", get(list_nodes))
        .route("/network-nodes/clear-debt", post(clear_debt))
        .route("/contacts", get(list_contacts))
        .route("/products", get(list_products))
}

pub async fn list_nodes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::NodeListQuery>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_ADMIN) {
        return resp;
    }

    match services.network.list_nodes(&query.into_filter()).await {
        Ok(nodes) => Json(dto::items(nodes.into_iter().map(dto::node_to_json).collect())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Zero the debt of the selected nodes. Unknown ids are skipped.
pub async fn clear_debt(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ClearDebtRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_ADMIN) {
        return resp;
    }
    let body = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.network.clear_debt(body.into_command(Utc::now())).await {
        Ok(cleared) => {
            tracing::info!(cleared, employee_id = %principal.employee_id(), "supplier debt cleared");
            Json(json!({
                "cleared": cleared,
                "message": format!("Debt cleared for {cleared} node(s)"),
            }))
            .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::NodeListQuery>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_ADMIN) {
        return resp;
    }

    match services.network.list_contacts(&query.into_filter()).await {
        Ok(contacts) => Json(dto::items(
            contacts
                .iter()
                .map(|(node_id, contact)| dto::node_contact_to_json(*node_id, contact))
                .collect(),
        ))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_ADMIN) {
        return resp;
    }

    match services.network.list_products().await {
        Ok(products) => Json(dto::items(products.iter().map(dto::product_to_json).collect())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
