use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use tradenet_auth::Permission;
use tradenet_network::DeleteNode;

use crate::app::routes::{parse_body, parse_node_id};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_nodes).post(create_node))
        .route(
            "/:id",
            get(get_node)
                .put(replace_node)
                .patch(patch_node)
                .delete(delete_node),
        )
}

pub async fn list_nodes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::NodeListQuery>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_READ) {
        return resp;
    }

    match services.network.list_nodes(&query.into_filter()).await {
        Ok(nodes) => Json(dto::items(nodes.into_iter().map(dto::node_to_json).collect())).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_node(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_READ) {
        return resp;
    }
    let node_id = match parse_node_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.network.get_node(node_id).await {
        Ok(details) => Json(dto::node_to_json(details)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_node(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateNodeRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_WRITE) {
        return resp;
    }
    let body = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = body.into_command(Utc::now());
    match services.network.create_node(cmd).await {
        Ok(details) => {
            tracing::info!(
                node_id = %details.node.id,
                employee_id = %principal.employee_id(),
                "network node created"
            );
            (StatusCode::CREATED, Json(dto::node_to_json(details))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn replace_node(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::ReplaceNodeRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_WRITE) {
        return resp;
    }
    let node_id = match parse_node_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.network.update_node(body.into_command(node_id, Utc::now())).await {
        Ok(details) => Json(dto::node_to_json(details)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn patch_node(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::PatchNodeRequest>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_WRITE) {
        return resp;
    }
    let node_id = match parse_node_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.network.update_node(body.into_command(node_id, Utc::now())).await {
        Ok(details) => Json(dto::node_to_json(details)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_node(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &Permission::NETWORK_WRITE) {
        return resp;
    }
    let node_id = match parse_node_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = DeleteNode {
        node_id,
        occurred_at: Utc::now(),
    };
    match services.network.delete_node(cmd).await {
        Ok(()) => {
            tracing::info!(%node_id, employee_id = %principal.employee_id(), "network node deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
