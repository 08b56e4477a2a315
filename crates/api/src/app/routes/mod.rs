use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Response,
};

use tradenet_core::NodeId;

use crate::app::errors::{domain_error_to_response, json_error};

pub mod admin;
pub mod network_nodes;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/network-nodes", network_nodes::router())
        .nest("/admin", admin::router())
}

pub(crate) fn parse_node_id(raw: &str) -> Result<NodeId, Response> {
    raw.parse::<NodeId>().map_err(domain_error_to_response)
}

pub(crate) fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}
