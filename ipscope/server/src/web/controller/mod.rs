// FIXME: remove this after this utoipa issue is fixed: https://github.com/juhaku/utoipa/pull/1423
#![allow(clippy::needless_for_each)]
mod error;

use axum::{extract::State, routing, Extension, Json, Router};
use ipscope_axum::response::EncapsulatedJson;
use ipscope_core::{
    model::{IpVersion, MetricsResponse, RequestHeaders},
    ServerInfo,
};
use snafu::ResultExt;
use utoipa::OpenApi;

pub use self::error::{Error, Result};
use crate::{web::extractor::ClientRequest, ServiceState};

pub fn api_router(service_state: &ServiceState) -> Router {
    let routes = Router::new()
        .route("/metrics", routing::get(metrics))
        .route("/v1/info", routing::get(server_info));

    Router::new().nest("/api", routes).with_state(service_state.clone())
}

/// Get server info
#[utoipa::path(
    get,
    operation_id = "get_server_info",
    path = "/api/v1/info",
    responses(
        (status = 200, body = ServerInfo)
    )
)]
pub async fn server_info(
    Extension(server_info): Extension<ServerInfo>,
) -> Result<EncapsulatedJson<ServerInfo>> {
    Ok(EncapsulatedJson::ok(server_info))
}

/// Address, geolocation and request headers of the caller
#[utoipa::path(
    get,
    operation_id = "get_metrics",
    path = "/api/metrics",
    params(
        ("X-Forwarded-For" = Option<String>, Header, description = "Client address set by a proxy"),
    ),
    responses(
        (status = 200, body = MetricsResponse),
        (status = 500, description = "Resolution task aborted")
    )
)]
pub async fn metrics(
    State(ServiceState { metrics_builder }): State<ServiceState>,
    ClientRequest(request): ClientRequest,
) -> Result<Json<MetricsResponse>> {
    // Resolution runs detached so a panic turns into a 500 instead of a dropped
    // connection.
    let response = tokio::spawn(async move { metrics_builder.build(&request).await })
        .await
        .context(error::ResolveMetricsSnafu)?;

    Ok(Json(response))
}

#[derive(OpenApi)]
#[openapi(
    paths(server_info, metrics),
    components(schemas(ServerInfo, MetricsResponse, RequestHeaders, IpVersion)),
    tags(
        (name = "Metrics", description = "Client address and geolocation")
    )
)]
pub struct ApiDoc;
