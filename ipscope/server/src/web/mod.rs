pub mod controller;
pub mod error;
pub mod extractor;

use std::{future::Future, net::SocketAddr, path::Path};

use axum::{
    extract::Request, http, response::IntoResponse, routing, Extension, Json, Router, ServiceExt,
};
use ipscope_axum::json_response;
use ipscope_core::ServerInfo;
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer, normalize_path::NormalizePathLayer, services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub use self::{controller::ApiDoc, error::Error};
use crate::service::MetricsBuilder;

pub async fn new_api_server<ShutdownSignal>(
    socket_address: SocketAddr,
    static_dir: Option<&Path>,
    service_state: ServiceState,
    server_info: ServerInfo,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = {
        let router = router(service_state, server_info, static_dir);
        let router = NormalizePathLayer::trim_trailing_slash().layer(router);
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(router)
    };

    let listener = TcpListener::bind(&socket_address)
        .await
        .context(error::BindTcpServerSnafu { listen_address: socket_address })?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context(error::ServeHttpServerSnafu)
}

/// All routes of the HTTP server.
///
/// With a `static_dir` every unmatched path, `/` included, is served from
/// that directory. Without one, `/` reports the server info and unmatched
/// paths get a JSON 404.
pub fn router(
    service_state: ServiceState,
    server_info: ServerInfo,
    static_dir: Option<&Path>,
) -> Router {
    let middleware_stack =
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CompressionLayer::new());

    let router = Router::new()
        .route("/openapi.json", routing::get(openapi_json))
        .merge(controller::api_router(&service_state));

    let router = match static_dir {
        Some(dir) => {
            tracing::info!("Serving static files from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        // For load balancer default health check
        None => router.route("/", routing::get(controller::server_info)).fallback(fallback),
    };

    router.layer(Extension(server_info)).layer(middleware_stack)
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: http::Uri) -> axum::response::Response {
    json_response! {
        status: http::StatusCode::NOT_FOUND,
        error: ipscope_axum::response::Error {
            type_: ipscope_axum::response::ErrorType::NotFound,
            message: format!("No route for {uri}"),
            additional_fields: indexmap::IndexMap::default(),
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> { Json(ApiDoc::openapi()) }

#[derive(Clone)]
pub struct ServiceState {
    pub metrics_builder: MetricsBuilder,
}

impl ServiceState {
    #[must_use]
    pub const fn new(metrics_builder: MetricsBuilder) -> Self { Self { metrics_builder } }
}
