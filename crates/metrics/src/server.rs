use std::{future::Future, net::SocketAddr};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Router,
};
use bytes::Bytes;
use prometheus::{Encoder, TextEncoder};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{error, Error, Metrics};

/// Serve `GET /metrics` until `shutdown_signal` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn start_metrics_server<M, ShutdownSignal>(
    listen_address: SocketAddr,
    metrics: M,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    M: Metrics + 'static,
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = Router::new()
        .route("/metrics", routing::get(gather::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics);

    let listener = TcpListener::bind(listen_address)
        .await
        .context(error::BindMetricsServerSnafu { listen_address })?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context(error::ServeMetricsServerSnafu)
}

pub(crate) fn encode<M: Metrics>(metrics: &M) -> Result<Bytes, Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buffer).context(error::EncodeMetricsSnafu)?;
    Ok(Bytes::from(buffer))
}

async fn gather<M: Metrics>(State(metrics): State<M>) -> Response {
    match encode(&metrics) {
        Ok(body) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref())], body)
                .into_response()
        }
        Err(err) => {
            tracing::error!("{err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
