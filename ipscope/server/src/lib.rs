mod error;
pub mod provider_client;
pub mod service;
mod web;

use std::{future::Future, net::SocketAddr, path::PathBuf, pin::Pin, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use ipscope_core::{
    config::{Config, GeoConfig},
    ServerInfo,
};
use ipscope_metrics::DefaultMetrics;
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;

pub use self::{
    error::{Error, Result},
    web::{controller, router, ApiDoc, ServiceState},
};
use self::{
    provider_client::HttpGeoClient,
    service::{GeoCache, GeoCounters, GeoResolver, MetricsBuilder},
};

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, metrics, geo } = config;

    let default_metrics = DefaultMetrics::new()?;

    let resolver = initialize_geo_resolver(geo, &default_metrics)?;

    let service_state = ServiceState::new(MetricsBuilder::new(resolver));

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager.spawn(
        "Http Server",
        create_web_http_server_future(web.listen_address, web.static_dir, service_state, server_info),
    );

    if metrics.enable {
        let _handle = lifecycle_manager.spawn(
            "Metrics server",
            create_metrics_server_future(metrics.listen_address, default_metrics),
        );
    }

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

#[tracing::instrument(skip_all)]
fn initialize_geo_resolver(
    GeoConfig { request_timeout, cache_ttl, providers }: GeoConfig,
    metrics: &DefaultMetrics,
) -> Result<GeoResolver> {
    tracing::info!(?request_timeout, ?cache_ttl, "Initializing geo resolver");
    tracing::info!(
        "Geo providers (primary: {}, secondary: {}, ip echo: {})",
        providers.primary.address_url,
        providers.secondary.address_url,
        providers.ip_echo_url
    );

    let client = HttpGeoClient::new(request_timeout).context(error::CreateProviderClientSnafu)?;
    let counters =
        GeoCounters::register(metrics.registry()).context(error::RegisterCountersSnafu)?;

    Ok(GeoResolver::new(Arc::new(client), providers, GeoCache::new(cache_ttl), counters))
}

fn create_web_http_server_future(
    listen_address: SocketAddr,
    static_dir: Option<PathBuf>,
    service_state: ServiceState,
    server_info: ServerInfo,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            tracing::info!("Listen Web HTTP server endpoint on {listen_address}");

            let result = web::new_api_server(
                listen_address,
                static_dir.as_deref(),
                service_state,
                server_info,
                shutdown_signal,
            )
            .await;

            match result {
                Ok(()) => {
                    tracing::info!("HTTP server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}

fn create_metrics_server_future<Metrics>(
    listen_address: SocketAddr,
    metrics: Metrics,
) -> impl FnOnce(Shutdown) -> Pin<Box<dyn Future<Output = ExitStatus<Error>> + Send>>
where
    Metrics: ipscope_metrics::Metrics + 'static,
{
    move |signal| {
        async move {
            tracing::info!("Listen metrics endpoint on {listen_address}");
            let result = ipscope_metrics::start_metrics_server(listen_address, metrics, signal).await;
            match result {
                Ok(()) => {
                    tracing::info!("Metrics server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}
