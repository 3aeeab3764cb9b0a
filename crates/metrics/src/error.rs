use std::net::SocketAddr;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to register metric collector, error: {source}"))]
    Register { source: prometheus::Error },

    #[snafu(display("Failed to bind metrics server on {listen_address}, error: {source}"))]
    BindMetricsServer { listen_address: SocketAddr, source: std::io::Error },

    #[snafu(display("Error occurs while serving metrics server, error: {source}"))]
    ServeMetricsServer { source: std::io::Error },

    #[snafu(display("Failed to encode metrics, error: {source}"))]
    EncodeMetrics { source: prometheus::Error },
}
