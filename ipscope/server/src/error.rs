use snafu::Snafu;

use crate::{provider_client, web};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Error occurs while creating geo provider client, error: {source}"))]
    CreateProviderClient { source: provider_client::Error },

    #[snafu(display("Error occurs while registering geo counters, error: {source}"))]
    RegisterCounters { source: prometheus::Error },

    #[snafu(display("{source}"))]
    Metrics { source: ipscope_metrics::Error },

    #[snafu(display("{source}"))]
    Web { source: web::Error },
}

impl From<ipscope_metrics::Error> for Error {
    fn from(source: ipscope_metrics::Error) -> Self { Self::Metrics { source } }
}

impl From<web::Error> for Error {
    fn from(source: web::Error) -> Self { Self::Web { source } }
}
