use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ipscope_axum::response::ErrorMessage;
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Metrics resolution aborted, error: {source}"))]
    ResolveMetrics { source: tokio::task::JoinError },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::ResolveMetrics { .. } => {
                tracing::error!(status_code = 500, "Internal Server Error: {self}");
                ErrorMessage::new(self.to_string())
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
