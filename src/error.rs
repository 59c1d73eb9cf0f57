use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Google Sheet Web App URL is not defined")]
    MissingSheetUrl,

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Google Script fetch failed: {0}")]
    RemoteRejected(String),

    #[error("Failed to fetch data: {0}")]
    RemoteStatus(String),

    #[error("API returned an error: {0}")]
    RemoteError(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// `{result, error}` body shared by the proxy and the JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success() -> Self {
        Envelope {
            result: "success".to_string(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope {
            result: "error".to_string(),
            error: Some(message.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("{self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Envelope::error(self.to_string())),
        )
            .into_response()
    }
}
