use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::workflow_client::WorkflowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only request-fatal conditions live here. Malformed model output and
/// business-rule rejections degrade into partial results instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Workflow API error (status {status})")]
    Upstream { status: u16, details: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotConfigured(what) => AppError::Configuration(what.to_string()),
            WorkflowError::Api { status, message } => AppError::Upstream {
                status,
                details: message,
            },
            WorkflowError::Http(e) => AppError::Stream(format!("workflow request failed: {e}")),
            WorkflowError::Stream(e) => AppError::Stream(format!("response body unreadable: {e}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    format!("Workflow API設定が見つかりません ({msg})"),
                    None,
                )
            }
            AppError::Upstream { status, details } => {
                tracing::error!("Workflow API error {status}: {details}");
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    status,
                    "UPSTREAM_ERROR",
                    "Workflow APIエラー".to_string(),
                    Some(details),
                )
            }
            AppError::Stream(msg) => {
                tracing::error!("Stream error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROCESSING_ERROR",
                    "シフト生成中にエラーが発生しました".to_string(),
                    Some(msg),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_passed_through() {
        let response = AppError::Upstream {
            status: 401,
            details: "bad key".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_success_status_maps_to_bad_gateway() {
        let response = AppError::Upstream {
            status: 200,
            details: String::new(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let response = AppError::Validation("target_month".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_configured_maps_to_configuration_error() {
        let err: AppError = WorkflowError::NotConfigured("WORKFLOW_API_KEY").into();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
