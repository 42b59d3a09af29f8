use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Per-field validation failure detail
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub details: String,
}

impl ValidationErrorDetail {
    pub fn new(field: String, details: String) -> Self {
        Self { field, details }
    }
}

/// Standard error body: `{error, details?}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
    #[serde(skip)]
    pub status_code: StatusCode,
}

impl ErrorResponse {
    /// Create an error response with default 400 Bad Request status
    pub fn send(error: String) -> Self {
        Self {
            error,
            details: None,
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    /// Create an error response carrying per-field validation details
    pub fn with_validation_errors(error: String, details: Vec<ValidationErrorDetail>) -> Self {
        Self {
            error,
            details: Some(details),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    /// Set custom status code (builder pattern)
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_omitted_when_absent() {
        let body = serde_json::to_value(ErrorResponse::send("Invalid token".to_string())).unwrap();
        assert_eq!(body["error"], "Invalid token");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_validation_details_serialized() {
        let body = serde_json::to_value(ErrorResponse::with_validation_errors(
            "Validation failed".to_string(),
            vec![ValidationErrorDetail::new(
                "password".to_string(),
                "Password must be between 8 and 128 characters".to_string(),
            )],
        ))
        .unwrap();
        assert_eq!(body["details"][0]["field"], "password");
    }
}
