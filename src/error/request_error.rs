use crate::response::app_response::{ErrorResponse, ValidationErrorDetail};
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
}

/// Extractor that deserializes the JSON body and runs `validator`
/// rules before the handler sees the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedRequest<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedRequest<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(RequestError::JsonRejection)?;
        value.validate()?;
        Ok(ValidatedRequest(value))
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::ValidationError(validation_errors) => {
                let details = convert_validation_errors_to_details(validation_errors);
                ErrorResponse::with_validation_errors("Validation failed".to_string(), details)
                    .with_status(StatusCode::BAD_REQUEST)
                    .into_response()
            }
            RequestError::JsonRejection(_) => ErrorResponse::send(self.to_string())
                .with_status(StatusCode::BAD_REQUEST)
                .into_response(),
        }
    }
}

fn convert_validation_errors_to_details(
    errors: validator::ValidationErrors,
) -> Vec<ValidationErrorDetail> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                ValidationErrorDetail::new(
                    field.to_string(),
                    error
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                )
            })
        })
        .collect()
}
