//! JSON body extractor that runs `validator` rules before the handler.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use minicloud_core::error::AppError;

/// A JSON body that deserialized and passed its validation rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid_input(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AppError::invalid_input(first_message(&errors)))?;

        Ok(Self(value))
    }
}

/// The first human-readable message from a set of validation failures.
fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for '{field}'"),
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid request body".to_string())
}
