use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::problem::{Problem, ProblemResponse, ValidationError};

/// JSON body extractor that runs `validator` rules before the handler sees the payload.
///
/// Malformed JSON is rejected with the status axum picks for it (400/415/422),
/// rule violations with 422 and one entry per failing field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ProblemResponse(Problem::new(
                rejection.status(),
                "Invalid request body",
                rejection.body_text(),
            ))
        })?;

        value
            .validate()
            .map_err(|errors| validation_problem(&errors))?;

        Ok(Self(value))
    }
}

/// Render `validator` output as a 422 problem with one pointer per field.
pub fn validation_problem(errors: &ValidationErrors) -> ProblemResponse {
    let mut items: Vec<ValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| ValidationError {
                detail: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
                pointer: format!("/{field}"),
            })
        })
        .collect();
    items.sort_by(|a, b| a.pointer.cmp(&b.pointer));

    ProblemResponse(
        Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
            "request payload failed validation",
        )
        .coded("request.validation")
        .with_errors(items),
    )
}
