use axum::http::StatusCode;
use datasource::RepoError;
use svckit::api::problem::from_parts;
use svckit::ProblemResponse;

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { .. } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "users.validation",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Repo(RepoError::InvalidId(_)) => from_parts(
            StatusCode::BAD_REQUEST,
            "users.invalid_id",
            "Invalid identifier",
            e.to_string(),
            instance,
        ),
        DomainError::Repo(RepoError::NotFound { id, .. }) => from_parts(
            StatusCode::NOT_FOUND,
            "users.not_found",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::Repo(r) if r.is_unique_violation() => from_parts(
            StatusCode::CONFLICT,
            "users.conflict",
            "User already exists",
            "username, email or phone is already in use",
            instance,
        ),
        DomainError::Repo(RepoError::ZeroRows { .. } | RepoError::Store(_)) => {
            // Already recorded by the failing repository span; details stay server-side.
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "users.internal",
                "Internal error",
                "An internal store error occurred",
                instance,
            )
        }
    }
}
