use axum::http::StatusCode;
use datasource::RepoError;
use svckit::api::problem::from_parts;
use svckit::ProblemResponse;

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { .. } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "products.validation",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::Repo(RepoError::InvalidId(_)) => from_parts(
            StatusCode::BAD_REQUEST,
            "products.invalid_id",
            "Invalid identifier",
            e.to_string(),
            instance,
        ),
        DomainError::Repo(RepoError::NotFound { id, .. }) => from_parts(
            StatusCode::NOT_FOUND,
            "products.not_found",
            "Product not found",
            format!("Product with id {id} was not found"),
            instance,
        ),
        DomainError::Repo(r) if r.is_unique_violation() => from_parts(
            StatusCode::CONFLICT,
            "products.conflict",
            "Product already exists",
            "sku is already in use",
            instance,
        ),
        DomainError::Repo(RepoError::ZeroRows { .. } | RepoError::Store(_)) => {
            // Already recorded by the failing repository span; details stay server-side.
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "products.internal",
                "Internal error",
                "An internal store error occurred",
                instance,
            )
        }
    }
}
