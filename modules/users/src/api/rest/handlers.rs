use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use svckit::{PageQuery, ProblemResponse, ValidatedJson};
use tracing::info;

use crate::api::rest::dto::{CreatedDto, SearchQuery, UserDto, UserListDto, UserReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;
use svckit::Problem;

/// List users in insertion order
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of users", body = UserListDto),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Json<UserListDto>, ProblemResponse> {
    let cfg = svc.config();
    let page = query.resolve(cfg.default_page_size, cfg.max_page_size);

    let users = svc
        .list_users(page)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    Ok(Json(UserListDto {
        items: users.into_iter().map(UserDto::from).collect(),
        page: page.page,
        size: page.size,
    }))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 404, description = "Not Found", body = Problem)
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .get_user(&id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(user.into()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = UserReq,
    responses(
        (status = 201, description = "Created", body = CreatedDto),
        (status = 409, description = "Username, email or phone taken", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    ValidatedJson(req): ValidatedJson<UserReq>,
) -> Result<(StatusCode, Json<CreatedDto>), ProblemResponse> {
    info!(username = %req.username, "Creating user");

    let id = svc
        .create_user(req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(CreatedDto { id })))
}

/// Overwrite every field of a user
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    request_body = UserReq,
    responses(
        (status = 200, description = "Stored user", body = UserDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 409, description = "Username, email or phone taken", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
    ValidatedJson(req): ValidatedJson<UserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .update_user(&id, req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(user.into()))
}

/// Delete a user by ID, returning the deleted record
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Deleted user", body = UserDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 404, description = "Not Found", body = Problem)
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    let user = svc
        .delete_user(&id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(user.into()))
}

/// Search users by username substring
#[utoipa::path(
    get,
    path = "/v1/users/search",
    tag = "users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListDto),
        (status = 500, description = "No match or store failure", body = Problem)
    )
)]
pub async fn search_users(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SearchQuery>,
    uri: Uri,
) -> Result<Json<UserListDto>, ProblemResponse> {
    let cfg = svc.config();
    let page = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve(cfg.default_page_size, cfg.max_page_size);

    let users = svc
        .search_users(&query.keyword, page)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    Ok(Json(UserListDto {
        items: users.into_iter().map(UserDto::from).collect(),
        page: page.page,
        size: page.size,
    }))
}
