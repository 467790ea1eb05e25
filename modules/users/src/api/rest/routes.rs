use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use svckit::api::problem::ValidationError;
use svckit::Problem;
use utoipa::OpenApi;

use crate::api::rest::dto::{CreatedDto, UserDto, UserListDto, UserReq};
use crate::api::rest::handlers;
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::search_users
    ),
    components(schemas(UserDto, UserReq, CreatedDto, UserListDto, Problem, ValidationError)),
    tags((name = "users", description = "User management"))
)]
pub struct UsersApi;

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/v1/users",
            post(handlers::create_user).get(handlers::list_users),
        )
        .route("/v1/users/search", get(handlers::search_users))
        .route(
            "/v1/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service))
}
