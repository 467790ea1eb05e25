use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use svckit::api::problem::ValidationError;
use svckit::Problem;
use utoipa::OpenApi;

use crate::api::rest::dto::{CreatedDto, ProductDto, ProductListDto, ProductReq};
use crate::api::rest::handlers;
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_products,
        handlers::get_product,
        handlers::create_product,
        handlers::update_product,
        handlers::delete_product,
        handlers::search_products
    ),
    components(schemas(ProductDto, ProductReq, CreatedDto, ProductListDto, Problem, ValidationError)),
    tags((name = "products", description = "Product catalogue"))
)]
pub struct ProductsApi;

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/v1/products",
            post(handlers::create_product).get(handlers::list_products),
        )
        .route("/v1/products/search", get(handlers::search_products))
        .route(
            "/v1/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(Extension(service))
}
