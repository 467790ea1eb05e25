use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use svckit::{PageQuery, Problem, ProblemResponse, ValidatedJson};

use crate::api::rest::dto::{CreatedDto, ProductDto, ProductListDto, ProductReq, SearchQuery};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

#[utoipa::path(
    get,
    path = "/v1/products",
    tag = "products",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of products", body = ProductListDto),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn list_products(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Json<ProductListDto>, ProblemResponse> {
    let cfg = svc.config();
    let page = query.resolve(cfg.default_page_size, cfg.max_page_size);
    let items = svc
        .list_products(page)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(ProductListDto {
        items: items.into_iter().map(ProductDto::from).collect(),
        page: page.page,
        size: page.size,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 404, description = "Not Found", body = Problem)
    )
)]
pub async fn get_product(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<ProductDto>, ProblemResponse> {
    svc.get_product(&id)
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

#[utoipa::path(
    post,
    path = "/v1/products",
    tag = "products",
    request_body = ProductReq,
    responses(
        (status = 201, description = "Created", body = CreatedDto),
        (status = 409, description = "SKU taken", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn create_product(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    ValidatedJson(req): ValidatedJson<ProductReq>,
) -> Result<(StatusCode, Json<CreatedDto>), ProblemResponse> {
    let id = svc
        .create_product(req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(CreatedDto { id })))
}

#[utoipa::path(
    put,
    path = "/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product UUID")),
    request_body = ProductReq,
    responses(
        (status = 200, description = "Stored product", body = ProductDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 409, description = "SKU taken", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn update_product(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
    ValidatedJson(req): ValidatedJson<ProductReq>,
) -> Result<Json<ProductDto>, ProblemResponse> {
    svc.update_product(&id, req.into())
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

#[utoipa::path(
    delete,
    path = "/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Deleted product", body = ProductDto),
        (status = 400, description = "Malformed identifier", body = Problem),
        (status = 404, description = "Not Found", body = Problem)
    )
)]
pub async fn delete_product(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<ProductDto>, ProblemResponse> {
    svc.delete_product(&id)
        .await
        .map(|p| Json(p.into()))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

#[utoipa::path(
    get,
    path = "/v1/products/search",
    tag = "products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = ProductListDto),
        (status = 500, description = "No match or store failure", body = Problem)
    )
)]
pub async fn search_products(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SearchQuery>,
    uri: Uri,
) -> Result<Json<ProductListDto>, ProblemResponse> {
    let cfg = svc.config();
    let page = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve(cfg.default_page_size, cfg.max_page_size);

    let items = svc
        .search_products(&query.keyword, page)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(ProductListDto {
        items: items.into_iter().map(ProductDto::from).collect(),
        page: page.page,
        size: page.size,
    }))
}
