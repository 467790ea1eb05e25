mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{product, TestDb};
use datasource::{Data, DataError, RepoError};
use products::domain::repo::ProductsRepository;
use products::infra::storage::sea_orm_repo::SeaOrmProductsRepository;
use products::{ProductsConfig, ProductsModule};
use serde_json::{json, Value};
use svckit::Pagination;
use tower::ServiceExt;

#[tokio::test]
async fn repository_round_trip_and_search() {
    let db = TestDb::new().await;
    let repo = SeaOrmProductsRepository::from_data(&db.data).unwrap();

    let mut lamp = product("Desk lamp", "LMP-001");
    lamp.description = Some("Warm white".into());
    let lamp_id = repo.save(lamp.clone()).await.unwrap();
    repo.save(product("Floor lamp", "LMP-002")).await.unwrap();
    repo.save(product("Chair", "CHR-001")).await.unwrap();

    assert_eq!(repo.get_by_id(&lamp_id).await.unwrap().fields(), lamp);

    let lamps = repo.search("lamp", Pagination::new(0, 10)).await.unwrap();
    assert_eq!(lamps.len(), 2);
    assert_eq!(lamps[0].id.to_string(), lamp_id);

    let second = repo.search("lamp", Pagination::new(1, 1)).await.unwrap();
    assert_eq!(second[0].sku, "LMP-002");

    assert!(matches!(
        repo.search("sofa", Pagination::new(0, 10)).await,
        Err(RepoError::ZeroRows { op: "products.search" })
    ));
}

#[tokio::test]
async fn duplicate_sku_and_idempotent_update() {
    let db = TestDb::new().await;
    let repo = SeaOrmProductsRepository::from_data(&db.data).unwrap();

    let id = repo.save(product("Desk lamp", "LMP-001")).await.unwrap();
    let err = repo
        .save(product("Other lamp", "LMP-001"))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let mut restocked = product("Desk lamp", "LMP-001");
    restocked.stock = 40;
    let once = repo.update(&id, restocked.clone()).await.unwrap();
    let twice = repo.update(&id, restocked.clone()).await.unwrap();
    assert_eq!(once.fields(), twice.fields());
    assert_eq!(twice.stock, 40);
    assert_eq!(repo.list(Pagination::new(0, 10)).await.unwrap().len(), 1);

    let deleted = repo.delete(&id).await.unwrap();
    assert_eq!(deleted.stock, 40);
    assert!(matches!(
        repo.get_by_id(&id).await,
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn module_requires_a_relational_store() {
    let err = ProductsModule::new(&Data::default(), ProductsConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, DataError::Unconfigured("relational")));
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn rest_surface() {
    let db = TestDb::new().await;
    let app = db.module().router();

    let (status, body) = send(
        &app,
        post(
            "/v1/products",
            json!({"name": "Desk lamp", "sku": "LMP-001", "price_cents": 1999, "stock": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post(
            "/v1/products",
            json!({"name": "Broken", "sku": "BRK-1", "price_cents": -1, "stock": 0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/price_cents");

    let get = Request::get(format!("/v1/products/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, get).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price_cents"], 1999);

    let search = Request::get("/v1/products/search?keyword=lamp&size=5")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, search).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], 5);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let bad = Request::delete("/v1/products/xyz").body(Body::empty()).unwrap();
    let (status, body) = send(&app, bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "products.invalid_id");
}

#[tokio::test]
async fn listing_far_past_the_end_is_an_empty_page() {
    let db = TestDb::new().await;
    let app = db.module().router();
    send(
        &app,
        post(
            "/v1/products",
            json!({"name": "Desk lamp", "sku": "LMP-001", "price_cents": 1999, "stock": 3}),
        ),
    )
    .await;

    let list = Request::get("/v1/products?page=4611686018427387904&size=2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());

    let search = Request::get(format!("/v1/products/search?keyword=lamp&page={}", i64::MAX))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, search).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "products.internal");
}
