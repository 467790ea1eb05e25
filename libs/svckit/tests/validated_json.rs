use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use svckit::ValidatedJson;
use tower::ServiceExt;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
struct Signup {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
}

async fn signup(ValidatedJson(body): ValidatedJson<Signup>) -> String {
    format!("{} <{}>", body.name, body.email)
}

fn app() -> Router {
    Router::new().route("/signup", post(signup))
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_payload_reaches_handler() {
    let resp = app()
        .oneshot(json_request(r#"{"email":"a@x.com","name":"alice"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"alice <a@x.com>");
}

#[tokio::test]
async fn rule_violations_become_422_with_pointers() {
    let resp = app()
        .oneshot(json_request(r#"{"email":"nope","name":""}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );

    let body = body_json(resp).await;
    assert_eq!(body["code"], "request.validation");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["pointer"], "/email");
    assert_eq!(errors[1]["pointer"], "/name");
    assert_eq!(errors[1]["detail"], "name must not be empty");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let resp = app().oneshot(json_request("{not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["title"], "Invalid request body");
}
