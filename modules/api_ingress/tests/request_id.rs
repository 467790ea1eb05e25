use api_ingress::request_id::{self, CorrelationId, REQUEST_ID_HEADER};
use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};
use tower::ServiceExt;

async fn echo(Extension(CorrelationId(id)): Extension<CorrelationId>) -> String {
    id
}

fn app() -> Router {
    Router::new()
        .route("/echo", get(echo))
        .layer(from_fn(request_id::record_correlation_id))
        .layer(request_id::propagate_layer())
        .layer(request_id::set_layer())
}

async fn call(req: Request<Body>) -> (Option<String>, String) {
    let resp = app().oneshot(req).await.unwrap();
    let header = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (header, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn generated_id_reaches_handler_and_response() {
    let (header, seen) = call(Request::get("/echo").body(Body::empty()).unwrap()).await;

    let header = header.expect("id is generated");
    assert_eq!(header.len(), 21);
    assert_eq!(seen, header);
}

#[tokio::test]
async fn caller_id_is_kept() {
    let req = Request::get("/echo")
        .header("x-request-id", "order-7f3a")
        .body(Body::empty())
        .unwrap();
    let (header, seen) = call(req).await;

    assert_eq!(header.as_deref(), Some("order-7f3a"));
    assert_eq!(seen, "order-7f3a");
}

#[tokio::test]
async fn ids_differ_between_calls() {
    let (a, _) = call(Request::get("/echo").body(Body::empty()).unwrap()).await;
    let (b, _) = call(Request::get("/echo").body(Body::empty()).unwrap()).await;
    assert_ne!(a, b);
}
