use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Log, Recognition, Stub};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("x-api-key", "dummy_key")
        .body(body.to_string())
        .unwrap()
}

#[tokio::test]
async fn answers_any_path_with_stub_body() {
    let log = Log::default();
    let resp = app(Stub::ok(r#"{"state":"queued"}"#), log.clone())
        .oneshot(Request::builder().uri("/v1/recognitions/abc").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(resp).await, r#"{"state":"queued"}"#);

    let recorded = log.snapshot().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/v1/recognitions/abc");
    assert!(recorded[0].body.is_empty());
}

#[tokio::test]
async fn records_headers_and_body_of_json_post() {
    let log = Log::default();
    let resp = app(Stub::default(), log.clone())
        .oneshot(json_request("POST", "/", r#"{"data":"dummy_data"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let recognition: Recognition = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(recognition.state, "queued");

    let recorded = log.snapshot().await;
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].header("x-api-key"), Some("dummy_key"));
    assert_eq!(recorded[0].header("content-type"), Some("application/json"));
    assert_eq!(recorded[0].body_text(), r#"{"data":"dummy_data"}"#);
}

#[tokio::test]
async fn replays_configured_error_status() {
    let resp = app(
        Stub::new(StatusCode::UNPROCESSABLE_ENTITY, r#"{"title":"invalid"}"#),
        Log::default(),
    )
    .oneshot(json_request("POST", "/", "{}"))
    .await
    .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_bytes(resp).await, r#"{"title":"invalid"}"#);
}

#[tokio::test]
async fn keeps_requests_in_arrival_order() {
    use tower::Service;

    let log = Log::default();
    let mut app = app(Stub::default(), log.clone()).into_service();

    for path in ["/first", "/second"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(Request::builder().uri(path).body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let paths: Vec<String> = log.snapshot().await.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/first", "/second"]);
}
