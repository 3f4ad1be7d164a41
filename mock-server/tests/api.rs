use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, state, MockConfig};
use serde_json::Value;
use tower::ServiceExt;

const BASIC: &str = "Basic a2V5OnNlY3JldA==";
const BEARER: &str = "Bearer mock-access-token";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn token_request(
    uri: &str,
    authorization: &str,
    content_type: &str,
    body: &str,
) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::AUTHORIZATION, authorization)
        .header(http::header::CONTENT_TYPE, content_type)
        .body(body.to_string())
        .unwrap()
}

fn search_request(uri: &str, authorization: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, authorization)
        .body(String::new())
        .unwrap()
}

// --- token ---

#[tokio::test]
async fn client_credentials_grant_returns_token() {
    let resp = app()
        .oneshot(token_request(
            "/sellers/oauth/accesstoken?grant_type=client_credentials",
            BASIC,
            "application/json",
            r#"{"username":"u","password":"p"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["access_token"], "mock-access-token");
    assert_eq!(body["grant_type"], "client_credentials");
}

#[tokio::test]
async fn password_grant_reads_form_body() {
    let resp = app()
        .oneshot(token_request(
            "/sellers/oauth/accesstoken",
            BASIC,
            "application/x-www-form-urlencoded",
            "grant_type=password&username=u&password=p",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["grant_type"], "password");
}

#[tokio::test]
async fn wrong_basic_token_is_unauthorized() {
    let resp = app()
        .oneshot(token_request(
            "/sellers/oauth/accesstoken?grant_type=client_credentials",
            "Basic bm9wZTpub3Bl",
            "application/json",
            "{}",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "invalid_client");
}

#[tokio::test]
async fn missing_grant_type_is_bad_request() {
    let resp = app()
        .oneshot(token_request("/sellers/oauth/accesstoken", BASIC, "application/json", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- search ---

#[tokio::test]
async fn search_pages_by_start_and_rows() {
    let resp = app()
        .oneshot(search_request(
            "/sellers/search/events/v3?rows=500&start=1000",
            BEARER,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["numFound"], 1200);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 200);
    assert_eq!(events[0]["id"], 1000);
}

#[tokio::test]
async fn search_defaults_to_server_page_size() {
    let resp = app()
        .oneshot(search_request("/sellers/search/events/v3", BEARER))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn start_past_the_end_returns_empty_list() {
    let resp = app()
        .oneshot(search_request("/sellers/search/locations/v3?start=50", BEARER))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["numFound"], 3);
    assert!(body["locations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_without_bearer_is_unauthorized() {
    let resp = app()
        .oneshot(search_request("/sellers/search/venues/v3", "Bearer stale"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn unknown_surface_is_not_found() {
    let resp = app()
        .oneshot(search_request("/sellers/search/tickets/v3", BEARER))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_rows_is_bad_request() {
    let resp = app()
        .oneshot(search_request("/sellers/search/events/v3?rows=many", BEARER))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_are_recorded() {
    let db = state(MockConfig {
        venues: 7,
        ..MockConfig::default()
    });
    let resp = app_with(db.clone())
        .oneshot(search_request("/sellers/search/venues/v3?rows=5&q=Hall", BEARER))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["venues"].as_array().unwrap().len(), 5);

    let requests = db.requests.read().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/sellers/search/venues/v3");
    assert_eq!(requests[0].query.get("q").map(String::as_str), Some("Hall"));
}
