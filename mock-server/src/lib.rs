use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Page size the server applies when the client sends no `rows`.
pub const SERVER_DEFAULT_ROWS: u64 = 10;

/// What the mock server accepts and how many results it holds per surface.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub basic_token: String,
    pub access_token: String,
    pub locations: u64,
    pub events: u64,
    pub venues: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            // base64("key:secret")
            basic_token: "a2V5OnNlY3JldA==".to_string(),
            access_token: "mock-access-token".to_string(),
            locations: 3,
            events: 1200,
            venues: 0,
        }
    }
}

/// A request the server has seen, kept for assertions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug)]
pub struct MockState {
    pub config: MockConfig,
    pub requests: RwLock<Vec<RecordedRequest>>,
}

pub type Db = Arc<MockState>;

pub fn state(config: MockConfig) -> Db {
    Arc::new(MockState {
        config,
        requests: RwLock::new(Vec::new()),
    })
}

pub fn app() -> Router {
    app_with(state(MockConfig::default()))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/sellers/oauth/accesstoken", post(access_token))
        .route("/sellers/search/{surface}/v3", get(search))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()
}

async fn access_token(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db.requests.write().await.push(RecordedRequest {
        method: "POST".to_string(),
        path: "/sellers/oauth/accesstoken".to_string(),
        query: query.clone(),
    });

    let expected = format!("Basic {}", db.config.basic_token);
    if authorization(&headers) != Some(expected.as_str()) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        ));
    }

    let grant = match query.get("grant_type") {
        Some(grant) => grant.clone(),
        None => body
            .split('&')
            .find_map(|pair| pair.strip_prefix("grant_type="))
            .unwrap_or_default()
            .to_string(),
    };
    if grant != "client_credentials" && grant != "password" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        ));
    }

    Ok(Json(json!({
        "access_token": db.config.access_token,
        "token_type": "bearer",
        "expires_in": 15552000,
        "refresh_token": "mock-refresh-token",
        "grant_type": grant,
    })))
}

async fn search(
    State(db): State<Db>,
    Path(surface): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    db.requests.write().await.push(RecordedRequest {
        method: "GET".to_string(),
        path: format!("/sellers/search/{surface}/v3"),
        query: query.clone(),
    });

    let expected = format!("Bearer {}", db.config.access_token);
    if authorization(&headers) != Some(expected.as_str()) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let num_found = match surface.as_str() {
        "locations" => db.config.locations,
        "events" => db.config.events,
        "venues" => db.config.venues,
        _ => return Err(StatusCode::NOT_FOUND),
    };
    let parse = |name: &str, default: u64| -> Result<u64, StatusCode> {
        match query.get(name) {
            Some(raw) => raw.parse().map_err(|_| StatusCode::BAD_REQUEST),
            None => Ok(default),
        }
    };
    let start = parse("start", 0)?;
    let rows = parse("rows", SERVER_DEFAULT_ROWS)?;

    let end = start.saturating_add(rows).min(num_found);
    let items: Vec<Value> = (start.min(end)..end)
        .map(|id| json!({"id": id, "name": format!("{surface} #{id}")}))
        .collect();

    let mut page = serde_json::Map::new();
    page.insert("numFound".to_string(), json!(num_found));
    page.insert(surface, Value::Array(items));
    Ok(Json(Value::Object(page)))
}
