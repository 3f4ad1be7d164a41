//! Synchronous client for the StubHub search API.
//!
//! # Overview
//! Authenticates with an OAuth client-credentials or password grant, then
//! runs location, event and venue searches, fetching every page of a result
//! set and merging them into one JSON object.
//!
//! # Design
//! - `auth` and `search` build `HttpRequest` values and parse `HttpResponse`
//!   values as plain data; `Transport` executes them (`UreqTransport` over
//!   blocking ureq, or any fake in tests).
//! - `StubhubClient` owns the transport, the bearer token and the session
//!   headers, and drives the sequential pagination loop.
//! - Failures are typed `ApiError` values. A non-200 search response is
//!   logged and returned as an empty mapping.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod params;
pub mod search;
pub mod transport;

pub use auth::{GrantType, TokenResponse};
pub use client::StubhubClient;
pub use config::ClientConfig;
pub use credentials::{basic_token, Credentials, CredentialsConfig};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{SearchParams, DEFAULT_ROWS};
pub use search::{Page, SearchSurface};
pub use transport::{Transport, UreqTransport};
