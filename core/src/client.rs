//! Authenticated, paginating client for the StubHub search API.
//!
//! # Design
//! `StubhubClient` authenticates once in its constructor and then holds the
//! bearer token, the base URL and a header mapping for its whole lifetime.
//! Requests are built by `auth` and `search` as plain data and executed by
//! the owned `Transport`, one at a time: page N+1 is only requested after
//! page N has been merged.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::auth::{build_token_request, parse_token_response, TokenResponse};
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::join_url;
use crate::params::SearchParams;
use crate::search::{
    build_search_request, merge_page, num_found, page_count, page_offsets, parse_page, Page,
    SearchSurface,
};
use crate::transport::{Transport, UreqTransport};

/// Client for the location, event and venue searches.
#[derive(Debug)]
pub struct StubhubClient<T: Transport = UreqTransport> {
    base_url: String,
    token: TokenResponse,
    headers: BTreeMap<String, String>,
    transport: T,
}

impl StubhubClient<UreqTransport> {
    /// Authenticate over a blocking ureq transport.
    pub fn connect(config: ClientConfig) -> Result<Self, ApiError> {
        Self::new(config, UreqTransport::new())
    }
}

impl<T: Transport> StubhubClient<T> {
    /// Resolve credentials, exchange them for a bearer token and build the
    /// default headers. Token endpoint failures are returned as-is.
    pub fn new(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let credentials = Credentials::load(&config.credentials)?;
        Self::with_credentials(config, &credentials, transport)
    }

    /// Like [`StubhubClient::new`] with credentials already resolved.
    pub fn with_credentials(
        config: ClientConfig,
        credentials: &Credentials,
        mut transport: T,
    ) -> Result<Self, ApiError> {
        let request = build_token_request(
            &config.base_url,
            credentials,
            config.grant_type,
            config.scope.as_deref(),
        )?;
        let token = parse_token_response(transport.execute(request)?)?;
        info!(grant = %config.grant_type, "Obtained access token");

        let mut headers = BTreeMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", token.access_token),
        );
        headers.insert("Accept".to_string(), "application/json".to_string());

        Ok(Self {
            base_url: config.base_url,
            token,
            headers,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path` on this client's API host.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn token(&self) -> &TokenResponse {
        &self.token
    }

    /// A field of the token response by name.
    pub fn token_field(&self, name: &str) -> Option<&serde_json::Value> {
        self.token.get(name)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header sent with every search. Names compare
    /// case-insensitively.
    pub fn set_header(&mut self, name: &str, value: &str) -> Option<String> {
        let previous = self.remove_header(name);
        self.headers.insert(name.to_string(), value.to_string());
        previous
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let key = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()?;
        self.headers.remove(&key)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Search for locations (cities, regions) matching `params`.
    pub fn search_locations(&mut self, params: SearchParams) -> Result<Page, ApiError> {
        self.search(SearchSurface::Locations, params)
    }

    pub fn search_events(&mut self, params: SearchParams) -> Result<Page, ApiError> {
        self.search(SearchSurface::Events, params)
    }

    pub fn search_venues(&mut self, params: SearchParams) -> Result<Page, ApiError> {
        self.search(SearchSurface::Venues, params)
    }

    /// Validate `params`, fetch every page of `surface` and merge them.
    ///
    /// Disallowed parameters fail before any request is sent. A non-200
    /// response on any page yields an empty mapping rather than an error.
    pub fn search(
        &mut self,
        surface: SearchSurface,
        params: SearchParams,
    ) -> Result<Page, ApiError> {
        let mut params = params;
        params.validate(surface.allowed_params())?;
        params.default_rows();
        let rows = params.rows()?;

        let headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let request = build_search_request(&self.base_url, surface, &params, None, &headers);
        let response = self.transport.execute(request)?;
        if response.status != 200 {
            warn!(
                %surface,
                status = response.status,
                body = %response.body,
                "Could not retrieve {surface}"
            );
            return Ok(Page::new());
        }

        let mut pages = parse_page(&response.body)?;
        let total = num_found(&pages)?;
        let pages_needed = page_count(total, rows);
        debug!(%surface, total, rows, pages = pages_needed, "Fetched first page");

        for offset in page_offsets(total, rows) {
            let request =
                build_search_request(&self.base_url, surface, &params, Some(offset), &headers);
            let response = self.transport.execute(request)?;
            if response.status != 200 {
                warn!(
                    %surface,
                    offset,
                    status = response.status,
                    "Could not retrieve {surface} page"
                );
                return Ok(Page::new());
            }
            merge_page(&mut pages, parse_page(&response.body)?, surface.list_field())?;
            debug!(%surface, offset, "Merged page");
        }

        Ok(pages)
    }
}
