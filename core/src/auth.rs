//! OAuth token exchange.
//!
//! Both grants POST to the same endpoint with `Authorization: Basic
//! <basic_token>`. Client credentials send the username/password as JSON
//! with `grant_type` in the query string; the password grant sends a
//! form-encoded body.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{join_url, HttpRequest, HttpResponse};

pub const TOKEN_PATH: &str = "/sellers/oauth/accesstoken";

/// OAuth grant used for the token exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrantType {
    #[default]
    ClientCredentials,
    Password,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::Password => "password",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "client_credentials" => Ok(GrantType::ClientCredentials),
            "password" => Ok(GrantType::Password),
            other => Err(format!("unknown grant type: {other}")),
        }
    }
}

/// Parsed token endpoint body. Every field is kept, not just the token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    fields: Map<String, Value>,
}

impl TokenResponse {
    /// Any field of the token response, e.g. `expires_in` or `token_type`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

pub fn build_token_request(
    base_url: &str,
    credentials: &Credentials,
    grant: GrantType,
    scope: Option<&str>,
) -> Result<HttpRequest, ApiError> {
    let url = join_url(base_url, TOKEN_PATH);
    let authorization = format!("Basic {}", credentials.basic_token);

    let request = match grant {
        GrantType::ClientCredentials => {
            let body = serde_json::to_string(&serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            let mut request = HttpRequest::post(url, body);
            request
                .query
                .push(("grant_type".to_string(), grant.as_str().to_string()));
            request
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
            request.headers.push(("Authorization".to_string(), authorization));
            request
        }
        GrantType::Password => {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("grant_type", grant.as_str());
            form.append_pair("username", &credentials.username);
            form.append_pair("password", &credentials.password);
            if let Some(scope) = scope {
                form.append_pair("scope", scope);
            }
            let mut request = HttpRequest::post(url, form.finish());
            request.headers.push((
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ));
            request.headers.push(("Authorization".to_string(), authorization));
            request
        }
    };
    Ok(request)
}

pub fn parse_token_response(response: HttpResponse) -> Result<TokenResponse, ApiError> {
    if !response.is_success() {
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body,
        });
    }

    let fields: Map<String, Value> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    let access_token = fields
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ApiError::DeserializationError("token response has no `access_token`".to_string())
        })?
        .to_string();

    Ok(TokenResponse {
        access_token,
        fields,
    })
}
