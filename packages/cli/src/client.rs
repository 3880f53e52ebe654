// ABOUTME: HTTP client for the OKRDesk API used by the sign-in commands
// ABOUTME: Unwraps the response envelope and surfaces API error codes

use okrdesk_api::auth_handlers::LoginResponse;
use okrdesk_core::PublicUser;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<Value>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> CliResult<LoginResponse> {
        let request = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        send(request).await
    }

    pub async fn logout(&self, token: &str) -> CliResult<()> {
        let request = self.http.post(self.url("/api/auth/logout")).bearer_auth(token);
        send::<Value>(request).await.map(|_| ())
    }

    pub async fn me(&self, token: &str) -> CliResult<PublicUser> {
        let request = self.http.get(self.url("/api/auth/me")).bearer_auth(token);
        send(request).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> CliResult<T> {
    let response = request.send().await?;
    let status = response.status();
    debug!("API responded with {}", status);

    let body: Envelope<T> = response
        .json()
        .await
        .map_err(|e| CliError::UnexpectedResponse(e.to_string()))?;

    if !status.is_success() || !body.success {
        return Err(api_error(status.as_u16(), body.error));
    }

    body.data
        .ok_or_else(|| CliError::UnexpectedResponse("response carried no data".to_string()))
}

fn api_error(status: u16, error: Option<Value>) -> CliError {
    let field = |name: &str| {
        error
            .as_ref()
            .and_then(|e| e.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = field("message")
        .or_else(|| error.as_ref().and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());

    CliError::Api {
        status,
        code: field("code").unwrap_or_else(|| "UNKNOWN".to_string()),
        message,
    }
}
