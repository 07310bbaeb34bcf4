pub mod types;

use crate::{
    api::types::{
        ErrorBody, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        TwoFactorRequest, TwoFactorSetup,
    },
    auth::{error::AuthError, store::CredentialStore},
};
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// All auth endpoints live under this prefix on the gateway.
const AUTH_PREFIX: &str = "/users/auth";

/// Normalize the configured base URL and append an endpoint path.
#[instrument]
pub fn endpoint_url(base_url: &str, endpoint: &str) -> Result<String, AuthError> {
    let url = Url::parse(base_url)
        .map_err(|e| AuthError::Config(format!("invalid API URL {base_url}: {e}")))?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| AuthError::Config(format!("invalid API URL {base_url}: no host")))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => {
                return Err(AuthError::Config(format!(
                    "invalid API URL {base_url}: unsupported scheme {scheme}"
                )))
            }
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{AUTH_PREFIX}{endpoint}");

    debug!("endpoint URL: {}", endpoint);

    Ok(endpoint_url)
}

/// HTTP client for the GraphFlix auth API. Every request passes through one
/// send path that attaches the current bearer credential, so callers never
/// handle tokens themselves.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: CredentialStore,
}

impl ApiClient {
    /// Build a client against `base_url`. The URL is validated here so later
    /// calls can only fail on transport or protocol grounds.
    pub fn new(base_url: &str, store: CredentialStore) -> Result<Self, AuthError> {
        endpoint_url(base_url, "/login")?;

        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            store,
        })
    }

    /// POST `body` to an auth endpoint. The credential lookup happens here,
    /// at send time, so a token persisted or cleared after this client was
    /// built is still honored. No token is a valid case; the header is simply
    /// omitted.
    #[instrument(skip(self, body))]
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, AuthError> {
        let url = endpoint_url(&self.base_url, endpoint)?;

        let mut request = self.http.post(&url).json(body);

        if let Some(token) = self.store.bearer_token() {
            request = request.bearer_auth(token.expose_secret());
        }

        Ok(request.send().await?)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let response = self.post("/login", request).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(unexpected(status, response).await),
        }
    }

    /// Registration returns a plain-text confirmation, not JSON.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, AuthError> {
        let response = self.post("/register", request).await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            Err(unexpected(status, response).await)
        }
    }

    /// Sends the code under the pending-challenge bearer token; the endpoint
    /// rejects full session tokens.
    pub async fn verify_two_factor(&self, code: &str) -> Result<LoginResponse, AuthError> {
        let request = TwoFactorRequest {
            code: code.to_string(),
        };
        let response = self.post("/verify-2fa", &request).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCode),
            StatusCode::BAD_REQUEST => Err(AuthError::InvalidRequest(error_message(response).await)),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(unexpected(status, response).await),
        }
    }

    pub async fn setup_two_factor(&self) -> Result<TwoFactorSetup, AuthError> {
        let response = self.post("/2fa/setup", &serde_json::json!({})).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AuthError::Unauthenticated),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(unexpected(status, response).await),
        }
    }

    pub async fn enable_two_factor(&self, code: &str) -> Result<MessageResponse, AuthError> {
        self.two_factor_flag("/2fa/enable", code).await
    }

    pub async fn disable_two_factor(&self, code: &str) -> Result<MessageResponse, AuthError> {
        self.two_factor_flag("/2fa/disable", code).await
    }

    async fn two_factor_flag(
        &self,
        endpoint: &str,
        code: &str,
    ) -> Result<MessageResponse, AuthError> {
        let request = TwoFactorRequest {
            code: code.to_string(),
        };
        let response = self.post(endpoint, &request).await?;

        match response.status() {
            // enable/disable report a bad code as 400
            StatusCode::BAD_REQUEST => Err(AuthError::InvalidCode),
            StatusCode::UNAUTHORIZED => Err(AuthError::Unauthenticated),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(unexpected(status, response).await),
        }
    }
}

/// Best-effort extraction of the `error` field from a 400 body.
async fn error_message(response: Response) -> String {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| "invalid request".to_string())
}

async fn unexpected(status: StatusCode, response: Response) -> AuthError {
    let message = response.text().await.unwrap_or_default();

    AuthError::Api {
        status: status.as_u16(),
        message,
    }
}
