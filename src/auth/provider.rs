use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

use super::token::AccessToken;
use super::Credentials;

const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const TOKEN_SCOPE: &str = "https://outlook.office365.com/.default";

/// Exchanges tenant/client credentials for a bearer token via the
/// client-credentials grant. Every call is a fresh round trip.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    base_url: String,
}

impl TokenClient {
    pub fn new() -> Self {
        Self::with_base_url(LOGIN_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn acquire(&self, credentials: &Credentials) -> Result<AccessToken> {
        if credentials.client_id.is_empty()
            || credentials.client_secret.is_empty()
            || credentials.tenant_id.is_empty()
        {
            return Err(Error::Auth(
                "client_id, client_secret, tenant_id must be non-empty".to_string(),
            ));
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.base_url.trim_end_matches('/'),
            credentials.tenant_id
        );

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("scope", TOKEN_SCOPE),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        debug!(tenant = %credentials.tenant_id, "requesting client-credentials token");
        let response = self.http.post(&url).form(&form).send().await?;
        parse_token_response(response).await
    }
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

async fn parse_token_response(response: reqwest::Response) -> Result<AccessToken> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body).map_err(|err| {
            Error::Auth(format!("token endpoint returned unexpected body: {err}"))
        });
    }

    let body = response.text().await.unwrap_or_default();
    if let Ok(err_payload) = serde_json::from_str::<TokenErrorResponse>(&body) {
        let error = err_payload
            .error
            .unwrap_or_else(|| "unknown_oauth_error".to_string());
        let description = err_payload
            .error_description
            .unwrap_or_else(|| "no description".to_string());
        return Err(Error::Auth(format!(
            "token request failed ({status}): {error} ({description})"
        )));
    }

    Err(Error::Auth(format!("token request failed ({status}): {body}")))
}
