use serde::Deserialize;

/// Token endpoint response, kept as the provider returned it. Held only for
/// the duration of one orchestrated call; never cached or persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub ext_expires_in: Option<u64>,
}

impl AccessToken {
    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}
