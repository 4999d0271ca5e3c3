pub mod provider;
pub mod token;

pub use provider::TokenClient;
pub use token::AccessToken;

/// Client-credentials grant material for one tenant-scoped app registration.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}
