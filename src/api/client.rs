use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::messages::{self, ListFilter};
use super::models::{Attachment, MessageSummary};

const OUTLOOK_API_BASE_URL: &str = "https://outlook.office365.com";

/// Client for the Outlook REST v2.0 message endpoints. Holds no mailbox or
/// token state; both are arguments on every call.
#[derive(Debug, Clone)]
pub struct MailClient {
    http: Client,
    base_url: String,
}

impl MailClient {
    pub fn new() -> Self {
        Self::with_base_url(OUTLOOK_API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Lists one page of messages from the mailbox; the server applies the
    /// filter, the crate never follows a next-page link.
    pub async fn list_messages(
        &self,
        access_token: &str,
        mailbox: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageSummary>> {
        let endpoint = messages::messages_endpoint(mailbox);
        let query = messages::filter_query(filter);
        let response: CollectionResponse<MessageSummary> = self
            .get_json(&endpoint, access_token, query.as_deref())
            .await?;

        let messages = response.value.unwrap_or_default();
        debug!(mailbox, count = messages.len(), "listed messages");
        Ok(messages)
    }

    /// Fetches the attachment collection of one message, in provider order.
    pub async fn list_attachments(
        &self,
        access_token: &str,
        mailbox: &str,
        message_id: &str,
    ) -> Result<Vec<Attachment>> {
        let endpoint = messages::attachments_endpoint(mailbox, message_id);
        let response: CollectionResponse<AttachmentResource> =
            self.get_json(&endpoint, access_token, None).await?;

        let attachments = response
            .value
            .unwrap_or_default()
            .into_iter()
            .map(|resource| resource.into_attachment(message_id))
            .collect::<Vec<_>>();

        debug!(message_id, count = attachments.len(), "listed attachments");
        Ok(attachments)
    }

    /// Flips the message's read flag on the server.
    pub async fn mark_read(
        &self,
        access_token: &str,
        mailbox: &str,
        message_id: &str,
    ) -> Result<()> {
        let endpoint = messages::message_endpoint(mailbox, message_id);
        let url = self.endpoint_url(&endpoint)?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(access_token)
            .json(&MarkReadRequest { is_read: true })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(message_id, "marked message read");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query: Option<&[(String, String)]>,
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http.get(url).bearer_auth(access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(map_api_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|err| Error::Upstream(format!("unexpected response body: {err}")))
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }
}

impl Default for MailClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CollectionResponse<T> {
    value: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct AttachmentResource {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ContentBytes")]
    content_bytes: Option<String>,
    #[serde(rename = "ContentType")]
    content_type: Option<String>,
}

impl AttachmentResource {
    fn into_attachment(self, message_id: &str) -> Attachment {
        Attachment {
            message_id: message_id.to_string(),
            file_name: self.name,
            content_bytes_base64: self.content_bytes.unwrap_or_default(),
            content_type: self.content_type,
        }
    }
}

#[derive(Debug, Serialize)]
struct MarkReadRequest {
    #[serde(rename = "IsRead")]
    is_read: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
}

fn map_api_error(status: StatusCode, body: &str) -> Error {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    Error::Upstream(format!("mail api request failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
