use serde::{Deserialize, Serialize};

/// Read-only projection of a provider message resource. Fields the crate
/// never inspects are kept in `extra` so callers still see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Subject")]
    pub subject: Option<String>,
    #[serde(rename = "IsRead")]
    pub is_read: Option<bool>,
    #[serde(rename = "HasAttachments")]
    pub has_attachments: Option<bool>,
    #[serde(rename = "ReceivedDateTime")]
    pub received_date_time: Option<String>,
    #[serde(rename = "BodyPreview")]
    pub body_preview: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One attachment of one message, payload still base64 as the provider
/// returned it. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub message_id: String,
    pub file_name: String,
    pub content_bytes_base64: String,
    pub content_type: Option<String>,
}
