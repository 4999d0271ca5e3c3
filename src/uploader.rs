use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::api::models::Attachment;
use crate::api::MailClient;
use crate::error::{Error, Result};
use crate::storage::ObjectStore;

/// Writes each attachment to the bucket in sequence, then flips the message's
/// read flag. The flag only flips once every attachment in the batch is
/// stored; an empty batch leaves the message untouched. No rollback: a
/// failure mid-batch leaves earlier objects in the bucket and the message
/// unread.
pub async fn upload_and_mark_read<S: ObjectStore>(
    mail: &MailClient,
    access_token: &str,
    mailbox: &str,
    message_id: &str,
    attachments: &[Attachment],
    store: &S,
    bucket: &str,
) -> Result<u32> {
    let mut uploaded = 0u32;

    for attachment in attachments {
        let body = decode_payload(attachment)?;
        store
            .put_object(
                bucket,
                &attachment.file_name,
                body,
                attachment.content_type.as_deref(),
            )
            .await?;
        uploaded += 1;
        debug!(message_id, file = %attachment.file_name, "attachment uploaded");
    }

    if !attachments.is_empty() {
        mail.mark_read(access_token, mailbox, message_id).await?;
    }

    Ok(uploaded)
}

fn decode_payload(attachment: &Attachment) -> Result<Vec<u8>> {
    STANDARD
        .decode(&attachment.content_bytes_base64)
        .map_err(|err| {
            Error::Upstream(format!(
                "attachment {} carries invalid base64: {err}",
                attachment.file_name
            ))
        })
}
