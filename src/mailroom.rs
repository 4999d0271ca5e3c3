use tracing::info;

use crate::api::messages::ListFilter;
use crate::api::models::{Attachment, MessageSummary};
use crate::api::MailClient;
use crate::auth::{Credentials, TokenClient};
use crate::error::{Error, Result};
use crate::storage::{ObjectStore, S3Store, StorageTarget};
use crate::uploader;

/// The five public entry points over one mailbox pass. Holds only endpoint
/// configuration; every call validates its arguments, acquires one fresh
/// token, then issues its requests sequentially.
#[derive(Debug, Clone)]
pub struct Mailroom {
    tokens: TokenClient,
    mail: MailClient,
}

impl Mailroom {
    pub fn new() -> Self {
        Self {
            tokens: TokenClient::new(),
            mail: MailClient::new(),
        }
    }

    /// Points both the token grant and the mail API at alternate bases.
    pub fn with_endpoints(
        login_base_url: impl Into<String>,
        mail_base_url: impl Into<String>,
    ) -> Self {
        Self {
            tokens: TokenClient::with_base_url(login_base_url),
            mail: MailClient::with_base_url(mail_base_url),
        }
    }

    /// Lists unread messages in the mailbox. The mailbox itself is not a
    /// validated field here; an empty one surfaces as an upstream failure.
    pub async fn fetch_unread_emails(
        &self,
        credentials: &Credentials,
        mailbox: &str,
    ) -> Result<Vec<MessageSummary>> {
        require_fields(&credential_fields(credentials))?;

        let token = self.tokens.acquire(credentials).await?;
        self.mail
            .list_messages(token.bearer(), mailbox, ListFilter::Unread)
            .await
    }

    /// Lists unread messages that carry at least one attachment.
    pub async fn fetch_unread_emails_with_attachments(
        &self,
        credentials: &Credentials,
        mailbox: &str,
    ) -> Result<Vec<MessageSummary>> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        require_fields(&fields)?;

        let token = self.tokens.acquire(credentials).await?;
        self.mail
            .list_messages(token.bearer(), mailbox, ListFilter::UnreadWithAttachments)
            .await
    }

    /// Lists one page of the mailbox under an explicit filter, for callers
    /// that want something other than the unread views above.
    pub async fn list_messages(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageSummary>> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        require_fields(&fields)?;

        let token = self.tokens.acquire(credentials).await?;
        self.mail.list_messages(token.bearer(), mailbox, filter).await
    }

    /// Fetches one message's attachments, payloads still base64.
    pub async fn read_attachments(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        message_id: &str,
    ) -> Result<Vec<Attachment>> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        fields.push(("message_id", message_id));
        require_fields(&fields)?;

        let token = self.tokens.acquire(credentials).await?;
        self.mail
            .list_attachments(token.bearer(), mailbox, message_id)
            .await
    }

    /// Uploads one message's attachments to the S3 bucket and marks the
    /// message read. Returns the number of attachments uploaded.
    pub async fn save_message_attachments(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        message_id: &str,
        target: &StorageTarget,
    ) -> Result<u32> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        fields.push(("message_id", message_id));
        fields.extend(storage_fields(target));
        require_fields(&fields)?;

        let store = S3Store::connect(target);
        self.save_message(credentials, mailbox, message_id, &store, &target.bucket)
            .await
    }

    /// Same pass as [`Mailroom::save_message_attachments`], writing through a
    /// caller-supplied store instead of S3.
    pub async fn save_message_attachments_to<S: ObjectStore>(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        message_id: &str,
        store: &S,
        bucket: &str,
    ) -> Result<u32> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        fields.push(("message_id", message_id));
        fields.push(("bucket", bucket));
        require_fields(&fields)?;

        self.save_message(credentials, mailbox, message_id, store, bucket)
            .await
    }

    /// Uploads the attachments of every unread message to the S3 bucket,
    /// marking each message read after its own batch. Messages are processed
    /// strictly one at a time, in listing order. Returns the summed count.
    pub async fn save_unread_attachments(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        target: &StorageTarget,
    ) -> Result<u32> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        fields.extend(storage_fields(target));
        require_fields(&fields)?;

        let store = S3Store::connect(target);
        self.save_unread(credentials, mailbox, &store, &target.bucket)
            .await
    }

    /// Same pass as [`Mailroom::save_unread_attachments`], writing through a
    /// caller-supplied store instead of S3.
    pub async fn save_unread_attachments_to<S: ObjectStore>(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        store: &S,
        bucket: &str,
    ) -> Result<u32> {
        let mut fields = credential_fields(credentials);
        fields.push(("mailbox", mailbox));
        fields.push(("bucket", bucket));
        require_fields(&fields)?;

        self.save_unread(credentials, mailbox, store, bucket).await
    }

    async fn save_message<S: ObjectStore>(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        message_id: &str,
        store: &S,
        bucket: &str,
    ) -> Result<u32> {
        let token = self.tokens.acquire(credentials).await?;
        let attachments = self
            .mail
            .list_attachments(token.bearer(), mailbox, message_id)
            .await?;

        let uploaded = uploader::upload_and_mark_read(
            &self.mail,
            token.bearer(),
            mailbox,
            message_id,
            &attachments,
            store,
            bucket,
        )
        .await?;

        info!(message_id, uploaded, "message attachments saved");
        Ok(uploaded)
    }

    async fn save_unread<S: ObjectStore>(
        &self,
        credentials: &Credentials,
        mailbox: &str,
        store: &S,
        bucket: &str,
    ) -> Result<u32> {
        let token = self.tokens.acquire(credentials).await?;
        let messages = self
            .mail
            .list_messages(token.bearer(), mailbox, ListFilter::UnreadWithAttachments)
            .await?;

        let mut total = 0u32;
        for message in &messages {
            let attachments = self
                .mail
                .list_attachments(token.bearer(), mailbox, &message.id)
                .await?;
            total += uploader::upload_and_mark_read(
                &self.mail,
                token.bearer(),
                mailbox,
                &message.id,
                &attachments,
                store,
                bucket,
            )
            .await?;
        }

        info!(mailbox, messages = messages.len(), total, "mailbox pass complete");
        Ok(total)
    }
}

impl Default for Mailroom {
    fn default() -> Self {
        Self::new()
    }
}

fn credential_fields<'a>(credentials: &'a Credentials) -> Vec<(&'static str, &'a str)> {
    vec![
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("tenant_id", credentials.tenant_id.as_str()),
    ]
}

fn storage_fields<'a>(target: &'a StorageTarget) -> Vec<(&'static str, &'a str)> {
    vec![
        ("access_key_id", target.access_key_id.as_str()),
        ("secret_access_key", target.secret_access_key.as_str()),
        ("bucket", target.bucket.as_str()),
    ]
}

fn require_fields(fields: &[(&str, &str)]) -> Result<()> {
    let missing = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();

    if missing.is_empty() {
        return Ok(());
    }

    Err(Error::Validation(missing.join(", ")))
}
