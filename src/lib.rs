//! Retrieves unread messages and attachments from an Outlook mailbox and
//! optionally delivers the attachments to an S3 bucket, marking each source
//! message read once its batch is stored. Credentials are supplied per call;
//! the crate keeps no state between calls.

pub mod api;
pub mod auth;
pub mod error;
pub mod mailroom;
pub mod storage;
pub mod uploader;

pub use api::messages::ListFilter;
pub use api::models::{Attachment, MessageSummary};
pub use auth::Credentials;
pub use error::{Error, Result};
pub use mailroom::Mailroom;
pub use storage::{ObjectStore, StorageTarget};
