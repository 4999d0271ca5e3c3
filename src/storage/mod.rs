pub mod s3;

pub use s3::S3Store;

use async_trait::async_trait;

use crate::error::Result;

/// Object-storage target addressed with an explicit key pair. The region is
/// optional; `S3Store` falls back to us-east-1.
#[derive(Debug, Clone)]
pub struct StorageTarget {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: Option<String>,
}

/// Seam between the upload loop and the storage backend, so tests can swap
/// in a recording store.
#[async_trait]
pub trait ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<()>;
}
