use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket error: {0}")]
    Bucket(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Delete error: {0}")]
    Delete(String),

    #[error("Presign error: {0}")]
    Presign(String),
}

/// S3-compatible object store client, constructed once at startup and
/// injected through application state. Readiness (bucket reachable, created
/// if absent) is checked during `connect`; a failure there is fatal, unlike
/// per-request storage errors which surface as 500s.
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    presign_expiry: Duration,
}

impl ObjectStorage {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let storage = Self {
            client: build_client(config).await,
            bucket: config.bucket.clone(),
            presign_expiry: Duration::from_secs(config.presign_expiry_secs),
        };

        storage.ensure_bucket().await?;
        info!("Object storage ready, bucket '{}' confirmed", storage.bucket);
        Ok(storage)
    }

    /// Check the bucket exists, creating it when the probe reports 404.
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let head = self.client.head_bucket().bucket(&self.bucket).send().await;

        match head {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().map_or(false, |e| e.is_not_found()) => {
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::Bucket(e.to_string()))?;
                info!("Created bucket '{}'", self.bucket);
                Ok(())
            }
            Err(err) => Err(StorageError::Bucket(err.to_string())),
        }
    }

    pub async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        Ok(())
    }

    /// Time-limited signed GET URL for one object; clients read blobs through
    /// these instead of learning storage-layer identifiers.
    pub async fn presigned_url(&self, key: &str) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;
        Ok(())
    }
}

/// Build the S3 client from the shared AWS defaults, overridden with the
/// configured MinIO endpoint and static credentials. Construction is
/// offline; connectivity is only exercised by the bucket probe.
async fn build_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "static",
    );

    let base = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(format!("http://{}", config.endpoint))
        .credentials_provider(credentials)
        .region(Region::new("us-east-1"))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&base)
        // MinIO serves buckets under the path, not a subdomain
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}

/// Server-generated storage key: `uploads/<username>/<random id>.<ext>`, with
/// the extension taken from the uploaded filename and `jpg` as the fallback.
/// The random component makes collisions negligible; there is no retry loop.
pub fn object_key(username: &str, filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("jpg");
    format!("uploads/{}/{}.{}", username, Uuid::new_v4(), extension)
}

/// The only payload validation on uploads: the declared MIME type must be an
/// image. No size cap, no content sniffing.
pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_keeps_filename_extension() {
        let key = object_key("alice", "cat.png");
        assert!(key.starts_with("uploads/alice/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn object_key_defaults_to_jpg() {
        assert!(object_key("alice", "noextension").ends_with(".jpg"));
        // A trailing dot leaves an empty suffix, which also falls back
        assert!(object_key("alice", "trailingdot.").ends_with(".jpg"));
    }

    #[test]
    fn object_key_uses_last_suffix() {
        assert!(object_key("alice", "archive.tar.gz").ends_with(".gz"));
    }

    #[test]
    fn object_keys_are_unique_per_upload() {
        assert_ne!(object_key("alice", "cat.png"), object_key("alice", "cat.png"));
    }

    #[tokio::test]
    async fn client_builds_with_configured_endpoint() {
        let config = StorageConfig {
            endpoint: "localhost:9000".to_string(),
            access_key: "minio".to_string(),
            secret_key: "minio-secret".to_string(),
            bucket: "photos".to_string(),
            presign_expiry_secs: 3600,
        };
        let client = build_client(&config).await;
        let endpoint = client.config().endpoint_url();
        assert!(endpoint.is_some_and(|url| url.contains("localhost:9000")));
    }

    #[test]
    fn image_mime_gate() {
        assert!(is_image("image/png"));
        assert!(is_image("image/jpeg"));
        assert!(!is_image("application/pdf"));
        assert!(!is_image("text/html"));
        assert!(!is_image(""));
    }
}
