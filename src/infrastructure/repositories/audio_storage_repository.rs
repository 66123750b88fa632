use async_trait::async_trait;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use object_store::{path::Path as ObjectPath, Error as ObjectStoreError, ObjectStore, PutPayload};
use std::sync::Arc;

/// Listing entry for a stored audio object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// Repository for the bucket holding generated audio.
///
/// Every operation is individually atomic on the backend; there is no
/// index besides the objects themselves.
#[async_trait]
pub trait AudioStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// `Ok(None)` when the object does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<StoredObject>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn bucket_exists(&self) -> Result<bool, StorageError>;

    async fn create_bucket(&self) -> Result<(), StorageError>;

    /// Create the bucket when it is missing; `Ok(true)` when it was created
    async fn ensure_bucket(&self) -> Result<bool, StorageError> {
        if self.bucket_exists().await? {
            return Ok(false);
        }
        self.create_bucket().await?;
        Ok(true)
    }
}

/// `object_store` backed implementation (S3, MinIO, in-memory)
///
/// `object_store` cannot create buckets; existence checks and creation go
/// through the S3 API client when one is attached.
pub struct ObjectStoreAudioRepository {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    s3_client: Option<Arc<aws_sdk_s3::Client>>,
    region: Option<String>,
}

impl ObjectStoreAudioRepository {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            s3_client: None,
            region: None,
        }
    }

    /// Attach an S3 client for bucket administration
    pub fn with_s3_client(mut self, s3_client: Arc<aws_sdk_s3::Client>, region: impl Into<String>) -> Self {
        self.s3_client = Some(s3_client);
        self.region = Some(region.into());
        self
    }

    fn path(key: &str) -> Result<ObjectPath, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        ObjectPath::parse(key).map_err(|e| StorageError::InvalidKey(format!("{}: {}", key, e)))
    }
}

fn backend_error(bucket: &str, operation: &str, err: ObjectStoreError) -> StorageError {
    tracing::error!(bucket = bucket, operation = operation, error = %err, "Object storage call failed");
    StorageError::Backend(format!("{} failed: {}", operation, err))
}

#[async_trait]
impl AudioStorage for ObjectStoreAudioRepository {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = Self::path(key)?;
        let size = bytes.len();

        self.store
            .put(&path, PutPayload::from(bytes))
            .await
            .map_err(|e| backend_error(&self.bucket, "put", e))?;

        tracing::debug!(bucket = %self.bucket, key = key, size = size, "Object uploaded");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = Self::path(key)?;

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %self.bucket, key = key, "Object not found");
                return Ok(None);
            }
            Err(e) => return Err(backend_error(&self.bucket, "get", e)),
        };

        match result.bytes().await {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            // Deleted between the head and the body read
            Err(ObjectStoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(backend_error(&self.bucket, "read", e)),
        }
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<StoredObject>, StorageError> {
        let prefix = prefix.map(ObjectPath::from);

        let metas: Vec<_> = self
            .store
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(|e| backend_error(&self.bucket, "list", e))?;

        Ok(metas
            .into_iter()
            .map(|meta| StoredObject {
                key: meta.location.to_string(),
                last_modified: meta.last_modified,
                size: meta.size as u64,
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = Self::path(key)?;

        self.store
            .delete(&path)
            .await
            .map_err(|e| backend_error(&self.bucket, "delete", e))
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        if let Some(client) = &self.s3_client {
            return match client.head_bucket().bucket(&self.bucket).send().await {
                Ok(_) => Ok(true),
                Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
                Err(e) => {
                    tracing::error!(bucket = %self.bucket, error = %aws_sdk_s3::error::DisplayErrorContext(&e), "head_bucket failed");
                    Err(StorageError::Backend(format!("bucket_exists failed: {}", e)))
                }
            };
        }

        match self.store.list_with_delimiter(None).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(backend_error(&self.bucket, "bucket_exists", e)),
        }
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        let Some(client) = &self.s3_client else {
            // Stores without an S3 client (in-memory, local) have no bucket to create
            return Ok(());
        };

        let mut request = client.create_bucket().bucket(&self.bucket);
        // us-east-1 is the implicit location and must not be sent as a constraint
        if let Some(region) = self.region.as_deref().filter(|r| *r != "us-east-1") {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "Storage bucket created");
                Ok(())
            }
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()) =>
            {
                tracing::debug!(bucket = %self.bucket, "Storage bucket already exists");
                Ok(())
            }
            Err(e) => {
                tracing::error!(bucket = %self.bucket, error = %aws_sdk_s3::error::DisplayErrorContext(&e), "create_bucket failed");
                Err(StorageError::Backend(format!("create_bucket failed: {}", e)))
            }
        }
    }
}
