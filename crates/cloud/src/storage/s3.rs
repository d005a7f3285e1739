//! S3-compatible backend built on `aws-sdk-s3`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::{PresignedRequest, PresigningConfig};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{ObjectStore, PresignedUrl, StorageError};
use crate::cors::build_cors_configuration;

/// Default presigned URL lifetime.
const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// SigV4 presigned URLs cannot outlive seven days.
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 3600;

const DEFAULT_REGION: &str = "us-east-1";

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). Enables path-style addressing.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub presign_expiry: Duration,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                 | Required | Default         |
    /// |--------------------------|----------|-----------------|
    /// | `S3_BUCKET`              | yes      |                 |
    /// | `S3_REGION`              | no       | `us-east-1`     |
    /// | `S3_ENDPOINT`            | no       | AWS             |
    /// | `S3_ACCESS_KEY_ID`       | no       | default chain   |
    /// | `S3_SECRET_ACCESS_KEY`   | no       | default chain   |
    /// | `S3_PRESIGN_EXPIRY_SECS` | no       | `3600`          |
    pub fn from_env() -> Result<Self, StorageError> {
        let bucket = non_empty_var("S3_BUCKET")
            .ok_or_else(|| StorageError::Config("S3_BUCKET must be set".into()))?;

        let expiry_secs = std::env::var("S3_PRESIGN_EXPIRY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PRESIGN_EXPIRY_SECS);

        Ok(Self {
            bucket,
            region: non_empty_var("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            endpoint: non_empty_var("S3_ENDPOINT"),
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY"),
            presign_expiry: clamp_expiry(expiry_secs),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Clamp a presign lifetime into `1..=MAX_PRESIGN_EXPIRY_SECS` seconds.
pub fn clamp_expiry(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_PRESIGN_EXPIRY_SECS))
}

// ---------------------------------------------------------------------------
// S3ObjectStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    presign_expiry: Duration,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl S3ObjectStore {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when both keys are set, otherwise the
    /// default AWS provider chain applies.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "saivd-static",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 object store configured"
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            presign_expiry: config.presign_expiry,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Replace the bucket's CORS rules with ones allowing `origins`.
    pub async fn apply_cors(&self, origins: &[String]) -> Result<(), StorageError> {
        let configuration = build_cors_configuration(origins)?;
        self.client
            .put_bucket_cors()
            .bucket(&self.bucket)
            .cors_configuration(configuration)
            .send()
            .await
            .map_err(|e| StorageError::Request {
                key: self.bucket.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    fn presigning_config(&self, key: &str) -> Result<PresigningConfig, StorageError> {
        PresigningConfig::expires_in(self.presign_expiry).map_err(|e| StorageError::Presign {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn to_presigned_url(&self, request: PresignedRequest) -> PresignedUrl {
        PresignedUrl {
            url: request.uri().to_string(),
            method: request.method().to_string(),
            headers: request
                .headers()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            expires_in: self.presign_expiry.as_secs(),
        }
    }
}

fn request_error(key: &str, err: impl std::error::Error) -> StorageError {
    StorageError::Request {
        key: key.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(self.presigning_config(key)?)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(self.to_presigned_url(request))
    }

    async fn presign_get(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(self.presigning_config(key)?)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(self.to_presigned_url(request))
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Ok(None);
            }
            Err(e) => return Err(request_error(key, e)),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| request_error(key, e))?;
        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| request_error(key, e))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| request_error(key, e))?;
        tracing::debug!(key, "Deleted object");
        Ok(())
    }
}
