//! S3-backed [`ScratchStore`].

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::ScratchStore;

pub struct S3Scratch {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Scratch {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ScratchStore for S3Scratch {
    // DeleteObject on a missing key succeeds, so zero-row cleanups are no-ops.
    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("delete s3://{}/{}", self.bucket, key))?;
        Ok(())
    }
}
