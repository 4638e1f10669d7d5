use crate::domain::ports::ObjectStorage;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};
use base64::{Engine as _, engine::general_purpose};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Uploads through an HTTP gateway in front of the bucket; objects are served from `public_url`.
pub struct HttpObjectStorage {
    client: Client,
    upload_url: String,
    public_url: String,
    token: String,
}

impl HttpObjectStorage {
    pub fn new(upload_url: String, public_url: String, token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
            upload_url,
            public_url: public_url.trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadPayload<'a> {
    key: &'a str,
    content_type: &'a str,
    content_base64: String,
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, AppError> {
        let payload = UploadPayload {
            key,
            content_type,
            content_base64: general_purpose::STANDARD.encode(&data),
        };

        let res = self.client.post(&self.upload_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Object storage connection error: {}", e);
                AppError::UpstreamUnavailable("File storage is unavailable".into())
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Object storage rejected upload. Status: {}, Body: {}", status, text);
            return Err(AppError::UpstreamUnavailable("File storage is unavailable".into()));
        }

        info!("Stored object {} ({} bytes)", key, data.len());
        Ok(format!("{}/{}", self.public_url, key))
    }
}
