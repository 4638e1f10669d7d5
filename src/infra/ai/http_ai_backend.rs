use crate::domain::ports::AiBackend;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use std::time::Duration;
use tokio::time::sleep;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Forwards chat payloads to the external AI service at `{base_url}/chat`.
pub struct HttpAiBackend {
    client: Client,
    chat_url: String,
    token: Option<String>,
}

impl HttpAiBackend {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
            chat_url: format!("{}/chat", base_url.trim_end_matches('/')),
            token,
        }
    }

    async fn send_with_retry(&self, payload: &Value) -> Result<Value, AppError> {
        let mut retries = 0;
        let mut backoff = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self.client.post(&self.chat_url).json(payload);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| {
                            error!("AI backend returned invalid JSON: {:?}", e);
                            AppError::UpstreamUnavailable("AI backend returned an invalid response".into())
                        });
                    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if retries >= MAX_RETRIES {
                            error!("AI backend failed after {} retries. Status: {}", retries, status);
                            return Err(AppError::UpstreamUnavailable(format!("AI backend unavailable ({})", status)));
                        }
                        warn!("AI backend transient error {}. Retrying in {}ms...", status, backoff);
                    } else {
                        let text = response.text().await.unwrap_or_default();
                        warn!("AI backend rejected request {}: {}", status, text);
                        return Err(AppError::Validation(format!("AI request rejected: {}", status)));
                    }
                }
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        error!("AI backend network error after {} retries: {:?}", retries, e);
                        return Err(AppError::UpstreamUnavailable("AI backend unreachable".into()));
                    }
                    warn!("AI backend network error. Retrying in {}ms... {:?}", backoff, e);
                }
            }

            sleep(Duration::from_millis(backoff)).await;
            retries += 1;
            backoff *= 2;
        }
    }
}

#[async_trait]
impl AiBackend for HttpAiBackend {
    #[instrument(skip(self, payload))]
    async fn chat(&self, payload: &Value) -> Result<Value, AppError> {
        info!("Forwarding chat request to AI backend");
        let reply = self.send_with_retry(payload).await?;
        info!("AI backend replied");
        Ok(reply)
    }
}
