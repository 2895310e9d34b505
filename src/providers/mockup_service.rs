//! Mockup-generation service client
//!
//! Posts a generation request as JSON and returns the rendered mockup list.
//! A body carrying `error` is a rejection even when the status is 200.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::providers::http_client::RateLimitedClient;
use crate::providers::traits::{
    GenerationRequest, GenerationResponse, MockupGenerator, ProviderCredentials, ProviderError, ProviderResult,
};

/// HTTP client for the authoritative mockup renderer
pub struct HttpMockupService {
    client: RateLimitedClient,
    endpoint: String,
    credentials: ProviderCredentials,
    max_retries: u32,
}

impl HttpMockupService {
    pub fn new(base_url: &str, credentials: ProviderCredentials, client: RateLimitedClient, max_retries: u32) -> Self {
        HttpMockupService {
            client,
            endpoint: format!("{}/mockups", base_url.trim_end_matches('/')),
            credentials,
            max_retries,
        }
    }
}

#[async_trait]
impl MockupGenerator for HttpMockupService {
    #[instrument(skip(self, request), fields(template_id = %request.template_id, variants = request.variant_ids.len()))]
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GenerationResponse> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = self.credentials.access_token.as_deref() {
            builder = builder.bearer_auth(token);
        }

        debug!(endpoint = %self.endpoint, "Requesting authoritative mockups");
        let response = builder.send_with_retry(self.max_retries).await?;

        let status = response.status();
        let text = response.text().await?;

        // Error bodies share the response schema, prefer their message
        let parsed: Result<GenerationResponse, _> = serde_json::from_str(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|body| body.error)
                .unwrap_or(text);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = parsed.map_err(|e| ProviderError::ParseError(format!("Generation response: {}", e)))?;
        if let Some(error) = body.error {
            return Err(ProviderError::Rejected(error));
        }

        info!(
            mockups = body.mockups.len(),
            batch_id = body.batch_id.as_deref().unwrap_or("-"),
            "Mockup generation response received"
        );

        Ok(body)
    }
}
