//! Printful catalog client
//!
//! Implements template lookup on top of the Printful catalog and
//! mockup-generator printfile endpoints.
//!
//! API Docs: https://developers.printful.com/docs/

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{ProductTemplate, TemplateVariant};
use crate::providers::http_client::RateLimitedClient;
use crate::providers::traits::{CatalogLookup, ProviderCredentials, ProviderError, ProviderResult};
use super::mapper::PrintfulMapper;
use super::models::*;

pub const PRINTFUL_CODE: &str = "printful";

/// Printful catalog client
pub struct PrintfulCatalog {
    client: RateLimitedClient,
    access_token: Option<String>,
    base_url: String,
    max_retries: u32,
}

impl PrintfulCatalog {
    /// Create a new Printful catalog client
    pub fn new(
        credentials: ProviderCredentials,
        base_url: &str,
        client: RateLimitedClient,
        max_retries: u32,
    ) -> Self {
        PrintfulCatalog {
            client,
            access_token: credentials.access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        }
    }

    /// Make an authenticated GET request
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ProviderResult<T> {
        let token = self.access_token.as_ref()
            .ok_or_else(|| ProviderError::AuthFailed("No access token configured".to_string()))?;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Printful API request");

        let response = self.client
            .get(&url)
            .bearer_auth(token)
            .send_with_retry(self.max_retries)
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::ParseError(format!("JSON parse error: {} - Body: {}", e, truncate(&text, 500))))
    }

    async fn product_detail(&self, template_id: &str) -> ProviderResult<PrintfulProductDetail> {
        let response: PrintfulResponse<PrintfulProductDetail> =
            self.get(&format!("/products/{}", template_id)).await?;
        Ok(response.result)
    }

    /// Printfiles are optional: without them variants carry no print area and
    /// placement hints fall back to the default print canvas.
    async fn printfiles(&self, template_id: &str) -> Option<PrintfulPrintfilesResponse> {
        let path = format!("/mockup-generator/printfiles/{}", template_id);
        match self.get::<PrintfulResponse<PrintfulPrintfilesResponse>>(&path).await {
            Ok(response) => Some(response.result),
            Err(e) => {
                warn!(template_id = %template_id, error = %e, "Printfiles unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl CatalogLookup for PrintfulCatalog {
    fn code(&self) -> &'static str {
        PRINTFUL_CODE
    }

    async fn template(&self, template_id: &str) -> ProviderResult<ProductTemplate> {
        let detail = self.product_detail(template_id).await?;
        if !detail.product.is_available() {
            return Err(ProviderError::NotFound(format!("template {} is discontinued", template_id)));
        }

        let printfiles = self.printfiles(template_id).await;
        let template = PrintfulMapper::map_template(detail, printfiles.as_ref());

        info!(
            template_id = %template.id,
            title = %template.title,
            variants = template.variants.len(),
            "Loaded template from Printful"
        );

        Ok(template)
    }

    async fn variants(&self, template_id: &str, provider_id: &str) -> ProviderResult<Vec<TemplateVariant>> {
        if provider_id != PRINTFUL_CODE {
            return Err(ProviderError::NotFound(format!("provider {} for template {}", provider_id, template_id)));
        }
        Ok(self.template(template_id).await?.variants)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn catalog(token: Option<&str>) -> PrintfulCatalog {
        let client = RateLimitedClient::new(120, Duration::from_secs(1)).unwrap();
        PrintfulCatalog::new(
            ProviderCredentials { access_token: token.map(String::from) },
            "http://127.0.0.1:1/",
            client,
            0,
        )
    }

    #[test]
    fn test_catalog_creation() {
        let catalog = catalog(None);
        assert_eq!(catalog.code(), "printful");
        assert_eq!(catalog.base_url, "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_missing_token_fails_auth() {
        let err = catalog(None).template("71").await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn test_other_provider_is_not_found() {
        let err = catalog(Some("t")).variants("71", "gelato").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
