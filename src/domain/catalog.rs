//! Product template models
//!
//! Provider-agnostic view of a catalog template as the editor needs it: a
//! title to classify, reference images to composite onto, and the variants a
//! mockup can be rendered for.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::profile::{classify, ProfileId};

/// Physical print-area resolution of a variant, in print pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrintAreaSize {
    pub width_px: u32,
    pub height_px: u32,
}

/// Product variant (size/color combination)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateVariant {
    /// Provider's variant ID
    pub id: String,

    /// Display name (e.g., "White / S")
    pub name: String,

    /// Size (e.g., "S", "M", "L", "XL")
    pub size: Option<String>,

    /// Color name (e.g., "White", "Black", "Navy")
    pub color: Option<String>,

    /// Front print area, when the provider exposes one
    pub print_area: Option<PrintAreaSize>,
}

impl TemplateVariant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        TemplateVariant {
            id: id.into(),
            name: name.into(),
            size: None,
            color: None,
            print_area: None,
        }
    }
}

/// Catalog template selected for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductTemplate {
    /// Provider's product ID
    pub id: String,

    /// Product title, used for profile classification
    pub title: String,

    /// Reference images, first one is composited onto
    pub images: Vec<String>,

    /// Provider code (e.g., "printful")
    pub provider_id: String,

    /// Variants offered by the provider
    pub variants: Vec<TemplateVariant>,
}

impl ProductTemplate {
    /// Profile this template's title classifies to
    pub fn profile_id(&self) -> ProfileId {
        classify(&self.title)
    }

    /// Image the local compositor draws onto
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn variant(&self, id: &str) -> Option<&TemplateVariant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_profile_and_lookup() {
        let template = ProductTemplate {
            id: "146".to_string(),
            title: "Premium Hoodie XL".to_string(),
            images: vec!["https://cdn/hoodie.png".to_string()],
            provider_id: "printful".to_string(),
            variants: vec![TemplateVariant::new("5530", "Black / XL")],
        };

        assert_eq!(template.profile_id(), ProfileId::Hoodie);
        assert_eq!(template.primary_image(), Some("https://cdn/hoodie.png"));
        assert!(template.variant("5530").is_some());
        assert!(template.variant("1").is_none());
    }
}
