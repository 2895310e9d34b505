//! Printful API response models
//!
//! Only the parts of the catalog responses the editor reads. They are mapped
//! to template models in the mapper module.

use std::collections::HashMap;

use serde::Deserialize;

/// Generic Printful API response wrapper
#[derive(Debug, Deserialize)]
pub struct PrintfulResponse<T> {
    pub code: i32,
    pub result: T,
}

/// Product from the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulProduct {
    pub id: i64,
    pub r#type: String,
    pub type_name: String,
    pub title: String,
    pub image: Option<String>,
    #[serde(default)]
    pub is_discontinued: Option<bool>,
}

/// Detailed product info (from /products/{id})
#[derive(Debug, Deserialize)]
pub struct PrintfulProductDetail {
    pub product: PrintfulProduct,
    pub variants: Vec<PrintfulVariant>,
}

/// Product variant
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulVariant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// Printfiles response (from /mockup-generator/printfiles/{id})
#[derive(Debug, Deserialize)]
pub struct PrintfulPrintfilesResponse {
    pub product_id: i64,
    pub printfiles: Vec<PrintfulPrintfile>,
    #[serde(default)]
    pub variant_printfiles: Vec<PrintfulVariantPrintfile>,
}

/// Printfile definition (print area)
#[derive(Debug, Deserialize)]
pub struct PrintfulPrintfile {
    pub printfile_id: i64,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

/// Variant-specific printfile per placement
#[derive(Debug, Deserialize)]
pub struct PrintfulVariantPrintfile {
    pub variant_id: i64,
    /// placement name -> printfile id
    pub placements: HashMap<String, i64>,
}

impl PrintfulProduct {
    /// Check if product is available
    pub fn is_available(&self) -> bool {
        !self.is_discontinued.unwrap_or(false)
    }
}

impl PrintfulVariant {
    /// Check if variant is in stock
    pub fn is_in_stock(&self) -> bool {
        self.in_stock.unwrap_or(true)
    }
}
