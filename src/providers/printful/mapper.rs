//! Printful to template model mapper

use std::collections::HashMap;

use crate::domain::{PrintAreaSize, ProductTemplate, TemplateVariant};
use super::models::*;

/// Placement whose printfile sizes the design
const PRIMARY_PLACEMENT: &str = "front";

/// Mapper for Printful API responses
pub struct PrintfulMapper;

impl PrintfulMapper {
    /// Map a product detail (and its printfiles, when fetched) to a template
    pub fn map_template(
        detail: PrintfulProductDetail,
        printfiles: Option<&PrintfulPrintfilesResponse>,
    ) -> ProductTemplate {
        let product = detail.product;

        let mut images: Vec<String> = Vec::new();
        for url in product.image.iter().chain(detail.variants.iter().filter_map(|v| v.image.as_ref())) {
            if !images.contains(url) {
                images.push(url.clone());
            }
        }

        let variants = detail.variants
            .into_iter()
            .filter(PrintfulVariant::is_in_stock)
            .map(|variant| Self::map_variant(variant, printfiles))
            .collect();

        ProductTemplate {
            id: product.id.to_string(),
            title: product.title,
            images,
            provider_id: "printful".to_string(),
            variants,
        }
    }

    /// Map a Printful variant, attaching its front print area
    pub fn map_variant(variant: PrintfulVariant, printfiles: Option<&PrintfulPrintfilesResponse>) -> TemplateVariant {
        let print_area = printfiles.and_then(|pf| Self::print_area_for(pf, variant.id));

        TemplateVariant {
            id: variant.id.to_string(),
            name: variant.name,
            size: variant.size,
            color: variant.color,
            print_area,
        }
    }

    /// Resolve the printfile a variant uses for its primary placement
    pub fn print_area_for(response: &PrintfulPrintfilesResponse, variant_id: i64) -> Option<PrintAreaSize> {
        let by_id: HashMap<i64, &PrintfulPrintfile> = response.printfiles
            .iter()
            .map(|pf| (pf.printfile_id, pf))
            .collect();

        let printfile_id = response.variant_printfiles
            .iter()
            .find(|vp| vp.variant_id == variant_id)
            .and_then(|vp| {
                vp.placements
                    .get(PRIMARY_PLACEMENT)
                    .or_else(|| {
                        // No front placement, take the alphabetically first one
                        let mut names: Vec<&String> = vp.placements.keys().collect();
                        names.sort();
                        names.first().and_then(|name| vp.placements.get(*name))
                    })
                    .copied()
            });

        let printfile = match printfile_id {
            Some(id) => by_id.get(&id).copied(),
            None if response.printfiles.len() == 1 => response.printfiles.first(),
            None => None,
        }?;

        Some(PrintAreaSize {
            width_px: printfile.width,
            height_px: printfile.height,
        })
    }
}
