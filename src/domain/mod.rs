//! Domain types and models

mod placement;
pub mod catalog;
pub mod mockup;
pub mod profile;

pub use placement::{
    DesignTransform, FineEdit, Mirror, ScaleClass, VerticalAnchor,
    PRINT_TEMPLATE_HEIGHT, PRINT_TEMPLATE_WIDTH,
};
pub use catalog::{PrintAreaSize, ProductTemplate, TemplateVariant};
pub use mockup::{ContentId, DesignAsset, MockupImage, MockupSet, SourceFingerprint, VariantSet};
pub use profile::{classify, resolve, BlendMode, PrintRegionProfile, ProfileId};
