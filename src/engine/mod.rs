//! Local preview engine
//!
//! This module contains the local approximation pipeline:
//! - Image loading (template and design joined before drawing)
//! - Print region geometry and containment fitting
//! - Compositing with the fabric shadow pass

mod compositor;
mod geometry;
mod loader;
mod shading;

pub use compositor::{LocalCompositor, Preview, PreviewOutcome, PreviewRequest};
pub use geometry::{contain, fit_design, preview_dimensions, region_rect, PixelRect};
pub use loader::{ImageLoader, ImageSource, LoadError};
pub use shading::DEFAULT_SHADOW_OPACITY;
