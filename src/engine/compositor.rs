//! Local preview compositing
//!
//! Draws the design into the resolved print region of the template image. This
//! is an immediate approximation; authoritative renders come from the remote
//! mockup pipeline.

use bytes::Bytes;
use image::{
    imageops::{self, FilterType},
    ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage,
};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::domain::{BlendMode, DesignTransform, PrintRegionProfile};
use super::geometry::{fit_design, preview_dimensions, region_rect, PixelRect};
use super::loader::{ImageLoader, ImageSource, LoadError};
use super::shading::{apply_shadow_pass, DEFAULT_SHADOW_OPACITY};

/// Compositing errors
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("Failed to encode image: {0}")]
    EncodeFailed(#[from] image::ImageError),
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

/// What the preview ended up showing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PreviewOutcome {
    /// Design drawn into the print region
    Composited,
    /// Template alone, either because no design is set or it failed to load
    TemplateOnly { reason: Option<String> },
    /// Nothing could be drawn
    Unavailable { reason: String },
}

impl PreviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewOutcome::Composited => "composited",
            PreviewOutcome::TemplateOnly { .. } => "template_only",
            PreviewOutcome::Unavailable { .. } => "unavailable",
        }
    }
}

/// A rendered local preview
#[derive(Debug, Clone)]
pub struct Preview {
    pub outcome: PreviewOutcome,
    /// PNG bytes, absent when unavailable
    pub png: Option<Bytes>,
    pub width: u32,
    pub height: u32,
    /// Where the design landed, when it was drawn
    pub fit: Option<PixelRect>,
}

impl Preview {
    fn unavailable(reason: String) -> Self {
        Preview {
            outcome: PreviewOutcome::Unavailable { reason },
            png: None,
            width: 0,
            height: 0,
            fit: None,
        }
    }
}

/// Inputs for one preview
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub template: ImageSource,
    pub design: Option<ImageSource>,
    pub profile: PrintRegionProfile,
    pub transform: DesignTransform,
}

/// Local approximate compositor
#[derive(Debug, Clone, Copy)]
pub struct LocalCompositor {
    max_dimension: u32,
    shadow_opacity: f64,
}

impl LocalCompositor {
    /// Create a new compositor
    pub fn new(max_dimension: u32, shadow_opacity: f64) -> Self {
        LocalCompositor {
            max_dimension: max_dimension.max(1),
            shadow_opacity: shadow_opacity.clamp(0.0, 1.0),
        }
    }

    /// Load both images, then draw on the blocking pool.
    ///
    /// Always resolves to a defined preview; load and render failures degrade
    /// to template-only or unavailable.
    pub async fn compose(&self, loader: &ImageLoader, request: PreviewRequest) -> Preview {
        let (template, design) = loader
            .load_pair(&request.template, request.design.as_ref())
            .await;

        let compositor = *self;
        let profile = request.profile;
        let transform = request.transform;

        match tokio::task::spawn_blocking(move || compositor.render(template, design, &profile, &transform)).await {
            Ok(preview) => preview,
            Err(e) => {
                warn!(error = %e, "Preview render task failed");
                Preview::unavailable(CompositorError::TaskFailed(e.to_string()).to_string())
            }
        }
    }

    /// Draw a preview from already loaded images
    pub fn render(
        &self,
        template: Result<DynamicImage, LoadError>,
        design: Option<Result<DynamicImage, LoadError>>,
        profile: &PrintRegionProfile,
        transform: &DesignTransform,
    ) -> Preview {
        let template = match template {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "Template image unavailable");
                return Preview::unavailable(e.to_string());
            }
        };

        let (width, height) = preview_dimensions(template.width(), template.height(), self.max_dimension);
        let base = if (width, height) == (template.width(), template.height()) {
            template.to_rgba8()
        } else {
            imageops::resize(&template.to_rgba8(), width, height, FilterType::Lanczos3)
        };

        let design = match design {
            None => return self.finish(base, PreviewOutcome::TemplateOnly { reason: None }, None),
            Some(Err(e)) => {
                warn!(error = %e, "Design image unavailable, rendering template only");
                return self.finish(base, PreviewOutcome::TemplateOnly { reason: Some(e.to_string()) }, None);
            }
            Some(Ok(img)) => img,
        };

        let region = region_rect(profile, width, height);
        let fit = fit_design(region, design.width(), design.height(), transform);

        debug!(
            profile = %profile.id,
            region = %region,
            fit = %fit,
            rotation = transform.rotation,
            "Calculated design placement"
        );

        let drawn = transform_design(&design, &fit, transform);
        let origin = (
            (fit.x + fit.width / 2.0 - drawn.width() as f64 / 2.0).round() as i64,
            (fit.y + fit.height / 2.0 - drawn.height() as f64 / 2.0).round() as i64,
        );

        let mut canvas = base.clone();
        composite_normal(&mut canvas, &drawn, origin);

        if profile.blend_mode == BlendMode::Multiply {
            apply_shadow_pass(&mut canvas, &base, &drawn, origin, self.shadow_opacity);
        }

        self.finish(canvas, PreviewOutcome::Composited, Some(fit))
    }

    fn finish(&self, canvas: RgbaImage, outcome: PreviewOutcome, fit: Option<PixelRect>) -> Preview {
        let (width, height) = canvas.dimensions();

        match encode_png(&canvas) {
            Ok(png) => {
                info!(
                    width = width,
                    height = height,
                    bytes = png.len(),
                    outcome = outcome.as_str(),
                    "Local preview rendered"
                );
                Preview {
                    outcome,
                    png: Some(Bytes::from(png)),
                    width,
                    height,
                    fit,
                }
            }
            Err(e) => {
                warn!(error = %e, "Preview encoding failed");
                Preview::unavailable(e.to_string())
            }
        }
    }
}

impl Default for LocalCompositor {
    fn default() -> Self {
        Self::new(1024, DEFAULT_SHADOW_OPACITY)
    }
}

/// Resize into the fit rectangle, then mirror and rotate about its center
fn transform_design(design: &DynamicImage, fit: &PixelRect, transform: &DesignTransform) -> RgbaImage {
    let width = (fit.width.round() as u32).max(1);
    let height = (fit.height.round() as u32).max(1);
    let mut drawn = imageops::resize(&design.to_rgba8(), width, height, FilterType::Lanczos3);

    if transform.mirror.horizontal {
        imageops::flip_horizontal_in_place(&mut drawn);
    }
    if transform.mirror.vertical {
        imageops::flip_vertical_in_place(&mut drawn);
    }

    if transform.rotation != 0.0 {
        drawn = rotated_canvas(&drawn, transform.rotation);
    }

    drawn
}

/// Rotate onto a canvas large enough to hold the rotated corners
fn rotated_canvas(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let (w, h) = image.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let bound_w = ((w as f64 * cos + h as f64 * sin).ceil() as u32).max(w);
    let bound_h = ((w as f64 * sin + h as f64 * cos).ceil() as u32).max(h);

    let mut padded = RgbaImage::from_pixel(bound_w, bound_h, Rgba([0, 0, 0, 0]));
    imageops::overlay(
        &mut padded,
        image,
        ((bound_w - w) / 2) as i64,
        ((bound_h - h) / 2) as i64,
    );

    rotate_about_center(&padded, radians as f32, Interpolation::Bilinear, Rgba([0, 0, 0, 0]))
}

/// Alpha-blend `overlay` onto `base` at `origin`, clipping at the edges
fn composite_normal(base: &mut RgbaImage, overlay: &RgbaImage, origin: (i64, i64)) {
    let (base_width, base_height) = base.dimensions();
    let (overlay_width, overlay_height) = overlay.dimensions();

    for dy in 0..overlay_height {
        let y = origin.1 + dy as i64;
        if y < 0 || y >= base_height as i64 {
            continue;
        }

        for dx in 0..overlay_width {
            let x = origin.0 + dx as i64;
            if x < 0 || x >= base_width as i64 {
                continue;
            }

            let overlay_pixel = overlay.get_pixel(dx, dy);

            // Skip fully transparent pixels
            if overlay_pixel.0[3] == 0 {
                continue;
            }

            let base_pixel = base.get_pixel(x as u32, y as u32);
            let blended = blend_normal_pixel(base_pixel, overlay_pixel);
            base.put_pixel(x as u32, y as u32, blended);
        }
    }
}

/// Normal alpha blending
fn blend_normal_pixel(base: &Rgba<u8>, overlay: &Rgba<u8>) -> Rgba<u8> {
    let alpha = overlay.0[3] as f64 / 255.0;
    let inv_alpha = 1.0 - alpha;

    Rgba([
        (overlay.0[0] as f64 * alpha + base.0[0] as f64 * inv_alpha).round() as u8,
        (overlay.0[1] as f64 * alpha + base.0[1] as f64 * inv_alpha).round() as u8,
        (overlay.0[2] as f64 * alpha + base.0[2] as f64 * inv_alpha).round() as u8,
        base.0[3].max(overlay.0[3]),
    ])
}

/// Encode image to PNG bytes (preserves RGBA transparency)
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CompositorError> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(buffer)
}
