//! Print region geometry
//!
//! Converts fractional print regions into preview pixels and fits the design
//! into them by containment: aspect ratio preserved, never cropped, never
//! stretched.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DesignTransform, PrintRegionProfile};

/// Axis-aligned rectangle in output pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        PixelRect { x, y, width, height }
    }
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0},{:.0},{:.0},{:.0}", self.x, self.y, self.width, self.height)
    }
}

/// Output size for a template, keeping its aspect ratio and bounding the
/// longer side by `max_dimension`.
pub fn preview_dimensions(template_width: u32, template_height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = template_width.max(template_height);
    if longest <= max_dimension || longest == 0 {
        return (template_width, template_height);
    }

    let scale = max_dimension as f64 / longest as f64;
    let width = ((template_width as f64 * scale).round() as u32).max(1);
    let height = ((template_height as f64 * scale).round() as u32).max(1);
    (width, height)
}

/// Print region in output pixel coordinates
pub fn region_rect(profile: &PrintRegionProfile, width: u32, height: u32) -> PixelRect {
    PixelRect::new(
        profile.x * width as f64,
        profile.y * height as f64,
        profile.width * width as f64,
        profile.height * height as f64,
    )
}

/// Largest size with the design's aspect ratio that fits inside the bounds
pub fn contain(design_width: u32, design_height: u32, bounds_width: f64, bounds_height: f64) -> (f64, f64) {
    if design_width == 0 || design_height == 0 || bounds_width <= 0.0 || bounds_height <= 0.0 {
        return (0.0, 0.0);
    }

    let dw = design_width as f64;
    let dh = design_height as f64;
    let scale = (bounds_width / dw).min(bounds_height / dh);

    // Snap the touching dimension exactly onto its bound
    if bounds_width / dw <= bounds_height / dh {
        (bounds_width, dh * scale)
    } else {
        (dw * scale, bounds_height)
    }
}

/// Place the design inside the region.
///
/// The containment box is the region shrunk by the transform's scale factor
/// (factors above 1 are held at the region size), and the slack left around
/// the fitted design is distributed by the normalized position.
pub fn fit_design(region: PixelRect, design_width: u32, design_height: u32, transform: &DesignTransform) -> PixelRect {
    let scale = transform.scale_factor.clamp(0.0, 1.0);
    let (width, height) = contain(design_width, design_height, region.width * scale, region.height * scale);

    let slack_x = (region.width - width).max(0.0);
    let slack_y = (region.height - height).max(0.0);

    PixelRect::new(
        region.x + slack_x * transform.x.clamp(0.0, 1.0),
        region.y + slack_y * transform.y.clamp(0.0, 1.0),
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    impl PixelRect {
        fn right(&self) -> f64 {
            self.x + self.width
        }

        fn bottom(&self) -> f64 {
            self.y + self.height
        }
    }

    fn inside(outer: &PixelRect, inner: &PixelRect) -> bool {
        const EPS: f64 = 1e-6;
        inner.x >= outer.x - EPS
            && inner.y >= outer.y - EPS
            && inner.right() <= outer.right() + EPS
            && inner.bottom() <= outer.bottom() + EPS
    }
    use crate::domain::{resolve, ProfileId, ScaleClass, VerticalAnchor};

    fn fill_center() -> DesignTransform {
        let mut t = DesignTransform::default();
        t.set_scale_class(ScaleClass::Fill);
        t.set_vertical_anchor(VerticalAnchor::Center);
        t
    }

    #[test]
    fn test_wide_design_in_square_region() {
        let region = PixelRect::new(0.0, 0.0, 400.0, 400.0);
        let fit = fit_design(region, 800, 400, &fill_center());

        assert_eq!(fit.width, 400.0);
        assert_eq!(fit.height, 200.0);
        assert_eq!(fit.x, 0.0);
        assert_eq!(fit.y, 100.0);
        assert_eq!(fit.bottom(), 300.0);
    }

    #[test]
    fn test_anchor_moves_slack() {
        let region = PixelRect::new(50.0, 50.0, 400.0, 400.0);
        let mut t = fill_center();

        t.set_vertical_anchor(VerticalAnchor::Top);
        assert_eq!(fit_design(region, 800, 400, &t).y, 50.0);

        t.set_vertical_anchor(VerticalAnchor::Bottom);
        assert_eq!(fit_design(region, 800, 400, &t).bottom(), 450.0);
    }

    #[test]
    fn test_containment_for_arbitrary_aspects() {
        let regions = [
            PixelRect::new(0.0, 0.0, 400.0, 400.0),
            PixelRect::new(12.5, 30.0, 333.3, 120.7),
            PixelRect::new(100.0, 7.0, 90.0, 610.0),
        ];
        let designs = [(1, 1), (800, 400), (400, 800), (1920, 1080), (3, 2000), (2000, 3), (517, 517)];

        for region in regions {
            for (dw, dh) in designs {
                let fit = fit_design(region, dw, dh, &fill_center());
                assert!(inside(&region, &fit), "{region:?} {dw}x{dh} -> {fit:?}");

                let touches_width = (fit.width - region.width).abs() < 1e-9;
                let touches_height = (fit.height - region.height).abs() < 1e-9;
                assert!(touches_width || touches_height, "{region:?} {dw}x{dh} -> {fit:?}");

                let aspect_in = dw as f64 / dh as f64;
                let aspect_out = fit.width / fit.height;
                assert!((aspect_in - aspect_out).abs() / aspect_in < 1e-9);
            }
        }
    }

    #[test]
    fn test_scale_factor_shrinks_and_oversize_is_clamped() {
        let region = PixelRect::new(0.0, 0.0, 400.0, 400.0);
        let mut t = fill_center();
        t.set_scale_class(ScaleClass::Small);
        let fit = fit_design(region, 100, 100, &t);
        assert!((fit.width - 160.0).abs() < 1e-9);
        assert!(inside(&region, &fit));

        t.apply_fine(&crate::domain::FineEdit { scale_factor: Some(2.0), ..Default::default() });
        let fit = fit_design(region, 100, 100, &t);
        assert_eq!(fit.width, 400.0);
        assert!(inside(&region, &fit));
    }

    #[test]
    fn test_preview_dimensions_keep_aspect() {
        assert_eq!(preview_dimensions(2000, 1000, 1024), (1024, 512));
        assert_eq!(preview_dimensions(800, 600, 1024), (800, 600));
        assert_eq!(preview_dimensions(1000, 4000, 1000), (250, 1000));
    }

    #[test]
    fn test_region_rect_uses_fractions() {
        let hoodie = resolve(ProfileId::Hoodie);
        let rect = region_rect(&hoodie, 1000, 800);
        assert_eq!(rect, PixelRect::new(250.0, 200.0, 500.0, 320.0));
    }
}
