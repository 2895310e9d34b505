//! Design placement intent
//!
//! A [`DesignTransform`] carries two views of where the artwork sits inside the
//! print region: coarse presets picked from a toolbar and the fine-grained
//! values edited in the advanced panel. The fine view is authoritative; the
//! coarse view is always derived from it through one canonical mapping.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Physical print canvas used when a variant has no print-area resolution
pub const PRINT_TEMPLATE_WIDTH: u32 = 1800;
pub const PRINT_TEMPLATE_HEIGHT: u32 = 2400;

pub const MIN_SCALE_FACTOR: f64 = 0.05;
pub const MAX_SCALE_FACTOR: f64 = 2.0;
pub const MAX_ROTATION: f64 = 180.0;

/// Coarse size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScaleClass {
    Small,
    Medium,
    Large,
    Fill,
}

impl ScaleClass {
    /// Bucket a scale factor
    pub fn from_factor(factor: f64) -> Self {
        if factor <= 0.45 {
            ScaleClass::Small
        } else if factor <= 0.65 {
            ScaleClass::Medium
        } else if factor <= 0.85 {
            ScaleClass::Large
        } else {
            ScaleClass::Fill
        }
    }

    /// Scale factor written when this preset is picked
    pub fn representative(&self) -> f64 {
        match self {
            ScaleClass::Small => 0.4,
            ScaleClass::Medium => 0.6,
            ScaleClass::Large => 0.8,
            ScaleClass::Fill => 1.0,
        }
    }
}

/// Coarse vertical preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

impl VerticalAnchor {
    /// Bucket a normalized vertical position
    pub fn from_position(y: f64) -> Self {
        if y <= 0.35 {
            VerticalAnchor::Top
        } else if y <= 0.65 {
            VerticalAnchor::Center
        } else {
            VerticalAnchor::Bottom
        }
    }

    /// Normalized vertical position written when this preset is picked
    pub fn representative(&self) -> f64 {
        match self {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Center => 0.5,
            VerticalAnchor::Bottom => 1.0,
        }
    }
}

/// Mirror flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Mirror {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Partial update from the advanced panel. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FineEdit {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_factor: Option<f64>,
    pub mirror_horizontal: Option<bool>,
    pub mirror_vertical: Option<bool>,
}

/// User placement intent for the design inside the print region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DesignTransform {
    /// Derived from `scale_factor`
    pub scale_class: ScaleClass,
    /// Derived from `y`
    pub vertical_anchor: VerticalAnchor,
    /// Normalized horizontal position of the slack, 0 = left, 1 = right
    pub x: f64,
    /// Normalized vertical position of the slack, 0 = top, 1 = bottom
    pub y: f64,
    /// Degrees, clockwise
    pub rotation: f64,
    /// Fraction of the containment box, (0, 2]
    pub scale_factor: f64,
    pub mirror: Mirror,
    /// Bumped on every mutation
    pub version: u64,
}

impl Default for DesignTransform {
    fn default() -> Self {
        let scale_factor = ScaleClass::Large.representative();
        let y = VerticalAnchor::Center.representative();
        DesignTransform {
            scale_class: ScaleClass::from_factor(scale_factor),
            vertical_anchor: VerticalAnchor::from_position(y),
            x: 0.5,
            y,
            rotation: 0.0,
            scale_factor,
            mirror: Mirror::default(),
            version: 0,
        }
    }
}

impl DesignTransform {
    /// Pick a size preset. Only `scale_factor` is overwritten.
    pub fn set_scale_class(&mut self, class: ScaleClass) {
        self.scale_factor = class.representative();
        self.touch();
    }

    /// Pick a vertical preset. Only `y` is overwritten.
    pub fn set_vertical_anchor(&mut self, anchor: VerticalAnchor) {
        self.y = anchor.representative();
        self.touch();
    }

    /// Apply an advanced-panel edit. Values are clamped into range and
    /// non-finite values are ignored.
    pub fn apply_fine(&mut self, edit: &FineEdit) {
        if let Some(x) = edit.x.filter(|v| v.is_finite()) {
            self.x = x.clamp(0.0, 1.0);
        }
        if let Some(y) = edit.y.filter(|v| v.is_finite()) {
            self.y = y.clamp(0.0, 1.0);
        }
        if let Some(rotation) = edit.rotation.filter(|v| v.is_finite()) {
            self.rotation = rotation.clamp(-MAX_ROTATION, MAX_ROTATION);
        }
        if let Some(scale) = edit.scale_factor.filter(|v| v.is_finite()) {
            self.scale_factor = scale.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR);
        }
        if let Some(h) = edit.mirror_horizontal {
            self.mirror.horizontal = h;
        }
        if let Some(v) = edit.mirror_vertical {
            self.mirror.vertical = v;
        }
        self.touch();
    }

    /// Re-derive the coarse view and bump the version
    fn touch(&mut self) {
        self.scale_class = ScaleClass::from_factor(self.scale_factor);
        self.vertical_anchor = VerticalAnchor::from_position(self.y);
        self.version += 1;
    }
}
