//! Print region profiles and product type classification
//!
//! Every product template resolves to exactly one [`PrintRegionProfile`]. The
//! classifier maps free-text template titles onto a [`ProfileId`] and the
//! registry maps that id onto static region geometry. Both lookups are total:
//! anything unrecognised lands on [`ProfileId::Default`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Profile Ids
// ============================================================================

/// Print region profile identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfileId {
    Tshirt,
    Hoodie,
    Sweatshirt,
    TankTop,
    LongSleeve,
    Poster,
    Canvas,
    Mug,
    PhoneCase,
    ToteBag,
    Hat,
    Sticker,
    Pillow,
    Default,
}

impl ProfileId {
    /// Every profile the registry knows about
    pub const ALL: [ProfileId; 14] = [
        ProfileId::Tshirt,
        ProfileId::Hoodie,
        ProfileId::Sweatshirt,
        ProfileId::TankTop,
        ProfileId::LongSleeve,
        ProfileId::Poster,
        ProfileId::Canvas,
        ProfileId::Mug,
        ProfileId::PhoneCase,
        ProfileId::ToteBag,
        ProfileId::Hat,
        ProfileId::Sticker,
        ProfileId::Pillow,
        ProfileId::Default,
    ];

    /// Stable string key (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileId::Tshirt => "tshirt",
            ProfileId::Hoodie => "hoodie",
            ProfileId::Sweatshirt => "sweatshirt",
            ProfileId::TankTop => "tank_top",
            ProfileId::LongSleeve => "long_sleeve",
            ProfileId::Poster => "poster",
            ProfileId::Canvas => "canvas",
            ProfileId::Mug => "mug",
            ProfileId::PhoneCase => "phone_case",
            ProfileId::ToteBag => "tote_bag",
            ProfileId::Hat => "hat",
            ProfileId::Sticker => "sticker",
            ProfileId::Pillow => "pillow",
            ProfileId::Default => "default",
        }
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Explicit product-type keys, checked first and in order.
const PRODUCT_TYPE_KEYS: &[(&str, ProfileId)] = &[
    ("hoodie", ProfileId::Hoodie),
    ("hooded", ProfileId::Hoodie),
    ("sweatshirt", ProfileId::Sweatshirt),
    ("crewneck", ProfileId::Sweatshirt),
    ("crew neck", ProfileId::Sweatshirt),
    ("tank top", ProfileId::TankTop),
    ("long sleeve", ProfileId::LongSleeve),
    ("longsleeve", ProfileId::LongSleeve),
    ("t-shirt", ProfileId::Tshirt),
    ("tshirt", ProfileId::Tshirt),
    ("poster", ProfileId::Poster),
    ("framed", ProfileId::Poster),
    ("canvas", ProfileId::Canvas),
    ("mug", ProfileId::Mug),
    ("tumbler", ProfileId::Mug),
    ("phone case", ProfileId::PhoneCase),
    ("iphone", ProfileId::PhoneCase),
    ("tote", ProfileId::ToteBag),
    ("pillow", ProfileId::Pillow),
    ("sticker", ProfileId::Sticker),
    ("beanie", ProfileId::Hat),
];

/// Broader heuristic keywords, checked only when no explicit key matched.
const HEURISTIC_KEYWORDS: &[(&str, ProfileId)] = &[
    ("pullover", ProfileId::Hoodie),
    ("zip", ProfileId::Hoodie),
    ("sweater", ProfileId::Sweatshirt),
    ("tank", ProfileId::TankTop),
    ("tee", ProfileId::Tshirt),
    ("shirt", ProfileId::Tshirt),
    ("jersey", ProfileId::Tshirt),
    ("wall art", ProfileId::Poster),
    ("print", ProfileId::Poster),
    ("frame", ProfileId::Poster),
    ("cup", ProfileId::Mug),
    ("bottle", ProfileId::Mug),
    ("drinkware", ProfileId::Mug),
    ("phone", ProfileId::PhoneCase),
    ("case", ProfileId::PhoneCase),
    ("bag", ProfileId::ToteBag),
    ("cushion", ProfileId::Pillow),
    ("decal", ProfileId::Sticker),
    ("hat", ProfileId::Hat),
    ("cap", ProfileId::Hat),
];

/// Classify a template title into a print region profile.
///
/// Case-insensitive substring match, first match wins. Never fails.
pub fn classify(title: &str) -> ProfileId {
    let lower = title.to_lowercase();

    PRODUCT_TYPE_KEYS
        .iter()
        .chain(HEURISTIC_KEYWORDS.iter())
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, id)| *id)
        .unwrap_or(ProfileId::Default)
}

// ============================================================================
// Registry
// ============================================================================

/// How the design interacts with the product surface in local previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Flat surfaces (posters, frames, phone cases)
    Normal,
    /// Fabric-like surfaces, followed by a shadow pass
    Multiply,
}

/// Print region geometry, all values are fractions of the template image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrintRegionProfile {
    pub id: ProfileId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub blend_mode: BlendMode,
}

const fn region(id: ProfileId, x: f64, y: f64, width: f64, height: f64, blend_mode: BlendMode) -> PrintRegionProfile {
    PrintRegionProfile { id, x, y, width, height, blend_mode }
}

/// Resolve a profile id to its region geometry
pub fn resolve(id: ProfileId) -> PrintRegionProfile {
    use BlendMode::{Multiply, Normal};

    match id {
        ProfileId::Tshirt => region(id, 0.30, 0.22, 0.40, 0.45, Multiply),
        ProfileId::Hoodie => region(id, 0.25, 0.25, 0.50, 0.40, Multiply),
        ProfileId::Sweatshirt => region(id, 0.28, 0.24, 0.44, 0.42, Multiply),
        ProfileId::TankTop => region(id, 0.32, 0.25, 0.36, 0.45, Multiply),
        ProfileId::LongSleeve => region(id, 0.31, 0.22, 0.38, 0.45, Multiply),
        ProfileId::Poster => region(id, 0.10, 0.10, 0.80, 0.80, Normal),
        ProfileId::Canvas => region(id, 0.08, 0.08, 0.84, 0.84, Normal),
        ProfileId::Mug => region(id, 0.30, 0.30, 0.35, 0.40, Normal),
        ProfileId::PhoneCase => region(id, 0.28, 0.12, 0.44, 0.76, Normal),
        ProfileId::ToteBag => region(id, 0.25, 0.35, 0.50, 0.45, Multiply),
        ProfileId::Hat => region(id, 0.35, 0.30, 0.30, 0.20, Multiply),
        ProfileId::Sticker => region(id, 0.15, 0.15, 0.70, 0.70, Normal),
        ProfileId::Pillow => region(id, 0.15, 0.15, 0.70, 0.70, Multiply),
        ProfileId::Default => region(id, 0.25, 0.20, 0.50, 0.50, Normal),
    }
}
