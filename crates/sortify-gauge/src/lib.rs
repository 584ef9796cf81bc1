#![warn(missing_docs)]
//! # sortify-gauge
//!
//! ## Purpose
//! Maps a resolved classification onto the immutable [`VisualState`] that
//! drives the risk gauge (arc, needle, badge).
//!
//! ## Responsibilities
//! - Fix angle, fill ratio, and color per [`Category`] (categorical policy).
//! - Optionally refine the position within a category's band by score
//!   ([`GaugePolicy::Banded`]).
//! - Resolve badge text through the display override and canonical phrases.
//! - Derive render geometry (arc dash offset, needle transform) and badge tone.
//!
//! ## Data flow
//! [`ResolvedClassification`] -> [`GaugeMapper::map`] -> [`VisualState`] ->
//! presentation sink. Concrete colors come from a [`Palette`] at render time.
//!
//! ## Ownership and lifetimes
//! `VisualState` owns its display text so a sink can keep it after the
//! response buffer is gone.
//!
//! ## Error model
//! Mapping is total. Only palette loading and policy parsing return
//! [`GaugeError`].
//!
//! ## Example
//! ```rust
//! use sortify_classification_contract::Category;
//! use sortify_gauge::{compute_visual_state, ColorToken};
//!
//! let state = compute_visual_state(Category::Spam, 0.75, None);
//! assert_eq!(state.angle_degrees, 45.0);
//! assert_eq!(state.fill_ratio, 0.75);
//! assert_eq!(state.color, ColorToken::Elevated);
//! assert_eq!(state.display_text, "Spam");
//! ```

mod palette;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sortify_classification_contract::{Category, ResolvedClassification, normalize_value};
use thiserror::Error;

pub use palette::{ColorToken, Palette, Swatch};

/// Length of the semicircular arc path in SVG user units.
pub const MAX_ARC_LENGTH: f64 = 283.0;

/// Needle pivot in SVG user units (`x`, `y`).
pub const NEEDLE_PIVOT: (u32, u32) = (100, 100);

/// Half-width of a category's angular band under [`GaugePolicy::Banded`].
pub const BAND_HALF_WIDTH_DEGREES: f64 = 22.5;

/// Half-width of a category's fill band under [`GaugePolicy::Banded`].
pub const BAND_HALF_WIDTH_FILL: f64 = 0.125;

/// Fixed gauge position and color for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryAnchor {
    /// Needle angle in degrees; `-90` is safest, `90` most dangerous.
    pub angle_degrees: f64,
    /// Arc fill ratio.
    pub fill_ratio: f64,
    /// Semantic color.
    pub color: ColorToken,
}

/// Returns the categorical anchor for `category`.
pub fn anchor(category: Category) -> CategoryAnchor {
    let (angle_degrees, fill_ratio, color) = match category {
        Category::Ham => (-90.0, 0.0, ColorToken::Safe),
        Category::Support => (-45.0, 0.25, ColorToken::Informational),
        Category::Spam => (45.0, 0.75, ColorToken::Elevated),
        Category::Phishing => (90.0, 1.0, ColorToken::Critical),
        Category::Unknown => (0.0, 0.5, ColorToken::Neutral),
    };

    CategoryAnchor {
        angle_degrees,
        fill_ratio,
        color,
    }
}

/// How the score influences gauge position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugePolicy {
    /// Position and color are fixed per category; the score is ignored.
    #[default]
    Categorical,
    /// Color is fixed per category; position moves within the category's
    /// band, scaled by score.
    Banded,
}

impl fmt::Display for GaugePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical => f.write_str("categorical"),
            Self::Banded => f.write_str("banded"),
        }
    }
}

impl FromStr for GaugePolicy {
    type Err = GaugeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "categorical" => Ok(Self::Categorical),
            "banded" => Ok(Self::Banded),
            other => Err(GaugeError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Badge styling class derived from category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    /// Ham or unknown.
    Safe,
    /// Support request.
    Support,
    /// Spam.
    Medium,
    /// Phishing.
    Spam,
}

impl BadgeTone {
    /// CSS class name used by the panel stylesheet.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Safe => "status-safe",
            Self::Support => "status-support",
            Self::Medium => "status-medium",
            Self::Spam => "status-spam",
        }
    }
}

/// Complete description of what the gauge and badge display for one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    /// Resolved category.
    pub category: Category,
    /// Score in `[0, 1]`.
    pub normalized_score: f64,
    /// Needle angle in `[-90, 90]`.
    pub angle_degrees: f64,
    /// Arc fill ratio in `[0, 1]`.
    pub fill_ratio: f64,
    /// Semantic color token.
    pub color: ColorToken,
    /// Badge text.
    pub display_text: String,
}

impl VisualState {
    /// Neutral state shown before any classification or for empty mail.
    pub fn neutral() -> Self {
        compute_visual_state(Category::Unknown, 0.5, None)
    }

    /// Score as a rounded percentage, for example `"75%"`.
    pub fn percent_text(&self) -> String {
        format!("{}%", (self.normalized_score * 100.0).round() as u32)
    }

    /// Badge tone for this state's category.
    pub fn badge_tone(&self) -> BadgeTone {
        match self.category {
            Category::Phishing => BadgeTone::Spam,
            Category::Spam => BadgeTone::Medium,
            Category::Support => BadgeTone::Support,
            Category::Ham | Category::Unknown => BadgeTone::Safe,
        }
    }

    /// Arc and needle geometry for SVG-style renderers.
    pub fn arc(&self) -> ArcGeometry {
        ArcGeometry {
            dash_offset: MAX_ARC_LENGTH - self.fill_ratio * MAX_ARC_LENGTH,
            angle_degrees: self.angle_degrees,
        }
    }
}

/// Render geometry for a semicircular gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    /// `stroke-dashoffset` of the arc; [`MAX_ARC_LENGTH`] means empty.
    pub dash_offset: f64,
    /// Needle rotation in degrees.
    pub angle_degrees: f64,
}

impl ArcGeometry {
    /// SVG `transform` attribute value for the needle.
    pub fn needle_transform(&self) -> String {
        let (x, y) = NEEDLE_PIVOT;
        format!("rotate({} {x} {y})", self.angle_degrees)
    }
}

/// Visual state mapper configured with a [`GaugePolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaugeMapper {
    policy: GaugePolicy,
}

impl GaugeMapper {
    /// Creates a mapper for `policy`.
    pub fn new(policy: GaugePolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub fn policy(&self) -> GaugePolicy {
        self.policy
    }

    /// Maps category and score to a visual state.
    ///
    /// The score is re-normalized, so out-of-range input cannot break the
    /// `[0, 1]` invariant. Blank display overrides are ignored.
    pub fn compute(
        &self,
        category: Category,
        normalized_score: f64,
        override_display: Option<&str>,
    ) -> VisualState {
        let score = normalize_value(normalized_score);
        let anchor = anchor(category);

        let (angle_degrees, fill_ratio) = match self.policy {
            GaugePolicy::Categorical => (anchor.angle_degrees, anchor.fill_ratio),
            GaugePolicy::Banded => {
                // Offset in [-1, 1]; bands never overlap, so the needle stays
                // inside its category's sector.
                let offset = (score - 0.5) * 2.0;
                (
                    (anchor.angle_degrees + offset * BAND_HALF_WIDTH_DEGREES).clamp(-90.0, 90.0),
                    (anchor.fill_ratio + offset * BAND_HALF_WIDTH_FILL).clamp(0.0, 1.0),
                )
            }
        };

        let display_text = override_display
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| category.canonical_display())
            .to_string();

        VisualState {
            category,
            normalized_score: score,
            angle_degrees,
            fill_ratio,
            color: anchor.color,
            display_text,
        }
    }

    /// Maps a fully resolved classification.
    pub fn map(&self, resolved: &ResolvedClassification) -> VisualState {
        self.compute(
            resolved.category,
            resolved.score,
            resolved.display_override.as_deref(),
        )
    }
}

/// Maps category and score with the default categorical policy.
pub fn compute_visual_state(
    category: Category,
    normalized_score: f64,
    override_display: Option<&str>,
) -> VisualState {
    GaugeMapper::default().compute(category, normalized_score, override_display)
}

/// Gauge configuration errors.
#[derive(Debug, Error)]
pub enum GaugeError {
    /// Palette JSON is malformed or names an unknown token.
    #[error("palette decode failure: {0}")]
    PaletteDecode(#[source] serde_json::Error),
    /// Palette value is not a hex color.
    #[error("invalid color {value:?} for token {token}")]
    InvalidColor {
        /// Token being overridden.
        token: ColorToken,
        /// Offending value.
        value: String,
    },
    /// Policy name is not recognized.
    #[error("unknown gauge policy: {0:?}")]
    UnknownPolicy(String),
}
