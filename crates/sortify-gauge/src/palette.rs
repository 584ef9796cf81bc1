//! Semantic color table for gauge rendering.
//!
//! Mapping logic only ever names a [`ColorToken`]; renderers look the token up
//! in a [`Palette`] to obtain concrete colors. The default palette can be
//! partially overridden from JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GaugeError;

/// Semantic color emitted by the visual state mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    /// Safe green.
    Safe,
    /// Informational blue.
    Informational,
    /// Elevated orange.
    Elevated,
    /// Critical red.
    Critical,
    /// Neutral gray.
    Neutral,
}

impl ColorToken {
    /// Token name as used in palette files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Informational => "informational",
            Self::Elevated => "elevated",
            Self::Critical => "critical",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete colors for one token: a solid fallback and a three-stop arc
/// gradient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    /// Solid `#rrggbb` color used when gradients are unavailable.
    pub solid: String,
    /// Gradient stops, start to end.
    pub gradient: [String; 3],
}

impl Swatch {
    fn new(solid: &str, gradient: [&str; 3]) -> Self {
        Self {
            solid: solid.to_string(),
            gradient: gradient.map(str::to_string),
        }
    }

    fn validate(&self, token: ColorToken) -> Result<(), GaugeError> {
        for value in std::iter::once(&self.solid).chain(self.gradient.iter()) {
            if !is_hex_color(value) {
                return Err(GaugeError::InvalidColor {
                    token,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Color table keyed by [`ColorToken`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    safe: Swatch,
    informational: Swatch,
    elevated: Swatch,
    critical: Swatch,
    neutral: Swatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteOverrides {
    safe: Option<Swatch>,
    informational: Option<Swatch>,
    elevated: Option<Swatch>,
    critical: Option<Swatch>,
    neutral: Option<Swatch>,
}

impl Palette {
    /// Returns the swatch for `token`.
    pub fn swatch(&self, token: ColorToken) -> &Swatch {
        match token {
            ColorToken::Safe => &self.safe,
            ColorToken::Informational => &self.informational,
            ColorToken::Elevated => &self.elevated,
            ColorToken::Critical => &self.critical,
            ColorToken::Neutral => &self.neutral,
        }
    }

    /// Builds a palette from a JSON document keyed by token name.
    ///
    /// Tokens absent from the document keep their default swatch.
    ///
    /// # Errors
    /// Returns [`GaugeError::PaletteDecode`] for malformed JSON or unknown
    /// token names, and [`GaugeError::InvalidColor`] for values that are not
    /// `#rgb`/`#rrggbb` hex colors.
    pub fn from_json_str(raw: &str) -> Result<Self, GaugeError> {
        let overrides: PaletteOverrides =
            serde_json::from_str(raw).map_err(GaugeError::PaletteDecode)?;

        let mut palette = Self::default();
        let slots = [
            (ColorToken::Safe, overrides.safe, &mut palette.safe),
            (
                ColorToken::Informational,
                overrides.informational,
                &mut palette.informational,
            ),
            (ColorToken::Elevated, overrides.elevated, &mut palette.elevated),
            (ColorToken::Critical, overrides.critical, &mut palette.critical),
            (ColorToken::Neutral, overrides.neutral, &mut palette.neutral),
        ];

        for (token, replacement, slot) in slots {
            if let Some(swatch) = replacement {
                swatch.validate(token)?;
                *slot = swatch;
            }
        }

        Ok(palette)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            safe: Swatch::new("#28a745", ["#28a745", "#4bd07e", "#7be0a3"]),
            informational: Swatch::new("#007bff", ["#007bff", "#2fa8ff", "#28a745"]),
            elevated: Swatch::new("#fd7e14", ["#fd7e14", "#ff9a3b", "#dc3545"]),
            critical: Swatch::new("#dc3545", ["#ff6b6b", "#dc3545", "#b00020"]),
            neutral: Swatch::new("#6c757d", ["#6c757d", "#8a8f94", "#b0b5bb"]),
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
