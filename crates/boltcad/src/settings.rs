//! Print settings shared by every derivation and build call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FastenerError, Result};

/// Tunables for a particular printer and material.
///
/// Settings are read, never written, by the builders. Missing keys in a TOML
/// file fall back to [`PrintSettings::default`].
///
/// ```toml
/// min_wall = 1.2
/// gap = 0.15
/// resolution = 48
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Thinnest wall the printer reliably produces (mm).
    pub min_wall: f64,
    /// Radial fit allowance between mating parts (mm).
    pub gap: f64,
    /// Facets per full turn for circles, arcs and helices.
    pub resolution: u32,
    /// Angle between a head bevel and the head face (degrees).
    pub bevel_angle: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            min_wall: 0.8,
            gap: 0.1,
            resolution: 32,
            bevel_angle: 30.0,
        }
    }
}

impl PrintSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Copy with a different facet count.
    pub fn with_resolution(&self, resolution: u32) -> Self {
        Self {
            resolution,
            ..self.clone()
        }
    }

    /// Facets per turn, never fewer than 3.
    pub fn facets(&self) -> u32 {
        self.resolution.max(3)
    }

    /// Fit allowance scaled by `multiplier`.
    pub fn gap_scaled(&self, multiplier: f64) -> f64 {
        self.gap * multiplier
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.min_wall.is_finite() || self.min_wall <= 0.0 {
            return Err(FastenerError::InvalidSettings(
                "min_wall must be positive".into(),
            ));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(FastenerError::InvalidSettings(
                "gap must be zero or positive".into(),
            ));
        }
        if !(self.bevel_angle > 0.0 && self.bevel_angle < 90.0) {
            return Err(FastenerError::InvalidSettings(
                "bevel_angle must be between 0 and 90 degrees".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = PrintSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.facets(), 32);
    }

    #[test]
    fn test_facet_floor() {
        let settings = PrintSettings::default().with_resolution(1);
        assert_eq!(settings.facets(), 3);
        assert_eq!(settings.resolution, 1);
    }

    #[test]
    fn test_partial_toml() {
        let settings = PrintSettings::from_toml_str("gap = 0.2\nresolution = 64\n").unwrap();
        assert_eq!(settings.gap, 0.2);
        assert_eq!(settings.resolution, 64);
        assert_eq!(settings.min_wall, 0.8);
        assert_eq!(settings.gap_scaled(2.0), 0.4);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = PrintSettings {
            min_wall: -0.1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let err = PrintSettings::from_toml_str("bevel_angle = 90.0").unwrap_err();
        assert!(matches!(err, FastenerError::InvalidSettings(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PrintSettings::from_toml_str("gap = \"wide\"").unwrap_err();
        assert!(matches!(err, FastenerError::Parse(_)));
    }
}
