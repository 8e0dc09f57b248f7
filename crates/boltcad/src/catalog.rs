//! Per-size fastener tables.
//!
//! A catalog is an ordered list of [`RawSpec`] entries. Every optional field
//! left unset means "derive it" during completion; a present zero is a real
//! value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FastenerError, Result};

/// Raw catalog entry for one nominal size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSpec {
    /// Size designation, e.g. `"M3"`.
    pub name: String,
    /// Axial advance per turn.
    pub pitch: f64,
    /// Nominal (major) thread diameter.
    pub thread_diameter: f64,
    /// Default thread length.
    pub thread_length: f64,
    /// Pilot hole diameter for tapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_diameter: Option<f64>,
    /// Clearance hole diameter for the threaded shaft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_passage_diameter: Option<f64>,
    /// Length of the clearance part of a passage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_passage_length: Option<f64>,
    /// Socket head diameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allen_head_diameter: Option<f64>,
    /// Socket head height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allen_head_length: Option<f64>,
    /// Hex key size across flats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allen_tool_size: Option<f64>,
    /// Hex head diameter across corners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex_head_diameter: Option<f64>,
    /// Hex head (and square head) height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex_head_length: Option<f64>,
    /// Wrench size across flats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex_tool_size: Option<f64>,
    /// Square head width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_tool_size: Option<f64>,
    /// Counterbore diameter for the head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_passage_diameter: Option<f64>,
    /// Counterbore depth for the head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_passage_length: Option<f64>,
}

impl RawSpec {
    /// Entry with only the mandatory fields set.
    pub fn new(
        name: impl Into<String>,
        pitch: f64,
        thread_diameter: f64,
        thread_length: f64,
    ) -> Self {
        Self {
            name: name.into(),
            pitch,
            thread_diameter,
            thread_length,
            ..Default::default()
        }
    }

    fn socket_head(mut self, diameter: f64, length: f64, tool: f64) -> Self {
        self.allen_head_diameter = Some(diameter);
        self.allen_head_length = Some(length);
        self.allen_tool_size = Some(tool);
        self
    }

    fn hex_nut(mut self, tool: f64, length: f64) -> Self {
        self.hex_tool_size = Some(tool);
        self.hex_head_length = Some(length);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    screw: Vec<RawSpec>,
}

/// Ordered, read-only table of raw entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<RawSpec>,
}

impl Catalog {
    /// Catalog over the given entries, in order.
    pub fn new(entries: Vec<RawSpec>) -> Self {
        Self { entries }
    }

    /// ISO metric coarse sizes M2 to M12.
    ///
    /// Socket heads follow ISO 4762 and hex sizes ISO 4032 where those
    /// standards fix them; everything else is left to completion.
    pub fn iso_metric() -> Self {
        Self::new(vec![
            RawSpec::new("M2", 0.4, 2.0, 10.0).socket_head(3.8, 2.0, 1.5),
            RawSpec::new("M2.5", 0.45, 2.5, 12.0).socket_head(4.5, 2.5, 2.0),
            RawSpec::new("M3", 0.5, 3.0, 16.0)
                .socket_head(5.5, 3.0, 2.5)
                .hex_nut(5.5, 2.4),
            RawSpec::new("M4", 0.7, 4.0, 20.0)
                .socket_head(7.0, 4.0, 3.0)
                .hex_nut(7.0, 3.2),
            RawSpec::new("M5", 0.8, 5.0, 25.0)
                .socket_head(8.5, 5.0, 4.0)
                .hex_nut(8.0, 4.7),
            RawSpec::new("M6", 1.0, 6.0, 30.0)
                .socket_head(10.0, 6.0, 5.0)
                .hex_nut(10.0, 5.2),
            RawSpec::new("M8", 1.25, 8.0, 35.0)
                .socket_head(13.0, 8.0, 6.0)
                .hex_nut(13.0, 6.8),
            RawSpec::new("M10", 1.5, 10.0, 40.0)
                .socket_head(16.0, 10.0, 8.0)
                .hex_nut(16.0, 8.4),
            RawSpec::new("M12", 1.75, 12.0, 50.0)
                .socket_head(18.0, 12.0, 10.0)
                .hex_nut(18.0, 10.8),
        ])
    }

    /// Parse a catalog from TOML with one `[[screw]]` table per entry.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::new(file.screw))
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Result<&RawSpec> {
        self.entries.get(index).ok_or(FastenerError::InvalidIndex {
            index,
            len: self.entries.len(),
        })
    }

    /// Index of the first entry named `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &RawSpec> {
        self.entries.iter()
    }

    /// Index of the nearest size to thread diameter `td`.
    ///
    /// The sign of `td` picks the search direction: positive looks for the
    /// smallest size at or above `|td|`, negative for the largest size at or
    /// below it, zero for the nearest size either way. Ties go to the entry
    /// listed first.
    pub fn guess(&self, td: f64) -> Result<usize> {
        if !td.is_finite() {
            return Err(FastenerError::NoMatchingSize(td));
        }
        let target = td.abs();
        let mut best: Option<(usize, f64)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let diff = entry.thread_diameter - target;
            let eligible = diff == 0.0 || td == 0.0 || (td > 0.0) == (diff > 0.0);
            if !eligible {
                continue;
            }
            if best.map_or(true, |(_, d)| diff.abs() < d) {
                best = Some((index, diff.abs()));
            }
        }
        let (index, distance) = best.ok_or(FastenerError::NoMatchingSize(td))?;
        tracing::debug!(td, index, distance, "guessed catalog size");
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            RawSpec::new("A", 0.4, 2.0, 10.0),
            RawSpec::new("B", 0.5, 3.0, 10.0),
            RawSpec::new("C", 0.7, 4.0, 10.0),
            RawSpec::new("D", 0.8, 5.0, 10.0),
        ])
    }

    #[test]
    fn test_guess_upward() {
        let catalog = small_catalog();
        assert_eq!(catalog.guess(3.5).unwrap(), 2);
        assert_eq!(catalog.guess(3.0).unwrap(), 1);
    }

    #[test]
    fn test_guess_downward() {
        let catalog = small_catalog();
        assert_eq!(catalog.guess(-3.5).unwrap(), 1);
        assert_eq!(catalog.guess(-4.0).unwrap(), 2);
    }

    #[test]
    fn test_guess_zero_picks_smallest() {
        assert_eq!(small_catalog().guess(0.0).unwrap(), 0);
    }

    #[test]
    fn test_guess_out_of_range() {
        let catalog = small_catalog();
        assert!(matches!(
            catalog.guess(6.0),
            Err(FastenerError::NoMatchingSize(_))
        ));
        assert!(matches!(
            catalog.guess(-1.0),
            Err(FastenerError::NoMatchingSize(_))
        ));
        assert!(Catalog::default().guess(0.0).is_err());
    }

    #[test]
    fn test_guess_rejects_non_finite() {
        let catalog = small_catalog();
        for td in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                catalog.guess(td),
                Err(FastenerError::NoMatchingSize(_))
            ));
        }
    }

    #[test]
    fn test_guess_ties_go_to_first_entry() {
        let catalog = Catalog::new(vec![
            RawSpec::new("first", 0.5, 3.0, 10.0),
            RawSpec::new("second", 0.35, 3.0, 10.0),
        ]);
        assert_eq!(catalog.guess(2.5).unwrap(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let catalog = small_catalog();
        assert_eq!(catalog.get(3).unwrap().name, "D");
        assert!(matches!(
            catalog.get(4),
            Err(FastenerError::InvalidIndex { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_iso_metric_table() {
        let catalog = Catalog::iso_metric();
        let m3 = catalog.get(catalog.find("M3").unwrap()).unwrap();
        assert_eq!(m3.pitch, 0.5);
        assert_eq!(m3.allen_tool_size, Some(2.5));
        assert_eq!(m3.hex_head_diameter, None);
        // Sizes are listed smallest first.
        let diameters: Vec<f64> = catalog.iter().map(|e| e.thread_diameter).collect();
        assert!(diameters.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = Catalog::from_toml_str(
            r#"
[[screw]]
name = "M3"
pitch = 0.5
thread_diameter = 3.0
thread_length = 16.0

[[screw]]
name = "M4"
pitch = 0.7
thread_diameter = 4.0
thread_length = 20.0
allen_tool_size = 3.0
head_passage_length = 0.0
"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("M4"), Some(1));
        let m4 = catalog.get(1).unwrap();
        assert_eq!(m4.allen_tool_size, Some(3.0));
        // A present zero is distinct from an absent field.
        assert_eq!(m4.head_passage_length, Some(0.0));
        assert_eq!(catalog.get(0).unwrap().head_passage_length, None);
    }

    #[test]
    fn test_catalog_rejects_unknown_keys() {
        let err = Catalog::from_toml_str(
            "[[screw]]\nname = \"X\"\npitch = 1.0\nthread_diameter = 6.0\nthread_length = 10.0\ncolour = 3\n",
        )
        .unwrap_err();
        assert!(matches!(err, FastenerError::Parse(_)));
    }
}
