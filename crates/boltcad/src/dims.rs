//! Dimension completion: from a raw catalog entry to every derived size.
//!
//! Completion resolves each field in a fixed order. A field takes the
//! override if one is given, else the catalog value, else a default derived
//! from fields resolved before it. The thread cross-section constants follow
//! the ISO metric basic profile.

use serde::Serialize;

use crate::catalog::{Catalog, RawSpec};
use crate::error::{FastenerError, Result};
use crate::settings::PrintSettings;

/// Half flank angle of the ISO metric thread (degrees).
pub const FLANK_ANGLE: f64 = 30.0;

/// Default socket key size relative to the thread diameter.
const ALLEN_TOOL_RATIO: f64 = 0.75;
/// Default hex head height relative to the thread diameter.
const HEX_HEAD_LENGTH_RATIO: f64 = 0.7;
/// Default hex head diameter (across corners) relative to the thread diameter.
const HEX_HEAD_RATIO: f64 = 26.0 / 15.0;

pub(crate) fn cos_deg(deg: f64) -> f64 {
    deg.to_radians().cos()
}

/// Cross-section constants of one thread, all radii measured from the axis.
///
/// The basic profile has a flat at the minor radius (root of the external
/// thread) and a flat at the major radius (crest). Each flat is replaced by
/// a circular arc that meets both flanks tangentially at the flat's ends, so
/// the arcs bulge past the flats: the enclosing radii [`top_radius`] and
/// [`bottom_radius`] lie outside the functional major and minor radii.
///
/// [`top_radius`]: ThreadGeometry::top_radius
/// [`bottom_radius`]: ThreadGeometry::bottom_radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThreadGeometry {
    /// Half flank angle (degrees).
    pub flank_angle: f64,
    /// Height of the fundamental triangle, `pitch / (2 tan Θ)`.
    pub height: f64,
    /// Functional radius at the crest flat.
    pub major_radius: f64,
    /// Functional radius at the root flat, `major - 5H/8`.
    pub minor_radius: f64,
    /// Half length of the crest flat.
    pub major_flat: f64,
    /// Half length of the root flat.
    pub minor_flat: f64,
    /// Radius of the crest rounding arc.
    pub major_rounding: f64,
    /// Radius of the root rounding arc.
    pub minor_rounding: f64,
    /// Radial position of the crest arc center.
    pub major_center: f64,
    /// Radial position of the root arc center.
    pub minor_center: f64,
    /// Outermost radius including the crest arc.
    pub top_radius: f64,
    /// Innermost radius including the root arc.
    pub bottom_radius: f64,
}

impl ThreadGeometry {
    /// Profile constants for a thread of `pitch` and nominal `diameter`.
    pub fn new(pitch: f64, diameter: f64) -> Self {
        let theta = FLANK_ANGLE.to_radians();
        let (sin, cos) = theta.sin_cos();

        let height = pitch / (2.0 * theta.tan());
        let major_radius = diameter / 2.0;
        let minor_radius = major_radius - 5.0 * height / 8.0;

        let minor_flat = pitch / 8.0;
        let major_flat = pitch / 16.0;
        let minor_rounding = minor_flat / cos;
        let major_rounding = major_flat / cos;

        // Centers sit on the flat's symmetry line, one rounding radius away
        // from each flank along its normal.
        let minor_center = minor_radius + minor_rounding * sin;
        let major_center = major_radius - major_rounding * sin;

        Self {
            flank_angle: FLANK_ANGLE,
            height,
            major_radius,
            minor_radius,
            major_flat,
            minor_flat,
            major_rounding,
            minor_rounding,
            major_center,
            minor_center,
            top_radius: major_center + major_rounding,
            bottom_radius: minor_center - minor_rounding,
        }
    }

    /// The same profile moved radially by `delta` (negative shrinks).
    pub fn offset(&self, delta: f64) -> Self {
        Self {
            major_radius: self.major_radius + delta,
            minor_radius: self.minor_radius + delta,
            major_center: self.major_center + delta,
            minor_center: self.minor_center + delta,
            top_radius: self.top_radius + delta,
            bottom_radius: self.bottom_radius + delta,
            ..*self
        }
    }
}

/// Explicit values that take precedence over the catalog.
///
/// Every field is optional; `None` means "use the catalog value or the
/// default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Size designation.
    pub name: Option<String>,
    /// Axial advance per turn.
    pub pitch: Option<f64>,
    /// Nominal thread diameter.
    pub thread_diameter: Option<f64>,
    /// Thread length.
    pub thread_length: Option<f64>,
    /// Pilot hole diameter.
    pub tap_diameter: Option<f64>,
    /// Clearance diameter for the shaft.
    pub thread_passage_diameter: Option<f64>,
    /// Clearance length, clamped to the thread length.
    pub thread_passage_length: Option<f64>,
    /// Socket head diameter.
    pub allen_head_diameter: Option<f64>,
    /// Socket head height.
    pub allen_head_length: Option<f64>,
    /// Hex key size.
    pub allen_tool_size: Option<f64>,
    /// Hex head diameter across corners, converted to a wrench size.
    pub hex_head_diameter: Option<f64>,
    /// Hex and square head height.
    pub hex_head_length: Option<f64>,
    /// Wrench size across flats.
    pub hex_tool_size: Option<f64>,
    /// Square head width.
    pub square_tool_size: Option<f64>,
    /// Head counterbore diameter.
    pub head_passage_diameter: Option<f64>,
    /// Head counterbore depth.
    pub head_passage_length: Option<f64>,
}

/// Fully resolved dimensions of one fastener size.
///
/// Created by [`complete`], [`guess`] or [`ScrewDims::with_overrides`] and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrewDims {
    index: usize,
    name: String,
    pitch: f64,
    tap_diameter: f64,
    thread_diameter: f64,
    thread_passage_diameter: f64,
    thread_length: f64,
    thread_passage_length: f64,
    head_passage_diameter: f64,
    head_passage_length: f64,
    allen_head_diameter: f64,
    allen_head_length: f64,
    allen_tool_size: f64,
    hex_head_diameter: f64,
    hex_head_length: f64,
    hex_tool_size: f64,
    square_tool_size: f64,
    thread: ThreadGeometry,
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FastenerError::InvalidDimension { field, value })
    }
}

/// Complete catalog entry `index`.
pub fn complete(
    catalog: &Catalog,
    index: usize,
    overrides: &Overrides,
    settings: &PrintSettings,
) -> Result<ScrewDims> {
    complete_raw(index, catalog.get(index)?, overrides, settings)
}

/// Complete the nearest catalog size to `td` (see [`Catalog::guess`]).
pub fn guess(
    catalog: &Catalog,
    td: f64,
    overrides: &Overrides,
    settings: &PrintSettings,
) -> Result<ScrewDims> {
    let index = catalog.guess(td)?;
    complete(catalog, index, overrides, settings)
}

/// Complete a raw entry that is not necessarily part of a catalog.
pub fn complete_raw(
    index: usize,
    raw: &RawSpec,
    ov: &Overrides,
    settings: &PrintSettings,
) -> Result<ScrewDims> {
    settings.validate()?;
    let cos30 = cos_deg(30.0);
    let cos45 = cos_deg(45.0);

    // Nominal size
    let name = ov.name.clone().unwrap_or_else(|| raw.name.clone());
    let pitch = require_positive("pitch", ov.pitch.unwrap_or(raw.pitch))?;
    let thread_diameter = require_positive(
        "thread_diameter",
        ov.thread_diameter.unwrap_or(raw.thread_diameter),
    )?;
    let thread_length = require_positive(
        "thread_length",
        ov.thread_length.unwrap_or(raw.thread_length),
    )?;

    // Socket head height
    let allen_head_length = ov
        .allen_head_length
        .or(raw.allen_head_length)
        .unwrap_or(thread_diameter);

    // Hex key
    let allen_tool_size = ov
        .allen_tool_size
        .or(raw.allen_tool_size)
        .unwrap_or(ALLEN_TOOL_RATIO * thread_diameter);

    // Hex head height
    let hex_head_length = ov
        .hex_head_length
        .or(raw.hex_head_length)
        .unwrap_or(HEX_HEAD_LENGTH_RATIO * thread_diameter);

    // Wrench size. A head diameter given instead is read across corners.
    let hex_tool_size = ov
        .hex_tool_size
        .or_else(|| ov.hex_head_diameter.map(|d| d * cos30))
        .or(raw.hex_tool_size)
        .or_else(|| raw.hex_head_diameter.map(|d| d * cos30))
        .unwrap_or(thread_diameter * cos30 * HEX_HEAD_RATIO);

    // Socket head diameter
    let allen_head_diameter = ov
        .allen_head_diameter
        .or(raw.allen_head_diameter)
        .unwrap_or(hex_tool_size);

    // Counterbore wide enough for a square of the wrench size
    let head_passage_diameter = ov
        .head_passage_diameter
        .or(raw.head_passage_diameter)
        .unwrap_or(hex_tool_size / cos45);

    let head_passage_length = ov
        .head_passage_length
        .or(raw.head_passage_length)
        .unwrap_or(allen_head_length);

    // Always derived from the wrench size
    let hex_head_diameter = hex_tool_size / cos30;

    let square_tool_size = ov
        .square_tool_size
        .or(raw.square_tool_size)
        .unwrap_or(hex_tool_size);

    let tap_diameter = ov
        .tap_diameter
        .or(raw.tap_diameter)
        .unwrap_or(thread_diameter - pitch);

    // Clamped, never rejected
    let thread_passage_length = ov
        .thread_passage_length
        .or(raw.thread_passage_length)
        .unwrap_or(thread_length)
        .min(thread_length);

    let thread = ThreadGeometry::new(pitch, thread_diameter);
    if thread.bottom_radius - settings.gap <= 0.0 {
        return Err(FastenerError::InvalidDimension {
            field: "pitch",
            value: pitch,
        });
    }

    let thread_passage_diameter = ov
        .thread_passage_diameter
        .or(raw.thread_passage_diameter)
        .unwrap_or(2.0 * (thread.top_radius + settings.gap));

    tracing::debug!(
        index,
        name = %name,
        pitch,
        thread_diameter,
        hex_tool_size,
        thread_passage_diameter,
        "completed fastener dimensions"
    );

    Ok(ScrewDims {
        index,
        name,
        pitch,
        tap_diameter,
        thread_diameter,
        thread_passage_diameter,
        thread_length,
        thread_passage_length,
        head_passage_diameter,
        head_passage_length,
        allen_head_diameter,
        allen_head_length,
        allen_tool_size,
        hex_head_diameter,
        hex_head_length,
        hex_tool_size,
        square_tool_size,
        thread,
    })
}

impl ScrewDims {
    /// Re-complete with this record standing in for the catalog entry.
    ///
    /// With empty overrides the result equals `self`.
    pub fn with_overrides(&self, overrides: &Overrides, settings: &PrintSettings) -> Result<Self> {
        complete_raw(self.index, &RawSpec::from(self), overrides, settings)
    }

    /// Catalog position this record was completed from.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Size designation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Axial advance per turn.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Pilot hole diameter for tapping.
    pub fn tap_diameter(&self) -> f64 {
        self.tap_diameter
    }

    /// Nominal thread diameter.
    pub fn thread_diameter(&self) -> f64 {
        self.thread_diameter
    }

    /// Clearance hole diameter for the threaded shaft.
    pub fn thread_passage_diameter(&self) -> f64 {
        self.thread_passage_diameter
    }

    /// Thread length.
    pub fn thread_length(&self) -> f64 {
        self.thread_length
    }

    /// Clearance length of a passage, never above the thread length.
    pub fn thread_passage_length(&self) -> f64 {
        self.thread_passage_length
    }

    /// Head counterbore diameter.
    pub fn head_passage_diameter(&self) -> f64 {
        self.head_passage_diameter
    }

    /// Head counterbore depth.
    pub fn head_passage_length(&self) -> f64 {
        self.head_passage_length
    }

    /// Socket head diameter.
    pub fn allen_head_diameter(&self) -> f64 {
        self.allen_head_diameter
    }

    /// Socket head height.
    pub fn allen_head_length(&self) -> f64 {
        self.allen_head_length
    }

    /// Hex key size across flats.
    pub fn allen_tool_size(&self) -> f64 {
        self.allen_tool_size
    }

    /// Hex head diameter across corners.
    pub fn hex_head_diameter(&self) -> f64 {
        self.hex_head_diameter
    }

    /// Hex head height.
    pub fn hex_head_length(&self) -> f64 {
        self.hex_head_length
    }

    /// Wrench size across flats.
    pub fn hex_tool_size(&self) -> f64 {
        self.hex_tool_size
    }

    /// Square head width.
    pub fn square_tool_size(&self) -> f64 {
        self.square_tool_size
    }

    /// Square head height, shared with the hex head.
    pub fn square_head_length(&self) -> f64 {
        self.hex_head_length
    }

    /// Thread cross-section constants.
    pub fn thread(&self) -> &ThreadGeometry {
        &self.thread
    }
}

impl From<&ScrewDims> for RawSpec {
    fn from(dims: &ScrewDims) -> Self {
        RawSpec {
            name: dims.name.clone(),
            pitch: dims.pitch,
            thread_diameter: dims.thread_diameter,
            thread_length: dims.thread_length,
            tap_diameter: Some(dims.tap_diameter),
            thread_passage_diameter: Some(dims.thread_passage_diameter),
            thread_passage_length: Some(dims.thread_passage_length),
            allen_head_diameter: Some(dims.allen_head_diameter),
            allen_head_length: Some(dims.allen_head_length),
            allen_tool_size: Some(dims.allen_tool_size),
            hex_head_diameter: Some(dims.hex_head_diameter),
            hex_head_length: Some(dims.hex_head_length),
            hex_tool_size: Some(dims.hex_tool_size),
            square_tool_size: Some(dims.square_tool_size),
            head_passage_diameter: Some(dims.head_passage_diameter),
            head_passage_length: Some(dims.head_passage_length),
        }
    }
}
