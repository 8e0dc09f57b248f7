//! Fastener solids: heads, passages, threads and the finished bolts and nuts.
//!
//! Everything is built around the Z axis. A bolt has the underside of its
//! head on z = 0, the head below and the shank running up +Z. A nut stands
//! on z = 0. Passages follow the bolt layout by default and can be flipped
//! with [`Orientation::Nut`] so the head cavity opens upwards.
//!
//! Solids that must fuse with a neighbour overlap it by a small margin so
//! the boolean never sees coincident faces.

use crate::dims::{cos_deg, require_positive, ScrewDims};
use crate::error::Result;
use crate::helix::{build_slices, rotations_for};
use crate::part::Part;
use crate::profile::{build_profile, ThreadKind};
use crate::settings::PrintSettings;

/// Axial overlap between solids that are meant to fuse.
const OVERLAP: f64 = 0.01;
/// Socket depth relative to head height.
const SOCKET_DEPTH_RATIO: f64 = 0.5;
/// Included angle of the cone at the bottom of a socket.
const SOCKET_TIP_ANGLE: f64 = 120.0;

/// Circumradius of a regular hexagon `across_flats` wide.
fn hex_radius(across_flats: f64) -> f64 {
    across_flats / (2.0 * cos_deg(30.0))
}

/// Head and tool shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadStyle {
    /// Round socket head driven by a hex key.
    Allen,
    /// Hexagonal head driven by a wrench.
    Hex,
    /// Square head driven by a wrench.
    Square,
}

impl HeadStyle {
    /// Head height for this style.
    pub fn head_length(self, dims: &ScrewDims) -> f64 {
        match self {
            HeadStyle::Allen => dims.allen_head_length(),
            HeadStyle::Hex => dims.hex_head_length(),
            HeadStyle::Square => dims.square_head_length(),
        }
    }

    /// Distance from the axis to the nearest point of the head's side.
    pub fn inscribed_radius(self, dims: &ScrewDims) -> f64 {
        match self {
            HeadStyle::Allen => dims.allen_head_diameter() / 2.0,
            HeadStyle::Hex => dims.hex_tool_size() / 2.0,
            HeadStyle::Square => dims.square_tool_size() / 2.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            HeadStyle::Allen => "allen",
            HeadStyle::Hex => "hex",
            HeadStyle::Square => "square",
        }
    }
}

/// Which way along Z a body core points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Shank towards +Z, head cavity below the origin.
    #[default]
    Bolt,
    /// Mirrored: shank towards -Z, head cavity above the origin.
    Nut,
}

/// How closely a passage follows the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fit {
    /// Round counterbore that clears any head style.
    #[default]
    Loose,
    /// Cavity following the head outline, e.g. to trap a nut.
    Tight,
}

/// Which ends of a round body get a chamfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BevelEnds {
    /// Chamfer at z = 0.
    pub bottom: bool,
    /// Chamfer at the top face.
    pub top: bool,
}

impl BevelEnds {
    /// Chamfer both faces.
    pub const BOTH: BevelEnds = BevelEnds {
        bottom: true,
        top: true,
    };
    /// Chamfer only the face on z = 0.
    pub const BOTTOM: BevelEnds = BevelEnds {
        bottom: true,
        top: false,
    };
}

/// Stack of coaxial cylinders describing a shank and its head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreOptions {
    /// Length of the shank above the origin.
    pub length: f64,
    /// Shank diameter.
    pub shaft_diameter: f64,
    /// Widen the lower shank to the thread passage diameter.
    pub relief: bool,
    /// Add the head counterbore below the origin.
    pub head: bool,
    /// Radial allowance added to the shank and relief, negative to shrink.
    pub clearance: f64,
    /// Radial allowance added to the head counterbore.
    pub head_clearance: f64,
    /// Which way the stack points.
    pub orientation: Orientation,
}

/// Shank, optional passage relief and optional head counterbore.
pub fn body_core(dims: &ScrewDims, opts: &CoreOptions, settings: &PrintSettings) -> Result<Part> {
    let length = require_positive("length", opts.length)?;
    let shaft_radius = require_positive(
        "shaft_diameter",
        opts.shaft_diameter / 2.0 + opts.clearance,
    )?;
    let segments = settings.facets();

    let mut core = Part::cylinder("shaft", shaft_radius, length, segments);

    if opts.relief {
        let relief_length = dims.thread_passage_length().min(length);
        if relief_length > 0.0 {
            let radius = dims.thread_passage_diameter() / 2.0 + opts.clearance;
            core = core + Part::cylinder("relief", radius, relief_length, segments);
        }
    }

    if opts.head {
        let head_length = dims.head_passage_length();
        if head_length > 0.0 {
            let radius = dims.head_passage_diameter() / 2.0 + opts.head_clearance;
            let head = Part::cylinder("head_passage", radius, head_length + OVERLAP, segments)
                .translate(0.0, 0.0, -head_length);
            core = core + head;
        }
    }

    let core = match opts.orientation {
        Orientation::Bolt => core,
        Orientation::Nut => core.mirror_z(),
    };
    Ok(core.named("core"))
}

/// Chamfer envelope for a round body of `length` and tangent `diameter`.
///
/// The flanks run at the configured bevel angle, measured from the face, and
/// meet the faces on the circle of `diameter`. Intersect a head with the
/// envelope to chamfer it. With no ends selected the envelope is a plain
/// cylinder wide enough to leave the body untouched.
pub fn bevel(
    length: f64,
    diameter: f64,
    ends: BevelEnds,
    settings: &PrintSettings,
) -> Result<Part> {
    let length = require_positive("length", length)?;
    let radius = require_positive("diameter", diameter)? / 2.0;
    let run = length / settings.bevel_angle.to_radians().tan();
    let segments = settings.facets();

    let lower = || Part::cone("bevel_bottom", radius, radius + run, length, segments);
    let upper = || Part::cone("bevel_top", radius + run, radius, length, segments);

    let envelope = match (ends.bottom, ends.top) {
        (true, true) => lower() & upper(),
        (true, false) => lower(),
        (false, true) => upper(),
        (false, false) => Part::cylinder("bevel", radius + run, length, segments),
    };
    Ok(envelope.named("bevel"))
}

/// Outline of a head occupying `z ∈ [-OVERLAP, depth]`, grown by `grow` on
/// every side.
fn silhouette(
    dims: &ScrewDims,
    style: HeadStyle,
    depth: f64,
    grow: f64,
    settings: &PrintSettings,
) -> Part {
    let height = depth + OVERLAP;
    let prism = match style {
        HeadStyle::Allen => Part::cylinder(
            "silhouette",
            dims.allen_head_diameter() / 2.0 + grow,
            height,
            settings.facets(),
        ),
        HeadStyle::Hex => {
            Part::cylinder("silhouette", hex_radius(dims.hex_tool_size() + 2.0 * grow), height, 6)
        }
        HeadStyle::Square => {
            let side = dims.square_tool_size() + 2.0 * grow;
            Part::cube("silhouette", side, side, height).translate(-side / 2.0, -side / 2.0, 0.0)
        }
    };
    prism.translate(0.0, 0.0, -OVERLAP)
}

/// Solid head without any tool cavity, occupying `z ∈ [0, head_length]`.
///
/// The face on z = 0 is the outer face of a bolt head. Socket heads are
/// chamfered on that face only; wrench heads on both.
pub fn head_body(dims: &ScrewDims, style: HeadStyle, settings: &PrintSettings) -> Result<Part> {
    let length = require_positive("head_length", style.head_length(dims))?;
    let body = match style {
        HeadStyle::Allen => {
            let d = require_positive("allen_head_diameter", dims.allen_head_diameter())?;
            let cylinder = Part::cylinder("head", d / 2.0, length, settings.facets());
            cylinder & bevel(length, d * cos_deg(30.0), BevelEnds::BOTTOM, settings)?
        }
        HeadStyle::Hex => {
            let s = require_positive("hex_tool_size", dims.hex_tool_size())?;
            let prism = Part::cylinder("head", dims.hex_head_diameter() / 2.0, length, 6);
            prism & bevel(length, s, BevelEnds::BOTH, settings)?
        }
        HeadStyle::Square => {
            let s = require_positive("square_tool_size", dims.square_tool_size())?;
            let prism = Part::cube("head", s, s, length).translate(-s / 2.0, -s / 2.0, 0.0);
            prism & bevel(length, s, BevelEnds::BOTH, settings)?
        }
    };
    Ok(body.named(format!("{}_head", style.label())))
}

/// Cavity that receives the tool for `style`, opening at z = 0 and reaching
/// `depth` into +Z.
///
/// Allen heads take a hex key socket ending in a drill-point cone. Hex heads
/// take a flat-bottomed hex socket and square heads a square one, both for
/// the same key size. All are grown by the print gap.
pub fn tool_cavity(
    dims: &ScrewDims,
    style: HeadStyle,
    depth: f64,
    settings: &PrintSettings,
) -> Result<Part> {
    let depth = require_positive("depth", depth)?;
    let key = require_positive("allen_tool_size", dims.allen_tool_size())?;
    let width = key + settings.gap_scaled(2.0);
    let height = depth + OVERLAP;
    let cavity = match style {
        HeadStyle::Allen => {
            let radius = hex_radius(width);
            let socket = Part::cylinder("socket", radius, height, 6);
            let tip_height = radius / (SOCKET_TIP_ANGLE / 2.0).to_radians().tan();
            let tip = Part::cone("socket_tip", radius, 0.0, tip_height, 6)
                .translate(0.0, 0.0, height);
            socket + tip
        }
        HeadStyle::Hex => Part::cylinder("socket", hex_radius(width), height, 6),
        HeadStyle::Square => Part::cube("socket", width, width, height).translate(
            -width / 2.0,
            -width / 2.0,
            0.0,
        ),
    };
    Ok(cavity
        .translate(0.0, 0.0, -OVERLAP)
        .named(format!("{}_cavity", style.label())))
}

/// Finished head in `z ∈ [0, head_length]`, outer face on z = 0.
///
/// The tool cavity is cut from the outer face, half the head deep.
pub fn head(dims: &ScrewDims, style: HeadStyle, settings: &PrintSettings) -> Result<Part> {
    let body = head_body(dims, style, settings)?;
    let depth = style.head_length(dims) * SOCKET_DEPTH_RATIO;
    let head = body - tool_cavity(dims, style, depth, settings)?;
    Ok(head.named(format!("{}_head", style.label())))
}

/// Hole for a fastener of `length`, to subtract from a printed part.
///
/// The shank is drilled at the tap diameter so a bolt can cut its own
/// thread; the first part of it is widened to the thread passage diameter.
/// A loose fit adds a round counterbore for the head, opened up by the print
/// gap; a tight fit a cavity following the head outline, deep enough for
/// the whole head.
pub fn passage(
    dims: &ScrewDims,
    style: HeadStyle,
    fit: Fit,
    length: f64,
    orientation: Orientation,
    settings: &PrintSettings,
) -> Result<Part> {
    let opts = CoreOptions {
        length,
        shaft_diameter: dims.tap_diameter(),
        relief: true,
        head: fit == Fit::Loose,
        clearance: 0.0,
        head_clearance: settings.gap,
        orientation: Orientation::Bolt,
    };
    let mut hole = body_core(dims, &opts, settings)?;

    if fit == Fit::Tight {
        let depth = require_positive("head_length", style.head_length(dims))?;
        hole = hole + silhouette(dims, style, depth, settings.gap, settings).mirror_z();
    }

    let hole = match orientation {
        Orientation::Bolt => hole,
        Orientation::Nut => hole.mirror_z(),
    };
    tracing::debug!(size = dims.name(), ?style, ?fit, length, "built passage");
    Ok(hole.named(format!("{} passage", dims.name())))
}

/// Helical thread solid covering `z ∈ [0, length]`.
///
/// With `flat` ends the sweep runs one turn long and is cut square at both
/// ends. Without them the profile starts and stops inside the length, which
/// needs at least one pitch.
pub fn thread(
    dims: &ScrewDims,
    kind: ThreadKind,
    length: f64,
    flat: bool,
    wall: Option<f64>,
    settings: &PrintSettings,
) -> Result<Part> {
    let length = require_positive("length", length)?;
    let profile = build_profile(dims, kind, wall, settings)?;
    let pitch = profile.pitch;
    let slices = build_slices(&profile, rotations_for(length, pitch, flat), settings)?;
    let sweep = Part::loft("thread", &slices.profiles());

    let solid = if flat {
        let side = 2.0 * (profile.outer_radius + 1.0);
        // The sweep starts a turn early; keep one length of it and drop it to z = 0.
        let window = Part::cube("thread_clip", side, side, length).translate(
            -side / 2.0,
            -side / 2.0,
            pitch,
        );
        (sweep & window).translate(0.0, 0.0, -pitch)
    } else {
        sweep
    };
    Ok(solid.named("thread"))
}

/// Bolt with a smooth shank, e.g. for a printed pin or a self-tapping fit.
pub fn plain_bolt(
    dims: &ScrewDims,
    style: HeadStyle,
    length: Option<f64>,
    settings: &PrintSettings,
) -> Result<Part> {
    let length = length.unwrap_or(dims.thread_length());
    let head_length = style.head_length(dims);
    let opts = CoreOptions {
        length,
        shaft_diameter: dims.thread_diameter(),
        relief: false,
        head: false,
        clearance: -settings.gap,
        head_clearance: 0.0,
        orientation: Orientation::Bolt,
    };
    let shank = body_core(dims, &opts, settings)?;
    let head = head(dims, style, settings)?.translate(0.0, 0.0, -head_length);

    tracing::debug!(size = dims.name(), ?style, length, "built plain bolt");
    Ok((head + shank).named(format!("{} bolt", dims.name())))
}

/// Bolt with a helical thread along its shank.
pub fn threaded_bolt(
    dims: &ScrewDims,
    style: HeadStyle,
    length: Option<f64>,
    flat: bool,
    settings: &PrintSettings,
) -> Result<Part> {
    let length = require_positive("length", length.unwrap_or(dims.thread_length()))?;
    let head_length = style.head_length(dims);

    let head = head(dims, style, settings)?.translate(0.0, 0.0, -head_length);
    let core_radius = dims.thread().offset(-settings.gap).bottom_radius;
    let shaft = Part::cylinder(
        "shaft",
        require_positive("thread_core", core_radius)?,
        length + OVERLAP,
        settings.facets(),
    )
    .translate(0.0, 0.0, -OVERLAP);
    let thread = thread(dims, ThreadKind::External, length, flat, None, settings)?;

    tracing::debug!(size = dims.name(), ?style, length, flat, "built threaded bolt");
    Ok((head + shaft + thread).named(format!("{} bolt", dims.name())))
}

/// Nut in `z ∈ [0, head_length]` with an internal thread.
///
/// The bore is cleared to the thread's outer rounding and the internal
/// thread is subtracted from the bore before the bore is cut, which leaves
/// the thread teeth standing in the nut. A `wall` asks for that much backing
/// outside the major radius, never less than the printable minimum; when the
/// backing reaches past the head's flats the nut gets a round collar of that
/// radius.
pub fn threaded_nut(
    dims: &ScrewDims,
    style: HeadStyle,
    wall: Option<f64>,
    settings: &PrintSettings,
) -> Result<Part> {
    let height = require_positive("head_length", style.head_length(dims))?;
    let mut body = head_body(dims, style, settings)?;

    if wall.is_some() {
        let backing = build_profile(dims, ThreadKind::Internal, wall, settings)?.outer_radius;
        if backing > style.inscribed_radius(dims) {
            body = body + Part::cylinder("collar", backing, height, settings.facets());
        }
    }

    let bore_radius = dims.thread().offset(settings.gap).top_radius;
    let bore = Part::cylinder("bore", bore_radius, height + 2.0 * OVERLAP, settings.facets())
        .translate(0.0, 0.0, -OVERLAP);
    let thread = thread(dims, ThreadKind::Internal, height, true, wall, settings)?;

    tracing::debug!(size = dims.name(), ?style, height, ?wall, "built threaded nut");
    Ok((body - (bore - thread)).named(format!("{} nut", dims.name())))
}
