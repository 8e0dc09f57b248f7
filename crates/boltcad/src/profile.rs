//! Thread cross-section profiles.
//!
//! A profile is one pitch of the thread drawn in the half plane that contains
//! the screw axis. Points are `(radial, axial)` pairs stored as [`Point2`]
//! with `x` the distance from the axis and `y` the position along it. The
//! last point is always the first point moved one pitch along the axis, so
//! copies stacked at pitch spacing line up.

use nalgebra::{Point2, Vector2};

use crate::dims::ScrewDims;
use crate::error::Result;
use crate::settings::PrintSettings;

/// Which side of the thread the material is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    /// Bolt thread: material inside, undersized by the fit allowance.
    External,
    /// Nut thread: material outside, oversized by the fit allowance.
    Internal,
}

/// One pitch of thread cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadProfile {
    /// Bolt or nut variant.
    pub kind: ThreadKind,
    /// Axial length of the period.
    pub pitch: f64,
    /// Closed polyline, `(radial, axial)`.
    pub points: Vec<Point2<f64>>,
    /// Smallest radial coordinate.
    pub inner_radius: f64,
    /// Largest radial coordinate.
    pub outer_radius: f64,
}

/// Sample a circular arc from `start_deg` to `end_deg`.
///
/// Angles are measured from the radial axis towards the positive axial
/// direction. The step count follows the facets-per-turn setting and is
/// always even, at least two, so both endpoints and the arc's midpoint are
/// emitted exactly. Samples are mirrored about the midpoint.
pub fn rounding_arc(
    center: Point2<f64>,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    facets: u32,
) -> Vec<Point2<f64>> {
    let sweep = end_deg - start_deg;
    let needed = (sweep.abs() * f64::from(facets.max(3)) / 360.0).ceil() as usize;
    let steps = (needed + needed % 2).max(2);
    let half = steps / 2;
    let step = sweep / steps as f64;
    (0..=steps)
        .map(|i| {
            let deg = if i <= half {
                start_deg + step * i as f64
            } else {
                end_deg - step * (steps - i) as f64
            };
            let a = deg.to_radians();
            center + radius * Vector2::new(a.cos(), a.sin())
        })
        .collect()
}

/// Build the cross-section of `dims`' thread.
///
/// `wall` only applies to internal threads: it is the radial backing
/// thickness outside the major radius, raised to the printable minimum
/// `(minor - bottom) + min_wall` when smaller or absent.
pub fn build_profile(
    dims: &ScrewDims,
    kind: ThreadKind,
    wall: Option<f64>,
    settings: &PrintSettings,
) -> Result<ThreadProfile> {
    settings.validate()?;
    Ok(match kind {
        ThreadKind::External => external(dims, settings),
        ThreadKind::Internal => internal(dims, wall, settings),
    })
}

/// Thickness of the backing ring an internal thread needs to print.
pub fn min_internal_wall(dims: &ScrewDims, settings: &PrintSettings) -> f64 {
    let t = dims.thread();
    (t.minor_radius - t.bottom_radius) + settings.min_wall
}

fn external(dims: &ScrewDims, settings: &PrintSettings) -> ThreadProfile {
    let pitch = dims.pitch();
    let t = dims.thread().offset(-settings.gap);
    let facets = settings.facets();
    let theta = t.flank_angle;
    let core = t.bottom_radius / 2.0;

    let root = |z: f64| Point2::new(t.minor_center, z);
    let crest = Point2::new(t.major_center, pitch / 2.0);

    let mut points = vec![Point2::new(core, 0.0)];
    // Upper half of the root below, bottom to flank tangent.
    points.extend(rounding_arc(root(0.0), t.minor_rounding, 180.0, 90.0 + theta, facets));
    points.extend(rounding_arc(
        crest,
        t.major_rounding,
        theta - 90.0,
        90.0 - theta,
        facets,
    ));
    // Lower half of the next root.
    points.extend(rounding_arc(
        root(pitch),
        t.minor_rounding,
        270.0 - theta,
        180.0,
        facets,
    ));
    points.push(Point2::new(core, pitch));

    ThreadProfile {
        kind: ThreadKind::External,
        pitch,
        points,
        inner_radius: core,
        outer_radius: t.top_radius,
    }
}

fn internal(dims: &ScrewDims, wall: Option<f64>, settings: &PrintSettings) -> ThreadProfile {
    let pitch = dims.pitch();
    let t = dims.thread().offset(settings.gap);
    let facets = settings.facets();
    let theta = t.flank_angle;

    let min_wall = min_internal_wall(dims, settings);
    let wall = wall.map_or(min_wall, |w| w.max(min_wall));
    let outer = t.major_radius + wall;

    let mut points = vec![
        Point2::new(outer, 0.0),
        Point2::new(t.minor_radius, 0.0),
        Point2::new(t.minor_radius, t.minor_flat),
    ];
    // Rounded root at the major radius, flank tangent to flank tangent.
    points.extend(rounding_arc(
        Point2::new(t.major_center, pitch / 2.0),
        t.major_rounding,
        theta - 90.0,
        90.0 - theta,
        facets,
    ));
    points.extend([
        Point2::new(t.minor_radius, pitch - t.minor_flat),
        Point2::new(t.minor_radius, pitch),
        Point2::new(outer, pitch),
    ]);

    ThreadProfile {
        kind: ThreadKind::Internal,
        pitch,
        points,
        inner_radius: t.minor_radius,
        outer_radius: outer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, RawSpec};
    use crate::dims::{complete, Overrides};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn m6() -> ScrewDims {
        let catalog = Catalog::new(vec![RawSpec::new("M6", 1.0, 6.0, 20.0)]);
        complete(&catalog, 0, &Overrides::default(), &PrintSettings::default()).unwrap()
    }

    fn assert_period_closes(profile: &ThreadProfile) {
        let first = profile.points[0];
        let last = *profile.points.last().unwrap();
        assert_abs_diff_eq!(first.x, last.x, epsilon = 1e-12);
        assert_abs_diff_eq!(last.y - first.y, profile.pitch, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_endpoints_and_radius() {
        let center = Point2::new(2.0, 1.0);
        let arc = rounding_arc(center, 0.5, 180.0, 120.0, 32);
        assert_relative_eq!(arc[0].x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(arc[0].y, 1.0, epsilon = 1e-12);
        let end = arc.last().unwrap();
        assert_relative_eq!(end.x, 2.0 - 0.25, epsilon = 1e-12);
        assert_relative_eq!(end.y, 1.0 + 0.5 * 0.75_f64.sqrt(), epsilon = 1e-12);
        for p in &arc {
            assert_relative_eq!((p - center).norm(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_arc_sampling_follows_resolution() {
        let center = Point2::origin();
        let coarse = rounding_arc(center, 1.0, -60.0, 60.0, 3);
        let fine = rounding_arc(center, 1.0, -60.0, 60.0, 96);
        assert_eq!(coarse.len(), 3);
        assert_eq!(fine.len(), 33);
        // Below the floor of three facets the sampling does not get coarser.
        assert_eq!(rounding_arc(center, 1.0, -60.0, 60.0, 1).len(), 3);
    }

    #[test]
    fn test_arc_step_count_is_even() {
        let center = Point2::new(1.0, 0.5);
        // 120 degrees at 32 facets needs 10.67 steps, rounded up to 12.
        let arc = rounding_arc(center, 0.25, -60.0, 60.0, 32);
        assert_eq!(arc.len(), 13);
        // The apex is a sample, not a chord between two.
        assert_abs_diff_eq!(arc[6].x, 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(arc[6].y, 0.5, epsilon = 1e-12);
        // Mirrored about the apex.
        for (a, b) in arc.iter().zip(arc.iter().rev()) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
            assert_abs_diff_eq!(a.y - 0.5, 0.5 - b.y, epsilon = 1e-12);
        }
        // Tiny sweeps still get a midpoint.
        assert_eq!(rounding_arc(center, 0.25, 0.0, 1.0, 32).len(), 3);
    }

    #[test]
    fn test_external_profile() {
        let dims = m6();
        let settings = PrintSettings::default();
        let profile = build_profile(&dims, ThreadKind::External, None, &settings).unwrap();
        assert_period_closes(&profile);

        let t = dims.thread().offset(-settings.gap);
        assert_relative_eq!(profile.outer_radius, t.top_radius);
        let max_r = profile.points.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        // The crest apex is sampled, so the polyline reaches the enclosing radius.
        assert_abs_diff_eq!(max_r, t.top_radius, epsilon = 1e-12);
        assert_abs_diff_eq!(max_r, profile.outer_radius, epsilon = 1e-12);
        // Undersized against the nominal profile.
        assert!(max_r < dims.thread().top_radius);

        // Crest sits half a pitch up.
        let top = profile
            .points
            .iter()
            .max_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap();
        assert_abs_diff_eq!(top.y, 0.5, epsilon = 1e-12);

        // Flank tangent points land on the ends of the flats.
        assert!(profile.points.iter().any(|p| {
            (p.x - t.minor_radius).abs() < 1e-9 && (p.y - t.minor_flat).abs() < 1e-9
        }));
        assert!(profile.points.iter().any(|p| {
            (p.x - t.major_radius).abs() < 1e-9
                && (p.y - (0.5 - t.major_flat)).abs() < 1e-9
        }));
    }

    #[test]
    fn test_internal_profile_clears_external() {
        let dims = m6();
        let settings = PrintSettings::default();
        let nut = build_profile(&dims, ThreadKind::Internal, None, &settings).unwrap();
        let bolt = build_profile(&dims, ThreadKind::External, None, &settings).unwrap();
        assert_period_closes(&nut);

        let t = dims.thread();
        assert_relative_eq!(nut.inner_radius, t.minor_radius + settings.gap);
        assert!(nut.inner_radius > t.minor_radius);
        assert!(bolt.outer_radius < t.top_radius);
        assert_relative_eq!(
            nut.outer_radius,
            t.major_radius + settings.gap + min_internal_wall(&dims, &settings)
        );
    }

    #[test]
    fn test_internal_wall_minimum() {
        let dims = m6();
        let settings = PrintSettings::default();
        let min = min_internal_wall(&dims, &settings);
        let major = dims.thread().major_radius + settings.gap;

        let thin = build_profile(&dims, ThreadKind::Internal, Some(0.1), &settings).unwrap();
        assert_relative_eq!(thin.outer_radius, major + min);

        let thick = build_profile(&dims, ThreadKind::Internal, Some(3.0), &settings).unwrap();
        assert_relative_eq!(thick.outer_radius, major + 3.0);

        // Backing always clears the rounded root.
        let t = dims.thread().offset(settings.gap);
        assert!(thin.outer_radius > t.top_radius);
    }

    #[test]
    fn test_wall_ignored_for_external() {
        let dims = m6();
        let settings = PrintSettings::default();
        let a = build_profile(&dims, ThreadKind::External, None, &settings).unwrap();
        let b = build_profile(&dims, ThreadKind::External, Some(5.0), &settings).unwrap();
        assert_eq!(a, b);
    }
}
