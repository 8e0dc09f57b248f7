//! Helical placement of a thread profile.
//!
//! The profile is copied around the axis at a fixed angular step; each copy
//! is lifted by `angle / 360 * pitch`, so consecutive copies trace a helix
//! and a loft through them forms the thread solid.

use nalgebra::Point3;

use crate::error::{FastenerError, Result};
use crate::profile::ThreadProfile;
use crate::settings::PrintSettings;

/// One placed copy of the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Rotation about the axis (degrees).
    pub angle: f64,
    /// Axial lift, `angle / 360 * pitch`.
    pub offset: f64,
    /// Profile points in 3D.
    pub points: Vec<Point3<f64>>,
}

/// Ordered slices of one helical sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSequence {
    /// Axial advance per turn.
    pub pitch: f64,
    /// Number of turns the sweep covers.
    pub rotations: f64,
    /// Slices in increasing angle.
    pub slices: Vec<Slice>,
}

impl SliceSequence {
    /// Point rings of every slice, ready for lofting.
    pub fn profiles(&self) -> Vec<Vec<Point3<f64>>> {
        self.slices.iter().map(|s| s.points.clone()).collect()
    }

    /// Angle of the first and last slice.
    pub fn angle_span(&self) -> (f64, f64) {
        match (self.slices.first(), self.slices.last()) {
            (Some(first), Some(last)) => (first.angle, last.angle),
            _ => (0.0, 0.0),
        }
    }
}

/// Turns needed to cover `length` of thread.
///
/// Flat-ended threads sweep one extra turn so the ends can be cut square;
/// open-ended threads sweep one turn less so the profile stays inside the
/// length where it starts and stops.
pub fn rotations_for(length: f64, pitch: f64, flat: bool) -> f64 {
    let turns = length / pitch;
    if flat {
        turns + 1.0
    } else {
        turns - 1.0
    }
}

fn place(profile: &ThreadProfile, angle: f64) -> Slice {
    let offset = angle / 360.0 * profile.pitch;
    let (sin, cos) = angle.to_radians().sin_cos();
    let points = profile
        .points
        .iter()
        .map(|p| Point3::new(p.x * cos, p.x * sin, p.y + offset))
        .collect();
    Slice {
        angle,
        offset,
        points,
    }
}

/// Place `profile` along a helix of `rotations` turns.
///
/// Slices are one facet apart, starting half a facet before zero and ending
/// exactly half a facet past `rotations` turns, so the sweep overlaps itself
/// by a facet at both ends. The last step is shortened when the turn count
/// is not a whole number of facets. There are always at least two slices.
pub fn build_slices(
    profile: &ThreadProfile,
    rotations: f64,
    settings: &PrintSettings,
) -> Result<SliceSequence> {
    if !rotations.is_finite() || rotations < 0.0 {
        return Err(FastenerError::DegenerateThread {
            pitch: profile.pitch,
            rotations,
        });
    }

    let step = 360.0 / f64::from(settings.facets());
    let start = -step / 2.0;
    let end = rotations * 360.0 + step / 2.0;
    // Tolerance keeps whole facet counts from picking up a sliver step.
    let intervals = (((end - start) / step - 1e-9).ceil() as usize).max(1);

    let slices: Vec<Slice> = (0..intervals)
        .map(|i| place(profile, start + i as f64 * step))
        .chain(std::iter::once(place(profile, end)))
        .collect();

    tracing::debug!(
        rotations,
        slices = slices.len(),
        points = profile.points.len(),
        "built helical slices"
    );

    Ok(SliceSequence {
        pitch: profile.pitch,
        rotations,
        slices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ThreadKind;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn square_profile(pitch: f64) -> ThreadProfile {
        ThreadProfile {
            kind: ThreadKind::External,
            pitch,
            points: vec![
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, pitch / 2.0),
                Point2::new(1.0, pitch),
            ],
            inner_radius: 1.0,
            outer_radius: 2.0,
        }
    }

    #[test]
    fn test_rotations_for() {
        assert_relative_eq!(rotations_for(10.0, 1.0, true), 11.0);
        assert_relative_eq!(rotations_for(10.0, 1.0, false), 9.0);
        assert_relative_eq!(rotations_for(3.0, 0.5, true), 7.0);
    }

    #[test]
    fn test_slice_count_and_span() {
        let settings = PrintSettings::default();
        let seq = build_slices(&square_profile(1.0), 2.0, &settings).unwrap();
        // 2 turns at 32 facets plus one overlap step.
        assert_eq!(seq.slices.len(), 66);
        let (first, last) = seq.angle_span();
        assert_relative_eq!(first, -360.0 / 64.0);
        assert_relative_eq!(last, 2.0 * 360.0 + 360.0 / 64.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fractional_turns_end_half_a_step_past() {
        let settings = PrintSettings::default();
        let step = 360.0 / 32.0;
        let seq = build_slices(&square_profile(1.0), 1.3, &settings).unwrap();
        let (first, last) = seq.angle_span();
        assert_relative_eq!(first, -step / 2.0);
        assert_relative_eq!(last, 1.3 * 360.0 + step / 2.0, epsilon = 1e-9);
        assert_relative_eq!(last, 473.625, epsilon = 1e-9);

        // Uniform steps with a shorter final one.
        let gaps: Vec<f64> = seq.slices.windows(2).map(|w| w[1].angle - w[0].angle).collect();
        for gap in &gaps[..gaps.len() - 1] {
            assert_relative_eq!(*gap, step, epsilon = 1e-9);
        }
        let final_gap = gaps[gaps.len() - 1];
        assert!(final_gap > 0.0 && final_gap <= step + 1e-9);
        assert_relative_eq!(seq.slices.last().unwrap().offset, last / 360.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pitch_law() {
        let settings = PrintSettings::default().with_resolution(12);
        let profile = square_profile(0.8);
        let seq = build_slices(&profile, 1.5, &settings).unwrap();
        for slice in &seq.slices {
            assert_relative_eq!(slice.offset, slice.angle / 360.0 * 0.8, epsilon = 1e-12);
            for (p3, p2) in slice.points.iter().zip(&profile.points) {
                assert_relative_eq!(p3.z - p2.y, slice.offset, epsilon = 1e-12);
                assert_relative_eq!(p3.coords.xy().norm(), p2.x, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_rotations_still_two_slices() {
        let seq = build_slices(&square_profile(1.0), 0.0, &PrintSettings::default()).unwrap();
        assert_eq!(seq.slices.len(), 2);
    }

    #[test]
    fn test_resolution_floor() {
        let settings = PrintSettings::default().with_resolution(1);
        let seq = build_slices(&square_profile(1.0), 1.0, &settings).unwrap();
        let step = seq.slices[1].angle - seq.slices[0].angle;
        assert_relative_eq!(step, 120.0);
    }

    #[test]
    fn test_negative_rotations_rejected() {
        let settings = PrintSettings::default();
        let err = build_slices(&square_profile(1.0), rotations_for(0.5, 1.0, false), &settings)
            .unwrap_err();
        assert!(matches!(err, FastenerError::DegenerateThread { .. }));
        assert!(build_slices(&square_profile(1.0), f64::NAN, &settings).is_err());
    }
}
