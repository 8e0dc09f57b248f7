//! Conservative axis-aligned bounds of a construction tree.
//!
//! Bounds are computed from the tree alone without evaluating any boolean:
//! a difference is bounded by its left operand and an intersection by the
//! overlap of both boxes. The result always contains the true solid.

use boltcad_ir::{CsgOp, Document, NodeId};
use nalgebra::{Point3, Rotation3, Vector3};

use crate::error::Result;
use crate::part::Part;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Check if no point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both.
    pub fn merge(&self, other: &Aabb3) -> Aabb3 {
        Aabb3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Overlap of both boxes, `None` when they are disjoint.
    pub fn overlap(&self, other: &Aabb3) -> Option<Aabb3> {
        let b = Aabb3::new(self.min.sup(&other.min), self.max.inf(&other.max));
        (!b.is_empty()).then_some(b)
    }

    /// Box edge lengths.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    fn map(&self, f: impl Fn(Point3<f64>) -> Point3<f64>) -> Aabb3 {
        let mut out = Aabb3::empty();
        for corner in self.corners() {
            out.include_point(&f(corner));
        }
        out
    }

    fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Aabb3> {
        let mut out = Aabb3::empty();
        for p in points {
            out.include_point(p);
        }
        (!out.is_empty()).then_some(out)
    }
}

/// Bounds of the subtree rooted at `id`, `None` for an empty solid.
pub fn node_bounds(doc: &Document, id: NodeId) -> Result<Option<Aabb3>> {
    let node = doc
        .nodes
        .get(&id)
        .ok_or(boltcad_ir::IrError::MissingNode(id))?;

    Ok(match &node.op {
        CsgOp::Empty => None,
        CsgOp::Cube { size } => Aabb3::from_points(&[
            Point3::origin(),
            Point3::new(size.x, size.y, size.z),
        ]),
        CsgOp::Cylinder { radius, height, .. } => round_bounds(*radius, *height),
        CsgOp::Cone {
            radius_bottom,
            radius_top,
            height,
            ..
        } => round_bounds(radius_bottom.max(*radius_top), *height),
        CsgOp::Loft { profiles } => {
            let points: Vec<Point3<f64>> = profiles
                .iter()
                .flatten()
                .map(|v| Point3::new(v.x, v.y, v.z))
                .collect();
            Aabb3::from_points(&points)
        }
        CsgOp::Union { left, right } => {
            match (node_bounds(doc, *left)?, node_bounds(doc, *right)?) {
                (Some(a), Some(b)) => Some(a.merge(&b)),
                (a, b) => a.or(b),
            }
        }
        CsgOp::Difference { left, right } => {
            // Still walk the right side so dangling ids surface as errors.
            node_bounds(doc, *right)?;
            node_bounds(doc, *left)?
        }
        CsgOp::Intersection { left, right } => {
            match (node_bounds(doc, *left)?, node_bounds(doc, *right)?) {
                (Some(a), Some(b)) => a.overlap(&b),
                _ => None,
            }
        }
        CsgOp::Translate { child, offset } => {
            let t = Vector3::new(offset.x, offset.y, offset.z);
            node_bounds(doc, *child)?.map(|b| Aabb3::new(b.min + t, b.max + t))
        }
        CsgOp::Scale { child, factor } => {
            let s = Vector3::new(factor.x, factor.y, factor.z);
            node_bounds(doc, *child)?.map(|b| b.map(|p| Point3::from(p.coords.component_mul(&s))))
        }
        CsgOp::Rotate { child, angles } => {
            let r = Rotation3::from_euler_angles(
                angles.x.to_radians(),
                angles.y.to_radians(),
                angles.z.to_radians(),
            );
            node_bounds(doc, *child)?.map(|b| b.map(|p| r * p))
        }
    })
}

fn round_bounds(radius: f64, height: f64) -> Option<Aabb3> {
    Aabb3::from_points(&[
        Point3::new(-radius, -radius, 0.0),
        Point3::new(radius, radius, height),
    ])
}

impl Part {
    /// Conservative bounds of this part, `None` for an empty solid.
    pub fn bounds(&self) -> Result<Option<Aabb3>> {
        node_bounds(&self.to_document(), self.root().id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_primitive_bounds() {
        let b = Part::cube("box", 1.0, 2.0, 3.0).bounds().unwrap().unwrap();
        assert_eq!(b.min, Point3::origin());
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));

        let b = Part::cone("c", 1.0, 2.5, 4.0, 16).bounds().unwrap().unwrap();
        assert_eq!(b.min, Point3::new(-2.5, -2.5, 0.0));
        assert_eq!(b.max, Point3::new(2.5, 2.5, 4.0));

        assert!(Part::empty("e").bounds().unwrap().is_none());
    }

    #[test]
    fn test_boolean_bounds() {
        let a = Part::cube("a", 2.0, 2.0, 2.0);
        let b = Part::cube("b", 2.0, 2.0, 2.0).translate(1.0, 1.0, 1.0);

        let u = (&a + &b).bounds().unwrap().unwrap();
        assert_eq!(u.max, Point3::new(3.0, 3.0, 3.0));

        let i = (&a & &b).bounds().unwrap().unwrap();
        assert_eq!(i.min, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(i.max, Point3::new(2.0, 2.0, 2.0));

        let d = (&a - &b).bounds().unwrap().unwrap();
        assert_eq!(d.max, Point3::new(2.0, 2.0, 2.0));

        let far = Part::cube("far", 1.0, 1.0, 1.0).translate(10.0, 0.0, 0.0);
        assert!((&a & &far).bounds().unwrap().is_none());
    }

    #[test]
    fn test_transform_bounds() {
        let b = Part::cylinder("c", 1.0, 2.0, 8)
            .mirror_z()
            .bounds()
            .unwrap()
            .unwrap();
        assert_eq!(b.min.z, -2.0);
        assert_eq!(b.max.z, 0.0);

        let b = Part::cube("box", 2.0, 1.0, 1.0)
            .rotate(0.0, 0.0, 90.0)
            .bounds()
            .unwrap()
            .unwrap();
        assert_relative_eq!(b.min.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(b.max.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_node() {
        let mut doc = Part::cube("a", 1.0, 1.0, 1.0).translate(1.0, 0.0, 0.0).to_document();
        doc.nodes.remove(&1);
        assert!(node_bounds(&doc, doc.roots[0].root).is_err());
    }
}
