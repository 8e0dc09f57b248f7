//! Named construction subtrees with CSG combinators.

use std::collections::HashMap;

use boltcad_ir::{CsgOp, Document, Node, NodeId, SceneEntry, Vec3 as IrVec3};
use nalgebra::Point3;

/// A named part recorded as a construction tree.
///
/// Create primitives with [`Part::cube`], [`Part::cylinder`], [`Part::cone`]
/// and [`Part::loft`], then combine them with [`Part::union`],
/// [`Part::difference`], [`Part::intersection`] or the operator shorthands
/// (`+`, `-`, `&`). Nothing is evaluated here; extract the tree with
/// [`Part::to_document`] and hand it to a geometry kernel.
///
/// Node ids are local to a part. Combining two parts renumbers the right
/// operand past the left one, so the same construction always produces the
/// same document.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Human-readable name for this part.
    pub name: String,
    ir_node_id: NodeId,
    ir_nodes: HashMap<NodeId, Node>,
}

impl Part {
    // =========================================================================
    // Internal constructors
    // =========================================================================

    /// Create a leaf part with a single node.
    fn make_leaf(name: String, op: CsgOp) -> Self {
        let id = 1;
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op,
            },
        );
        Self {
            name,
            ir_node_id: id,
            ir_nodes: nodes,
        }
    }

    fn max_id(&self) -> NodeId {
        self.ir_nodes.keys().copied().max().unwrap_or(0)
    }

    /// Build a binary CSG node, merging both children's IR maps.
    fn make_binary(
        name: String,
        left: &Part,
        right: &Part,
        op_fn: impl FnOnce(NodeId, NodeId) -> CsgOp,
    ) -> Self {
        let shift = left.max_id();
        let mut nodes = left.ir_nodes.clone();
        nodes.extend(right.ir_nodes.values().map(|node| {
            let id = node.id + shift;
            (
                id,
                Node {
                    id,
                    name: node.name.clone(),
                    op: node.op.clone().remap(|child| child + shift),
                },
            )
        }));
        let id = shift + right.max_id() + 1;
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.clone()),
                op: op_fn(left.ir_node_id, right.ir_node_id + shift),
            },
        );
        Self {
            name,
            ir_node_id: id,
            ir_nodes: nodes,
        }
    }

    /// Build a unary transform node, cloning the child's IR map.
    fn make_unary(&self, op_fn: impl FnOnce(NodeId) -> CsgOp) -> Self {
        let id = self.max_id() + 1;
        let mut nodes = self.ir_nodes.clone();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(self.name.clone()),
                op: op_fn(self.ir_node_id),
            },
        );
        Self {
            name: self.name.clone(),
            ir_node_id: id,
            ir_nodes: nodes,
        }
    }

    // =========================================================================
    // Public constructors
    // =========================================================================

    /// Create an empty part.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::make_leaf(name.into(), CsgOp::Empty)
    }

    /// Create a box with one corner at the origin.
    pub fn cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::make_leaf(
            name.into(),
            CsgOp::Cube {
                size: IrVec3::new(x, y, z),
            },
        )
    }

    /// Create a cylinder along Z, base on the XY plane.
    ///
    /// A low segment count gives a regular prism with its first vertex on +X.
    pub fn cylinder(name: impl Into<String>, radius: f64, height: f64, segments: u32) -> Self {
        Self::make_leaf(
            name.into(),
            CsgOp::Cylinder {
                radius,
                height,
                segments,
            },
        )
    }

    /// Create a cone frustum along Z, base on the XY plane.
    pub fn cone(
        name: impl Into<String>,
        radius_bottom: f64,
        radius_top: f64,
        height: f64,
        segments: u32,
    ) -> Self {
        Self::make_leaf(
            name.into(),
            CsgOp::Cone {
                radius_bottom,
                radius_top,
                height,
                segments,
            },
        )
    }

    /// Create a solid skinned through closed cross sections.
    pub fn loft(name: impl Into<String>, profiles: &[Vec<Point3<f64>>]) -> Self {
        let profiles = profiles
            .iter()
            .map(|ring| ring.iter().map(|p| IrVec3::new(p.x, p.y, p.z)).collect())
            .collect();
        Self::make_leaf(name.into(), CsgOp::Loft { profiles })
    }

    // =========================================================================
    // CSG operations
    // =========================================================================

    /// Boolean difference (self - other).
    pub fn difference(&self, other: &Part) -> Self {
        let result_name = format!("{}-diff", self.name);
        Self::make_binary(result_name, self, other, |l, r| CsgOp::Difference {
            left: l,
            right: r,
        })
    }

    /// Boolean union (self + other).
    pub fn union(&self, other: &Part) -> Self {
        let result_name = format!("{}-union", self.name);
        Self::make_binary(result_name, self, other, |l, r| CsgOp::Union {
            left: l,
            right: r,
        })
    }

    /// Boolean intersection.
    pub fn intersection(&self, other: &Part) -> Self {
        let result_name = format!("{}-intersect", self.name);
        Self::make_binary(result_name, self, other, |l, r| CsgOp::Intersection {
            left: l,
            right: r,
        })
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Translate the part.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        self.make_unary(|child| CsgOp::Translate {
            child,
            offset: IrVec3::new(x, y, z),
        })
    }

    /// Rotate the part (angles in degrees).
    pub fn rotate(&self, x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        self.make_unary(|child| CsgOp::Rotate {
            child,
            angles: IrVec3::new(x_deg, y_deg, z_deg),
        })
    }

    /// Scale the part.
    pub fn scale(&self, x: f64, y: f64, z: f64) -> Self {
        self.make_unary(|child| CsgOp::Scale {
            child,
            factor: IrVec3::new(x, y, z),
        })
    }

    /// Mirror across the XY plane.
    pub fn mirror_z(&self) -> Self {
        self.scale(1.0, 1.0, -1.0)
    }

    /// Rename the part without adding a node.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Root node of this part's tree.
    pub fn root(&self) -> &Node {
        &self.ir_nodes[&self.ir_node_id]
    }

    /// Number of nodes in this part's tree.
    pub fn node_count(&self) -> usize {
        self.ir_nodes.len()
    }

    /// Check if the part is just an empty leaf.
    pub fn is_empty(&self) -> bool {
        matches!(self.root().op, CsgOp::Empty)
    }

    /// Extract the IR document for this part.
    ///
    /// The document contains all nodes in this part's construction DAG
    /// with this part's root node as the single scene entry.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.nodes = self.ir_nodes.clone();
        doc.roots.push(SceneEntry {
            root: self.ir_node_id,
            label: self.name.clone(),
        });
        doc
    }
}

// =============================================================================
// Operator overloads for ergonomic CSG
// =============================================================================

/// Union: `&a + &b`
impl std::ops::Add for &Part {
    type Output = Part;
    fn add(self, rhs: &Part) -> Part {
        self.union(rhs)
    }
}

/// Union: `a + b`
impl std::ops::Add for Part {
    type Output = Part;
    fn add(self, rhs: Part) -> Part {
        self.union(&rhs)
    }
}

/// Difference: `&a - &b`
impl std::ops::Sub for &Part {
    type Output = Part;
    fn sub(self, rhs: &Part) -> Part {
        self.difference(rhs)
    }
}

/// Difference: `a - b`
impl std::ops::Sub for Part {
    type Output = Part;
    fn sub(self, rhs: Part) -> Part {
        self.difference(&rhs)
    }
}

/// Intersection: `&a & &b`
impl std::ops::BitAnd for &Part {
    type Output = Part;
    fn bitand(self, rhs: &Part) -> Part {
        self.intersection(rhs)
    }
}

/// Intersection: `a & b`
impl std::ops::BitAnd for Part {
    type Output = Part;
    fn bitand(self, rhs: Part) -> Part {
        self.intersection(&rhs)
    }
}

// =============================================================================
// Scene (several parts in one document)
// =============================================================================

/// Several parts kept apart in one document, e.g. a bolt with its nut.
///
/// Unlike [`Part::union`], which merges geometry, each part stays a separate
/// scene root. Parts are renumbered as they are added so ids never collide.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    doc: Document,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part as its own scene root.
    pub fn add(&mut self, part: &Part) {
        let shift = self.doc.nodes.keys().copied().max().unwrap_or(0);
        for node in part.ir_nodes.values() {
            let id = node.id + shift;
            self.doc.nodes.insert(
                id,
                Node {
                    id,
                    name: node.name.clone(),
                    op: node.op.clone().remap(|child| child + shift),
                },
            );
        }
        self.doc.roots.push(SceneEntry {
            root: part.ir_node_id + shift,
            label: part.name.clone(),
        });
    }

    /// Get total number of parts.
    pub fn len(&self) -> usize {
        self.doc.roots.len()
    }

    /// Check if scene is empty.
    pub fn is_empty(&self) -> bool {
        self.doc.roots.is_empty()
    }

    /// Extract the multi-root IR document.
    pub fn to_document(&self) -> Document {
        self.doc.clone()
    }
}
