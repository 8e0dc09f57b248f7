//! Solid construction tree for boltcad fastener models.
//!
//! This crate defines the DAG-based IR that describes a fastener as a tree
//! of primitive solids, boolean operations and transforms. It is what the
//! core library hands to a geometry kernel for evaluation.
//!
//! The IR is purely declarative: no mesh data, just a graph of operations.
//! Evaluation (meshing, export) is handled by whichever kernel consumes it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// Errors found while checking a [`Document`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    /// A root or child references a node that is not in the document.
    #[error("node {0} is referenced but not defined")]
    MissingNode(NodeId),
    /// A node is stored under a key that differs from its own id.
    #[error("node stored under key {key} has id {id}")]
    MismatchedId {
        /// Map key.
        key: NodeId,
        /// Id recorded in the node.
        id: NodeId,
    },
    /// A loft node has fewer than two profiles or ragged profiles.
    #[error("loft node {0} is malformed: {1}")]
    MalformedLoft(NodeId, String),
}

/// 3D vector with f64 components (conventionally millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// CSG operation, the building block of the IR DAG.
///
/// Each variant is either a leaf primitive or a combining/transform operation
/// that references child nodes by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box with one corner at the origin, extending along +X, +Y, +Z.
    Cube {
        /// Size along each axis.
        size: Vec3,
    },
    /// Cylinder along the Z axis, base centered on the origin, extending along +Z.
    ///
    /// With a small segment count this is a regular prism whose first vertex
    /// lies on the +X axis (6 segments gives a hexagonal prism).
    Cylinder {
        /// Circumscribed radius of the cylinder.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
        /// Number of circular segments (0 = auto).
        segments: u32,
    },
    /// Cone frustum along the Z axis, base centered on the origin, extending along +Z.
    Cone {
        /// Bottom radius.
        radius_bottom: f64,
        /// Top radius (0 for a point).
        radius_top: f64,
        /// Height of the cone.
        height: f64,
        /// Number of circular segments (0 = auto).
        segments: u32,
    },
    /// Solid skinned through an ordered sequence of closed 3D polylines.
    ///
    /// Consecutive profiles are connected point-to-point, so every profile
    /// must have the same number of points. The first and last profiles
    /// become the end caps.
    Loft {
        /// Cross sections in skinning order.
        profiles: Vec<Vec<Vec3>>,
    },
    /// Empty geometry (identity for union).
    Empty,
    /// Boolean union of two geometries.
    Union {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Boolean intersection of two geometries.
    Intersection {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation by Euler angles in degrees (applied as X, then Y, then Z).
    Rotate {
        /// Child node to rotate.
        child: NodeId,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
    /// Non-uniform scale. Negative factors mirror.
    Scale {
        /// Child node to scale.
        child: NodeId,
        /// Scale factors per axis.
        factor: Vec3,
    },
}

impl CsgOp {
    /// Child node ids in evaluation order (left before right).
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            CsgOp::Union { left, right }
            | CsgOp::Difference { left, right }
            | CsgOp::Intersection { left, right } => vec![*left, *right],
            CsgOp::Translate { child, .. }
            | CsgOp::Rotate { child, .. }
            | CsgOp::Scale { child, .. } => vec![*child],
            CsgOp::Cube { .. }
            | CsgOp::Cylinder { .. }
            | CsgOp::Cone { .. }
            | CsgOp::Loft { .. }
            | CsgOp::Empty => Vec::new(),
        }
    }

    /// Rewrite every child reference through `f`.
    pub fn remap(self, f: impl Fn(NodeId) -> NodeId) -> CsgOp {
        match self {
            CsgOp::Union { left, right } => CsgOp::Union {
                left: f(left),
                right: f(right),
            },
            CsgOp::Difference { left, right } => CsgOp::Difference {
                left: f(left),
                right: f(right),
            },
            CsgOp::Intersection { left, right } => CsgOp::Intersection {
                left: f(left),
                right: f(right),
            },
            CsgOp::Translate { child, offset } => CsgOp::Translate {
                child: f(child),
                offset,
            },
            CsgOp::Rotate { child, angles } => CsgOp::Rotate {
                child: f(child),
                angles,
            },
            CsgOp::Scale { child, factor } => CsgOp::Scale {
                child: f(child),
                factor,
            },
            leaf => leaf,
        }
    }

    /// Short operation name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            CsgOp::Cube { .. } => "Cube",
            CsgOp::Cylinder { .. } => "Cylinder",
            CsgOp::Cone { .. } => "Cone",
            CsgOp::Loft { .. } => "Loft",
            CsgOp::Empty => "Empty",
            CsgOp::Union { .. } => "Union",
            CsgOp::Difference { .. } => "Difference",
            CsgOp::Intersection { .. } => "Intersection",
            CsgOp::Translate { .. } => "Translate",
            CsgOp::Rotate { .. } => "Rotate",
            CsgOp::Scale { .. } => "Scale",
        }
    }
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// An entry in the scene: a root node with a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Root node of this scene part.
    pub root: NodeId,
    /// Label for the part (e.g. "M3 bolt").
    pub label: String,
}

/// A boltcad document, the JSON hand-off format to a geometry kernel.
///
/// Contains the full IR DAG and the scene assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Scene entries (assembled parts).
    pub roots: Vec<SceneEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that every reference resolves and every loft is well formed.
    pub fn validate(&self) -> Result<(), IrError> {
        for (&key, node) in &self.nodes {
            if key != node.id {
                return Err(IrError::MismatchedId { key, id: node.id });
            }
            for child in node.op.children() {
                if !self.nodes.contains_key(&child) {
                    return Err(IrError::MissingNode(child));
                }
            }
            if let CsgOp::Loft { profiles } = &node.op {
                if profiles.len() < 2 {
                    return Err(IrError::MalformedLoft(
                        node.id,
                        format!("{} profile(s), need at least 2", profiles.len()),
                    ));
                }
                let n = profiles[0].len();
                if n < 3 || profiles.iter().any(|p| p.len() != n) {
                    return Err(IrError::MalformedLoft(
                        node.id,
                        "profiles must share a point count of at least 3".into(),
                    ));
                }
            }
        }
        for entry in &self.roots {
            if !self.nodes.contains_key(&entry.root) {
                return Err(IrError::MissingNode(entry.root));
            }
        }
        Ok(())
    }

    /// Nodes reachable from `root`, children before their parents.
    ///
    /// Shared subtrees are visited once.
    pub fn depth_first(&self, root: NodeId) -> Result<Vec<&Node>, IrError> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        // (id, children_done)
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = self.nodes.get(&id).ok_or(IrError::MissingNode(id))?;
            if expanded {
                order.push(node);
                continue;
            }
            if !seen.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in node.op.children().into_iter().rev() {
                if !seen.contains(&child) {
                    stack.push((child, false));
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, name: Option<&str>, op: CsgOp) -> Node {
        Node {
            id,
            name: name.map(str::to_string),
            op,
        }
    }

    #[test]
    fn roundtrip_document() {
        let mut doc = Document::new();

        // Hex prism head
        doc.nodes.insert(
            1,
            node(
                1,
                Some("head"),
                CsgOp::Cylinder {
                    radius: 2.6,
                    height: 2.1,
                    segments: 6,
                },
            ),
        );

        // Bore
        doc.nodes.insert(
            2,
            node(
                2,
                Some("bore"),
                CsgOp::Cylinder {
                    radius: 1.6,
                    height: 4.0,
                    segments: 32,
                },
            ),
        );

        doc.nodes.insert(
            3,
            node(3, Some("nut"), CsgOp::Difference { left: 1, right: 2 }),
        );

        doc.roots.push(SceneEntry {
            root: 3,
            label: "M3 nut".to_string(),
        });

        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");

        assert_eq!(doc, restored);
        assert_eq!(restored.nodes.len(), 3);
        assert_eq!(restored.roots.len(), 1);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        assert_eq!(doc.version, "0.1");
        assert!(doc.nodes.is_empty());
        assert!(doc.roots.is_empty());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn serde_tagged_enum() {
        let op = CsgOp::Cone {
            radius_bottom: 1.0,
            radius_top: 2.0,
            height: 3.0,
            segments: 16,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""type":"Cone""#));

        let restored: CsgOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, restored);
    }

    #[test]
    fn children_and_remap() {
        let op = CsgOp::Difference { left: 4, right: 7 };
        assert_eq!(op.children(), vec![4, 7]);
        let moved = op.remap(|id| id + 10);
        assert_eq!(moved, CsgOp::Difference { left: 14, right: 17 });

        let leaf = CsgOp::Cube {
            size: Vec3::new(1.0, 1.0, 1.0),
        };
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.clone().remap(|id| id + 1), leaf);
    }

    #[test]
    fn validate_reports_missing_child() {
        let mut doc = Document::new();
        doc.nodes.insert(
            1,
            node(
                1,
                None,
                CsgOp::Translate {
                    child: 9,
                    offset: Vec3::new(0.0, 0.0, 1.0),
                },
            ),
        );
        assert_eq!(doc.validate(), Err(IrError::MissingNode(9)));
    }

    #[test]
    fn validate_rejects_ragged_loft() {
        let tri = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mut quad = tri.clone();
        quad.push(Vec3::new(1.0, 1.0, 0.0));

        let mut doc = Document::new();
        doc.nodes.insert(
            1,
            node(
                1,
                None,
                CsgOp::Loft {
                    profiles: vec![tri, quad],
                },
            ),
        );
        assert!(matches!(doc.validate(), Err(IrError::MalformedLoft(1, _))));
    }

    #[test]
    fn depth_first_visits_children_first() {
        let mut doc = Document::new();
        doc.nodes.insert(1, node(1, None, CsgOp::Empty));
        doc.nodes.insert(
            2,
            node(
                2,
                None,
                CsgOp::Cube {
                    size: Vec3::new(1.0, 1.0, 1.0),
                },
            ),
        );
        doc.nodes
            .insert(3, node(3, None, CsgOp::Union { left: 1, right: 2 }));
        // Shared child: both operands point at node 3.
        doc.nodes
            .insert(4, node(4, None, CsgOp::Intersection { left: 3, right: 3 }));

        let order: Vec<NodeId> = doc
            .depth_first(4)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }
}
