//! Error type for construction operators and degenerate-geometry queries.
//!
//! Three tiers apply throughout the kernel: legitimate absence is
//! `Option::None`, structural corruption panics (stale keys index
//! straight into the arenas), and caller mistakes or geometric
//! degeneracies surface as [`TopoError`].

use crate::entity::{EdgeUseId, FaceUseId, LoopUseId, ShellId, VertexId, VertexUseId};
use thiserror::Error;

/// A recoverable failure of a construction operator or geometric query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopoError {
    /// The loopuse is not a wire loop hanging directly off a shell.
    #[error("loopuse {0:?} is not a wire loop owned by a shell")]
    NotAWireLoop(LoopUseId),

    /// The vertexuse is not the sole occupant of its parent, so it cannot
    /// be promoted to an edge.
    #[error("vertexuse {0:?} is not the sole occupant of its parent")]
    NotALoneVertexUse(VertexUseId),

    /// Two edgeuses were asked to share an edge but do not span the same
    /// pair of vertices.
    #[error("edgeuses {0:?} and {1:?} do not span the same two vertices")]
    EdgesDontShareVertices(EdgeUseId, EdgeUseId),

    /// The edge's endpoints coincide, so no line direction exists.
    #[error("edge through {0:?} has zero length")]
    ZeroLengthEdge(EdgeUseId),

    /// The edgeuse already carries line geometry.
    #[error("edgeuse {0:?} already carries line geometry")]
    GeometryAlreadyAssigned(EdgeUseId),

    /// A vertex needed for a geometric computation has no point yet.
    #[error("vertex {0:?} has no point assigned")]
    MissingVertexPoint(VertexId),

    /// The face admits no usable plane or left vector.
    #[error("face of {0:?} is degenerate")]
    DegenerateFace(FaceUseId),

    /// The shell has no children at all.
    #[error("shell {0:?} has no children")]
    EmptyShell(ShellId),

    /// Two faceuses share several edges whose line geometries are not
    /// provably coincident, so no single shared edge can be reported.
    /// The caller may fuse the geometries and retry.
    #[error("faceuses share {} edges with distinct line geometry", candidates.len())]
    AmbiguousSharedEdge {
        /// One edgeuse per distinct shared edge found.
        candidates: Vec<EdgeUseId>,
    },

    /// A polygonal face needs at least three vertices.
    #[error("a polygon face needs at least 3 vertices, got {0}")]
    PolygonTooSmall(usize),
}
