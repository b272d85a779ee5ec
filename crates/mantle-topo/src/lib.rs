#![warn(missing_docs)]

//! Radial-edge B-rep topology for the mantle kernel.
//!
//! A [`Model`] owns one arena per entity type: regions hold shells,
//! shells hold faceuses, wire loopuses, wire edgeuses, or a lone
//! vertexuse, and every face, loop, and edge is reached through its
//! oriented uses. Mate links pair the two uses of each entity; radial
//! links stack every use sharing an edge into one orbit, which is what
//! lets the structure represent non-manifold junctions where more than
//! two faces meet along an edge.
//!
//! The crate divides into read-only queries (ancestry, adjacency
//! searches, orbit iteration) and Euler-style construction operators
//! that are the only code allowed to rearrange the structure.
//! [`Model::audit`] verifies the cross-reference invariants after a
//! mutation sequence.
//!
//! Failure policy, uniformly: an absent ancestor or failed search is
//! `None`; a caller mistake or geometric degeneracy is a [`TopoError`];
//! a stale key or contradictory structure panics, because queries over
//! corrupted topology have no safe answer.

mod audit;
mod construct;
mod entity;
mod error;
mod model;
mod search;

pub use audit::{AuditError, TopologyAudit};
pub use entity::{
    Edge, EdgeGeom, EdgeGeomId, EdgeId, EdgeUse, EdgeUseId, EdgeUseUp, Face, FaceGeom, FaceGeomId,
    FaceId, FaceUse, FaceUseId, Loop, LoopId, LoopUse, LoopUseDown, LoopUseId, LoopUseUp,
    Orientation, Region, RegionId, Shell, ShellId, TopoRef, Vertex, VertexId, VertexUse,
    VertexUseId, VertexUseUp,
};
pub use error::TopoError;
pub use model::{LoopEdgeUses, Model, RadialOrbit};
