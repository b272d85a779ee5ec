//! Topological entity definitions and typed arena keys.
//!
//! The radial-edge structure distinguishes an entity (face, loop, edge,
//! vertex) from its *uses*: a face is used twice (front and back), an edge
//! once per loop traversal plus once for each radially stacked face, a
//! vertex once per incident edge end. Uses carry the adjacency pointers;
//! the underlying entities carry shared geometry and bounds.

use mantle_math::{Aabb, PlaneEq, Point3, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Key of a [`Region`] in its model.
    pub struct RegionId;
    /// Key of a [`Shell`] in its model.
    pub struct ShellId;
    /// Key of a [`Face`] in its model.
    pub struct FaceId;
    /// Key of a [`FaceUse`] in its model.
    pub struct FaceUseId;
    /// Key of a [`Loop`] in its model.
    pub struct LoopId;
    /// Key of a [`LoopUse`] in its model.
    pub struct LoopUseId;
    /// Key of an [`Edge`] in its model.
    pub struct EdgeId;
    /// Key of an [`EdgeUse`] in its model.
    pub struct EdgeUseId;
    /// Key of a [`Vertex`] in its model.
    pub struct VertexId;
    /// Key of a [`VertexUse`] in its model.
    pub struct VertexUseId;
    /// Key of an [`EdgeGeom`] in its model.
    pub struct EdgeGeomId;
    /// Key of a [`FaceGeom`] in its model.
    pub struct FaceGeomId;
}

/// Orientation of a use with respect to its underlying entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Agrees with the entity's canonical orientation.
    Same,
    /// Reversed from the entity's canonical orientation.
    Opposite,
    /// Not yet assigned.
    Unspec,
}

/// Top of the containment hierarchy. A region groups shells that together
/// bound one volume of space.
#[derive(Debug, Clone)]
pub struct Region {
    /// Shells contained in this region.
    pub shells: Vec<ShellId>,
    /// Extent of all shells, set by `compute_region_bounds`.
    pub bounds: Option<Aabb>,
}

/// A connected collection of faces, wire loops, wire edges, or (minimally)
/// a single lone vertex.
///
/// A freshly made shell holds only `vertex_use`; construction operators
/// consume that placeholder as real structure appears. Use/mate pairs are
/// listed together in the child lists.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Owning region.
    pub region: RegionId,
    /// Faceuses of this shell (both uses of each face).
    pub face_uses: Vec<FaceUseId>,
    /// Wire loopuses not embedded in any face.
    pub loop_uses: Vec<LoopUseId>,
    /// Wire edgeuses not embedded in any loop.
    pub edge_uses: Vec<EdgeUseId>,
    /// Lone vertexuse of an otherwise empty shell.
    pub vertex_use: Option<VertexUseId>,
    /// Extent of all children, set by `compute_shell_bounds`.
    pub bounds: Option<Aabb>,
}

/// A bounded portion of surface, used from both sides.
#[derive(Debug, Clone)]
pub struct Face {
    /// One representative of the faceuse pair.
    pub fu: FaceUseId,
    /// Shared plane geometry, if assigned.
    pub geom: Option<FaceGeomId>,
    /// When set, the face normal is the reverse of the stored plane normal.
    pub flip: bool,
    /// Extent of the face's loops, set by `compute_face_bounds`.
    pub bounds: Option<Aabb>,
}

/// One side of a face within a shell.
#[derive(Debug, Clone)]
pub struct FaceUse {
    /// Owning shell.
    pub shell: ShellId,
    /// The use of the same face from the other side.
    pub mate: FaceUseId,
    /// This side's relation to the face's canonical plane.
    pub orientation: Orientation,
    /// Underlying face, shared with the mate.
    pub face: FaceId,
    /// Boundary loops; by convention the first is the outer boundary.
    pub loop_uses: Vec<LoopUseId>,
}

/// A closed boundary curve, used once per side of its parent.
#[derive(Debug, Clone)]
pub struct Loop {
    /// One representative of the loopuse pair.
    pub lu: LoopUseId,
    /// Extent of the loop's vertices, set by `compute_loop_bounds`.
    pub bounds: Option<Aabb>,
}

/// Parent of a loopuse: a face side, or the shell directly (wire loop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopUseUp {
    /// Boundary loop of a faceuse.
    FaceUse(FaceUseId),
    /// Wire loop hanging directly off a shell.
    Shell(ShellId),
}

/// Content of a loopuse: a cyclic edgeuse chain, or a single vertexuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopUseDown {
    /// A cyclic chain of edgeuses; `first` anchors the `next`/`prev` cycle.
    Edges {
        /// Entry point into the cycle.
        first: EdgeUseId,
        /// Number of edgeuses in the cycle.
        len: usize,
    },
    /// A degenerate loop of a single vertex.
    Vertex(VertexUseId),
}

/// One side's traversal of a loop.
#[derive(Debug, Clone)]
pub struct LoopUse {
    /// Owning faceuse or shell.
    pub up: LoopUseUp,
    /// The opposite traversal of the same loop.
    pub mate: LoopUseId,
    /// Underlying loop, shared with the mate.
    pub lp: LoopId,
    /// Winding of this traversal relative to the loop.
    pub orientation: Orientation,
    /// Edge chain or single vertex.
    pub down: LoopUseDown,
}

/// A topological edge: the curve segment between two vertices, shared by
/// every use stacked radially around it.
#[derive(Debug, Clone)]
pub struct Edge {
    /// One representative use of this edge.
    pub eu: EdgeUseId,
}

/// Parent of an edgeuse: a loopuse, or the shell directly (wire edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUseUp {
    /// Link in a loop's edge chain.
    LoopUse(LoopUseId),
    /// Wire edge hanging directly off a shell.
    Shell(ShellId),
}

/// One directed traversal of an edge.
///
/// `mate` reverses direction; `radial` steps to the next use stacked
/// around the shared edge. Alternating `radial` and `mate` orbits every
/// use of the edge. A dangling edgeuse has `radial == mate`.
#[derive(Debug, Clone)]
pub struct EdgeUse {
    /// Owning loopuse or shell.
    pub up: EdgeUseUp,
    /// Same edge walked the other way.
    pub mate: EdgeUseId,
    /// Next use around the edge, in the opposite direction.
    pub radial: EdgeUseId,
    /// Underlying edge, shared by the whole radial orbit.
    pub edge: EdgeId,
    /// Use of the start vertex.
    pub vu: VertexUseId,
    /// Following edgeuse in the loop cycle (the mate, for a wire edge).
    pub next: EdgeUseId,
    /// Preceding edgeuse in the loop cycle (the mate, for a wire edge).
    pub prev: EdgeUseId,
    /// Shared line geometry, if assigned.
    pub geom: Option<EdgeGeomId>,
}

/// A topological point.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Every use of this vertex, across the whole model.
    pub uses: Vec<VertexUseId>,
    /// Coordinates, once assigned.
    pub point: Option<Point3>,
}

/// Parent of a vertexuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexUseUp {
    /// Start vertex of an edgeuse.
    EdgeUse(EdgeUseId),
    /// Sole content of a single-vertex loop.
    LoopUse(LoopUseId),
    /// Lone vertex of an otherwise empty shell.
    Shell(ShellId),
}

/// One appearance of a vertex in the structure.
#[derive(Debug, Clone)]
pub struct VertexUse {
    /// Owning edgeuse, loopuse, or shell.
    pub up: VertexUseUp,
    /// Underlying vertex.
    pub vertex: VertexId,
    /// Per-use shading normal annotation.
    pub normal: Option<Vec3>,
}

/// Line geometry shared by every colinear edgeuse.
#[derive(Debug, Clone)]
pub struct EdgeGeom {
    /// A point on the line.
    pub pt: Point3,
    /// Direction of the line; not necessarily unit length.
    pub dir: Vec3,
    /// Every edgeuse lying on this line.
    pub uses: Vec<EdgeUseId>,
}

/// Plane geometry shared by every coplanar face.
#[derive(Debug, Clone)]
pub struct FaceGeom {
    /// The face plane, oriented by convention so that a face with
    /// `flip == false` has this normal.
    pub plane: PlaneEq,
}

/// A reference to any entity in a model.
///
/// Upward walks and traversal entry points dispatch on this closed sum
/// instead of an open type tag, so an unknown entity kind cannot be
/// represented at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopoRef {
    /// A region.
    Region(RegionId),
    /// A shell.
    Shell(ShellId),
    /// A face.
    Face(FaceId),
    /// A faceuse.
    FaceUse(FaceUseId),
    /// A loop.
    Loop(LoopId),
    /// A loopuse.
    LoopUse(LoopUseId),
    /// An edge.
    Edge(EdgeId),
    /// An edgeuse.
    EdgeUse(EdgeUseId),
    /// A vertex.
    Vertex(VertexId),
    /// A vertexuse.
    VertexUse(VertexUseId),
    /// A shared edge line.
    EdgeGeom(EdgeGeomId),
    /// A shared face plane.
    FaceGeom(FaceGeomId),
}

macro_rules! topo_ref_from {
    ($($id:ty => $variant:ident),* $(,)?) => {
        $(impl From<$id> for TopoRef {
            fn from(id: $id) -> Self {
                TopoRef::$variant(id)
            }
        })*
    };
}

topo_ref_from! {
    RegionId => Region,
    ShellId => Shell,
    FaceId => Face,
    FaceUseId => FaceUse,
    LoopId => Loop,
    LoopUseId => LoopUse,
    EdgeId => Edge,
    EdgeUseId => EdgeUse,
    VertexId => Vertex,
    VertexUseId => VertexUse,
    EdgeGeomId => EdgeGeom,
    FaceGeomId => FaceGeom,
}
