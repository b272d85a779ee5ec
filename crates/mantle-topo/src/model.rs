//! The model: one arena per entity type, plus upward and structural queries.

use mantle_math::{Aabb, Vec3};
use slotmap::SlotMap;

use crate::entity::{
    Edge, EdgeGeom, EdgeGeomId, EdgeId, EdgeUse, EdgeUseId, EdgeUseUp, Face, FaceGeom, FaceGeomId,
    FaceId, FaceUse, FaceUseId, Loop, LoopId, LoopUse, LoopUseDown, LoopUseId, LoopUseUp,
    Orientation, Region, RegionId, Shell, ShellId, TopoRef, Vertex, VertexId, VertexUse,
    VertexUseId, VertexUseUp,
};

/// A complete topological model.
///
/// Every entity lives in one of the arenas below, and every id held by an
/// entity refers back into the same model. Indexing with a key that was
/// never issued by this model, or whose entity has been removed, panics;
/// such a key is evidence of corruption, not a recoverable condition.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Region arena.
    pub regions: SlotMap<RegionId, Region>,
    /// Shell arena.
    pub shells: SlotMap<ShellId, Shell>,
    /// Face arena.
    pub faces: SlotMap<FaceId, Face>,
    /// Faceuse arena.
    pub face_uses: SlotMap<FaceUseId, FaceUse>,
    /// Loop arena.
    pub loops: SlotMap<LoopId, Loop>,
    /// Loopuse arena.
    pub loop_uses: SlotMap<LoopUseId, LoopUse>,
    /// Edge arena.
    pub edges: SlotMap<EdgeId, Edge>,
    /// Edgeuse arena.
    pub edge_uses: SlotMap<EdgeUseId, EdgeUse>,
    /// Vertex arena.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// Vertexuse arena.
    pub vertex_uses: SlotMap<VertexUseId, VertexUse>,
    /// Shared edge line arena.
    pub edge_geoms: SlotMap<EdgeGeomId, EdgeGeom>,
    /// Shared face plane arena.
    pub face_geoms: SlotMap<FaceGeomId, FaceGeom>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Basic accessors
    // =========================================================================

    /// Vertex at which the edgeuse starts.
    pub fn edgeuse_start(&self, eu: EdgeUseId) -> VertexId {
        self.vertex_uses[self.edge_uses[eu].vu].vertex
    }

    /// Vertex at which the edgeuse ends (the mate's start).
    pub fn edgeuse_end(&self, eu: EdgeUseId) -> VertexId {
        let mate = self.edge_uses[eu].mate;
        self.vertex_uses[self.edge_uses[mate].vu].vertex
    }

    /// Whether no other use is stacked radially around this edgeuse's edge.
    pub fn is_dangling(&self, eu: EdgeUseId) -> bool {
        let eu = &self.edge_uses[eu];
        eu.radial == eu.mate
    }

    /// Whether the shell has no faces, wire loops, wire edges, or lone vertex.
    pub fn shell_is_empty(&self, s: ShellId) -> bool {
        let s = &self.shells[s];
        s.face_uses.is_empty()
            && s.loop_uses.is_empty()
            && s.edge_uses.is_empty()
            && s.vertex_use.is_none()
    }

    // =========================================================================
    // Upward walks
    // =========================================================================

    /// One step up the containment hierarchy.
    ///
    /// Returns `None` at a region. A use with an alternative parent
    /// (loopuse in a face vs. wire loopuse) reports whichever it has. The
    /// parent of a vertex is its first recorded use. Geometry objects
    /// have no upward path; asking for one panics.
    pub fn parent_of(&self, entity: TopoRef) -> Option<TopoRef> {
        match entity {
            TopoRef::Region(_) => None,
            TopoRef::Shell(s) => Some(self.shells[s].region.into()),
            TopoRef::Face(f) => Some(self.faces[f].fu.into()),
            TopoRef::FaceUse(fu) => Some(self.face_uses[fu].shell.into()),
            TopoRef::Loop(lp) => Some(self.loops[lp].lu.into()),
            TopoRef::LoopUse(lu) => Some(match self.loop_uses[lu].up {
                LoopUseUp::FaceUse(fu) => fu.into(),
                LoopUseUp::Shell(s) => s.into(),
            }),
            TopoRef::Edge(e) => Some(self.edges[e].eu.into()),
            TopoRef::EdgeUse(eu) => Some(match self.edge_uses[eu].up {
                EdgeUseUp::LoopUse(lu) => lu.into(),
                EdgeUseUp::Shell(s) => s.into(),
            }),
            TopoRef::Vertex(v) => {
                let uses = &self.vertices[v].uses;
                match uses.first() {
                    Some(&vu) => Some(vu.into()),
                    None => panic!("vertex {v:?} has no uses"),
                }
            }
            TopoRef::VertexUse(vu) => Some(match self.vertex_uses[vu].up {
                VertexUseUp::EdgeUse(eu) => eu.into(),
                VertexUseUp::LoopUse(lu) => lu.into(),
                VertexUseUp::Shell(s) => s.into(),
            }),
            TopoRef::EdgeGeom(g) => panic!("edge geometry {g:?} has no upward path"),
            TopoRef::FaceGeom(g) => panic!("face geometry {g:?} has no upward path"),
        }
    }

    /// The region containing this entity. Total for topological entities;
    /// panics for geometry objects.
    pub fn region_of(&self, entity: TopoRef) -> RegionId {
        let mut cur = entity;
        loop {
            match cur {
                TopoRef::Region(r) => return r,
                _ => match self.parent_of(cur) {
                    Some(up) => cur = up,
                    None => unreachable!("only regions lack parents"),
                },
            }
        }
    }

    /// The shell containing this entity.
    ///
    /// Panics when given a region (a region holds many shells) or a
    /// geometry object.
    pub fn shell_of(&self, entity: TopoRef) -> ShellId {
        let mut cur = entity;
        loop {
            match cur {
                TopoRef::Shell(s) => return s,
                TopoRef::Region(r) => {
                    panic!("region {r:?} does not lie in a unique shell")
                }
                _ => match self.parent_of(cur) {
                    Some(up) => cur = up,
                    None => unreachable!("only regions lack parents"),
                },
            }
        }
    }

    /// Shell containing this loopuse.
    pub fn shell_of_lu(&self, lu: LoopUseId) -> ShellId {
        match self.loop_uses[lu].up {
            LoopUseUp::FaceUse(fu) => self.face_uses[fu].shell,
            LoopUseUp::Shell(s) => s,
        }
    }

    /// Shell containing this edgeuse.
    pub fn shell_of_eu(&self, eu: EdgeUseId) -> ShellId {
        match self.edge_uses[eu].up {
            EdgeUseUp::LoopUse(lu) => self.shell_of_lu(lu),
            EdgeUseUp::Shell(s) => s,
        }
    }

    /// Shell containing this vertexuse.
    pub fn shell_of_vu(&self, vu: VertexUseId) -> ShellId {
        match self.vertex_uses[vu].up {
            VertexUseUp::EdgeUse(eu) => self.shell_of_eu(eu),
            VertexUseUp::LoopUse(lu) => self.shell_of_lu(lu),
            VertexUseUp::Shell(s) => s,
        }
    }

    /// Faceuse two levels above this edgeuse, or `None` for a wire edgeuse
    /// or an edgeuse in a wire loop.
    pub fn fu_of_eu(&self, eu: EdgeUseId) -> Option<FaceUseId> {
        match self.edge_uses[eu].up {
            EdgeUseUp::LoopUse(lu) => self.fu_of_lu(lu),
            EdgeUseUp::Shell(_) => None,
        }
    }

    /// Faceuse above this loopuse, or `None` for a wire loop.
    pub fn fu_of_lu(&self, lu: LoopUseId) -> Option<FaceUseId> {
        match self.loop_uses[lu].up {
            LoopUseUp::FaceUse(fu) => Some(fu),
            LoopUseUp::Shell(_) => None,
        }
    }

    /// Faceuse enclosing this vertexuse, or `None` when the vertexuse
    /// hangs (possibly through an edgeuse) off a shell.
    pub fn fu_of_vu(&self, vu: VertexUseId) -> Option<FaceUseId> {
        match self.vertex_uses[vu].up {
            VertexUseUp::EdgeUse(eu) => self.fu_of_eu(eu),
            VertexUseUp::LoopUse(lu) => self.fu_of_lu(lu),
            VertexUseUp::Shell(_) => None,
        }
    }

    /// Loopuse enclosing this vertexuse, or `None` for a shell vertexuse
    /// or the vertexuse of a wire edgeuse.
    pub fn lu_of_vu(&self, vu: VertexUseId) -> Option<LoopUseId> {
        match self.vertex_uses[vu].up {
            VertexUseUp::LoopUse(lu) => Some(lu),
            VertexUseUp::EdgeUse(eu) => match self.edge_uses[eu].up {
                EdgeUseUp::LoopUse(lu) => Some(lu),
                EdgeUseUp::Shell(_) => None,
            },
            VertexUseUp::Shell(_) => None,
        }
    }

    /// Edgeuse owning this vertexuse, or `None` when the vertexuse belongs
    /// to a loopuse or shell directly.
    pub fn eu_of_vu(&self, vu: VertexUseId) -> Option<EdgeUseId> {
        match self.vertex_uses[vu].up {
            VertexUseUp::EdgeUse(eu) => Some(eu),
            _ => None,
        }
    }

    // =========================================================================
    // Face geometry lookups
    // =========================================================================

    /// Find a faceuse in shell `s` that shares `fu`'s plane geometry and
    /// faces the same way.
    ///
    /// Whether the matching faceuse or its mate is returned depends on the
    /// net orientation parity (use orientation combined with the face's
    /// `flip`) so that the result faces the same direction as `fu` does.
    /// `fu` itself and its mate are never returned.
    pub fn find_fu_with_fg_in_shell(&self, s: ShellId, fu: FaceUseId) -> Option<FaceUseId> {
        let f2 = &self.faces[self.face_uses[fu].face];
        let fg2 = f2.geom?;
        let flip2 = (self.face_uses[fu].orientation != Orientation::Same) != f2.flip;

        for &fu1 in &self.shells[s].face_uses {
            let fu1_data = &self.face_uses[fu1];
            let f1 = &self.faces[fu1_data.face];
            if f1.geom != Some(fg2) {
                continue;
            }
            if fu1 == fu || fu1_data.mate == fu {
                continue;
            }
            let flip1 = (fu1_data.orientation != Orientation::Same) != f1.flip;
            if flip1 == flip2 {
                return Some(fu1);
            }
            return Some(fu1_data.mate);
        }
        None
    }

    /// Outward normal of this side of the face, or `None` when the face
    /// has no plane geometry yet.
    ///
    /// The stored plane normal is reversed once if the face is flipped
    /// against its geometry and once more if this use is not the `Same`
    /// side.
    pub fn faceuse_normal(&self, fu: FaceUseId) -> Option<Vec3> {
        let fu_data = &self.face_uses[fu];
        let f = &self.faces[fu_data.face];
        let g = f.geom?;
        let mut n = self.face_geoms[g].plane.normal;
        if f.flip {
            n = -n;
        }
        if fu_data.orientation != Orientation::Same {
            n = -n;
        }
        Some(n)
    }

    // =========================================================================
    // Extents
    // =========================================================================

    /// Union of all region extents.
    ///
    /// Panics if any region's bounds were never computed; call
    /// `compute_region_bounds` first.
    pub fn bounding_box(&self) -> Aabb {
        let mut bb = Aabb::EMPTY;
        for (r, region) in &self.regions {
            match &region.bounds {
                Some(rb) => bb = bb.union(rb),
                None => panic!("region {r:?} has no bounds computed"),
            }
        }
        bb
    }

    // =========================================================================
    // Cycles
    // =========================================================================

    /// Iterate the edgeuses of a loopuse in cycle order.
    ///
    /// Empty for a single-vertex loop.
    pub fn loop_edge_uses(&self, lu: LoopUseId) -> LoopEdgeUses<'_> {
        let (cur, remaining) = match self.loop_uses[lu].down {
            LoopUseDown::Edges { first, len } => (first, len),
            LoopUseDown::Vertex(_) => (EdgeUseId::default(), 0),
        };
        LoopEdgeUses {
            model: self,
            cur,
            remaining,
        }
    }

    /// Iterate every use of `eu`'s edge, starting at `eu`, by alternating
    /// radial and mate steps.
    ///
    /// A dangling edgeuse yields exactly itself and its mate.
    pub fn radial_orbit(&self, eu: EdgeUseId) -> RadialOrbit<'_> {
        RadialOrbit {
            model: self,
            start: eu,
            cur: Some(eu),
            take_radial: true,
        }
    }

    /// Iterate every use of an edge, starting from its representative use.
    pub fn edge_uses_of_edge(&self, e: EdgeId) -> RadialOrbit<'_> {
        self.radial_orbit(self.edges[e].eu)
    }
}

/// Iterator over a loopuse's edge cycle. See [`Model::loop_edge_uses`].
pub struct LoopEdgeUses<'m> {
    model: &'m Model,
    cur: EdgeUseId,
    remaining: usize,
}

impl Iterator for LoopEdgeUses<'_> {
    type Item = EdgeUseId;

    fn next(&mut self) -> Option<EdgeUseId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let eu = self.cur;
        self.cur = self.model.edge_uses[eu].next;
        Some(eu)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LoopEdgeUses<'_> {}

/// Iterator over the radial orbit of an edge. See [`Model::radial_orbit`].
pub struct RadialOrbit<'m> {
    model: &'m Model,
    start: EdgeUseId,
    cur: Option<EdgeUseId>,
    take_radial: bool,
}

impl Iterator for RadialOrbit<'_> {
    type Item = EdgeUseId;

    fn next(&mut self) -> Option<EdgeUseId> {
        let eu = self.cur?;
        let step = &self.model.edge_uses[eu];
        let nxt = if self.take_radial {
            step.radial
        } else {
            step.mate
        };
        self.take_radial = !self.take_radial;
        self.cur = (nxt != self.start).then_some(nxt);
        Some(eu)
    }
}
