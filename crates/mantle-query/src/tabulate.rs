//! Downward traversal and exactly-once collectors.
//!
//! [`visit`] performs a pre-order walk of everything structurally below
//! an entry point, calling one hook per entity type on a caller-supplied
//! [`TopoVisitor`]. The walk itself never deduplicates: an entity shared
//! by several parents is reported at every encounter. The collectors
//! built on it keep a seen-set over arena keys and emit each entity once,
//! in first-discovery order.
//!
//! Collectors borrow the model for their whole run, so the structure
//! cannot change mid-traversal.

use std::collections::HashSet;

use mantle_math::{dist_sq_point_to_line, Point3, Tolerance, Vec3};
use mantle_topo::{
    EdgeGeomId, EdgeId, EdgeUseId, FaceGeomId, FaceId, FaceUseId, LoopId, LoopUseDown, LoopUseId,
    Model, RegionId, ShellId, TopoRef, VertexId, VertexUseId,
};

/// Per-entity-type hooks for [`visit`]. Every method defaults to doing
/// nothing; implement only the hooks for the entities of interest.
#[allow(unused_variables)]
pub trait TopoVisitor {
    /// Called once per region encountered.
    fn visit_region(&mut self, m: &Model, r: RegionId) {}
    /// Called once per shell encountered.
    fn visit_shell(&mut self, m: &Model, s: ShellId) {}
    /// Called once per faceuse encountered.
    fn visit_faceuse(&mut self, m: &Model, fu: FaceUseId) {}
    /// Called once per face encountered (once per faceuse).
    fn visit_face(&mut self, m: &Model, f: FaceId) {}
    /// Called once per face plane encountered.
    fn visit_face_geom(&mut self, m: &Model, g: FaceGeomId) {}
    /// Called once per loopuse encountered.
    fn visit_loopuse(&mut self, m: &Model, lu: LoopUseId) {}
    /// Called once per loop encountered (once per loopuse).
    fn visit_loop(&mut self, m: &Model, lp: LoopId) {}
    /// Called once per edgeuse encountered.
    fn visit_edgeuse(&mut self, m: &Model, eu: EdgeUseId) {}
    /// Called once per edge encountered (once per edgeuse).
    fn visit_edge(&mut self, m: &Model, e: EdgeId) {}
    /// Called once per edge line encountered.
    fn visit_edge_geom(&mut self, m: &Model, g: EdgeGeomId) {}
    /// Called once per vertexuse encountered.
    fn visit_vertexuse(&mut self, m: &Model, vu: VertexUseId) {}
    /// Called once per vertex encountered (once per vertexuse).
    fn visit_vertex(&mut self, m: &Model, v: VertexId) {}
}

/// Pre-order walk of everything below `start`.
///
/// Containers descend into their children; an underlying entity entry
/// point (face, loop, edge) descends through its representative use, and
/// a vertex entry point reports just the vertex (its uses lie above it,
/// not below). An edge or edgeuse entry covers both endpoints: the use's
/// own vertexuse starts the edge and the mate's starts the far end.
/// Shared entities are reported once per encounter.
pub fn visit<V: TopoVisitor>(m: &Model, start: TopoRef, visitor: &mut V) {
    match start {
        TopoRef::Region(r) => visit_region(m, r, visitor),
        TopoRef::Shell(s) => visit_shell(m, s, visitor),
        TopoRef::FaceUse(fu) => visit_faceuse(m, fu, visitor),
        TopoRef::Face(f) => visit_faceuse(m, m.faces[f].fu, visitor),
        TopoRef::LoopUse(lu) => visit_loopuse(m, lu, visitor),
        TopoRef::Loop(lp) => visit_loopuse(m, m.loops[lp].lu, visitor),
        TopoRef::EdgeUse(eu) => visit_edge_entry(m, eu, visitor),
        TopoRef::Edge(e) => visit_edge_entry(m, m.edges[e].eu, visitor),
        TopoRef::VertexUse(vu) => visit_vertexuse(m, vu, visitor),
        TopoRef::Vertex(v) => visitor.visit_vertex(m, v),
        TopoRef::EdgeGeom(g) => visitor.visit_edge_geom(m, g),
        TopoRef::FaceGeom(g) => visitor.visit_face_geom(m, g),
    }
}

/// Walk everything below every region of the model.
pub fn visit_model<V: TopoVisitor>(m: &Model, visitor: &mut V) {
    for (r, _) in &m.regions {
        visit_region(m, r, visitor);
    }
}

fn visit_region<V: TopoVisitor>(m: &Model, r: RegionId, visitor: &mut V) {
    visitor.visit_region(m, r);
    for &s in &m.regions[r].shells {
        visit_shell(m, s, visitor);
    }
}

fn visit_shell<V: TopoVisitor>(m: &Model, s: ShellId, visitor: &mut V) {
    visitor.visit_shell(m, s);
    let shell = &m.shells[s];
    for &fu in &shell.face_uses {
        visit_faceuse(m, fu, visitor);
    }
    for &lu in &shell.loop_uses {
        visit_loopuse(m, lu, visitor);
    }
    for &eu in &shell.edge_uses {
        visit_edgeuse(m, eu, visitor);
    }
    if let Some(vu) = shell.vertex_use {
        visit_vertexuse(m, vu, visitor);
    }
}

fn visit_faceuse<V: TopoVisitor>(m: &Model, fu: FaceUseId, visitor: &mut V) {
    visitor.visit_faceuse(m, fu);
    let f = m.face_uses[fu].face;
    visitor.visit_face(m, f);
    if let Some(g) = m.faces[f].geom {
        visitor.visit_face_geom(m, g);
    }
    for &lu in &m.face_uses[fu].loop_uses {
        visit_loopuse(m, lu, visitor);
    }
}

fn visit_loopuse<V: TopoVisitor>(m: &Model, lu: LoopUseId, visitor: &mut V) {
    visitor.visit_loopuse(m, lu);
    visitor.visit_loop(m, m.loop_uses[lu].lp);
    match m.loop_uses[lu].down {
        LoopUseDown::Vertex(vu) => visit_vertexuse(m, vu, visitor),
        LoopUseDown::Edges { .. } => {
            for eu in m.loop_edge_uses(lu) {
                visit_edgeuse(m, eu, visitor);
            }
        }
    }
}

/// Entry at an edge or edgeuse: the use itself reaches only its start
/// vertexuse, so the far endpoint comes from the mate's vertexuse.
fn visit_edge_entry<V: TopoVisitor>(m: &Model, eu: EdgeUseId, visitor: &mut V) {
    visit_edgeuse(m, eu, visitor);
    let mate = m.edge_uses[eu].mate;
    visit_vertexuse(m, m.edge_uses[mate].vu, visitor);
}

fn visit_edgeuse<V: TopoVisitor>(m: &Model, eu: EdgeUseId, visitor: &mut V) {
    visitor.visit_edgeuse(m, eu);
    visitor.visit_edge(m, m.edge_uses[eu].edge);
    if let Some(g) = m.edge_uses[eu].geom {
        visitor.visit_edge_geom(m, g);
    }
    visit_vertexuse(m, m.edge_uses[eu].vu, visitor);
}

fn visit_vertexuse<V: TopoVisitor>(m: &Model, vu: VertexUseId, visitor: &mut V) {
    visitor.visit_vertexuse(m, vu);
    visitor.visit_vertex(m, m.vertex_uses[vu].vertex);
}

macro_rules! dedup_collector {
    ($name:ident, $id:ty, $hook:ident) => {
        #[derive(Default)]
        struct $name {
            seen: HashSet<$id>,
            out: Vec<$id>,
        }

        impl TopoVisitor for $name {
            fn $hook(&mut self, _m: &Model, id: $id) {
                if self.seen.insert(id) {
                    self.out.push(id);
                }
            }
        }
    };
}

dedup_collector!(VertexCollector, VertexId, visit_vertex);
dedup_collector!(EdgeUseCollector, EdgeUseId, visit_edgeuse);
dedup_collector!(EdgeCollector, EdgeId, visit_edge);
dedup_collector!(EdgeGeomCollector, EdgeGeomId, visit_edge_geom);
dedup_collector!(FaceCollector, FaceId, visit_face);

/// Every distinct vertex below `start`, in first-discovery order.
pub fn vertex_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<VertexId> {
    let mut c = VertexCollector::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// Every distinct vertexuse below `start` that carries a shading normal.
pub fn vertexuse_normal_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<VertexUseId> {
    #[derive(Default)]
    struct C {
        seen: HashSet<VertexUseId>,
        out: Vec<VertexUseId>,
    }
    impl TopoVisitor for C {
        fn visit_vertexuse(&mut self, m: &Model, vu: VertexUseId) {
            if m.vertex_uses[vu].normal.is_some() && self.seen.insert(vu) {
                self.out.push(vu);
            }
        }
    }
    let mut c = C::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// Every distinct edgeuse below `start`, in first-discovery order.
pub fn edgeuse_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<EdgeUseId> {
    let mut c = EdgeUseCollector::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// Every distinct edge below `start`, in first-discovery order.
pub fn edge_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<EdgeId> {
    let mut c = EdgeCollector::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// Every distinct edge line below `start`, in first-discovery order.
pub fn edge_geom_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<EdgeGeomId> {
    let mut c = EdgeGeomCollector::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// Every distinct face below `start`, in first-discovery order.
pub fn face_tabulate(m: &Model, start: impl Into<TopoRef>) -> Vec<FaceId> {
    let mut c = FaceCollector::default();
    visit(m, start.into(), &mut c);
    c.out
}

/// One representative edgeuse per distinct edge, plus every distinct
/// vertex, both below `start`, collected in a single pass.
pub fn e_and_v_tabulate(m: &Model, start: impl Into<TopoRef>) -> (Vec<EdgeUseId>, Vec<VertexId>) {
    #[derive(Default)]
    struct C {
        seen_edges: HashSet<EdgeId>,
        eus: Vec<EdgeUseId>,
        seen_verts: HashSet<VertexId>,
        verts: Vec<VertexId>,
    }
    impl TopoVisitor for C {
        fn visit_edgeuse(&mut self, m: &Model, eu: EdgeUseId) {
            if self.seen_edges.insert(m.edge_uses[eu].edge) {
                self.eus.push(eu);
            }
        }
        fn visit_vertex(&mut self, _m: &Model, v: VertexId) {
            if self.seen_verts.insert(v) {
                self.verts.push(v);
            }
        }
    }
    let mut c = C::default();
    visit(m, start.into(), &mut c);
    (c.eus, c.verts)
}

/// Every edgeuse on the line geometry's use list.
///
/// A straight read of the stored list; a listed use that disavows the
/// geometry is corruption and panics.
pub fn edgeuse_with_eg_tabulate(m: &Model, eg: EdgeGeomId) -> Vec<EdgeUseId> {
    let uses = m.edge_geoms[eg].uses.clone();
    for &eu in &uses {
        if m.edge_uses[eu].geom != Some(eg) {
            panic!("edgeuse {eu:?} on the use list of {eg:?} disavows it");
        }
    }
    uses
}

/// Every distinct edgeuse below `start` whose line geometry is parallel
/// to `(pt, dir)` within the generous 0.9 ratio and whose endpoints both
/// lie within `tol.dist` of it. Callers wanting a wider net pass a
/// scaled tolerance.
pub fn edgeuse_on_line_tabulate(
    m: &Model,
    start: impl Into<TopoRef>,
    pt: &Point3,
    dir: &Vec3,
    tol: &Tolerance,
) -> Vec<EdgeUseId> {
    struct C<'a> {
        pt: &'a Point3,
        dir: &'a Vec3,
        dist_sq: f64,
        seen: HashSet<EdgeUseId>,
        out: Vec<EdgeUseId>,
    }
    impl TopoVisitor for C<'_> {
        fn visit_edgeuse(&mut self, m: &Model, eu: EdgeUseId) {
            if self.seen.contains(&eu) {
                return;
            }
            let g = match m.edge_uses[eu].geom {
                Some(g) => &m.edge_geoms[g],
                None => return,
            };
            let ratio = g.dir.dot(self.dir).abs() / (g.dir.norm() * self.dir.norm());
            if !(ratio >= 0.9) {
                return;
            }
            let v1 = m.edgeuse_start(eu);
            let v2 = m.edgeuse_end(eu);
            let (p1, p2) = match (m.vertices[v1].point, m.vertices[v2].point) {
                (Some(p1), Some(p2)) => (p1, p2),
                _ => return,
            };
            if dist_sq_point_to_line(&p1, self.pt, self.dir) <= self.dist_sq
                && dist_sq_point_to_line(&p2, self.pt, self.dir) <= self.dist_sq
            {
                self.seen.insert(eu);
                self.out.push(eu);
            }
        }
    }
    let mut c = C {
        pt,
        dir,
        dist_sq: tol.dist_sq,
        seen: HashSet::new(),
        out: Vec::new(),
    };
    visit(m, start.into(), &mut c);
    c.out
}
