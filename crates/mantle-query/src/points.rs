//! Point and vertex searches, plus membership scans over caller-supplied
//! id lists.
//!
//! Everything here is a deliberate brute-force linear scan: these
//! queries answer one-off questions during repair and evaluation, not
//! bulk spatial lookups, and a spatial index would be wasted on them.

use mantle_math::{dist_sq_point_to_seg2, transform_point, Mat4, Point2, Point3, Tolerance};
use mantle_topo::{
    EdgeId, EdgeUseId, FaceId, FaceUseId, LoopId, LoopUseDown, LoopUseId, Model, ShellId, TopoRef,
    VertexId, VertexUseId, VertexUseUp,
};

use crate::tabulate::edgeuse_tabulate;

/// Find a vertexuse of the loop whose vertex lies within tolerance of
/// `pt`. Covers both edge-chain loops and single-vertex loops.
pub fn find_pt_in_lu(
    m: &Model,
    lu: LoopUseId,
    pt: &Point3,
    tol: &Tolerance,
) -> Option<VertexUseId> {
    match m.loop_uses[lu].down {
        LoopUseDown::Vertex(vu) => {
            let v = m.vertex_uses[vu].vertex;
            let p = m.vertices[v].point?;
            tol.points_equal(&p, pt).then_some(vu)
        }
        LoopUseDown::Edges { .. } => {
            for eu in m.loop_edge_uses(lu) {
                let vu = m.edge_uses[eu].vu;
                let v = m.vertex_uses[vu].vertex;
                if let Some(p) = m.vertices[v].point {
                    if tol.points_equal(&p, pt) {
                        return Some(vu);
                    }
                }
            }
            None
        }
    }
}

/// Find a vertexuse anywhere in the faceuse's loops matching `pt`.
pub fn find_pt_in_face(
    m: &Model,
    fu: FaceUseId,
    pt: &Point3,
    tol: &Tolerance,
) -> Option<VertexUseId> {
    m.face_uses[fu]
        .loop_uses
        .iter()
        .find_map(|&lu| find_pt_in_lu(m, lu, pt, tol))
}

/// Find a vertex anywhere in the shell matching `pt`: faces first, then
/// wire loops, wire edges, and finally the lone vertexuse.
pub fn find_pt_in_shell(m: &Model, s: ShellId, pt: &Point3, tol: &Tolerance) -> Option<VertexId> {
    let shell = &m.shells[s];
    for &fu in &shell.face_uses {
        if let Some(vu) = find_pt_in_face(m, fu, pt, tol) {
            return Some(m.vertex_uses[vu].vertex);
        }
    }
    for &lu in &shell.loop_uses {
        if let Some(vu) = find_pt_in_lu(m, lu, pt, tol) {
            return Some(m.vertex_uses[vu].vertex);
        }
    }
    for &eu in &shell.edge_uses {
        let v = m.edgeuse_start(eu);
        if let Some(p) = m.vertices[v].point {
            if tol.points_equal(&p, pt) {
                return Some(v);
            }
        }
    }
    if let Some(vu) = shell.vertex_use {
        let v = m.vertex_uses[vu].vertex;
        if let Some(p) = m.vertices[v].point {
            if tol.points_equal(&p, pt) {
                return Some(v);
            }
        }
    }
    None
}

/// Find a vertex anywhere in the model matching `pt`.
///
/// Linear in the number of vertices; callers matching many points should
/// build their own index instead of looping over this.
pub fn find_pt_in_model(m: &Model, pt: &Point3, tol: &Tolerance) -> Option<VertexId> {
    for (v, vertex) in &m.vertices {
        if let Some(p) = vertex.point {
            if tol.points_equal(&p, pt) {
                return Some(v);
            }
        }
    }
    None
}

/// Find a use of vertex `v` lying in faceuse `fu`.
pub fn find_v_in_face(m: &Model, v: VertexId, fu: FaceUseId) -> Option<VertexUseId> {
    m.vertices[v]
        .uses
        .iter()
        .copied()
        .find(|&vu| m.fu_of_vu(vu) == Some(fu))
}

/// Find a use of vertex `v` lying in shell `s`.
///
/// With `edges_only`, only uses owned by edgeuses count; lone and
/// vertex-loop uses are skipped.
pub fn find_v_in_shell(m: &Model, v: VertexId, s: ShellId, edges_only: bool) -> Option<VertexUseId> {
    m.vertices[v].uses.iter().copied().find(|&vu| {
        if edges_only && !matches!(m.vertex_uses[vu].up, VertexUseUp::EdgeUse(_)) {
            return false;
        }
        m.shell_of_vu(vu) == s
    })
}

/// Whether `v` is the vertex of a single-vertex wire loop in shell `s`.
pub fn is_vertex_a_selfloop_in_shell(m: &Model, v: VertexId, s: ShellId) -> bool {
    m.vertices[v].uses.iter().any(|&vu| {
        match m.vertex_uses[vu].up {
            // Only a vertex-loop owns a vertexuse directly.
            VertexUseUp::LoopUse(lu) => m.shell_of_lu(lu) == s && m.fu_of_lu(lu).is_none(),
            _ => false,
        }
    })
}

/// Whether any edgeuse in the list starts at `v`. Lists holding both
/// uses of each edge (as shell wire lists do) therefore cover both
/// endpoints.
pub fn is_vertex_in_edgelist(m: &Model, v: VertexId, eus: &[EdgeUseId]) -> bool {
    eus.iter().any(|&eu| m.edgeuse_start(eu) == v)
}

/// Whether any loop in the list visits `v`. `singletons` also accepts
/// single-vertex loops on `v`; otherwise only edge chains count.
pub fn is_vertex_in_looplist(m: &Model, v: VertexId, lus: &[LoopUseId], singletons: bool) -> bool {
    lus.iter().any(|&lu| match m.loop_uses[lu].down {
        LoopUseDown::Vertex(vu) => singletons && m.vertex_uses[vu].vertex == v,
        LoopUseDown::Edges { .. } => m.loop_edge_uses(lu).any(|eu| m.edgeuse_start(eu) == v),
    })
}

/// Whether either side of face `f` uses vertex `v`.
pub fn is_vertex_in_face(m: &Model, v: VertexId, f: FaceId) -> bool {
    m.vertices[v]
        .uses
        .iter()
        .any(|&vu| m.fu_of_vu(vu).is_some_and(|fu| m.face_uses[fu].face == f))
}

/// Whether any face in the list uses vertex `v`.
pub fn is_vertex_in_facelist(m: &Model, v: VertexId, faces: &[FaceId]) -> bool {
    faces.iter().any(|&f| is_vertex_in_face(m, v, f))
}

/// Whether any edgeuse in the list uses edge `e`.
pub fn is_edge_in_edgelist(m: &Model, e: EdgeId, eus: &[EdgeUseId]) -> bool {
    eus.iter().any(|&eu| m.edge_uses[eu].edge == e)
}

/// Whether any loop in the list traverses edge `e`.
pub fn is_edge_in_looplist(m: &Model, e: EdgeId, lus: &[LoopUseId]) -> bool {
    lus.iter().any(|&lu| match m.loop_uses[lu].down {
        LoopUseDown::Vertex(_) => false,
        LoopUseDown::Edges { .. } => m.loop_edge_uses(lu).any(|eu| m.edge_uses[eu].edge == e),
    })
}

/// Whether any face in the list traverses edge `e`.
pub fn is_edge_in_facelist(m: &Model, e: EdgeId, faces: &[FaceId]) -> bool {
    faces.iter().any(|&f| {
        let fu = m.faces[f].fu;
        is_edge_in_looplist(m, e, &m.face_uses[fu].loop_uses)
    })
}

/// Whether any face in the list carries loop `lp` on either side.
pub fn is_loop_in_facelist(m: &Model, lp: LoopId, faces: &[FaceId]) -> bool {
    faces.iter().any(|&f| {
        let fu = m.faces[f].fu;
        let mate = m.face_uses[fu].mate;
        m.face_uses[fu]
            .loop_uses
            .iter()
            .chain(&m.face_uses[mate].loop_uses)
            .any(|&lu| m.loop_uses[lu].lp == lp)
    })
}

/// Project every edge below `start` through `proj` and return the
/// edgeuse nearest `pt2` in the projection plane, or `None` when no
/// edge lies below `start`.
///
/// An edge within the distance tolerance of the point is returned
/// immediately without finishing the scan.
pub fn find_e_nearest_pt2(
    m: &Model,
    start: TopoRef,
    pt2: &Point2,
    proj: &Mat4,
    tol: &Tolerance,
) -> Option<EdgeUseId> {
    let mut best: Option<(f64, EdgeUseId)> = None;
    for eu in edgeuse_tabulate(m, start) {
        let v1 = m.edgeuse_start(eu);
        let v2 = m.edgeuse_end(eu);
        let (p1, p2) = match (m.vertices[v1].point, m.vertices[v2].point) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => continue,
        };
        let a3 = transform_point(proj, &p1);
        let b3 = transform_point(proj, &p2);
        let a = Point2::new(a3.x, a3.y);
        let b = Point2::new(b3.x, b3.y);
        let d = dist_sq_point_to_seg2(pt2, &a, &b);
        if d <= tol.dist_sq {
            return Some(eu);
        }
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, eu));
        }
    }
    best.map(|(_, eu)| eu)
}
