//! Loop-level predicates: plane and area, winding, crack detection, and
//! self-touch detection.
//!
//! All of these read the loop's vertex cycle and nothing else; they
//! never mutate and never panic on well-formed input. Degenerate
//! geometry answers `None` or `false`, per the kernel-wide sentinel
//! policy.

use mantle_math::{polygon_area_vector, PlaneEq, Point3, Tolerance, Vec3};
use mantle_topo::{LoopUseDown, LoopUseId, Model, VertexUseId, VertexUseUp};

/// Winding of a loop relative to a reference normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopWinding {
    /// Counterclockwise around the reference normal (an exterior loop).
    Ccw,
    /// Clockwise around the reference normal (a hole loop).
    Cw,
}

/// Enclosed area and plane of the loop's vertex cycle, by the Newell sum.
///
/// `None` for a single-vertex loop, a cycle of fewer than three edges, a
/// vertex without a position, or a vanishing area vector: all the cases
/// where no plane is defined.
pub fn loop_plane_area(m: &Model, lu: LoopUseId) -> Option<(f64, PlaneEq)> {
    let mut pts: Vec<Point3> = Vec::new();
    match m.loop_uses[lu].down {
        LoopUseDown::Vertex(_) => return None,
        LoopUseDown::Edges { .. } => {
            for eu in m.loop_edge_uses(lu) {
                let v = m.edgeuse_start(eu);
                pts.push(m.vertices[v].point?);
            }
        }
    }
    if pts.len() < 3 {
        return None;
    }

    let area_vec = polygon_area_vector(&pts);
    let area = area_vec.norm();
    if area <= 0.0 {
        return None;
    }
    let normal = area_vec / area;
    let d = pts.iter().map(|p| normal.dot(&p.coords)).sum::<f64>() / pts.len() as f64;
    Some((area, PlaneEq { normal, d }))
}

/// Whether the loop is a crack: a zero-area excursion in which every
/// edgeuse has a distinct return edgeuse in the same loopuse spanning
/// the same two vertices the other way.
///
/// Vertex loops and wire loops are never cracks. Worst case O(E²): each
/// edge scans its far vertex's whole use list.
pub fn loop_is_a_crack(m: &Model, lu: LoopUseId) -> bool {
    if m.fu_of_lu(lu).is_none() {
        return false;
    }
    let mut any = false;
    for eu in m.loop_edge_uses(lu) {
        any = true;
        let va = m.edgeuse_start(eu);
        let vb = m.edgeuse_end(eu);

        // Look for some other edgeuse of this same loopuse running vb
        // back to va. The mate does not count: it lives in the mate
        // loopuse on the other side of the face.
        let mut found = false;
        for &vu in &m.vertices[vb].uses {
            let eu2 = match m.vertex_uses[vu].up {
                VertexUseUp::EdgeUse(eu2) => eu2,
                _ => continue,
            };
            if eu2 == eu {
                continue;
            }
            if m.lu_of_vu(vu) != Some(lu) {
                continue;
            }
            if m.edgeuse_end(eu2) == va {
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    any
}

/// Classify the loop's winding against a reference normal.
///
/// `Some(Ccw)` when the loop's own Newell normal points along the
/// reference, `Some(Cw)` when it opposes it. `None` when the loop has no
/// plane, its area is below tolerance, or the two normals are nearly
/// perpendicular. These are numerically indeterminate, not errors.
pub fn loop_is_ccw(
    m: &Model,
    lu: LoopUseId,
    normal: &Vec3,
    tol: &Tolerance,
) -> Option<LoopWinding> {
    let (area, plane) = loop_plane_area(m, lu)?;
    if area < tol.dist_sq {
        return None;
    }
    let dot = plane.normal.dot(normal);
    if dot.abs() < tol.perp {
        return None;
    }
    Some(if dot > 0.0 {
        LoopWinding::Ccw
    } else {
        LoopWinding::Cw
    })
}

/// Find a vertex the loop visits twice (an accordion pleat), returning
/// the second use encountered. `None` for a loop that never revisits a
/// vertex. Worst case O(E²).
pub fn loop_touches_self(m: &Model, lu: LoopUseId) -> Option<VertexUseId> {
    for eu in m.loop_edge_uses(lu) {
        let this_vu = m.edge_uses[eu].vu;
        let v = m.vertex_uses[this_vu].vertex;
        for &other in &m.vertices[v].uses {
            if other == this_vu {
                continue;
            }
            if m.lu_of_vu(other) == Some(lu) {
                return Some(other);
            }
        }
    }
    None
}
