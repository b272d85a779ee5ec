//! Edge frames and dihedral angle measurement.
//!
//! The "left" vector of an edgeuse points into the interior of its face,
//! perpendicular to the edge and in the plane of the face. Radial
//! sorting and face-angle measurement are both built on it.

use mantle_math::{angle_measure, Point3, Tolerance, Vec3};
use mantle_topo::{EdgeUseId, Model, TopoError};

/// The squared-sine threshold below which an edge counts as parallel to
/// its face normal and the left vector must come from loop neighbors.
const SIN_SQ_PARALLEL: f64 = 1e-6;

fn endpoints(m: &Model, eu: EdgeUseId) -> Result<(Point3, Point3), TopoError> {
    let v1 = m.edgeuse_start(eu);
    let v2 = m.edgeuse_end(eu);
    let p1 = m.vertices[v1]
        .point
        .ok_or(TopoError::MissingVertexPoint(v1))?;
    let p2 = m.vertices[v2]
        .point
        .ok_or(TopoError::MissingVertexPoint(v2))?;
    Ok((p1, p2))
}

/// Left cross product for one edgeuse against a given face normal, or
/// `None` when the edge is too nearly parallel to the normal for the
/// cross product to be trustworthy.
fn leftvec_against(m: &Model, eu: EdgeUseId, normal: &Vec3) -> Result<Option<Vec3>, TopoError> {
    let (p1, p2) = endpoints(m, eu)?;
    let evec = p2 - p1;
    let e_sq = evec.norm_squared();
    if e_sq <= 0.0 {
        return Ok(None);
    }
    let left = normal.cross(&evec);
    if left.norm_squared() / e_sq < SIN_SQ_PARALLEL {
        return Ok(None);
    }
    Ok(Some(left / left.norm()))
}

/// Unnormalized left vector: face normal crossed with the edge vector.
///
/// `None` for a wire edgeuse or a face without plane geometry. The
/// result is not unit length and may be arbitrarily short for an edge
/// nearly parallel to the normal; use [`find_eu_leftvec`] when a usable
/// direction is required.
pub fn find_eu_left_non_unit(m: &Model, eu: EdgeUseId) -> Option<Vec3> {
    let fu = m.fu_of_eu(eu)?;
    let normal = m.faceuse_normal(fu)?;
    let v1 = m.edgeuse_start(eu);
    let v2 = m.edgeuse_end(eu);
    let p1 = m.vertices[v1].point?;
    let p2 = m.vertices[v2].point?;
    Some(normal.cross(&(p2 - p1)))
}

/// Unit left vector of an edgeuse: perpendicular to the edge, in the
/// plane of the face, pointing toward the face interior.
///
/// `Ok(None)` for a wire edgeuse or a face without a plane. When the
/// edge runs nearly parallel to the face normal (possible only through
/// near-degenerate geometry), the left vector is recovered by blending
/// the left vectors of the nearest usable neighbors scanning forward
/// and backward around the loop; if no neighbor is usable either, the
/// face has no reference direction at all and the result is
/// [`TopoError::DegenerateFace`].
pub fn find_eu_leftvec(m: &Model, eu: EdgeUseId) -> Result<Option<Vec3>, TopoError> {
    let fu = match m.fu_of_eu(eu) {
        Some(fu) => fu,
        None => return Ok(None),
    };
    let normal = match m.faceuse_normal(fu) {
        Some(n) => n,
        None => return Ok(None),
    };

    if let Some(left) = leftvec_against(m, eu, &normal)? {
        return Ok(Some(left));
    }

    // Degenerate: scan the loop for the nearest non-parallel edges on
    // each side and average their left vectors.
    let mut forward = None;
    let mut cur = m.edge_uses[eu].next;
    while cur != eu {
        if let Some(left) = leftvec_against(m, cur, &normal)? {
            forward = Some(left);
            break;
        }
        cur = m.edge_uses[cur].next;
    }
    let mut backward = None;
    let mut cur = m.edge_uses[eu].prev;
    while cur != eu {
        if let Some(left) = leftvec_against(m, cur, &normal)? {
            backward = Some(left);
            break;
        }
        cur = m.edge_uses[cur].prev;
    }

    let blended = match (forward, backward) {
        (Some(f), Some(b)) => f + b,
        (Some(f), None) => f,
        (None, Some(b)) => b,
        (None, None) => return Err(TopoError::DegenerateFace(fu)),
    };
    let norm = blended.norm();
    if norm <= 0.0 {
        // The two neighbors cancelled exactly.
        return Err(TopoError::DegenerateFace(fu));
    }
    Ok(Some(blended / norm))
}

/// The orthonormal frame of an edgeuse: unit edge vector, unit left
/// vector, and the face normal, in that order.
///
/// This is the corruption-tier variant: a zero-length edge, a wire
/// edgeuse, or a face without a plane panics, because callers erect
/// frames only on edges they already know are embedded in a real face.
pub fn eu_2vecs_perp(m: &Model, eu: EdgeUseId, tol: &Tolerance) -> [Vec3; 3] {
    let fu = m
        .fu_of_eu(eu)
        .unwrap_or_else(|| panic!("edgeuse {eu:?} is a wire; it has no frame"));
    let normal = m
        .faceuse_normal(fu)
        .unwrap_or_else(|| panic!("face of {eu:?} has no plane geometry"));

    let v1 = m.edgeuse_start(eu);
    let v2 = m.edgeuse_end(eu);
    let p1 = m.vertices[v1].point.expect("vertex without a point");
    let p2 = m.vertices[v2].point.expect("vertex without a point");
    let evec = p2 - p1;
    let len = evec.norm();
    if len <= tol.dist {
        panic!("edgeuse {eu:?} has zero length within tolerance");
    }
    let xvec = evec / len;
    let yvec = normal.cross(&xvec);
    [xvec, yvec / yvec.norm(), normal]
}

/// Measure the angle of `eu`'s left vector in the caller's 2D basis,
/// counterclockwise from `xvec` toward `yvec`, in `[0, 2π)`.
///
/// A wire edgeuse has no face and answers the documented sentinel `-π`.
/// A degenerate face propagates [`TopoError::DegenerateFace`].
pub fn measure_fu_angle(
    m: &Model,
    eu: EdgeUseId,
    xvec: &Vec3,
    yvec: &Vec3,
) -> Result<f64, TopoError> {
    match find_eu_leftvec(m, eu)? {
        None => Ok(-std::f64::consts::PI),
        Some(left) => Ok(angle_measure(&left, xvec, yvec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mantle_primitives::{open_triangle, wire_segment};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    #[test]
    fn leftvec_points_into_the_triangle() {
        let tri = open_triangle();
        let m = &tri.model;
        let lu = m.face_uses[tri.fu].loop_uses[0];

        // The edge along +x, on a +z face: left is +y, into the interior.
        let eu = m
            .loop_edge_uses(lu)
            .find(|&eu| m.edgeuse_start(eu) == tri.verts[0] && m.edgeuse_end(eu) == tri.verts[1])
            .unwrap();
        let left = find_eu_leftvec(m, eu).unwrap().unwrap();
        assert_relative_eq!(left.y, 1.0, epsilon = 1e-12);

        let non_unit = find_eu_left_non_unit(m, eu).unwrap();
        assert!(non_unit.y > 0.0);
        assert_relative_eq!(non_unit.x, 0.0, epsilon = 1e-12);

        let [x, y, z] = eu_2vecs_perp(m, eu, &tol());
        assert_relative_eq!(x.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(z.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn wire_edgeuse_answers_the_sentinel() {
        let wire = wire_segment(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let m = &wire.model;
        assert_eq!(find_eu_leftvec(m, wire.eu), Ok(None));
        assert_eq!(find_eu_left_non_unit(m, wire.eu), None);
        assert_eq!(
            measure_fu_angle(m, wire.eu, &Vec3::x(), &Vec3::y()),
            Ok(-PI)
        );
    }

    #[test]
    fn angle_in_the_callers_basis() {
        let tri = open_triangle();
        let m = &tri.model;
        let lu = m.face_uses[tri.fu].loop_uses[0];
        let eu = m
            .loop_edge_uses(lu)
            .find(|&eu| m.edgeuse_start(eu) == tri.verts[0] && m.edgeuse_end(eu) == tri.verts[1])
            .unwrap();

        // Left is +y: zero angle in a (y, z) basis, a quarter turn in (x, y).
        assert_relative_eq!(
            measure_fu_angle(m, eu, &Vec3::y(), &Vec3::z()).unwrap(),
            0.0
        );
        assert_relative_eq!(
            measure_fu_angle(m, eu, &Vec3::x(), &Vec3::y()).unwrap(),
            FRAC_PI_2
        );
    }

    #[test]
    #[should_panic(expected = "is a wire")]
    fn frame_on_a_wire_panics() {
        let wire = wire_segment(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        eu_2vecs_perp(&wire.model, wire.eu, &tol());
    }
}
