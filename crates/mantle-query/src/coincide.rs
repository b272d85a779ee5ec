//! Line-geometry coincidence and the shared-edge query between two
//! faceuses.

use mantle_math::{dist_sq_point_to_line, Point3, Tolerance};
use mantle_topo::{EdgeUseId, FaceUseId, Model, TopoError};
use tracing::debug;

/// Dot-product ratio above which two line directions count as parallel.
///
/// Deliberately far looser than the caller's parallel tolerance (about
/// 26 degrees): short nearly-parallel edges produce noisy directions,
/// and the endpoint distance checks below carry the real precision.
const PARALLEL_RATIO: f64 = 0.9;

/// Multiplier for the diagnostic recheck of a failed endpoint test.
const NEAR_MISS_FUZZ: f64 = 1e5;

fn seg_endpoints(m: &Model, eu: EdgeUseId) -> Option<(Point3, Point3)> {
    let v1 = m.edgeuse_start(eu);
    let v2 = m.edgeuse_end(eu);
    Some((m.vertices[v1].point?, m.vertices[v2].point?))
}

/// Whether both endpoints of `eu` lie within `dist` of the line
/// `(pt, dir)`.
fn endpoints_on_line(
    m: &Model,
    eu: EdgeUseId,
    pt: &Point3,
    dir: &mantle_math::Vec3,
    dist: f64,
) -> Option<bool> {
    let (a, b) = seg_endpoints(m, eu)?;
    let d2 = dist * dist;
    Some(dist_sq_point_to_line(&a, pt, dir) <= d2 && dist_sq_point_to_line(&b, pt, dir) <= d2)
}

/// Whether two edgeuses lie on coincident lines.
///
/// Symmetric in its arguments. True immediately when they share one
/// geometry object; otherwise their directions must be parallel within
/// [`PARALLEL_RATIO`] and all four endpoints must lie within `tol.dist`
/// of the other edge's infinite line. Edgeuses without line geometry or
/// endpoint positions are never coincident.
///
/// A pair that fails the strict endpoint test but would pass it with a
/// `1e5` fuzz is structurally suspicious (two lines that close together
/// usually mean an upstream fuse was missed) and is flagged through the
/// diagnostic stream; the answer is still `false`.
pub fn edgeuse_g_coincident(m: &Model, eu1: EdgeUseId, eu2: EdgeUseId, tol: &Tolerance) -> bool {
    let (g1, g2) = match (m.edge_uses[eu1].geom, m.edge_uses[eu2].geom) {
        (Some(g1), Some(g2)) => (g1, g2),
        _ => return false,
    };
    if g1 == g2 {
        return true;
    }
    let l1 = &m.edge_geoms[g1];
    let l2 = &m.edge_geoms[g2];

    let ratio = l1.dir.dot(&l2.dir).abs() / (l1.dir.norm() * l2.dir.norm());
    if !(ratio >= PARALLEL_RATIO) {
        return false;
    }

    let strict = match (
        endpoints_on_line(m, eu1, &l2.pt, &l2.dir, tol.dist),
        endpoints_on_line(m, eu2, &l1.pt, &l1.dir, tol.dist),
    ) {
        (Some(a), Some(b)) => a && b,
        _ => return false,
    };
    if strict {
        return true;
    }

    let fuzzy = endpoints_on_line(m, eu1, &l2.pt, &l2.dir, tol.dist * NEAR_MISS_FUZZ)
        .unwrap_or(false)
        && endpoints_on_line(m, eu2, &l1.pt, &l1.dir, tol.dist * NEAR_MISS_FUZZ).unwrap_or(false);
    if fuzzy {
        debug!(
            ?eu1,
            ?eu2,
            "edge lines are near-coincident but distinct; a fuse may be overdue"
        );
    }
    false
}

/// Find the edge shared by two faceuses.
///
/// A pure query: walks every edgeuse of `fu1`'s loops and probes each
/// radial orbit for a use belonging to `fu2`'s face. Distinct shared
/// edges lying on provably coincident lines count as one and the first
/// is returned. Several shared edges on genuinely different lines is
/// ambiguous: the query reports every candidate and mutates nothing;
/// the caller may fuse the line geometries and ask again.
pub fn find_edge_between_2fu(
    m: &Model,
    fu1: FaceUseId,
    fu2: FaceUseId,
    tol: &Tolerance,
) -> Result<Option<EdgeUseId>, TopoError> {
    let f2 = m.face_uses[fu2].face;
    let mut reps: Vec<EdgeUseId> = Vec::new();

    for &lu in &m.face_uses[fu1].loop_uses {
        for eu in m.loop_edge_uses(lu) {
            let hit = m
                .radial_orbit(eu)
                .skip(1)
                .any(|eur| m.fu_of_eu(eur).is_some_and(|fu| m.face_uses[fu].face == f2));
            if !hit {
                continue;
            }
            let e = m.edge_uses[eu].edge;
            if reps.iter().any(|&rep| m.edge_uses[rep].edge == e) {
                continue;
            }
            if reps
                .iter()
                .any(|&rep| edgeuse_g_coincident(m, rep, eu, tol))
            {
                debug!(?eu, "extra shared edge lies on a coincident line; ignored");
                continue;
            }
            reps.push(eu);
        }
    }

    match reps.len() {
        0 => Ok(None),
        1 => Ok(Some(reps[0])),
        _ => Err(TopoError::AmbiguousSharedEdge { candidates: reps }),
    }
}
