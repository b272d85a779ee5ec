#![warn(missing_docs)]

//! Ready-made models for tests, benchmarks, and examples.
//!
//! Each constructor returns a fixture struct bundling the [`Model`] with
//! handles to the entities a caller usually wants: the shell, named
//! vertices, representative faceuses or loopuses. All fixtures come back
//! with positions set, face planes attached, and the bounds chain
//! computed, so geometric queries work on them immediately.
//!
//! Construction here cannot fail for any input these functions accept,
//! so errors from the underlying operators are treated as bugs and
//! panic.

use mantle_math::{Point3, Tolerance};
use mantle_topo::{
    EdgeUseId, FaceId, FaceUseId, LoopUseId, Model, RegionId, ShellId, VertexId,
};
use tracing::instrument;

// =============================================================================
// Unit cube
// =============================================================================

/// A closed unit cube: 8 vertices, 12 edges, 6 faces, one shell.
#[derive(Debug)]
pub struct CubeModel {
    /// The model holding everything below.
    pub model: Model,
    /// The single region.
    pub region: RegionId,
    /// The single closed shell.
    pub shell: ShellId,
    /// Corners in the layout of the diagram on [`unit_cube`].
    pub verts: [VertexId; 8],
    /// Faces in order: bottom, top, front, back, left, right.
    pub faces: [FaceId; 6],
}

// Corner layout, z up:
//
//        v7--------v6
//       / |       / |
//      v4--------v5 |
//      |  |      |  |
//      |  v3-----|--v2
//      | /       | /
//      v0--------v1
//
// v0 at the origin, v6 at (1, 1, 1).
const CUBE_CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

// Corner indices per face, ordered so every outward normal points away
// from the cube: bottom, top, front, back, left, right.
const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // -z
    [4, 5, 6, 7], // +z
    [0, 1, 5, 4], // -y
    [2, 3, 7, 6], // +y
    [0, 4, 7, 3], // -x
    [1, 2, 6, 5], // +x
];

/// Build the axis-aligned unit cube with one corner at the origin.
///
/// Shared corner slots make consecutive faces reuse the dangling edges
/// of the earlier ones, so every edge ends up with exactly two faces
/// (four edgeuses) around it.
#[instrument]
pub fn unit_cube() -> CubeModel {
    let mut m = Model::new();
    let (region, shell) = m.make_region();
    let tol = Tolerance::DEFAULT;

    let mut table: [Option<VertexId>; 8] = [None; 8];
    let mut faces = [FaceId::default(); 6];
    for (f, corners) in CUBE_FACES.iter().enumerate() {
        let mut slots = corners.map(|i| table[i]);
        let fu = m
            .make_polygon_face(shell, &mut slots)
            .expect("cube face construction cannot fail");
        for (&i, &slot) in corners.iter().zip(&slots) {
            table[i] = slot;
        }
        faces[f] = m.face_uses[fu].face;
    }
    let verts = table.map(|v| v.expect("every corner appears in some face"));

    for (&v, p) in verts.iter().zip(CUBE_CORNERS) {
        m.set_vertex_point(v, Point3::new(p[0], p[1], p[2]));
    }
    for &f in &faces {
        let fu = m.faces[f].fu;
        m.face_plane_from_loop(fu, &tol)
            .expect("cube faces are planar quads");
    }
    m.compute_region_bounds(region, &tol)
        .expect("cube has geometry everywhere");

    CubeModel {
        model: m,
        region,
        shell,
        verts,
        faces,
    }
}

// =============================================================================
// Square plate with a hole
// =============================================================================

/// A single face in the xy-plane: a square outer boundary with a smaller
/// square hole, both centered at the origin.
#[derive(Debug)]
pub struct PlateModel {
    /// The model holding everything below.
    pub model: Model,
    /// The single region.
    pub region: RegionId,
    /// The single shell.
    pub shell: ShellId,
    /// The one face.
    pub face: FaceId,
    /// The upward (`Same`) side of the face.
    pub fu: FaceUseId,
    /// Outer boundary on `fu`, counterclockwise seen from +z.
    pub outer_lu: LoopUseId,
    /// Hole boundary on `fu`, clockwise seen from +z.
    pub hole_lu: LoopUseId,
    /// Outer corners, counterclockwise from (-outer/2, -outer/2).
    pub outer_verts: [VertexId; 4],
    /// Hole corners, clockwise from (-inner/2, -inner/2).
    pub hole_verts: [VertexId; 4],
}

/// Build a square plate of side `outer` with a square hole of side
/// `inner` punched through its middle, lying in the z = 0 plane.
///
/// `inner` must be smaller than `outer`; neither boundary is checked
/// against the other beyond that.
#[instrument]
pub fn square_plate_with_hole(outer: f64, inner: f64) -> PlateModel {
    assert!(
        0.0 < inner && inner < outer,
        "hole must fit inside the plate"
    );
    let mut m = Model::new();
    let (region, shell) = m.make_region();
    let tol = Tolerance::DEFAULT;
    let ho = outer / 2.0;
    let hi = inner / 2.0;

    let mut outer_slots = [None; 4];
    let fu = m
        .make_polygon_face(shell, &mut outer_slots)
        .expect("plate boundary construction cannot fail");
    let outer_verts = outer_slots.map(|v| v.expect("written back"));
    let outer_pts = [
        Point3::new(-ho, -ho, 0.0),
        Point3::new(ho, -ho, 0.0),
        Point3::new(ho, ho, 0.0),
        Point3::new(-ho, ho, 0.0),
    ];
    for (&v, p) in outer_verts.iter().zip(outer_pts) {
        m.set_vertex_point(v, p);
    }
    m.face_plane_from_loop(fu, &tol)
        .expect("plate boundary is a planar square");

    // Hole corners run clockwise against the +z face normal.
    let mut hole_slots = [None; 4];
    let hole_lu = m
        .add_loop_to_face(fu, &mut hole_slots)
        .expect("hole construction cannot fail");
    let hole_verts = hole_slots.map(|v| v.expect("written back"));
    let hole_pts = [
        Point3::new(-hi, -hi, 0.0),
        Point3::new(-hi, hi, 0.0),
        Point3::new(hi, hi, 0.0),
        Point3::new(hi, -hi, 0.0),
    ];
    for (&v, p) in hole_verts.iter().zip(hole_pts) {
        m.set_vertex_point(v, p);
    }
    m.compute_region_bounds(region, &tol)
        .expect("plate has geometry everywhere");

    let face = m.face_uses[fu].face;
    let outer_lu = m.face_uses[fu].loop_uses[0];
    PlateModel {
        model: m,
        region,
        shell,
        face,
        fu,
        outer_lu,
        hole_lu,
        outer_verts,
        hole_verts,
    }
}

// =============================================================================
// Open triangle
// =============================================================================

/// A lone triangular face in the z = 0 plane, normal +z.
#[derive(Debug)]
pub struct TriangleModel {
    /// The model holding everything below.
    pub model: Model,
    /// The single region.
    pub region: RegionId,
    /// The single shell.
    pub shell: ShellId,
    /// The upward (`Same`) side of the face.
    pub fu: FaceUseId,
    /// Corners at the origin, (1, 0, 0), and (0, 1, 0).
    pub verts: [VertexId; 3],
}

/// Build a single right triangle with legs along +x and +y.
///
/// The shell is open: both triangle sides face the outside.
#[instrument]
pub fn open_triangle() -> TriangleModel {
    let mut m = Model::new();
    let (region, shell) = m.make_region();
    let tol = Tolerance::DEFAULT;

    let mut slots = [None; 3];
    let fu = m
        .make_polygon_face(shell, &mut slots)
        .expect("triangle construction cannot fail");
    let verts = slots.map(|v| v.expect("written back"));
    let pts = [
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    for (&v, p) in verts.iter().zip(pts) {
        m.set_vertex_point(v, p);
    }
    m.face_plane_from_loop(fu, &tol)
        .expect("triangle is planar by definition");
    m.compute_region_bounds(region, &tol)
        .expect("triangle has geometry everywhere");

    TriangleModel {
        model: m,
        region,
        shell,
        fu,
        verts,
    }
}

// =============================================================================
// Wire segment
// =============================================================================

/// A single wire edge between two placed vertices, with line geometry.
#[derive(Debug)]
pub struct WireModel {
    /// The model holding everything below.
    pub model: Model,
    /// The single region.
    pub region: RegionId,
    /// The single shell.
    pub shell: ShellId,
    /// The edgeuse running from `v1` to `v2`.
    pub eu: EdgeUseId,
    /// Start vertex, at `a`.
    pub v1: VertexId,
    /// End vertex, at `b`.
    pub v2: VertexId,
}

/// Build one wire edge from `a` to `b`.
///
/// Panics if the endpoints coincide, since a zero-length edge has no
/// line geometry.
#[instrument]
pub fn wire_segment(a: Point3, b: Point3) -> WireModel {
    let mut m = Model::new();
    let (region, shell) = m.make_region();
    let tol = Tolerance::DEFAULT;

    let eu = m.make_wire_edge(None, None, shell);
    let v1 = m.edgeuse_start(eu);
    let v2 = m.edgeuse_end(eu);
    m.set_vertex_point(v1, a);
    m.set_vertex_point(v2, b);
    m.edge_geom_from_endpoints(eu)
        .expect("distinct endpoints give a line");
    m.compute_region_bounds(region, &tol)
        .expect("wire has geometry everywhere");

    WireModel {
        model: m,
        region,
        shell,
        eu,
        v1,
        v2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mantle_math::Vec3;
    use mantle_topo::TopoRef;
    use std::collections::HashSet;

    #[test]
    fn cube_entity_counts() {
        let cube = unit_cube();
        let m = &cube.model;

        assert_eq!(m.vertices.len(), 8);
        assert_eq!(m.edges.len(), 12);
        assert_eq!(m.faces.len(), 6);
        assert_eq!(m.face_uses.len(), 12);
        assert_eq!(m.edge_uses.len(), 48);
        assert!(m.audit().is_clean());

        // Closed shell: no wires, no lone vertex, every edge radially
        // shared by exactly two faces.
        let shell = &m.shells[cube.shell];
        assert!(shell.loop_uses.is_empty());
        assert!(shell.edge_uses.is_empty());
        assert!(shell.vertex_use.is_none());
        for (_, e) in &m.edges {
            assert_eq!(m.radial_orbit(e.eu).count(), 4);
            assert!(!m.is_dangling(e.eu));
        }
    }

    #[test]
    fn cube_normals_point_outward() {
        let cube = unit_cube();
        let m = &cube.model;
        let want = [
            -Vec3::z(),
            Vec3::z(),
            -Vec3::y(),
            Vec3::y(),
            -Vec3::x(),
            Vec3::x(),
        ];
        for (&f, n) in cube.faces.iter().zip(want) {
            let got = m.faceuse_normal(m.faces[f].fu).unwrap();
            assert_relative_eq!(got.dot(&n), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cube_parent_queries_are_total() {
        let cube = unit_cube();
        let m = &cube.model;
        for (eu, _) in &m.edge_uses {
            assert_eq!(m.shell_of(TopoRef::EdgeUse(eu)), cube.shell);
            m.fu_of_eu(eu).expect("every cube edgeuse sits in a face");
        }
        for (vu, _) in &m.vertex_uses {
            assert_eq!(m.shell_of(TopoRef::VertexUse(vu)), cube.shell);
        }
    }

    #[test]
    fn cube_corner_positions_match_the_diagram() {
        let cube = unit_cube();
        let m = &cube.model;
        let p6 = m.vertices[cube.verts[6]].point.unwrap();
        assert_eq!(p6, Point3::new(1.0, 1.0, 1.0));
        let p0 = m.vertices[cube.verts[0]].point.unwrap();
        assert_eq!(p0, Point3::origin());

        let distinct: HashSet<_> = cube.verts.iter().collect();
        assert_eq!(distinct.len(), 8);
    }

    #[test]
    fn plate_loops_and_counts() {
        let plate = square_plate_with_hole(2.0, 1.0);
        let m = &plate.model;

        assert_eq!(m.faces.len(), 1);
        assert_eq!(m.loops.len(), 2);
        assert_eq!(m.edges.len(), 8);
        assert_eq!(m.vertices.len(), 8);
        assert!(m.audit().is_clean());

        assert_ne!(plate.outer_lu, plate.hole_lu);
        assert_eq!(m.face_uses[plate.fu].loop_uses.len(), 2);
        let n = m.faceuse_normal(plate.fu).unwrap();
        assert_relative_eq!(n.z, 1.0);

        // Outer rim at plus and minus half the outer side.
        for &v in &plate.outer_verts {
            let p = m.vertices[v].point.unwrap();
            assert_eq!(p.x.abs(), 1.0);
            assert_eq!(p.y.abs(), 1.0);
        }
        for &v in &plate.hole_verts {
            let p = m.vertices[v].point.unwrap();
            assert_eq!(p.x.abs(), 0.5);
            assert_eq!(p.y.abs(), 0.5);
        }
    }

    #[test]
    #[should_panic(expected = "hole must fit")]
    fn plate_rejects_oversized_hole() {
        square_plate_with_hole(1.0, 2.0);
    }

    #[test]
    fn triangle_shape() {
        let tri = open_triangle();
        let m = &tri.model;
        assert_eq!(m.faces.len(), 1);
        assert_eq!(m.edges.len(), 3);
        assert!(m.audit().is_clean());
        let n = m.faceuse_normal(tri.fu).unwrap();
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn wire_has_line_geometry() {
        let wire = wire_segment(Point3::origin(), Point3::new(3.0, 0.0, 0.0));
        let m = &wire.model;
        assert!(m.is_dangling(wire.eu));
        let g = m.edge_uses[wire.eu].geom.unwrap();
        assert_relative_eq!(m.edge_geoms[g].dir.x, 3.0);
        assert!(m.audit().is_clean());
    }
}
