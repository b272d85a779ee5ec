#![warn(missing_docs)]

//! Read-only interrogation of [`mantle_topo`] models.
//!
//! Everything here takes `&Model` and answers a question without
//! touching the structure: loop classification (plane, area, winding,
//! cracks, self-touches), edgeuse frames and dihedral angle measures,
//! brute-force point and membership searches, edge coincidence between
//! faceuses, and exactly-once tabulation of the entities below any
//! entry point.
//!
//! Geometric predicates take a [`mantle_math::Tolerance`] explicitly;
//! none of them bake in a fixed epsilon.

mod angle;
mod coincide;
mod loops;
mod points;
mod tabulate;

pub use angle::{eu_2vecs_perp, find_eu_left_non_unit, find_eu_leftvec, measure_fu_angle};
pub use coincide::{edgeuse_g_coincident, find_edge_between_2fu};
pub use loops::{loop_is_a_crack, loop_is_ccw, loop_plane_area, loop_touches_self, LoopWinding};
pub use points::{
    find_e_nearest_pt2, find_pt_in_face, find_pt_in_lu, find_pt_in_model, find_pt_in_shell,
    find_v_in_face, find_v_in_shell, is_edge_in_edgelist, is_edge_in_facelist, is_edge_in_looplist,
    is_loop_in_facelist, is_vertex_a_selfloop_in_shell, is_vertex_in_edgelist,
    is_vertex_in_facelist, is_vertex_in_face, is_vertex_in_looplist,
};
pub use tabulate::{
    e_and_v_tabulate, edge_geom_tabulate, edge_tabulate, edgeuse_on_line_tabulate,
    edgeuse_tabulate, edgeuse_with_eg_tabulate, face_tabulate, vertex_tabulate,
    vertexuse_normal_tabulate, visit, visit_model, TopoVisitor,
};
