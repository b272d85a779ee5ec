#![warn(missing_docs)]

//! mantle — a radial-edge B-rep topology kernel
//!
//! A model is one arena-backed [`topo::Model`] holding regions, shells,
//! faces, loops, edges, and vertices, each underlying entity fanned out
//! into use records so that the same edge or vertex can participate in
//! any number of faces. Construction goes through Euler-style operators
//! that keep the structure consistent at every step; interrogation goes
//! through the read-only [`query`] layer.
//!
//! # Example
//!
//! ```rust
//! use mantle::math::Tolerance;
//! use mantle::primitives::unit_cube;
//! use mantle::query::{edge_tabulate, find_edge_between_2fu};
//!
//! let cube = unit_cube();
//! let m = &cube.model;
//!
//! // Twelve edges below the region, however many faces meet at each.
//! let edges = edge_tabulate(m, cube.region);
//! assert_eq!(edges.len(), 12);
//!
//! // Bottom and front face share exactly one edge.
//! let tol = Tolerance::DEFAULT;
//! let bottom = m.faces[cube.faces[0]].fu;
//! let front = m.faces[cube.faces[2]].fu;
//! let shared = find_edge_between_2fu(m, bottom, front, &tol).unwrap();
//! assert!(shared.is_some());
//! ```

pub use mantle_math as math;
pub use mantle_primitives as primitives;
pub use mantle_query as query;
pub use mantle_topo as topo;

pub use mantle_math::{Point3, Tolerance, Vec3};
pub use mantle_topo::{Model, TopoError, TopoRef};
