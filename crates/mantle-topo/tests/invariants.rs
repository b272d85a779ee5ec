//! Randomized join/unglue sequences must preserve the mate and radial
//! involutions, orbit closure, and the rest of the audited structure.

use std::collections::HashSet;

use mantle_topo::{EdgeUseId, Model, ShellId};
use proptest::prelude::*;

/// One randomized step against a set of edgeuses sharing two vertices.
#[derive(Debug, Clone)]
enum Op {
    Join { dst: usize, src: usize },
    Unglue { eu: usize },
}

fn op_strategy(n_edges: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n_edges, 0..n_edges).prop_map(|(dst, src)| Op::Join { dst, src }),
        (0..n_edges).prop_map(|eu| Op::Unglue { eu }),
    ]
}

/// Build a shell holding `n` parallel wire edges between one vertex pair,
/// alternating direction so that joins exercise both pairings.
fn parallel_edges(n: usize) -> (Model, ShellId, Vec<EdgeUseId>) {
    let mut m = Model::new();
    let (_, s) = m.make_region();
    let first = m.make_wire_edge(None, None, s);
    let v1 = m.edgeuse_start(first);
    let v2 = m.edgeuse_end(first);
    let mut eus = vec![first];
    for i in 1..n {
        let eu = if i % 2 == 0 {
            m.make_wire_edge(Some(v1), Some(v2), s)
        } else {
            m.make_wire_edge(Some(v2), Some(v1), s)
        };
        eus.push(eu);
    }
    (m, s, eus)
}

/// Brute-force set of every edgeuse on the same edge as `eu`, scanned
/// straight out of the arena. The radial orbit must enumerate exactly
/// this set.
fn uses_of_same_edge(m: &Model, eu: EdgeUseId) -> HashSet<EdgeUseId> {
    let e = m.edge_uses[eu].edge;
    m.edge_uses
        .iter()
        .filter(|(_, data)| data.edge == e)
        .map(|(id, _)| id)
        .collect()
}

fn check_involutions(m: &Model) {
    for (id, eu) in &m.edge_uses {
        let mate = eu.mate;
        assert_eq!(m.edge_uses[mate].mate, id, "mate is not an involution");
        assert_eq!(m.edge_uses[mate].edge, eu.edge, "mates use different edges");
        let radial = eu.radial;
        assert_eq!(m.edge_uses[radial].radial, id, "radial is not an involution");
        assert_eq!(
            m.edge_uses[radial].edge, eu.edge,
            "radial partners use different edges"
        );
        assert_eq!(m.is_dangling(id), radial == mate);
    }
}

fn check_orbits(m: &Model) {
    let total = m.edge_uses.len();
    for (id, _) in &m.edge_uses {
        let orbit: Vec<EdgeUseId> = m.radial_orbit(id).collect();
        assert!(orbit.len() <= total, "orbit visited more uses than exist");
        let orbit_set: HashSet<EdgeUseId> = orbit.iter().copied().collect();
        assert_eq!(orbit_set.len(), orbit.len(), "orbit revisited a use");
        assert_eq!(orbit_set, uses_of_same_edge(m, id));
    }
}

proptest! {
    #[test]
    fn join_unglue_sequences_keep_structure(
        n_edges in 2usize..6,
        ops in prop::collection::vec(op_strategy(6), 0..24),
    ) {
        let (mut m, _s, eus) = parallel_edges(n_edges);

        for op in ops {
            match op {
                Op::Join { dst, src } => {
                    let dst = eus[dst % n_edges];
                    let src = eus[src % n_edges];
                    // Every pair spans the same two vertices, so this
                    // can only fail by a bug, not by bad input.
                    m.join_edgeuse(dst, src).unwrap();
                }
                Op::Unglue { eu } => {
                    m.unglue_edgeuse(eus[eu % n_edges]);
                }
            }

            check_involutions(&m);
            check_orbits(&m);
            let audit = m.audit();
            prop_assert!(audit.is_clean(), "audit found: {:?}", audit.errors);
        }
    }

    #[test]
    fn random_polygon_fans_share_edges_cleanly(sides in 3usize..8, fans in 1usize..5) {
        let mut m = Model::new();
        let (_, s) = m.make_region();

        // A fan of polygons all sharing one edge pair after the first.
        let mut first = vec![None; sides];
        m.make_polygon_face(s, &mut first).unwrap();
        let (a, b) = (first[0], first[1]);
        for _ in 1..fans {
            let mut next = vec![None; sides];
            next[0] = b;
            next[1] = a;
            m.make_polygon_face(s, &mut next).unwrap();
        }

        check_involutions(&m);
        check_orbits(&m);
        let audit = m.audit();
        prop_assert!(audit.is_clean(), "audit found: {:?}", audit.errors);
    }
}
