//! Adjacency searches over the mate/radial structure.
//!
//! These are pure topology walks: no coordinates are consulted, so a model
//! without any geometry attached answers them just as well. Absence is
//! always `None`, never an error.

use crate::entity::{
    EdgeId, EdgeUseId, FaceUseId, LoopUseId, Orientation, ShellId, VertexId, VertexUseId,
    VertexUseUp,
};
use crate::model::Model;

impl Model {
    /// Find an edgeuse running from `v1` to `v2`.
    ///
    /// `shell` restricts the search to one shell; `None` considers the
    /// whole model. `exclude` rejects that edgeuse and its mate.
    /// `dangling_only` accepts only edgeuses with no other radial uses.
    ///
    /// The returned use is orientation-normalized against the reference:
    /// when the match lies in a faceuse whose orientation differs from
    /// `exclude`'s faceuse orientation (`Same` when `exclude` is absent or
    /// a wire), its mate is returned instead.
    pub fn find_edgeuse(
        &self,
        v1: VertexId,
        v2: VertexId,
        shell: Option<ShellId>,
        exclude: Option<EdgeUseId>,
        dangling_only: bool,
    ) -> Option<EdgeUseId> {
        let ref_orientation = match exclude.and_then(|eup| self.fu_of_eu(eup)) {
            Some(fu) => self.face_uses[fu].orientation,
            None => Orientation::Same,
        };

        for &vu in &self.vertices[v1].uses {
            let eu = match self.vertex_uses[vu].up {
                VertexUseUp::EdgeUse(eu) => eu,
                _ => continue,
            };
            if self.edgeuse_end(eu) != v2 {
                continue;
            }
            if let Some(eup) = exclude {
                if eu == eup || self.edge_uses[eu].mate == eup {
                    continue;
                }
            }
            if let Some(s) = shell {
                if self.shell_of_eu(eu) != s {
                    continue;
                }
            }
            if dangling_only && !self.is_dangling(eu) {
                continue;
            }

            if let Some(fu) = self.fu_of_eu(eu) {
                if self.face_uses[fu].orientation != ref_orientation {
                    return Some(self.edge_uses[eu].mate);
                }
            }
            return Some(eu);
        }
        None
    }

    /// Like [`Model::find_edgeuse`] but restricted to one faceuse.
    pub fn find_edgeuse_in_face(
        &self,
        v1: VertexId,
        v2: VertexId,
        fu: FaceUseId,
        exclude: Option<EdgeUseId>,
        dangling_only: bool,
    ) -> Option<EdgeUseId> {
        let ref_orientation = match exclude.and_then(|eup| self.fu_of_eu(eup)) {
            Some(ref_fu) => self.face_uses[ref_fu].orientation,
            None => Orientation::Same,
        };

        for &vu in &self.vertices[v1].uses {
            let eu = match self.vertex_uses[vu].up {
                VertexUseUp::EdgeUse(eu) => eu,
                _ => continue,
            };
            if self.edgeuse_end(eu) != v2 {
                continue;
            }
            if let Some(eup) = exclude {
                if eu == eup || self.edge_uses[eu].mate == eup {
                    continue;
                }
            }
            if self.fu_of_eu(eu) != Some(fu) {
                continue;
            }
            if dangling_only && !self.is_dangling(eu) {
                continue;
            }

            if let Some(found_fu) = self.fu_of_eu(eu) {
                if self.face_uses[found_fu].orientation != ref_orientation {
                    return Some(self.edge_uses[eu].mate);
                }
            }
            return Some(eu);
        }
        None
    }

    /// Find an edge joining `v1` and `v2`, other than `exclude`.
    pub fn find_edge(
        &self,
        v1: VertexId,
        v2: VertexId,
        shell: Option<ShellId>,
        exclude: Option<EdgeId>,
    ) -> Option<EdgeId> {
        for &vu in &self.vertices[v1].uses {
            let eu = match self.vertex_uses[vu].up {
                VertexUseUp::EdgeUse(eu) => eu,
                _ => continue,
            };
            if self.edgeuse_end(eu) != v2 {
                continue;
            }
            let e = self.edge_uses[eu].edge;
            if exclude == Some(e) {
                continue;
            }
            if let Some(s) = shell {
                if self.shell_of_eu(eu) != s {
                    continue;
                }
            }
            return Some(e);
        }
        None
    }

    /// Find an edgeuse in `shell` joining the same two vertices as `eu`.
    ///
    /// Works whether or not `eu` itself lies in `shell`; `eu` and its mate
    /// are never returned.
    pub fn find_matching_edgeuse_in_shell(
        &self,
        eu: EdgeUseId,
        shell: ShellId,
    ) -> Option<EdgeUseId> {
        let v1 = self.edgeuse_start(eu);
        let v2 = self.edgeuse_end(eu);
        self.find_edgeuse(v1, v2, Some(shell), Some(eu), false)
    }

    /// Looking radially around an edge, find another use lying in the same
    /// underlying face as `eu` (possibly `eu`'s own mate).
    ///
    /// `None` when `eu` is not part of a face.
    pub fn faceradial(&self, eu: EdgeUseId) -> Option<EdgeUseId> {
        let fu = self.fu_of_eu(eu)?;
        let f = self.face_uses[fu].face;

        let mut eur = self.edge_uses[eu].radial;
        loop {
            if let Some(rfu) = self.fu_of_eu(eur) {
                if self.face_uses[rfu].face == f {
                    return Some(eur);
                }
            }
            eur = self.edge_uses[self.edge_uses[eur].mate].radial;
        }
    }

    /// Looking radially around an edge, find a use belonging to a face in
    /// the same shell as `eu`.
    ///
    /// The walk stops at `eu`'s mate without examining it, so `None` means
    /// no *other* face in this shell touches the edge.
    pub fn radial_face_edge_in_shell(&self, eu: EdgeUseId) -> Option<EdgeUseId> {
        let s = self.shell_of_eu(eu);
        let mate = self.edge_uses[eu].mate;

        let mut eur = self.edge_uses[eu].radial;
        while eur != mate {
            if let Some(rfu) = self.fu_of_eu(eur) {
                if self.face_uses[rfu].shell == s {
                    return Some(eur);
                }
            }
            eur = self.edge_uses[self.edge_uses[eur].mate].radial;
        }
        None
    }

    /// Some use of this edge (the use or its mate) lying in a faceuse with
    /// `Same` orientation, or `None` when every use is a wire or lies only
    /// in `Opposite`/`Unspec` faceuses.
    ///
    /// Useful for selecting a representative use to erect an edge frame on.
    pub fn find_ot_same_eu_of_e(&self, e: EdgeId) -> Option<EdgeUseId> {
        self.edge_uses_of_edge(e).find(|&eu| {
            matches!(
                self.fu_of_eu(eu).map(|fu| self.face_uses[fu].orientation),
                Some(Orientation::Same)
            )
        })
    }

    /// Find the edgeuse of the loopuse that starts at the given vertexuse.
    ///
    /// `None` when the vertexuse starts no edge of this loopuse: it may
    /// end one (the far endpoint belongs to the successor or the mate),
    /// belong to another loop entirely, or the loopuse may be a
    /// single-vertex loop with no edges at all.
    pub fn find_eu_with_vu_in_lu(&self, lu: LoopUseId, vu: VertexUseId) -> Option<EdgeUseId> {
        self.loop_edge_uses(lu).find(|&eu| self.edge_uses[eu].vu == vu)
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::{LoopUseUp, Orientation};
    use crate::model::Model;

    #[test]
    fn findeu_respects_direction_exclusion_and_shell() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu);
        let v2 = m.edgeuse_end(eu);
        let mate = m.edge_uses[eu].mate;

        assert_eq!(m.find_edgeuse(v1, v2, Some(s), None, false), Some(eu));
        assert_eq!(m.find_edgeuse(v2, v1, Some(s), None, false), Some(mate));
        // Excluding the pair leaves nothing.
        assert_eq!(m.find_edgeuse(v1, v2, Some(s), Some(eu), false), None);
        assert_eq!(m.find_edgeuse(v1, v2, Some(s), Some(mate), false), None);

        // A second shell holds no such edgeuse.
        let s2 = m.make_shell(m.shells[s].region);
        assert_eq!(m.find_edgeuse(v1, v2, Some(s2), None, false), None);
        assert_eq!(m.find_edgeuse(v1, v2, None, None, false), Some(eu));
    }

    #[test]
    fn findeu_dangling_filter() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu1);
        let v2 = m.edgeuse_end(eu1);
        let eu2 = m.make_wire_edge(Some(v1), Some(v2), s);
        m.join_edgeuse(eu1, eu2).unwrap();

        assert_eq!(m.find_edgeuse(v1, v2, Some(s), None, true), None);
        assert!(m.find_edgeuse(v1, v2, Some(s), None, false).is_some());
    }

    #[test]
    fn find_edge_excludes_the_named_edge() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu1);
        let v2 = m.edgeuse_end(eu1);
        let e1 = m.edge_uses[eu1].edge;

        assert_eq!(m.find_edge(v1, v2, Some(s), None), Some(e1));
        assert_eq!(m.find_edge(v2, v1, Some(s), None), Some(e1));
        assert_eq!(m.find_edge(v1, v2, Some(s), Some(e1)), None);

        let eu2 = m.make_wire_edge(Some(v1), Some(v2), s);
        let e2 = m.edge_uses[eu2].edge;
        assert_eq!(m.find_edge(v1, v2, Some(s), Some(e1)), Some(e2));
    }

    #[test]
    fn matching_edgeuse_across_shells() {
        let mut m = Model::new();
        let (r, s1) = m.make_region();
        let s2 = m.make_shell(r);
        let eu1 = m.make_wire_edge(None, None, s1);
        let v1 = m.edgeuse_start(eu1);
        let v2 = m.edgeuse_end(eu1);

        assert_eq!(m.find_matching_edgeuse_in_shell(eu1, s2), None);

        let eu2 = m.make_wire_edge(Some(v1), Some(v2), s2);
        assert_eq!(m.find_matching_edgeuse_in_shell(eu1, s2), Some(eu2));
        // Never returns the probe itself.
        assert_eq!(m.find_matching_edgeuse_in_shell(eu1, s1), None);
    }

    #[test]
    fn ot_same_lookup_skips_wires() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu = m.make_wire_edge(None, None, s);
        let e = m.edge_uses[eu].edge;
        assert_eq!(m.find_ot_same_eu_of_e(e), None);

        // Wrap a one-edge loop into a face and orient it.
        let lu = m.make_vertex_loop(LoopUseUp::Shell(s), None, Orientation::Same);
        let vu = match m.loop_uses[lu].down {
            crate::entity::LoopUseDown::Vertex(vu) => vu,
            _ => unreachable!(),
        };
        let loop_eu = m.make_edge_on_vertexuse(vu).unwrap();
        let fu = m.make_face(lu).unwrap();
        m.face_uses[fu].orientation = Orientation::Same;
        let fmate = m.face_uses[fu].mate;
        m.face_uses[fmate].orientation = Orientation::Opposite;

        let le = m.edge_uses[loop_eu].edge;
        let found = m.find_ot_same_eu_of_e(le).unwrap();
        let found_fu = m.fu_of_eu(found).unwrap();
        assert_eq!(m.face_uses[found_fu].orientation, Orientation::Same);
    }

    #[test]
    fn eu_starting_at_vertexuse_in_loop() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut verts = [None, None, None];
        let fu = m.make_polygon_face(s, &mut verts).unwrap();
        let lu = m.face_uses[fu].loop_uses[0];
        let lumate = m.loop_uses[lu].mate;

        for eu in m.loop_edge_uses(lu).collect::<Vec<_>>() {
            let vu = m.edge_uses[eu].vu;
            assert_eq!(m.find_eu_with_vu_in_lu(lu, vu), Some(eu));
            // The same vertexuse starts nothing in the mate loopuse.
            assert_eq!(m.find_eu_with_vu_in_lu(lumate, vu), None);
        }

        // A single-vertex loop has no edges to start.
        let vlu = m.make_vertex_loop(LoopUseUp::Shell(s), verts[0], Orientation::Unspec);
        let vvu = match m.loop_uses[vlu].down {
            crate::entity::LoopUseDown::Vertex(vu) => vu,
            _ => unreachable!(),
        };
        assert_eq!(m.find_eu_with_vu_in_lu(vlu, vvu), None);
    }
}
