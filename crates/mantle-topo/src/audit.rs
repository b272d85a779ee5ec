//! Structural audit: verify every cross-reference invariant of a model.
//!
//! A dirty audit means a mutation operator left the structure
//! inconsistent; it is a bug report against the mutating code, not a
//! condition queries are expected to tolerate. Tests run this after
//! every construction sequence.

use std::collections::HashSet;
use thiserror::Error;

use crate::entity::{
    EdgeUseId, LoopUseDown, LoopUseId, LoopUseUp, TopoRef, VertexUseId, VertexUseUp,
};
use crate::model::Model;

/// One violated structural invariant found by [`Model::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// An entity holds a key that is not in the model's arenas.
    #[error("{holder:?} refers to {missing:?}, which is not in the model")]
    MissingEntity {
        /// Entity holding the stale reference.
        holder: TopoRef,
        /// The reference that resolves to nothing.
        missing: TopoRef,
    },

    /// A use's mate does not point back at it.
    #[error("mate of {0:?} does not point back")]
    MateNotInvolution(TopoRef),

    /// An edgeuse's radial partner does not point back at it.
    #[error("radial of {0:?} does not point back")]
    RadialNotInvolution(EdgeUseId),

    /// Mate or radial partners disagree about the underlying edge.
    #[error("{0:?} and its mate or radial partner use different edges")]
    EdgePartnerMismatch(EdgeUseId),

    /// A parent's child list and the child's up reference disagree.
    #[error("{parent:?} and {child:?} disagree about containment")]
    ParentChildDisagree {
        /// The alleged parent.
        parent: TopoRef,
        /// The alleged child.
        child: TopoRef,
    },

    /// An underlying entity's representative use belongs to a different
    /// underlying entity.
    #[error("representative use of {0:?} belongs to something else")]
    RepresentativeDisavowed(TopoRef),

    /// A loopuse's `next`/`prev` cycle does not close on itself in `len`
    /// steps, or `next` and `prev` are not mutual inverses.
    #[error("edge cycle of loopuse {0:?} is broken")]
    LoopCycleBroken(LoopUseId),

    /// A vertexuse is absent from its vertex's use list.
    #[error("vertexuse {0:?} is not on its vertex's use list")]
    VertexUseNotListed(VertexUseId),

    /// An edgeuse carries line geometry whose use list omits it, or a
    /// listed use disavows the geometry.
    #[error("edgeuse {0:?} and its line geometry disagree")]
    EdgeGeomDisagree(EdgeUseId),

    /// Mates carry different line geometry.
    #[error("edgeuse {0:?} and its mate carry different line geometry")]
    MatesGeomDiffer(EdgeUseId),
}

/// Outcome of [`Model::audit`]: every violated invariant, in arena order.
#[derive(Debug, Clone, Default)]
pub struct TopologyAudit {
    /// Every violation found.
    pub errors: Vec<AuditError>,
}

impl TopologyAudit {
    /// True when no invariant was violated.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Model {
    /// Walk every arena and check the cross-reference invariants:
    /// mate/radial involutions, parent/child agreement in both
    /// directions, loop-cycle closure, vertex and line-geometry use
    /// lists, and representative back-references.
    pub fn audit(&self) -> TopologyAudit {
        let mut out = TopologyAudit::default();

        self.audit_regions(&mut out);
        self.audit_faces(&mut out);
        self.audit_loops(&mut out);
        self.audit_edges(&mut out);
        self.audit_vertices(&mut out);
        self.audit_edge_geoms(&mut out);

        out
    }

    fn audit_regions(&self, out: &mut TopologyAudit) {
        for (r, region) in &self.regions {
            for &s in &region.shells {
                match self.shells.get(s) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: r.into(),
                        missing: s.into(),
                    }),
                    Some(shell) if shell.region != r => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: r.into(),
                            child: s.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for (s, shell) in &self.shells {
            if !self
                .regions
                .get(shell.region)
                .is_some_and(|r| r.shells.contains(&s))
            {
                out.errors.push(AuditError::ParentChildDisagree {
                    parent: shell.region.into(),
                    child: s.into(),
                });
            }
            for &fu in &shell.face_uses {
                match self.face_uses.get(fu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: s.into(),
                        missing: fu.into(),
                    }),
                    Some(f) if f.shell != s => out.errors.push(AuditError::ParentChildDisagree {
                        parent: s.into(),
                        child: fu.into(),
                    }),
                    Some(_) => {}
                }
            }
            for &lu in &shell.loop_uses {
                match self.loop_uses.get(lu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: s.into(),
                        missing: lu.into(),
                    }),
                    Some(l) if l.up != LoopUseUp::Shell(s) => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: s.into(),
                            child: lu.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for &eu in &shell.edge_uses {
                match self.edge_uses.get(eu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: s.into(),
                        missing: eu.into(),
                    }),
                    Some(e) if e.up != crate::entity::EdgeUseUp::Shell(s) => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: s.into(),
                            child: eu.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
            if let Some(vu) = shell.vertex_use {
                match self.vertex_uses.get(vu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: s.into(),
                        missing: vu.into(),
                    }),
                    Some(v) if v.up != VertexUseUp::Shell(s) => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: s.into(),
                            child: vu.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn audit_faces(&self, out: &mut TopologyAudit) {
        for (f, face) in &self.faces {
            match self.face_uses.get(face.fu) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: f.into(),
                    missing: face.fu.into(),
                }),
                Some(fu) if fu.face != f => {
                    out.errors.push(AuditError::RepresentativeDisavowed(f.into()))
                }
                Some(_) => {}
            }
        }

        for (fu, fu_data) in &self.face_uses {
            match self.face_uses.get(fu_data.mate) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: fu.into(),
                    missing: fu_data.mate.into(),
                }),
                Some(mate) => {
                    if mate.mate != fu {
                        out.errors.push(AuditError::MateNotInvolution(fu.into()));
                    }
                    if mate.face != fu_data.face {
                        out.errors.push(AuditError::RepresentativeDisavowed(fu.into()));
                    }
                }
            }
            if !self
                .shells
                .get(fu_data.shell)
                .is_some_and(|s| s.face_uses.contains(&fu))
            {
                out.errors.push(AuditError::ParentChildDisagree {
                    parent: fu_data.shell.into(),
                    child: fu.into(),
                });
            }
            for &lu in &fu_data.loop_uses {
                match self.loop_uses.get(lu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: fu.into(),
                        missing: lu.into(),
                    }),
                    Some(l) if l.up != LoopUseUp::FaceUse(fu) => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: fu.into(),
                            child: lu.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn audit_loops(&self, out: &mut TopologyAudit) {
        for (lp, lp_data) in &self.loops {
            match self.loop_uses.get(lp_data.lu) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: lp.into(),
                    missing: lp_data.lu.into(),
                }),
                Some(lu) if lu.lp != lp => {
                    out.errors.push(AuditError::RepresentativeDisavowed(lp.into()))
                }
                Some(_) => {}
            }
        }

        for (lu, lu_data) in &self.loop_uses {
            match self.loop_uses.get(lu_data.mate) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: lu.into(),
                    missing: lu_data.mate.into(),
                }),
                Some(mate) => {
                    if mate.mate != lu {
                        out.errors.push(AuditError::MateNotInvolution(lu.into()));
                    }
                    if mate.lp != lu_data.lp {
                        out.errors.push(AuditError::RepresentativeDisavowed(lu.into()));
                    }
                }
            }
            let listed = match lu_data.up {
                LoopUseUp::FaceUse(fu) => self
                    .face_uses
                    .get(fu)
                    .is_some_and(|f| f.loop_uses.contains(&lu)),
                LoopUseUp::Shell(s) => self
                    .shells
                    .get(s)
                    .is_some_and(|s| s.loop_uses.contains(&lu)),
            };
            if !listed {
                let parent = match lu_data.up {
                    LoopUseUp::FaceUse(fu) => fu.into(),
                    LoopUseUp::Shell(s) => s.into(),
                };
                out.errors.push(AuditError::ParentChildDisagree {
                    parent,
                    child: lu.into(),
                });
            }

            match lu_data.down {
                LoopUseDown::Vertex(vu) => match self.vertex_uses.get(vu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: lu.into(),
                        missing: vu.into(),
                    }),
                    Some(v) if v.up != VertexUseUp::LoopUse(lu) => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: lu.into(),
                            child: vu.into(),
                        })
                    }
                    Some(_) => {}
                },
                LoopUseDown::Edges { first, len } => {
                    if !self.loop_cycle_closes(lu, first, len, out) {
                        out.errors.push(AuditError::LoopCycleBroken(lu));
                    }
                }
            }
        }
    }

    /// Walk `next` from `first` for `len` steps; the walk must stay in
    /// `lu`, keep `prev` inverse to `next`, and land back on `first`.
    fn loop_cycle_closes(
        &self,
        lu: LoopUseId,
        first: EdgeUseId,
        len: usize,
        out: &mut TopologyAudit,
    ) -> bool {
        if len == 0 {
            return false;
        }
        let mut cur = first;
        for step in 0..len {
            let eu = match self.edge_uses.get(cur) {
                Some(eu) => eu,
                None => {
                    out.errors.push(AuditError::MissingEntity {
                        holder: lu.into(),
                        missing: cur.into(),
                    });
                    return false;
                }
            };
            if eu.up != crate::entity::EdgeUseUp::LoopUse(lu) {
                out.errors.push(AuditError::ParentChildDisagree {
                    parent: lu.into(),
                    child: cur.into(),
                });
                return false;
            }
            match self.edge_uses.get(eu.next) {
                Some(next) if next.prev == cur => cur = eu.next,
                _ => return false,
            }
            // Returning to the anchor early means `len` overstates the cycle.
            if cur == first && step + 1 != len {
                return false;
            }
        }
        cur == first
    }

    fn audit_edges(&self, out: &mut TopologyAudit) {
        for (e, edge) in &self.edges {
            match self.edge_uses.get(edge.eu) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: e.into(),
                    missing: edge.eu.into(),
                }),
                Some(eu) if eu.edge != e => {
                    out.errors.push(AuditError::RepresentativeDisavowed(e.into()))
                }
                Some(_) => {}
            }
        }

        for (eu, eu_data) in &self.edge_uses {
            match self.edge_uses.get(eu_data.mate) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: eu.into(),
                    missing: eu_data.mate.into(),
                }),
                Some(mate) => {
                    if mate.mate != eu {
                        out.errors.push(AuditError::MateNotInvolution(eu.into()));
                    }
                    if mate.edge != eu_data.edge {
                        out.errors.push(AuditError::EdgePartnerMismatch(eu));
                    }
                    if mate.geom != eu_data.geom {
                        out.errors.push(AuditError::MatesGeomDiffer(eu));
                    }
                }
            }
            match self.edge_uses.get(eu_data.radial) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: eu.into(),
                    missing: eu_data.radial.into(),
                }),
                Some(radial) => {
                    if radial.radial != eu {
                        out.errors.push(AuditError::RadialNotInvolution(eu));
                    }
                    if radial.edge != eu_data.edge {
                        out.errors.push(AuditError::EdgePartnerMismatch(eu));
                    }
                }
            }
            match self.vertex_uses.get(eu_data.vu) {
                None => out.errors.push(AuditError::MissingEntity {
                    holder: eu.into(),
                    missing: eu_data.vu.into(),
                }),
                Some(vu) if vu.up != VertexUseUp::EdgeUse(eu) => {
                    out.errors.push(AuditError::ParentChildDisagree {
                        parent: eu.into(),
                        child: eu_data.vu.into(),
                    })
                }
                Some(_) => {}
            }
            if let crate::entity::EdgeUseUp::Shell(s) = eu_data.up {
                if !self
                    .shells
                    .get(s)
                    .is_some_and(|shell| shell.edge_uses.contains(&eu))
                {
                    out.errors.push(AuditError::ParentChildDisagree {
                        parent: s.into(),
                        child: eu.into(),
                    });
                }
            }
            if let Some(g) = eu_data.geom {
                if !self
                    .edge_geoms
                    .get(g)
                    .is_some_and(|geom| geom.uses.contains(&eu))
                {
                    out.errors.push(AuditError::EdgeGeomDisagree(eu));
                }
            }
        }
    }

    fn audit_vertices(&self, out: &mut TopologyAudit) {
        for (v, vertex) in &self.vertices {
            let mut seen = HashSet::new();
            for &vu in &vertex.uses {
                if !seen.insert(vu) {
                    out.errors.push(AuditError::VertexUseNotListed(vu));
                    continue;
                }
                match self.vertex_uses.get(vu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: v.into(),
                        missing: vu.into(),
                    }),
                    Some(vu_data) if vu_data.vertex != v => {
                        out.errors.push(AuditError::ParentChildDisagree {
                            parent: v.into(),
                            child: vu.into(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for (vu, vu_data) in &self.vertex_uses {
            if !self
                .vertices
                .get(vu_data.vertex)
                .is_some_and(|v| v.uses.contains(&vu))
            {
                out.errors.push(AuditError::VertexUseNotListed(vu));
            }
        }
    }

    fn audit_edge_geoms(&self, out: &mut TopologyAudit) {
        for (g, geom) in &self.edge_geoms {
            for &eu in &geom.uses {
                match self.edge_uses.get(eu) {
                    None => out.errors.push(AuditError::MissingEntity {
                        holder: g.into(),
                        missing: eu.into(),
                    }),
                    Some(eu_data) if eu_data.geom != Some(g) => {
                        out.errors.push(AuditError::EdgeGeomDisagree(eu))
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Orientation;
    use crate::model::Model;

    #[test]
    fn clean_model_audits_clean() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut verts = [None; 4];
        m.make_polygon_face(s, &mut verts).unwrap();
        let audit = m.audit();
        assert!(audit.is_clean(), "unexpected: {:?}", audit.errors);
    }

    #[test]
    fn broken_mate_is_reported() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu = m.make_wire_edge(None, None, s);
        // Point the mate back at the use itself.
        m.edge_uses[eu].mate = eu;

        let audit = m.audit();
        assert!(audit
            .errors
            .iter()
            .any(|e| matches!(e, AuditError::MateNotInvolution(_))));
    }

    #[test]
    fn orphaned_vertexuse_is_reported() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu = m.make_wire_edge(None, None, s);
        let vu = m.edge_uses[eu].vu;
        let v = m.vertex_uses[vu].vertex;
        m.vertices[v].uses.clear();

        let audit = m.audit();
        assert!(audit
            .errors
            .iter()
            .any(|e| matches!(e, AuditError::VertexUseNotListed(u) if *u == vu)));
    }

    #[test]
    fn loop_len_mismatch_is_reported() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let lu = m.make_vertex_loop(crate::entity::LoopUseUp::Shell(s), None, Orientation::Same);
        let vu = match m.loop_uses[lu].down {
            crate::entity::LoopUseDown::Vertex(vu) => vu,
            _ => unreachable!(),
        };
        let eu = m.make_edge_on_vertexuse(vu).unwrap();
        // Lie about the cycle length.
        m.loop_uses[lu].down = crate::entity::LoopUseDown::Edges { first: eu, len: 2 };

        let audit = m.audit();
        assert!(audit
            .errors
            .iter()
            .any(|e| matches!(e, AuditError::LoopCycleBroken(l) if *l == lu)));
    }
}
