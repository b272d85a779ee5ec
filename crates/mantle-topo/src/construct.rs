//! Construction and repair: Euler-style mutations, geometry association,
//! and extent computation.
//!
//! Every public operation leaves the mate/radial involutions and the
//! parent/child agreements intact; `Model::audit` checks exactly that
//! after a mutation sequence. Caller mistakes come back as
//! [`TopoError`]; a stale key is corruption and panics.

use mantle_math::{polygon_area_vector, Aabb, PlaneEq, Point3, Tolerance, Vec3};
use tracing::{debug, instrument};

use crate::entity::{
    Edge, EdgeGeom, EdgeGeomId, EdgeUse, EdgeUseId, EdgeUseUp, Face, FaceGeom, FaceId, FaceUse,
    FaceUseId, Loop, LoopId, LoopUse, LoopUseDown, LoopUseId, LoopUseUp, Orientation, Region,
    RegionId, Shell, ShellId, Vertex, VertexId, VertexUse, VertexUseId, VertexUseUp,
};
use crate::error::TopoError;
use crate::model::Model;

impl Model {
    // =========================================================================
    // Vertexuse plumbing
    // =========================================================================

    /// Make a vertexuse under `up`, on `vertex` or on a fresh vertex.
    fn new_vertex_use(&mut self, up: VertexUseUp, vertex: Option<VertexId>) -> VertexUseId {
        let v = vertex.unwrap_or_else(|| {
            self.vertices.insert(Vertex {
                uses: Vec::new(),
                point: None,
            })
        });
        let vu = self.vertex_uses.insert(VertexUse {
            up,
            vertex: v,
            normal: None,
        });
        self.vertices[v].uses.push(vu);
        vu
    }

    /// Delete a vertexuse, and its vertex when this was the last use.
    ///
    /// The caller is responsible for the parent's reference.
    fn kill_vertex_use(&mut self, vu: VertexUseId) {
        let v = self.vertex_uses[vu].vertex;
        let uses = &mut self.vertices[v].uses;
        if let Some(pos) = uses.iter().position(|&u| u == vu) {
            uses.remove(pos);
        }
        if self.vertices[v].uses.is_empty() {
            self.vertices.remove(v);
        }
        self.vertex_uses.remove(vu);
    }

    // =========================================================================
    // Makers
    // =========================================================================

    /// Make a region holding one minimal shell (a lone vertexuse on a new
    /// vertex), the canonical starting point for building anything.
    #[instrument(skip(self))]
    pub fn make_region(&mut self) -> (RegionId, ShellId) {
        let r = self.regions.insert(Region {
            shells: Vec::new(),
            bounds: None,
        });
        let s = self.make_shell(r);
        debug!(?r, ?s, "made region");
        (r, s)
    }

    /// Make a shell in `region`, seeded with a lone vertexuse on a new
    /// vertex so the shell is never element-free.
    #[instrument(skip(self))]
    pub fn make_shell(&mut self, region: RegionId) -> ShellId {
        let s = self.shells.insert(Shell {
            region,
            face_uses: Vec::new(),
            loop_uses: Vec::new(),
            edge_uses: Vec::new(),
            vertex_use: None,
            bounds: None,
        });
        self.regions[region].shells.push(s);
        let vu = self.new_vertex_use(VertexUseUp::Shell(s), None);
        self.shells[s].vertex_use = Some(vu);
        debug!(?s, ?vu, "made shell");
        s
    }

    /// Make a single-vertex loop (loopuse/mate pair over one vertexuse
    /// each) under a shell or a faceuse.
    ///
    /// A shell parent that still holds its lone vertexuse donates it to
    /// the new loop; if `vertex` is also given, the stolen use is moved
    /// onto it. Returns the loopuse on `parent`'s side.
    #[instrument(skip(self))]
    pub fn make_vertex_loop(
        &mut self,
        parent: LoopUseUp,
        vertex: Option<VertexId>,
        orientation: Orientation,
    ) -> LoopUseId {
        let lp = self.loops.insert(Loop {
            lu: LoopUseId::default(),
            bounds: None,
        });
        let up2 = match parent {
            LoopUseUp::Shell(s) => LoopUseUp::Shell(s),
            LoopUseUp::FaceUse(fu) => LoopUseUp::FaceUse(self.face_uses[fu].mate),
        };
        let lu1 = self.loop_uses.insert(LoopUse {
            up: parent,
            mate: LoopUseId::default(),
            lp,
            orientation,
            down: LoopUseDown::Vertex(VertexUseId::default()),
        });
        let lu2 = self.loop_uses.insert(LoopUse {
            up: up2,
            mate: lu1,
            lp,
            orientation,
            down: LoopUseDown::Vertex(VertexUseId::default()),
        });
        self.loop_uses[lu1].mate = lu2;
        self.loops[lp].lu = lu1;

        let vu1 = match parent {
            LoopUseUp::Shell(s) => {
                self.shells[s].loop_uses.push(lu1);
                self.shells[s].loop_uses.push(lu2);
                match self.shells[s].vertex_use.take() {
                    Some(vu) => {
                        self.vertex_uses[vu].up = VertexUseUp::LoopUse(lu1);
                        if let Some(v) = vertex {
                            self.move_vertexuse(vu, v);
                        }
                        vu
                    }
                    None => self.new_vertex_use(VertexUseUp::LoopUse(lu1), vertex),
                }
            }
            LoopUseUp::FaceUse(fu) => {
                let fmate = self.face_uses[fu].mate;
                self.face_uses[fu].loop_uses.push(lu1);
                self.face_uses[fmate].loop_uses.push(lu2);
                self.new_vertex_use(VertexUseUp::LoopUse(lu1), vertex)
            }
        };
        let v = self.vertex_uses[vu1].vertex;
        let vu2 = self.new_vertex_use(VertexUseUp::LoopUse(lu2), Some(v));
        self.loop_uses[lu1].down = LoopUseDown::Vertex(vu1);
        self.loop_uses[lu2].down = LoopUseDown::Vertex(vu2);

        debug!(?lu1, ?lp, "made single-vertex loop");
        lu1
    }

    /// Make a wire edge in the shell, returning the use from `v1` to `v2`.
    ///
    /// An unspecified endpoint consumes the shell's lone vertexuse while
    /// one is available, otherwise a new vertex; when both endpoints are
    /// specified the leftover lone vertexuse is deleted. The new pair is
    /// its own radial orbit.
    #[instrument(skip(self))]
    pub fn make_wire_edge(
        &mut self,
        v1: Option<VertexId>,
        v2: Option<VertexId>,
        s: ShellId,
    ) -> EdgeUseId {
        let e = self.edges.insert(Edge {
            eu: EdgeUseId::default(),
        });
        let eu1 = self.edge_uses.insert(EdgeUse {
            up: EdgeUseUp::Shell(s),
            mate: EdgeUseId::default(),
            radial: EdgeUseId::default(),
            edge: e,
            vu: VertexUseId::default(),
            next: EdgeUseId::default(),
            prev: EdgeUseId::default(),
            geom: None,
        });
        let eu2 = self.edge_uses.insert(EdgeUse {
            up: EdgeUseUp::Shell(s),
            mate: eu1,
            radial: eu1,
            edge: e,
            vu: VertexUseId::default(),
            next: eu1,
            prev: eu1,
            geom: None,
        });
        {
            let first = &mut self.edge_uses[eu1];
            first.mate = eu2;
            first.radial = eu2;
            first.next = eu2;
            first.prev = eu2;
        }
        self.edges[e].eu = eu1;

        let vu1 = match v1 {
            Some(v) => self.new_vertex_use(VertexUseUp::EdgeUse(eu1), Some(v)),
            None => match self.shells[s].vertex_use.take() {
                Some(vu) => {
                    self.vertex_uses[vu].up = VertexUseUp::EdgeUse(eu1);
                    vu
                }
                None => self.new_vertex_use(VertexUseUp::EdgeUse(eu1), None),
            },
        };
        let vu2 = match v2 {
            Some(v) => self.new_vertex_use(VertexUseUp::EdgeUse(eu2), Some(v)),
            None => match self.shells[s].vertex_use.take() {
                Some(vu) => {
                    self.vertex_uses[vu].up = VertexUseUp::EdgeUse(eu2);
                    vu
                }
                None => self.new_vertex_use(VertexUseUp::EdgeUse(eu2), None),
            },
        };
        self.edge_uses[eu1].vu = vu1;
        self.edge_uses[eu2].vu = vu2;

        if let Some(vu) = self.shells[s].vertex_use.take() {
            self.kill_vertex_use(vu);
        }

        self.shells[s].edge_uses.push(eu1);
        self.shells[s].edge_uses.push(eu2);

        debug!(?eu1, edge = ?e, "made wire edge");
        eu1
    }

    /// Promote a lone vertexuse into an edge with both ends on its vertex.
    ///
    /// A shell's lone vertexuse becomes a wire self-loop edge; the
    /// vertexuse of a single-vertex loop becomes a one-edge loop. Any
    /// other owner is a caller mistake.
    #[instrument(skip(self))]
    pub fn make_edge_on_vertexuse(&mut self, vu: VertexUseId) -> Result<EdgeUseId, TopoError> {
        match self.vertex_uses[vu].up {
            VertexUseUp::EdgeUse(_) => Err(TopoError::NotALoneVertexUse(vu)),
            VertexUseUp::Shell(s) => {
                if self.shells[s].vertex_use != Some(vu) {
                    panic!("shell {s:?} disowns its vertexuse {vu:?}");
                }
                let e = self.edges.insert(Edge {
                    eu: EdgeUseId::default(),
                });
                let eu1 = self.edge_uses.insert(EdgeUse {
                    up: EdgeUseUp::Shell(s),
                    mate: EdgeUseId::default(),
                    radial: EdgeUseId::default(),
                    edge: e,
                    vu,
                    next: EdgeUseId::default(),
                    prev: EdgeUseId::default(),
                    geom: None,
                });
                let eu2 = self.edge_uses.insert(EdgeUse {
                    up: EdgeUseUp::Shell(s),
                    mate: eu1,
                    radial: eu1,
                    edge: e,
                    vu: VertexUseId::default(),
                    next: eu1,
                    prev: eu1,
                    geom: None,
                });
                {
                    let first = &mut self.edge_uses[eu1];
                    first.mate = eu2;
                    first.radial = eu2;
                    first.next = eu2;
                    first.prev = eu2;
                }
                self.edges[e].eu = eu1;

                self.shells[s].vertex_use = None;
                self.vertex_uses[vu].up = VertexUseUp::EdgeUse(eu1);
                let v = self.vertex_uses[vu].vertex;
                let vu2 = self.new_vertex_use(VertexUseUp::EdgeUse(eu2), Some(v));
                self.edge_uses[eu2].vu = vu2;

                self.shells[s].edge_uses.push(eu1);
                self.shells[s].edge_uses.push(eu2);
                debug!(?eu1, "promoted lone vertexuse to wire self-loop");
                Ok(eu1)
            }
            VertexUseUp::LoopUse(lu) => {
                match self.loop_uses[lu].down {
                    LoopUseDown::Vertex(down) if down == vu => {}
                    _ => panic!("loopuse {lu:?} disowns its vertexuse {vu:?}"),
                }
                let lumate = self.loop_uses[lu].mate;
                let vumate = match self.loop_uses[lumate].down {
                    LoopUseDown::Vertex(vm) => vm,
                    LoopUseDown::Edges { .. } => {
                        panic!("mate of vertex loopuse {lu:?} holds edges")
                    }
                };
                if vumate == vu || self.vertex_uses[vumate].vertex != self.vertex_uses[vu].vertex {
                    panic!("vertex loopuse mates of {lu:?} disagree about their vertex");
                }

                let e = self.edges.insert(Edge {
                    eu: EdgeUseId::default(),
                });
                let eu1 = self.edge_uses.insert_with_key(|k| EdgeUse {
                    up: EdgeUseUp::LoopUse(lu),
                    mate: EdgeUseId::default(),
                    radial: EdgeUseId::default(),
                    edge: e,
                    vu,
                    next: k,
                    prev: k,
                    geom: None,
                });
                let eu2 = self.edge_uses.insert_with_key(|k| EdgeUse {
                    up: EdgeUseUp::LoopUse(lumate),
                    mate: eu1,
                    radial: eu1,
                    edge: e,
                    vu: vumate,
                    next: k,
                    prev: k,
                    geom: None,
                });
                {
                    let first = &mut self.edge_uses[eu1];
                    first.mate = eu2;
                    first.radial = eu2;
                }
                self.edges[e].eu = eu1;

                self.vertex_uses[vu].up = VertexUseUp::EdgeUse(eu1);
                self.vertex_uses[vumate].up = VertexUseUp::EdgeUse(eu2);
                self.loop_uses[lu].down = LoopUseDown::Edges { first: eu1, len: 1 };
                self.loop_uses[lumate].down = LoopUseDown::Edges { first: eu2, len: 1 };
                debug!(?eu1, ?lu, "promoted single-vertex loop to one-edge loop");
                Ok(eu1)
            }
        }
    }

    /// Wrap a wire loopuse pair into a new face.
    ///
    /// The loop pair moves off the shell's wire list into the new
    /// faceuse/mate; both loop orientations become `Same`, the faceuse
    /// orientations start `Unspec` until a plane is attached.
    #[instrument(skip(self))]
    pub fn make_face(&mut self, lu1: LoopUseId) -> Result<FaceUseId, TopoError> {
        let s = match self.loop_uses[lu1].up {
            LoopUseUp::Shell(s) => s,
            LoopUseUp::FaceUse(_) => return Err(TopoError::NotAWireLoop(lu1)),
        };
        let lu2 = self.loop_uses[lu1].mate;
        match self.loop_uses[lu2].up {
            LoopUseUp::Shell(s2) if s2 == s => {}
            _ => panic!("mate {lu2:?} does not share the parent of {lu1:?}"),
        }

        let f = self.faces.insert(Face {
            fu: FaceUseId::default(),
            geom: None,
            flip: false,
            bounds: None,
        });
        let fu1 = self.face_uses.insert(FaceUse {
            shell: s,
            mate: FaceUseId::default(),
            orientation: Orientation::Unspec,
            face: f,
            loop_uses: vec![lu1],
        });
        let fu2 = self.face_uses.insert(FaceUse {
            shell: s,
            mate: fu1,
            orientation: Orientation::Unspec,
            face: f,
            loop_uses: vec![lu2],
        });
        self.face_uses[fu1].mate = fu2;
        self.faces[f].fu = fu1;

        self.shells[s].loop_uses.retain(|&lu| lu != lu1 && lu != lu2);
        self.loop_uses[lu1].up = LoopUseUp::FaceUse(fu1);
        self.loop_uses[lu1].orientation = Orientation::Same;
        self.loop_uses[lu2].up = LoopUseUp::FaceUse(fu2);
        self.loop_uses[lu2].orientation = Orientation::Same;

        self.shells[s].face_uses.push(fu1);
        self.shells[s].face_uses.push(fu2);

        debug!(?fu1, ?f, "made face from wire loop");
        Ok(fu1)
    }

    /// Split `oldeu` (A to B) by inserting a vertex V: `oldeu` keeps A to
    /// V on its edge, the returned use spans V to B on a fresh edge,
    /// placed right after `oldeu` in the loop cycle. The mate cycle is
    /// patched to mirror. `None` makes a new vertex for V.
    fn split_loop_edgeuse(&mut self, oldeu: EdgeUseId, v: Option<VertexId>) -> EdgeUseId {
        debug_assert!(self.is_dangling(oldeu), "splitting a radially shared edge");
        let oldmate = self.edge_uses[oldeu].mate;
        let lu = match self.edge_uses[oldeu].up {
            EdgeUseUp::LoopUse(lu) => lu,
            EdgeUseUp::Shell(_) => panic!("edgeuse {oldeu:?} is not in a loop"),
        };
        let lumate = match self.edge_uses[oldmate].up {
            EdgeUseUp::LoopUse(lu) => lu,
            EdgeUseUp::Shell(_) => panic!("edgeuse {oldmate:?} is not in a loop"),
        };

        let e2 = self.edges.insert(Edge {
            eu: EdgeUseId::default(),
        });
        let eu1 = self.edge_uses.insert(EdgeUse {
            up: EdgeUseUp::LoopUse(lu),
            mate: EdgeUseId::default(),
            radial: EdgeUseId::default(),
            edge: e2,
            vu: VertexUseId::default(),
            next: EdgeUseId::default(),
            prev: EdgeUseId::default(),
            geom: None,
        });
        let eu2 = self.edge_uses.insert(EdgeUse {
            up: EdgeUseUp::LoopUse(lumate),
            mate: eu1,
            radial: eu1,
            edge: e2,
            vu: VertexUseId::default(),
            next: EdgeUseId::default(),
            prev: EdgeUseId::default(),
            geom: None,
        });
        {
            let first = &mut self.edge_uses[eu1];
            first.mate = eu2;
            first.radial = eu2;
        }
        self.edges[e2].eu = eu1;

        // eu1 goes after oldeu; eu2 goes before oldmate, keeping the mate
        // cycle the reverse traversal of the loop cycle.
        let after = self.edge_uses[oldeu].next;
        self.edge_uses[eu1].next = after;
        self.edge_uses[eu1].prev = oldeu;
        self.edge_uses[after].prev = eu1;
        self.edge_uses[oldeu].next = eu1;

        let before = self.edge_uses[oldmate].prev;
        self.edge_uses[eu2].next = oldmate;
        self.edge_uses[eu2].prev = before;
        self.edge_uses[before].next = eu2;
        self.edge_uses[oldmate].prev = eu2;

        // The old B-side vertexuse migrates to the new mate; V gets fresh
        // uses on the returned edgeuse and on the old mate.
        let old_b_vu = self.edge_uses[oldmate].vu;
        let vu1 = self.new_vertex_use(VertexUseUp::EdgeUse(eu1), v);
        let vv = self.vertex_uses[vu1].vertex;
        let mate_vu = self.new_vertex_use(VertexUseUp::EdgeUse(oldmate), Some(vv));
        self.vertex_uses[old_b_vu].up = VertexUseUp::EdgeUse(eu2);
        self.edge_uses[eu1].vu = vu1;
        self.edge_uses[eu2].vu = old_b_vu;
        self.edge_uses[oldmate].vu = mate_vu;

        for l in [lu, lumate] {
            if let LoopUseDown::Edges { len, .. } = &mut self.loop_uses[l].down {
                *len += 1;
            }
        }
        eu1
    }

    /// Build a face whose single loop visits `verts` in order.
    ///
    /// `None` slots receive newly created vertices, written back so a
    /// caller-side vertex table is shared across faces. Consecutive pairs
    /// already joined by a dangling edge in this shell reuse that edge by
    /// a radial join; this is what makes adjacent polygon faces share
    /// edges instead of stacking duplicates. The returned faceuse is the
    /// `Same`-oriented side, its loop running in the order given.
    #[instrument(skip(self, verts), fields(n = verts.len()))]
    pub fn make_polygon_face(
        &mut self,
        s: ShellId,
        verts: &mut [Option<VertexId>],
    ) -> Result<FaceUseId, TopoError> {
        let n = verts.len();
        if n < 3 {
            return Err(TopoError::PolygonTooSmall(n));
        }

        let lu = self.make_vertex_loop(LoopUseUp::Shell(s), verts[n - 1], Orientation::Same);
        let fu = self.make_face(lu)?;
        self.face_uses[fu].orientation = Orientation::Same;
        let fmate = self.face_uses[fu].mate;
        self.face_uses[fmate].orientation = Orientation::Opposite;

        self.grow_loop_edges(lu, s, verts)?;
        debug!(?fu, vertices = n, "made polygon face");
        Ok(fu)
    }

    /// Add a loop visiting `verts` in order to an existing face, typically
    /// a hole boundary (orient the hole opposite the outer loop: clockwise
    /// vertices against the face normal, loop orientation `Opposite`).
    ///
    /// Vertex slots behave as in [`Model::make_polygon_face`]: `None`
    /// slots are filled and written back, and consecutive pairs joined by
    /// a dangling edge in this shell reuse that edge.
    #[instrument(skip(self, verts), fields(n = verts.len()))]
    pub fn add_loop_to_face(
        &mut self,
        fu: FaceUseId,
        verts: &mut [Option<VertexId>],
    ) -> Result<LoopUseId, TopoError> {
        let n = verts.len();
        if n < 3 {
            return Err(TopoError::PolygonTooSmall(n));
        }
        let s = self.face_uses[fu].shell;
        let lu = self.make_vertex_loop(
            LoopUseUp::FaceUse(fu),
            verts[n - 1],
            Orientation::Opposite,
        );
        self.grow_loop_edges(lu, s, verts)?;
        debug!(?fu, ?lu, vertices = n, "added loop to face");
        Ok(lu)
    }

    /// Grow a freshly made single-vertex loop into a cycle visiting
    /// `verts` in order, reusing dangling edges found in shell `s`.
    fn grow_loop_edges(
        &mut self,
        lu: LoopUseId,
        s: ShellId,
        verts: &mut [Option<VertexId>],
    ) -> Result<(), TopoError> {
        let n = verts.len();
        let seed_vu = match self.loop_uses[lu].down {
            LoopUseDown::Vertex(vu) => vu,
            LoopUseDown::Edges { .. } => unreachable!("fresh vertex loop holds one vertexuse"),
        };
        let anchor_eu = self.make_edge_on_vertexuse(seed_vu)?;
        let anchor = self.edgeuse_start(anchor_eu);
        if verts[n - 1].is_none() {
            verts[n - 1] = Some(anchor);
        }

        // Grow the loop by splitting the anchor edgeuse once per remaining
        // vertex, from the last slot down to the first.
        let mut prev = anchor;
        for slot in verts[..n - 1].iter_mut().rev() {
            match *slot {
                Some(v) => {
                    let shared = self.find_edgeuse(prev, v, Some(s), Some(anchor_eu), true);
                    let eu = self.split_loop_edgeuse(anchor_eu, Some(v));
                    if let Some(existing) = shared {
                        self.join_edgeuse(existing, eu)?;
                    }
                    prev = v;
                }
                None => {
                    let eu = self.split_loop_edgeuse(anchor_eu, None);
                    let v = self.edgeuse_start(eu);
                    *slot = Some(v);
                    prev = v;
                }
            }
        }

        // Close the cycle, again sharing any dangling edge already there.
        if let Some(existing) = self.find_edgeuse(prev, anchor, Some(s), Some(anchor_eu), true) {
            self.join_edgeuse(existing, anchor_eu)?;
        }
        Ok(())
    }

    // =========================================================================
    // Joining and splitting
    // =========================================================================

    /// Glue: move `src` and its mate onto `dst`'s edge, radially adjacent
    /// to `dst`.
    ///
    /// The two uses must join the same pair of vertices (in either
    /// direction). Joining a use to itself or to an already-adjacent use
    /// is a no-op. The old edge is deleted when this was its last pair.
    #[instrument(skip(self))]
    pub fn join_edgeuse(&mut self, dst: EdgeUseId, src: EdgeUseId) -> Result<(), TopoError> {
        let src_mate = self.edge_uses[src].mate;
        if src == dst || src_mate == dst {
            debug!(?dst, "join of an edgeuse with itself ignored");
            return Ok(());
        }

        let dst_e = self.edge_uses[dst].edge;
        let src_e = self.edge_uses[src].edge;
        if src_e == dst_e
            && (self.edge_uses[src].radial == dst || self.edge_uses[dst].radial == src)
        {
            return Ok(());
        }

        let sv1 = self.edgeuse_start(src);
        let sv2 = self.edgeuse_end(src);
        let dv1 = self.edgeuse_start(dst);
        let dv2 = self.edgeuse_end(dst);
        if !((sv1 == dv1 && sv2 == dv2) || (sv1 == dv2 && sv2 == dv1)) {
            return Err(TopoError::EdgesDontShareVertices(dst, src));
        }

        self.edge_uses[src].edge = dst_e;
        self.edge_uses[src_mate].edge = dst_e;

        let src_rad = self.edge_uses[src].radial;
        if src_rad != src_mate {
            // Other uses stay behind on the old edge; splice this pair out.
            let rep = self.edges[src_e].eu;
            if rep == src || rep == src_mate {
                self.edges[src_e].eu = src_rad;
            }
            let src_mate_rad = self.edge_uses[src_mate].radial;
            self.edge_uses[src_rad].radial = src_mate_rad;
            self.edge_uses[src_mate_rad].radial = src_rad;
        } else {
            // Last pair off the old edge.
            self.edges.remove(src_e);
        }

        let dst_rad = self.edge_uses[dst].radial;
        self.edge_uses[src].radial = dst;
        self.edge_uses[src_mate].radial = dst_rad;
        self.edge_uses[dst_rad].radial = src_mate;
        self.edge_uses[dst].radial = src;

        debug!(?dst, ?src, "joined edgeuses onto one edge");
        Ok(())
    }

    /// Split a use/mate pair off a shared edge onto a fresh edge of its
    /// own. A pair already alone on its edge is left untouched.
    #[instrument(skip(self))]
    pub fn unglue_edgeuse(&mut self, eu: EdgeUseId) {
        let mate = self.edge_uses[eu].mate;
        if self.edge_uses[eu].radial == mate {
            return;
        }
        let old_e = self.edge_uses[eu].edge;
        let new_e = self.edges.insert(Edge { eu });

        let rep = self.edges[old_e].eu;
        if rep == eu || rep == mate {
            self.edges[old_e].eu = self.edge_uses[rep].radial;
        }

        let rad = self.edge_uses[eu].radial;
        let mate_rad = self.edge_uses[mate].radial;
        self.edge_uses[rad].radial = mate_rad;
        self.edge_uses[mate_rad].radial = rad;

        self.edge_uses[eu].edge = new_e;
        self.edge_uses[mate].edge = new_e;
        self.edge_uses[eu].radial = mate;
        self.edge_uses[mate].radial = eu;
        debug!(?eu, ?new_e, "unglued edgeuse pair onto its own edge");
    }

    /// Merge two vertices: `keep` inherits every use of `drop` (appended
    /// in order) and adopts `drop`'s point if it had none; `drop` is
    /// deleted. Merging a vertex with itself is a no-op.
    #[instrument(skip(self))]
    pub fn join_vertex(&mut self, keep: VertexId, drop: VertexId) {
        if keep == drop {
            return;
        }
        let dropped = match self.vertices.remove(drop) {
            Some(v) => v,
            None => panic!("vertex {drop:?} is not in this model"),
        };
        for &vu in &dropped.uses {
            self.vertex_uses[vu].vertex = keep;
        }
        let kept = &mut self.vertices[keep];
        kept.uses.extend(dropped.uses);
        if kept.point.is_none() {
            kept.point = dropped.point;
        }
        debug!(?keep, ?drop, "joined vertices");
    }

    /// Re-home one vertexuse onto `v`, deleting the old vertex when this
    /// was its last use.
    #[instrument(skip(self))]
    pub fn move_vertexuse(&mut self, vu: VertexUseId, v: VertexId) {
        let old = self.vertex_uses[vu].vertex;
        if old == v {
            return;
        }
        let uses = &mut self.vertices[old].uses;
        if let Some(pos) = uses.iter().position(|&u| u == vu) {
            uses.remove(pos);
        }
        if self.vertices[old].uses.is_empty() {
            self.vertices.remove(old);
        }
        self.vertex_uses[vu].vertex = v;
        self.vertices[v].uses.push(vu);
        debug!(?vu, ?v, "moved vertexuse");
    }

    // =========================================================================
    // Geometry association
    // =========================================================================

    /// Assign (or overwrite) the vertex's position.
    pub fn set_vertex_point(&mut self, v: VertexId, pt: Point3) {
        self.vertices[v].point = Some(pt);
    }

    /// Attach a shading normal to one vertexuse.
    pub fn set_vertexuse_normal(&mut self, vu: VertexUseId, n: Vec3) {
        self.vertex_uses[vu].normal = Some(n);
    }

    /// Give `eu`'s edge line geometry.
    ///
    /// Adopts any geometry already present somewhere on the radial orbit;
    /// otherwise builds the line through the endpoints. Either way the
    /// whole orbit ends up sharing one line. `eu` itself must not carry
    /// geometry yet.
    #[instrument(skip(self))]
    pub fn edge_geom_from_endpoints(&mut self, eu: EdgeUseId) -> Result<EdgeGeomId, TopoError> {
        if self.edge_uses[eu].geom.is_some() {
            return Err(TopoError::GeometryAlreadyAssigned(eu));
        }

        let mut adopted = None;
        for user in self.radial_orbit(eu) {
            if let Some(g) = self.edge_uses[user].geom {
                adopted = Some(g);
                break;
            }
        }
        let g = match adopted {
            Some(g) => g,
            None => {
                let v1 = self.edgeuse_start(eu);
                let v2 = self.edgeuse_end(eu);
                let p1 = self.vertices[v1]
                    .point
                    .ok_or(TopoError::MissingVertexPoint(v1))?;
                let p2 = self.vertices[v2]
                    .point
                    .ok_or(TopoError::MissingVertexPoint(v2))?;
                let dir = p2 - p1;
                if dir.norm_squared() == 0.0 {
                    return Err(TopoError::ZeroLengthEdge(eu));
                }
                self.edge_geoms.insert(EdgeGeom {
                    pt: p1,
                    dir,
                    uses: Vec::new(),
                })
            }
        };

        let orbit: Vec<EdgeUseId> = self.radial_orbit(eu).collect();
        for user in orbit {
            if self.edge_uses[user].geom.is_none() {
                self.edge_uses[user].geom = Some(g);
                self.edge_geoms[g].uses.push(user);
            }
        }
        debug!(?eu, geom = ?g, adopted = adopted.is_some(), "assigned line geometry");
        Ok(g)
    }

    /// Switch a use/mate pair onto an existing line, deleting the old
    /// geometry if this was its last user.
    pub fn use_edge_geom(&mut self, eu: EdgeUseId, g: EdgeGeomId) {
        let mate = self.edge_uses[eu].mate;
        for user in [eu, mate] {
            if let Some(old) = self.edge_uses[user].geom {
                let uses = &mut self.edge_geoms[old].uses;
                if let Some(pos) = uses.iter().position(|&u| u == user) {
                    uses.remove(pos);
                }
                if old != g && self.edge_geoms[old].uses.is_empty() {
                    self.edge_geoms.remove(old);
                }
            }
            self.edge_uses[user].geom = Some(g);
            self.edge_geoms[g].uses.push(user);
        }
        debug!(?eu, ?g, "switched edgeuse pair to line");
    }

    /// Re-home every user of `drop` onto `keep` and delete `drop`.
    ///
    /// This is the explicit repair step for two lines that turn out to be
    /// the same; queries that detect the coincidence report it instead of
    /// fusing behind the caller's back.
    #[instrument(skip(self))]
    pub fn fuse_edge_geom(&mut self, keep: EdgeGeomId, drop: EdgeGeomId) {
        if keep == drop {
            return;
        }
        if !self.edge_geoms.contains_key(drop) {
            panic!("line geometry {drop:?} is not in this model");
        }
        while let Some(&eu) = self.edge_geoms.get(drop).and_then(|g| g.uses.first()) {
            if self.edge_uses[eu].geom != Some(drop) {
                panic!("edgeuse {eu:?} on the use list of {drop:?} disavows it");
            }
            self.use_edge_geom(eu, keep);
        }
        // A userless drop survives the loop above.
        self.edge_geoms.remove(drop);
        debug!(?keep, ?drop, "fused line geometries");
    }

    /// Set the face's plane from the side `fu` sees.
    ///
    /// The pair's orientations become `Same` (on `fu`) and `Opposite`;
    /// the plane is stored negated when the face is flipped against its
    /// geometry, so `faceuse_normal` round-trips.
    pub fn set_face_plane(&mut self, fu: FaceUseId, plane: PlaneEq) {
        let mate = self.face_uses[fu].mate;
        self.face_uses[fu].orientation = Orientation::Same;
        self.face_uses[mate].orientation = Orientation::Opposite;

        let f = self.face_uses[fu].face;
        let stored = if self.faces[f].flip {
            plane.flipped()
        } else {
            plane
        };
        match self.faces[f].geom {
            Some(g) => self.face_geoms[g].plane = stored,
            None => {
                let g = self.face_geoms.insert(FaceGeom { plane: stored });
                self.faces[f].geom = Some(g);
            }
        }
        debug!(?fu, "set face plane");
    }

    /// Like [`Model::set_face_plane`], but when the current plane object
    /// is shared with other faces the face detaches onto a private one
    /// first, leaving the sharers unchanged.
    pub fn new_face_plane(&mut self, fu: FaceUseId, plane: PlaneEq) {
        let f = self.face_uses[fu].face;
        let shared = match self.faces[f].geom {
            Some(g) => {
                self.faces
                    .iter()
                    .filter(|(_, face)| face.geom == Some(g))
                    .count()
                    > 1
            }
            None => false,
        };
        if shared {
            self.faces[f].geom = None;
        }
        self.set_face_plane(fu, plane);
    }

    /// Compute the face plane from its first loop by the Newell sum and
    /// attach it facing out of `fu`.
    ///
    /// Fails on a vertex loop, a loop of fewer than three edges, missing
    /// vertex positions, or an area below tolerance.
    pub fn face_plane_from_loop(
        &mut self,
        fu: FaceUseId,
        tol: &Tolerance,
    ) -> Result<PlaneEq, TopoError> {
        let lu = match self.face_uses[fu].loop_uses.first() {
            Some(&lu) => lu,
            None => return Err(TopoError::DegenerateFace(fu)),
        };
        let mut pts = Vec::new();
        for eu in self.loop_edge_uses(lu) {
            let v = self.edgeuse_start(eu);
            let p = self.vertices[v]
                .point
                .ok_or(TopoError::MissingVertexPoint(v))?;
            pts.push(p);
        }
        if pts.len() < 3 {
            return Err(TopoError::DegenerateFace(fu));
        }
        let area = polygon_area_vector(&pts);
        let norm = area.norm();
        if norm < tol.dist_sq {
            return Err(TopoError::DegenerateFace(fu));
        }
        let normal = area / norm;
        let d = pts.iter().map(|p| normal.dot(&p.coords)).sum::<f64>() / pts.len() as f64;
        let plane = PlaneEq { normal, d };
        self.set_face_plane(fu, plane);
        Ok(plane)
    }

    // =========================================================================
    // Extents
    // =========================================================================

    /// Compute the loop's box from its vertices, padding thin axes by the
    /// distance tolerance. Edges without line geometry get it here, from
    /// their endpoints.
    pub fn compute_loop_bounds(&mut self, lp: LoopId, tol: &Tolerance) -> Result<(), TopoError> {
        let lu = self.loops[lp].lu;
        let mut bb = Aabb::EMPTY;
        match self.loop_uses[lu].down {
            LoopUseDown::Edges { .. } => {
                let eus: Vec<EdgeUseId> = self.loop_edge_uses(lu).collect();
                for eu in eus {
                    let v = self.edgeuse_start(eu);
                    let p = self.vertices[v]
                        .point
                        .ok_or(TopoError::MissingVertexPoint(v))?;
                    bb.expand(&p);
                    if self.edge_uses[eu].geom.is_none() {
                        self.edge_geom_from_endpoints(eu)?;
                    }
                }
            }
            LoopUseDown::Vertex(vu) => {
                let v = self.vertex_uses[vu].vertex;
                let p = self.vertices[v]
                    .point
                    .ok_or(TopoError::MissingVertexPoint(v))?;
                bb.expand(&p);
            }
        }
        bb.pad_thin_axes(tol.dist);
        self.loops[lp].bounds = Some(bb);
        Ok(())
    }

    /// Compute the face's box as the union of its loops' boxes,
    /// recomputing each loop along the way.
    pub fn compute_face_bounds(&mut self, f: FaceId, tol: &Tolerance) -> Result<(), TopoError> {
        let fu = self.faces[f].fu;
        let lus = self.face_uses[fu].loop_uses.clone();
        let mut bb = Aabb::EMPTY;
        for lu in lus {
            let lp = self.loop_uses[lu].lp;
            self.compute_loop_bounds(lp, tol)?;
            if let Some(lb) = &self.loops[lp].bounds {
                bb = bb.union(lb);
            }
        }
        self.faces[f].bounds = Some(bb);
        Ok(())
    }

    /// Compute the shell's box over faces, wire loops, wire edges, and
    /// the lone vertex. A lone vertex without a position is skipped; an
    /// element-free shell is an error.
    pub fn compute_shell_bounds(&mut self, s: ShellId, tol: &Tolerance) -> Result<(), TopoError> {
        if self.shell_is_empty(s) {
            return Err(TopoError::EmptyShell(s));
        }
        let mut bb = Aabb::EMPTY;

        let fus = self.shells[s].face_uses.clone();
        let mut last_face = None;
        for fu in fus {
            let f = self.face_uses[fu].face;
            if last_face == Some(f) {
                continue; // mate of the face just measured
            }
            last_face = Some(f);
            self.compute_face_bounds(f, tol)?;
            if let Some(fb) = &self.faces[f].bounds {
                bb = bb.union(fb);
            }
        }

        let lus = self.shells[s].loop_uses.clone();
        for lu in lus {
            let lp = self.loop_uses[lu].lp;
            self.compute_loop_bounds(lp, tol)?;
            if let Some(lb) = &self.loops[lp].bounds {
                bb = bb.union(lb);
            }
        }

        let eus = self.shells[s].edge_uses.clone();
        for eu in eus {
            let v = self.edgeuse_start(eu);
            let p = self.vertices[v]
                .point
                .ok_or(TopoError::MissingVertexPoint(v))?;
            bb.expand(&p);
        }

        if let Some(vu) = self.shells[s].vertex_use {
            let v = self.vertex_uses[vu].vertex;
            if let Some(p) = self.vertices[v].point {
                bb.expand(&p);
            }
        }

        self.shells[s].bounds = Some(bb);
        Ok(())
    }

    /// Compute the region's box as the union over its shells' boxes,
    /// recomputing each shell along the way.
    pub fn compute_region_bounds(&mut self, r: RegionId, tol: &Tolerance) -> Result<(), TopoError> {
        let shells = self.regions[r].shells.clone();
        let mut bb = Aabb::EMPTY;
        for s in shells {
            self.compute_shell_bounds(s, tol)?;
            if let Some(sb) = &self.shells[s].bounds {
                bb = bb.union(sb);
            }
        }
        self.regions[r].bounds = Some(bb);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    #[test]
    fn make_region_yields_minimal_shell() {
        let mut m = Model::new();
        let (r, s) = m.make_region();
        assert_eq!(m.regions[r].shells, vec![s]);
        assert!(m.shells[s].vertex_use.is_some());
        assert!(m.audit().is_clean());
    }

    #[test]
    fn vertex_loop_steals_shell_vertexuse() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let vu_before = m.shells[s].vertex_use.unwrap();
        let lu = m.make_vertex_loop(LoopUseUp::Shell(s), None, Orientation::Unspec);

        assert!(m.shells[s].vertex_use.is_none());
        assert_eq!(m.loop_uses[lu].down, LoopUseDown::Vertex(vu_before));
        let lu2 = m.loop_uses[lu].mate;
        assert_eq!(m.loop_uses[lu2].mate, lu);
        assert_eq!(m.shells[s].loop_uses, vec![lu, lu2]);
        assert!(m.audit().is_clean());
    }

    #[test]
    fn wire_edge_endpoint_stealing() {
        // Both endpoints unspecified: the first steals the lone vertexuse.
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let vu_before = m.shells[s].vertex_use.unwrap();
        let eu = m.make_wire_edge(None, None, s);
        assert_eq!(m.edge_uses[eu].vu, vu_before);
        assert!(m.shells[s].vertex_use.is_none());
        assert!(m.audit().is_clean());

        // Both specified into a fresh shell: the leftover lone vertexuse
        // is deleted rather than kept around.
        let mut m2 = Model::new();
        let (r2, s2) = m2.make_region();
        let helper = m2.make_wire_edge(None, None, s2);
        let v1 = m2.edgeuse_start(helper);
        let v2 = m2.edgeuse_end(helper);
        let s3 = m2.make_shell(r2);
        assert!(m2.shells[s3].vertex_use.is_some());
        let eu2 = m2.make_wire_edge(Some(v1), Some(v2), s3);
        assert!(m2.shells[s3].vertex_use.is_none());
        assert_eq!(m2.edgeuse_start(eu2), v1);
        assert_eq!(m2.edgeuse_end(eu2), v2);
        assert!(m2.audit().is_clean());
    }

    #[test]
    fn meonvu_promotes_vertex_loop() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let lu = m.make_vertex_loop(LoopUseUp::Shell(s), None, Orientation::Same);
        let vu = match m.loop_uses[lu].down {
            LoopUseDown::Vertex(vu) => vu,
            _ => unreachable!(),
        };
        let eu = m.make_edge_on_vertexuse(vu).unwrap();

        assert_eq!(m.loop_uses[lu].down, LoopUseDown::Edges { first: eu, len: 1 });
        assert_eq!(m.edge_uses[eu].next, eu);
        assert_eq!(m.edgeuse_start(eu), m.edgeuse_end(eu));
        assert!(m.is_dangling(eu));
        assert!(m.audit().is_clean());

        // An edge-owned vertexuse is rejected.
        let vu_on_edge = m.edge_uses[eu].vu;
        assert_eq!(
            m.make_edge_on_vertexuse(vu_on_edge),
            Err(TopoError::NotALoneVertexUse(vu_on_edge))
        );
    }

    #[test]
    fn make_face_requires_wire_loop() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let lu = m.make_vertex_loop(LoopUseUp::Shell(s), None, Orientation::Same);
        let fu = m.make_face(lu).unwrap();

        assert_eq!(m.loop_uses[lu].up, LoopUseUp::FaceUse(fu));
        assert_eq!(m.loop_uses[lu].orientation, Orientation::Same);
        assert_eq!(m.face_uses[fu].orientation, Orientation::Unspec);
        assert!(m.shells[s].loop_uses.is_empty());
        assert_eq!(m.shells[s].face_uses.len(), 2);
        assert!(m.audit().is_clean());

        // Already in a face now.
        assert_eq!(m.make_face(lu), Err(TopoError::NotAWireLoop(lu)));
    }

    #[test]
    fn polygon_face_orders_vertices_and_writes_back() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut verts = [None, None, None, None];
        let fu = m.make_polygon_face(s, &mut verts).unwrap();
        assert!(verts.iter().all(|v| v.is_some()));
        assert_eq!(m.face_uses[fu].orientation, Orientation::Same);

        let lu = m.face_uses[fu].loop_uses[0];
        let cycle: Vec<_> = m
            .loop_edge_uses(lu)
            .map(|eu| m.edgeuse_start(eu))
            .collect();
        assert_eq!(cycle.len(), 4);
        // The cycle visits the written-back vertices in slot order.
        let want: Vec<_> = verts.iter().map(|v| v.unwrap()).collect();
        let start = cycle.iter().position(|&v| v == want[0]).unwrap();
        let rotated: Vec<_> = (0..4).map(|i| cycle[(start + i) % 4]).collect();
        assert_eq!(rotated, want);
        assert!(m.audit().is_clean());
    }

    #[test]
    fn polygon_faces_share_dangling_edges() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut quad = [None, None, None, None];
        m.make_polygon_face(s, &mut quad).unwrap();
        let edges_before = m.edges.len();

        // Second face reuses the edge between quad[1] and quad[0].
        let mut tri = [quad[1], quad[0], None];
        m.make_polygon_face(s, &mut tri).unwrap();

        assert_eq!(m.edges.len(), edges_before + 2);
        let shared = m
            .find_edge(quad[0].unwrap(), quad[1].unwrap(), Some(s), None)
            .unwrap();
        let orbit: Vec<_> = m.edge_uses_of_edge(shared).collect();
        assert_eq!(orbit.len(), 4);
        assert!(m.audit().is_clean());
    }

    #[test]
    fn hole_loop_lands_on_both_face_sides() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut outer = [None; 4];
        let fu = m.make_polygon_face(s, &mut outer).unwrap();

        let mut hole = [None; 4];
        let lu = m.add_loop_to_face(fu, &mut hole).unwrap();

        assert_eq!(m.loop_uses[lu].up, LoopUseUp::FaceUse(fu));
        assert_eq!(m.loop_uses[lu].orientation, Orientation::Opposite);
        assert_eq!(m.face_uses[fu].loop_uses.len(), 2);
        let fmate = m.face_uses[fu].mate;
        assert_eq!(m.face_uses[fmate].loop_uses.len(), 2);
        assert_eq!(m.loop_edge_uses(lu).count(), 4);
        assert!(hole.iter().all(|v| v.is_some()));
        assert!(m.audit().is_clean());

        // Too few vertices is rejected before any mutation.
        let mut two = [None; 2];
        assert_eq!(
            m.add_loop_to_face(fu, &mut two),
            Err(TopoError::PolygonTooSmall(2))
        );
    }

    #[test]
    fn polygon_face_rejects_degenerate_count() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut two = [None, None];
        assert_eq!(
            m.make_polygon_face(s, &mut two),
            Err(TopoError::PolygonTooSmall(2))
        );
    }

    #[test]
    fn join_edgeuse_grows_orbit_and_unglue_undoes_it() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu1);
        let v2 = m.edgeuse_end(eu1);
        let eu2 = m.make_wire_edge(Some(v1), Some(v2), s);
        let eu3 = m.make_wire_edge(Some(v2), Some(v1), s);

        m.join_edgeuse(eu1, eu2).unwrap();
        assert_eq!(m.radial_orbit(eu1).count(), 4);
        m.join_edgeuse(eu1, eu3).unwrap();
        assert_eq!(m.radial_orbit(eu1).count(), 6);
        assert_eq!(m.edges.len(), 1);
        assert!(m.audit().is_clean());

        m.unglue_edgeuse(eu2);
        assert_eq!(m.radial_orbit(eu1).count(), 4);
        assert!(m.is_dangling(eu2));
        assert_eq!(m.edges.len(), 2);
        assert!(m.audit().is_clean());

        // Repeating the unglue changes nothing.
        m.unglue_edgeuse(eu2);
        assert!(m.is_dangling(eu2));
    }

    #[test]
    fn join_edgeuse_rejects_disjoint_edges() {
        let mut m = Model::new();
        let (r, s) = m.make_region();
        let s2 = m.make_shell(r);
        let eu1 = m.make_wire_edge(None, None, s);
        let eu2 = m.make_wire_edge(None, None, s2);
        assert_eq!(
            m.join_edgeuse(eu1, eu2),
            Err(TopoError::EdgesDontShareVertices(eu1, eu2))
        );
    }

    #[test]
    fn join_vertex_transfers_uses_and_point() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let keep = m.edgeuse_start(eu1);
        let drop = m.edgeuse_end(eu1);
        m.set_vertex_point(drop, Point3::new(1.0, 2.0, 3.0));

        let drop_uses = m.vertices[drop].uses.clone();
        m.join_vertex(keep, drop);

        assert!(!m.vertices.contains_key(drop));
        for vu in drop_uses {
            assert_eq!(m.vertex_uses[vu].vertex, keep);
        }
        assert_eq!(m.vertices[keep].point, Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(m.edgeuse_start(eu1), m.edgeuse_end(eu1));
        assert!(m.audit().is_clean());
    }

    #[test]
    fn edge_geom_propagates_around_orbit() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu1);
        let v2 = m.edgeuse_end(eu1);
        m.set_vertex_point(v1, Point3::origin());
        m.set_vertex_point(v2, Point3::new(2.0, 0.0, 0.0));
        let eu2 = m.make_wire_edge(Some(v1), Some(v2), s);
        m.join_edgeuse(eu1, eu2).unwrap();

        let g = m.edge_geom_from_endpoints(eu1).unwrap();
        for user in m.radial_orbit(eu1).collect::<Vec<_>>() {
            assert_eq!(m.edge_uses[user].geom, Some(g));
        }
        assert_eq!(m.edge_geoms[g].uses.len(), 4);
        assert_relative_eq!(m.edge_geoms[g].dir.x, 2.0);
        assert!(m.audit().is_clean());

        assert_eq!(
            m.edge_geom_from_endpoints(eu1),
            Err(TopoError::GeometryAlreadyAssigned(eu1))
        );
    }

    #[test]
    fn edge_geom_rejects_zero_length_and_missing_points() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu = m.make_wire_edge(None, None, s);
        let v1 = m.edgeuse_start(eu);
        let v2 = m.edgeuse_end(eu);

        assert_eq!(
            m.edge_geom_from_endpoints(eu),
            Err(TopoError::MissingVertexPoint(v1))
        );
        let p = Point3::new(1.0, 1.0, 1.0);
        m.set_vertex_point(v1, p);
        m.set_vertex_point(v2, p);
        assert_eq!(
            m.edge_geom_from_endpoints(eu),
            Err(TopoError::ZeroLengthEdge(eu))
        );
    }

    #[test]
    fn fuse_edge_geom_unifies_users() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let eu1 = m.make_wire_edge(None, None, s);
        let (a, b) = (m.edgeuse_start(eu1), m.edgeuse_end(eu1));
        m.set_vertex_point(a, Point3::origin());
        m.set_vertex_point(b, Point3::new(1.0, 0.0, 0.0));
        let eu2 = m.make_wire_edge(Some(a), Some(b), s);

        let g1 = m.edge_geom_from_endpoints(eu1).unwrap();
        let g2 = m.edge_geom_from_endpoints(eu2).unwrap();
        assert_ne!(g1, g2);

        m.fuse_edge_geom(g1, g2);
        assert!(!m.edge_geoms.contains_key(g2));
        assert_eq!(m.edge_geoms[g1].uses.len(), 4);
        assert_eq!(m.edge_uses[eu2].geom, Some(g1));
        assert!(m.audit().is_clean());
    }

    #[test]
    fn face_plane_orientations_and_flip() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut verts = [None, None, None];
        let fu = m.make_polygon_face(s, &mut verts).unwrap();
        let pts = [
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        for (v, p) in verts.iter().zip(pts) {
            m.set_vertex_point(v.unwrap(), p);
        }

        let plane = m.face_plane_from_loop(fu, &tol()).unwrap();
        assert_relative_eq!(plane.normal.z, 1.0);
        assert_eq!(m.face_uses[fu].orientation, Orientation::Same);
        let mate = m.face_uses[fu].mate;
        assert_eq!(m.face_uses[mate].orientation, Orientation::Opposite);

        let n = m.faceuse_normal(fu).unwrap();
        assert_relative_eq!(n.z, 1.0);
        assert_relative_eq!(m.faceuse_normal(mate).unwrap().z, -1.0);

        // A flipped face stores the negated plane but reports the same
        // outward normal.
        let f = m.face_uses[fu].face;
        m.faces[f].flip = true;
        m.set_face_plane(fu, plane);
        let g = m.faces[f].geom.unwrap();
        assert_relative_eq!(m.face_geoms[g].plane.normal.z, -1.0);
        assert_relative_eq!(m.faceuse_normal(fu).unwrap().z, 1.0);
    }

    #[test]
    fn degenerate_loop_has_no_plane() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        let mut verts = [None, None, None];
        let fu = m.make_polygon_face(s, &mut verts).unwrap();
        // Collinear points: area vector vanishes.
        for (i, v) in verts.iter().enumerate() {
            m.set_vertex_point(v.unwrap(), Point3::new(i as f64, 0.0, 0.0));
        }
        assert_eq!(
            m.face_plane_from_loop(fu, &tol()),
            Err(TopoError::DegenerateFace(fu))
        );
    }

    #[test]
    fn bounds_chain_reaches_model_box() {
        let mut m = Model::new();
        let (r, s) = m.make_region();
        let mut verts = [None, None, None];
        m.make_polygon_face(s, &mut verts).unwrap();
        let pts = [
            Point3::origin(),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        for (v, p) in verts.iter().zip(pts) {
            m.set_vertex_point(v.unwrap(), p);
        }

        m.compute_region_bounds(r, &tol()).unwrap();
        let bb = m.bounding_box();
        assert_relative_eq!(bb.max.x, 2.0);
        assert_relative_eq!(bb.max.y, 3.0);
        // Flat in z: padded by half the distance tolerance each way.
        assert_relative_eq!(bb.max.z, tol().dist * 0.5);
        assert!(m.audit().is_clean());
    }

    #[test]
    fn empty_shell_bounds_is_an_error() {
        let mut m = Model::new();
        let (_, s) = m.make_region();
        // Strip the seed vertexuse to fabricate the degenerate case.
        let vu = m.shells[s].vertex_use.take().unwrap();
        m.kill_vertex_use(vu);
        assert_eq!(
            m.compute_shell_bounds(s, &tol()),
            Err(TopoError::EmptyShell(s))
        );
    }
}
