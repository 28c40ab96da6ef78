//! Directed property graph with hierarchical vertex names.
//!
//! Vertices are stored in an arena and addressed by [`VertexId`]. Edges are
//! kept twice, in an outward and an inward adjacency set, and both sets
//! preserve insertion order: the inward order of a vertex is the operand
//! order its payload sees during evaluation.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::error::GraphError;
use crate::path::{self, QualifiedName};

/// Handle of a vertex inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u32);

impl VertexId {
    /// Arena index of this vertex.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// The same vertex after its graph was merged at `offset`.
    pub(crate) fn shifted(self, offset: usize) -> Self {
        Self::from_index(self.index() + offset)
    }
}

/// What a [`Graph::dfs`] visitor wants done after visiting a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the vertex's outward neighbours.
    Descend,
    /// Do not descend from this vertex.
    Prune,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    name: QualifiedName,
    payload: T,
}

/// A named, directed graph owning its vertex payloads.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    uid: String,
    slots: Vec<Option<Slot<T>>>,
    names: HashMap<QualifiedName, VertexId>,
    /// Segment -> vertices whose name contains it.
    segments: HashMap<String, IndexSet<VertexId>>,
    outward: Vec<IndexSet<VertexId>>,
    inward: Vec<IndexSet<VertexId>>,
}

impl<T> Graph<T> {
    /// Create an empty graph whose vertices will live under `uid`.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            slots: Vec::new(),
            names: HashMap::new(),
            segments: HashMap::new(),
            outward: Vec::new(),
            inward: Vec::new(),
        }
    }

    /// Namespace of this graph.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.names.len()
    }

    /// Number of arena slots, including removed vertices.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Add a vertex named `uid::name`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateVertex`] if the qualified name is taken.
    pub fn add_vertex(
        &mut self,
        name: impl Into<QualifiedName>,
        payload: T,
    ) -> Result<VertexId, GraphError> {
        let name = name.into().qualified(&self.uid);
        self.insert(name, payload)
    }

    /// Insert a vertex under an already-qualified name.
    fn insert(&mut self, name: QualifiedName, payload: T) -> Result<VertexId, GraphError> {
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateVertex(name.to_string()));
        }
        let id = VertexId::from_index(self.slots.len());
        for segment in name.segments() {
            self.segments.entry(segment.clone()).or_default().insert(id);
        }
        self.names.insert(name.clone(), id);
        self.slots.push(Some(Slot { name, payload }));
        self.outward.push(IndexSet::new());
        self.inward.push(IndexSet::new());
        Ok(id)
    }

    fn slot(&self, id: VertexId) -> Option<&Slot<T>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn require(&self, id: VertexId) -> Result<&Slot<T>, GraphError> {
        self.slot(id)
            .ok_or_else(|| GraphError::VertexNotFound(format!("#{}", id.index())))
    }

    /// Whether the handle refers to a live vertex.
    pub fn contains(&self, id: VertexId) -> bool {
        self.slot(id).is_some()
    }

    /// Payload of a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&T> {
        self.slot(id).map(|slot| &slot.payload)
    }

    /// Mutable payload of a vertex.
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .map(|slot| &mut slot.payload)
    }

    /// Fully-qualified name of a vertex.
    pub fn name(&self, id: VertexId) -> Option<&QualifiedName> {
        self.slot(id).map(|slot| &slot.name)
    }

    /// Resolve a possibly-partial name to a vertex handle.
    ///
    /// An exact fully-qualified name always wins, then the name local to this
    /// graph (`uid::name`); otherwise the name is [expanded](path::expand)
    /// as a unique suffix against every vertex.
    ///
    /// # Errors
    ///
    /// - [`GraphError::VertexNotFound`] if nothing matches
    /// - [`GraphError::AmbiguousReference`] if several vertices match
    pub fn resolve(&self, name: &str) -> Result<VertexId, GraphError> {
        let query = QualifiedName::parse(name);
        if let Some(&id) = self.names.get(&query) {
            return Ok(id);
        }
        if let Some(&id) = self.names.get(&query.qualified(&self.uid)) {
            return Ok(id);
        }

        // Only vertices sharing the query's rarest segment can match.
        let mut postings = Vec::with_capacity(query.segments().len());
        for segment in query.segments() {
            match self.segments.get(segment) {
                Some(ids) => postings.push(ids),
                None => return Err(GraphError::VertexNotFound(name.to_owned())),
            }
        }
        let rarest = postings
            .into_iter()
            .min_by_key(|ids| ids.len())
            .ok_or_else(|| GraphError::VertexNotFound(name.to_owned()))?;

        let found = path::expand(&query, rarest.iter().filter_map(|&id| self.name(id)))?;
        Ok(self.names[found])
    }

    /// Look up a vertex payload by possibly-partial name.
    ///
    /// # Errors
    ///
    /// See [`Graph::resolve`].
    pub fn get_vertex(&self, name: &str) -> Result<&T, GraphError> {
        let id = self.resolve(name)?;
        Ok(&self.require(id)?.payload)
    }

    /// Remove a vertex from the vertex map.
    ///
    /// Adjacency entries are left in place; managing them is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexNotFound`] if the vertex is not live.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<T, GraphError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or_else(|| GraphError::VertexNotFound(format!("#{}", id.index())))?;
        self.names.remove(&slot.name);
        for segment in slot.name.segments() {
            if let Some(ids) = self.segments.get_mut(segment) {
                ids.shift_remove(&id);
            }
        }
        Ok(slot.payload)
    }

    /// Add the edge `init -> term`.
    ///
    /// Returns `false` if the edge was already present.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexNotFound`] if either endpoint is missing.
    pub fn add_edge(&mut self, init: VertexId, term: VertexId) -> Result<bool, GraphError> {
        self.require(init)?;
        self.require(term)?;
        let added = self.outward[init.index()].insert(term);
        self.inward[term.index()].insert(init);
        Ok(added)
    }

    /// Remove the edge `init -> term`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::VertexNotFound`] if either endpoint is missing
    /// - [`GraphError::EdgeNotFound`] if either adjacency lacks the edge
    pub fn remove_edge(&mut self, init: VertexId, term: VertexId) -> Result<(), GraphError> {
        let init_name = self.require(init)?.name.to_string();
        let term_name = self.require(term)?.name.to_string();
        let missing = || GraphError::EdgeNotFound {
            init: init_name.clone(),
            term: term_name.clone(),
        };

        if !self.outward[init.index()].shift_remove(&term) {
            return Err(missing());
        }
        if !self.inward[term.index()].shift_remove(&init) {
            return Err(missing());
        }
        Ok(())
    }

    /// Whether the edge `init -> term` exists.
    pub fn has_edge(&self, init: VertexId, term: VertexId) -> bool {
        self.outward
            .get(init.index())
            .is_some_and(|adjacent| adjacent.contains(&term))
    }

    /// Vertices driven by `id`, in insertion order.
    pub fn outward(&self, id: VertexId) -> &IndexSet<VertexId> {
        &self.outward[id.index()]
    }

    /// Vertices driving `id`, in insertion order.
    pub fn inward(&self, id: VertexId) -> &IndexSet<VertexId> {
        &self.inward[id.index()]
    }

    /// Live vertex handles in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| VertexId::from_index(index))
    }

    /// Depth-first walk over outward edges from `start`.
    ///
    /// `visit` is called once per entered vertex with mutable access to the
    /// graph. A vertex is skipped only while it is on the active path: it is
    /// released as soon as it is pruned or its descent completes, so other
    /// paths may revisit it. An `Err` from `visit` aborts the walk.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `visit`.
    pub fn dfs<E, F>(&mut self, start: VertexId, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&mut Self, VertexId) -> Result<Visit, E>,
    {
        if !self.contains(start) {
            return Ok(());
        }

        let mut marked = vec![false; self.slots.len()];
        // (vertex, index of the next outward neighbour to enter)
        let mut stack: Vec<(VertexId, usize)> = Vec::new();

        marked[start.index()] = true;
        match visit(self, start)? {
            Visit::Descend => stack.push((start, 0)),
            Visit::Prune => return Ok(()),
        }

        while let Some(&(current, cursor)) = stack.last() {
            let Some(&next) = self.outward[current.index()].get_index(cursor) else {
                marked[current.index()] = false;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            if marked.get(next.index()).copied().unwrap_or(false) || !self.contains(next) {
                continue;
            }
            match visit(self, next)? {
                Visit::Descend => {
                    // The visitor may have grown the graph.
                    if next.index() >= marked.len() {
                        marked.resize(self.slots.len(), false);
                    }
                    marked[next.index()] = true;
                    stack.push((next, 0));
                }
                Visit::Prune => {}
            }
        }

        Ok(())
    }
}

impl<T: Clone> Graph<T> {
    /// Build a new graph `uid` from the disjoint union of `graphs`.
    ///
    /// Every vertex is re-inserted as `uid::name` and every edge is copied
    /// with both adjacency orders preserved. Handles of the k-th input graph
    /// are shifted by the total [`slot_count`](Graph::slot_count) of the
    /// graphs before it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateVertex`] if two inputs share a name.
    pub fn merge<'a, I>(uid: impl Into<String>, graphs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = &'a Graph<T>>,
        T: 'a,
    {
        let mut merged = Self::new(uid);

        for graph in graphs {
            let offset = merged.slots.len();
            for slot in &graph.slots {
                match slot {
                    Some(slot) => {
                        let name = slot.name.qualified(&merged.uid);
                        merged.insert(name, slot.payload.clone())?;
                    }
                    None => {
                        // Keep the tombstone so shifted handles stay aligned.
                        merged.slots.push(None);
                        merged.outward.push(IndexSet::new());
                        merged.inward.push(IndexSet::new());
                    }
                }
            }

            let shift = |ids: &IndexSet<VertexId>| -> IndexSet<VertexId> {
                ids.iter()
                    .filter(|id| graph.contains(**id))
                    .map(|id| id.shifted(offset))
                    .collect()
            };
            for (index, slot) in graph.slots.iter().enumerate() {
                if slot.is_some() {
                    merged.outward[offset + index] = shift(&graph.outward[index]);
                    merged.inward[offset + index] = shift(&graph.inward[index]);
                }
            }
        }

        Ok(merged)
    }
}
