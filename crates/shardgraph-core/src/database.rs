//! # Graph Database Façade
//!
//! One `GraphDatabase` hosts one partition of the logical graph. For every
//! operation it decodes the target's global id, serves it from the local
//! store if this partition owns it, and otherwise invokes the owning
//! partition's `RemoteAccess` capability (resolved lazily and cached).
//!
//! All structural protocols — sequence append/unlink, incidence ring
//! surgery, version bumps, deferred cascade deletion — are written once
//! against kind-generic accessors that dispatch per field, so the same
//! code path covers local and remote operands.
//!
//! Not internally thread-safe: callers serialize structural mutation per
//! partition (one control thread per partition process).

use crate::freelist::FreeIndexList;
use crate::proxy::{Proxy, ProxyCache};
use crate::remote::{RemoteAccess, RemoteResolver, Standalone};
use crate::schema::TypeRegistry;
use crate::store::{ElementRecord, GraphData, IncidenceRecord, LocalStore, ROOT_SUBGRAPH};
use crate::types::{
    Direction, EdgeId, ElementId, ElementKind, GlobalId, GraphError, IncidenceId, LocalId,
    PartitionId, SlotKind, TypeId, VertexId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

// =============================================================================
// OPTIONS & STATS
// =============================================================================

/// Sizing knobs for one partition, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseOptions {
    /// Hard bound on live vertices.
    pub max_vertices: u32,
    /// Hard bound on live edges.
    pub max_edges: u32,
    /// Hard bound on live incidences.
    pub max_incidences: u32,
    /// Bound on resident remote proxies.
    pub proxy_cache_capacity: usize,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_vertices: u32::MAX,
            max_edges: u32::MAX,
            max_incidences: u32::MAX,
            proxy_cache_capacity: 1024,
        }
    }
}

/// How often this façade took the local fast path versus a remote leaf call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoutingStats {
    /// Field accesses served by the local store.
    pub local_ops: u64,
    /// Leaf calls sent to peer capabilities.
    pub remote_calls: u64,
}

// =============================================================================
// RESOLVED ELEMENT
// =============================================================================

/// What `resolve_element` hands back: the authoritative local record's
/// identity, or a cached remote stand-in.
#[derive(Debug, Clone)]
pub enum Element {
    /// The element lives in this partition.
    Local {
        /// Its kind-qualified address.
        id: ElementId,
        /// Its schema type tag.
        type_id: TypeId,
    },
    /// The element lives elsewhere; accesses forward through the owner.
    Remote(Rc<Proxy>),
}

impl Element {
    /// The element's kind-qualified address.
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Local { id, .. } => *id,
            Self::Remote(proxy) => proxy.id,
        }
    }

    /// The element's schema type tag.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::Local { type_id, .. } => *type_id,
            Self::Remote(proxy) => proxy.type_id,
        }
    }

    /// Whether this is a remote stand-in.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

// =============================================================================
// GRAPH DATABASE
// =============================================================================

/// The storage façade of one partition.
pub struct GraphDatabase {
    partition: PartitionId,
    schema: Rc<TypeRegistry>,
    store: LocalStore,
    vertex_ids: FreeIndexList,
    edge_ids: FreeIndexList,
    incidence_ids: FreeIndexList,
    proxies: ProxyCache,
    peers: BTreeMap<PartitionId, Rc<dyn RemoteAccess>>,
    resolver: Box<dyn RemoteResolver>,
    stats: RoutingStats,
}

impl std::fmt::Debug for GraphDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphDatabase")
            .field("partition", &self.partition)
            .field("stats", &self.stats)
            .finish()
    }
}

impl GraphDatabase {
    /// Create the database of one partition.
    ///
    /// Fails with [`GraphError::InvalidPartition`] for partition 0.
    pub fn new(
        partition: PartitionId,
        options: DatabaseOptions,
        schema: Rc<TypeRegistry>,
        resolver: Box<dyn RemoteResolver>,
    ) -> Result<Self, GraphError> {
        if !partition.is_valid() {
            return Err(GraphError::InvalidPartition);
        }
        let mut store = LocalStore::new();
        store.store_subgraph(ROOT_SUBGRAPH, GraphData::default());
        Ok(Self {
            partition,
            proxies: ProxyCache::new(options.proxy_cache_capacity),
            vertex_ids: FreeIndexList::with_capacity(
                partition,
                SlotKind::Vertex,
                options.max_vertices,
            ),
            edge_ids: FreeIndexList::with_capacity(partition, SlotKind::Edge, options.max_edges),
            incidence_ids: FreeIndexList::with_capacity(
                partition,
                SlotKind::Incidence,
                options.max_incidences,
            ),
            schema,
            store,
            peers: BTreeMap::new(),
            resolver,
            stats: RoutingStats::default(),
        })
    }

    /// A single-partition deployment: every remote partition is unreachable.
    pub fn standalone(
        partition: PartitionId,
        schema: Rc<TypeRegistry>,
    ) -> Result<Self, GraphError> {
        Self::new(
            partition,
            DatabaseOptions::default(),
            schema,
            Box::new(Standalone),
        )
    }

    /// The partition this database hosts.
    #[must_use]
    pub const fn partition(&self) -> PartitionId {
        self.partition
    }

    /// The shared type registry.
    #[must_use]
    pub fn schema(&self) -> &TypeRegistry {
        &self.schema
    }

    /// Local/remote dispatch counters.
    #[must_use]
    pub const fn routing_stats(&self) -> RoutingStats {
        self.stats
    }

    /// Read access to the proxy cache (residency and hit statistics).
    #[must_use]
    pub const fn proxy_cache(&self) -> &ProxyCache {
        &self.proxies
    }

    /// The canonical top-level subgraph id of this partition.
    #[must_use]
    pub const fn root_id(&self) -> GlobalId {
        GlobalId::subgraph_root(self.partition)
    }
}

// =============================================================================
// ROUTING PRIMITIVES
// =============================================================================

impl GraphDatabase {
    /// Whether `partition` is served by the local store. Partition 0 is
    /// never addressable.
    fn owns(&self, partition: PartitionId) -> Result<bool, GraphError> {
        if !partition.is_valid() {
            return Err(GraphError::InvalidPartition);
        }
        Ok(partition == self.partition)
    }

    fn note_local(&mut self) {
        self.stats.local_ops = self.stats.local_ops.saturating_add(1);
    }

    /// Resolve (or lazily establish, then cache) the capability for a
    /// remote partition. Every call through here is one remote leaf call.
    fn peer(&mut self, partition: PartitionId) -> Result<Rc<dyn RemoteAccess>, GraphError> {
        self.stats.remote_calls = self.stats.remote_calls.saturating_add(1);
        if let Some(peer) = self.peers.get(&partition) {
            return Ok(Rc::clone(peer));
        }
        let peer = self.resolver.connect(partition)?;
        self.peers.insert(partition, Rc::clone(&peer));
        Ok(peer)
    }
}

// =============================================================================
// LOCAL LEAF OPERATIONS
// =============================================================================
//
// The peer-facing side of the capability contract: everything a transport
// server (or the in-process router) applies on behalf of a remote caller.
// Each touches only this partition's state and never dispatches.

impl GraphDatabase {
    /// Whether the local slot holds a live element.
    #[must_use]
    pub fn local_element_exists(&self, kind: ElementKind, local: LocalId) -> bool {
        self.store.element(kind, local).is_some()
    }

    /// The local element record, or the invalid-reference contract error.
    pub fn local_element(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<&ElementRecord, GraphError> {
        self.store
            .element(kind, local)
            .ok_or_else(|| GraphError::InvalidReference(ElementId::new(kind, self.partition, local)))
    }

    /// Mutable access to the local element record.
    pub fn local_element_mut(
        &mut self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<&mut ElementRecord, GraphError> {
        let partition = self.partition;
        self.store
            .element_mut(kind, local)
            .ok_or_else(|| GraphError::InvalidReference(ElementId::new(kind, partition, local)))
    }

    /// The local incidence record, or the invalid-reference contract error.
    pub fn local_incidence(&self, local: LocalId) -> Result<&IncidenceRecord, GraphError> {
        self.store
            .incidence(local)
            .ok_or_else(|| GraphError::InvalidIncidence(IncidenceId::new(self.partition, local)))
    }

    /// Mutable access to the local incidence record.
    pub fn local_incidence_mut(
        &mut self,
        local: LocalId,
    ) -> Result<&mut IncidenceRecord, GraphError> {
        let partition = self.partition;
        self.store
            .incidence_mut(local)
            .ok_or_else(|| GraphError::InvalidIncidence(IncidenceId::new(partition, local)))
    }

    /// This partition's top-level subgraph metadata.
    #[must_use]
    pub fn local_graph_data(&self) -> &GraphData {
        self.store.subgraph(ROOT_SUBGRAPH).unwrap_or(&GraphData::EMPTY)
    }

    /// Mutable access to the top-level subgraph metadata.
    pub fn local_graph_data_mut(&mut self) -> &mut GraphData {
        self.store.subgraph_entry(ROOT_SUBGRAPH)
    }

    /// Bump the incidence-list version of a local element.
    pub fn local_bump_incidence_version(
        &mut self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<(), GraphError> {
        let record = self.local_element_mut(kind, local)?;
        record.incidence_version = record.incidence_version.saturating_add(1);
        Ok(())
    }

    fn free_list_mut(&mut self, kind: ElementKind) -> &mut FreeIndexList {
        match kind {
            ElementKind::Vertex => &mut self.vertex_ids,
            ElementKind::Edge => &mut self.edge_ids,
        }
    }

    /// Allocate a local id, install an empty-incidence record and append it
    /// to this partition's global sequence of `kind` (O(1)).
    pub fn local_create_element(
        &mut self,
        kind: ElementKind,
        type_id: TypeId,
    ) -> Result<LocalId, GraphError> {
        self.schema.expect_kind(type_id, kind.into())?;
        let local = self.free_list_mut(kind).allocate()?;
        let global = GlobalId::encode(self.partition, local);

        let old_last = self.local_graph_data().last(kind);
        let mut record = ElementRecord::new(type_id);
        record.prev = old_last;
        self.store.store_element(kind, local, record);

        match old_last {
            Some(tail) => {
                self.local_element_mut(kind, tail.local())?.next = Some(global);
            }
            None => self.local_graph_data_mut().set_first(kind, Some(global)),
        }
        let data = self.local_graph_data_mut();
        data.set_last(kind, Some(global));
        data.increment_count(kind);
        data.bump_sequence_version(kind);
        Ok(local)
    }

    /// Clear an element slot and recycle its id. The element must already
    /// be unlinked from the sequence and hold no incidences.
    pub fn local_free_element(&mut self, kind: ElementKind, local: LocalId) -> Result<(), GraphError> {
        let removed = self.store.remove_element(kind, local);
        if removed.is_none() {
            return Err(GraphError::InvalidReference(ElementId::new(
                kind,
                self.partition,
                local,
            )));
        }
        self.free_list_mut(kind).free(local);
        let data = self.local_graph_data_mut();
        data.decrement_count(kind);
        data.bump_sequence_version(kind);
        Ok(())
    }

    /// Install an unlinked incidence record and count it.
    pub fn local_create_incidence(
        &mut self,
        type_id: TypeId,
        vertex: VertexId,
        edge: EdgeId,
        direction: Direction,
    ) -> Result<LocalId, GraphError> {
        // Participations may carry a dedicated incidence type or reuse the
        // edge's tag; vertex and subgraph tags are schema errors.
        let descriptor = self.schema.descriptor(type_id)?;
        if !matches!(descriptor.kind, SlotKind::Incidence | SlotKind::Edge) {
            return Err(GraphError::KindMismatch {
                type_id,
                expected: SlotKind::Incidence,
                actual: descriptor.kind,
            });
        }
        let local = self.incidence_ids.allocate()?;
        self.store
            .store_incidence(local, IncidenceRecord::new(type_id, vertex, edge, direction));
        let data = self.local_graph_data_mut();
        data.incidence_count = data.incidence_count.saturating_add(1);
        Ok(local)
    }

    /// Clear an incidence slot and recycle its id. The incidence must
    /// already be unlinked from both endpoint lists.
    pub fn local_free_incidence(&mut self, local: LocalId) -> Result<(), GraphError> {
        if self.store.remove_incidence(local).is_none() {
            return Err(GraphError::InvalidIncidence(IncidenceId::new(
                self.partition,
                local,
            )));
        }
        self.incidence_ids.free(local);
        let data = self.local_graph_data_mut();
        data.incidence_count = data.incidence_count.saturating_sub(1);
        Ok(())
    }
}

// =============================================================================
// DISPATCHING FIELD ACCESSORS
// =============================================================================
//
// Kind-generic accessors the structural protocols are written against.
// Each decodes the owning partition and either takes the local fast path
// or invokes one remote leaf.

impl GraphDatabase {
    /// Whether the id names a live element, wherever it lives.
    pub fn element_exists(&mut self, el: ElementId) -> Result<bool, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element_exists(el.kind(), el.local()))
        } else {
            Ok(self.peer(el.partition())?.element_exists(el.kind(), el.local())?)
        }
    }

    fn type_of(&mut self, el: ElementId) -> Result<TypeId, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.type_id)
        } else {
            Ok(self.peer(el.partition())?.element_type_id(el.kind(), el.local())?)
        }
    }

    fn next_of(&mut self, el: ElementId) -> Result<Option<GlobalId>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.next)
        } else {
            Ok(self.peer(el.partition())?.element_next(el.kind(), el.local())?)
        }
    }

    fn set_next_of(&mut self, el: ElementId, next: Option<GlobalId>) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.next = next;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_next(el.kind(), el.local(), next)?)
        }
    }

    fn prev_of(&mut self, el: ElementId) -> Result<Option<GlobalId>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.prev)
        } else {
            Ok(self.peer(el.partition())?.element_prev(el.kind(), el.local())?)
        }
    }

    fn set_prev_of(&mut self, el: ElementId, prev: Option<GlobalId>) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.prev = prev;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_prev(el.kind(), el.local(), prev)?)
        }
    }

    fn first_incidence_of(&mut self, el: ElementId) -> Result<Option<IncidenceId>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.first_incidence)
        } else {
            Ok(self
                .peer(el.partition())?
                .element_first_incidence(el.kind(), el.local())?)
        }
    }

    fn set_first_incidence_of(
        &mut self,
        el: ElementId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.first_incidence = incidence;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_first_incidence(el.kind(), el.local(), incidence)?)
        }
    }

    fn last_incidence_of(&mut self, el: ElementId) -> Result<Option<IncidenceId>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.last_incidence)
        } else {
            Ok(self
                .peer(el.partition())?
                .element_last_incidence(el.kind(), el.local())?)
        }
    }

    fn set_last_incidence_of(
        &mut self,
        el: ElementId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.last_incidence = incidence;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_last_incidence(el.kind(), el.local(), incidence)?)
        }
    }

    fn bump_version_of(&mut self, el: ElementId) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_bump_incidence_version(el.kind(), el.local())
        } else {
            Ok(self
                .peer(el.partition())?
                .bump_incidence_list_version(el.kind(), el.local())?)
        }
    }

    fn incidence_field<T>(
        &mut self,
        inc: IncidenceId,
        local_read: impl FnOnce(&IncidenceRecord) -> T,
        remote_read: impl FnOnce(&dyn RemoteAccess, LocalId) -> Result<T, crate::remote::RemoteFault>,
    ) -> Result<T, GraphError> {
        if self.owns(inc.partition())? {
            self.note_local();
            Ok(local_read(self.local_incidence(inc.local())?))
        } else {
            let peer = self.peer(inc.partition())?;
            Ok(remote_read(peer.as_ref(), inc.local())?)
        }
    }

    fn inc_next(
        &mut self,
        inc: IncidenceId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.incidence_field(
            inc,
            |r| match anchor {
                ElementKind::Vertex => r.next_at_vertex,
                ElementKind::Edge => r.next_at_edge,
            },
            |peer, local| peer.incidence_next(local, anchor),
        )
    }

    fn set_inc_next(
        &mut self,
        inc: IncidenceId,
        anchor: ElementKind,
        next: Option<IncidenceId>,
    ) -> Result<(), GraphError> {
        if self.owns(inc.partition())? {
            self.note_local();
            let record = self.local_incidence_mut(inc.local())?;
            match anchor {
                ElementKind::Vertex => record.next_at_vertex = next,
                ElementKind::Edge => record.next_at_edge = next,
            }
            Ok(())
        } else {
            Ok(self
                .peer(inc.partition())?
                .set_incidence_next(inc.local(), anchor, next)?)
        }
    }

    fn inc_prev(
        &mut self,
        inc: IncidenceId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.incidence_field(
            inc,
            |r| match anchor {
                ElementKind::Vertex => r.prev_at_vertex,
                ElementKind::Edge => r.prev_at_edge,
            },
            |peer, local| peer.incidence_prev(local, anchor),
        )
    }

    fn set_inc_prev(
        &mut self,
        inc: IncidenceId,
        anchor: ElementKind,
        prev: Option<IncidenceId>,
    ) -> Result<(), GraphError> {
        if self.owns(inc.partition())? {
            self.note_local();
            let record = self.local_incidence_mut(inc.local())?;
            match anchor {
                ElementKind::Vertex => record.prev_at_vertex = prev,
                ElementKind::Edge => record.prev_at_edge = prev,
            }
            Ok(())
        } else {
            Ok(self
                .peer(inc.partition())?
                .set_incidence_prev(inc.local(), anchor, prev)?)
        }
    }

    fn seq_first(
        &mut self,
        partition: PartitionId,
        kind: ElementKind,
    ) -> Result<Option<GlobalId>, GraphError> {
        if self.owns(partition)? {
            self.note_local();
            Ok(self.local_graph_data().first(kind))
        } else {
            Ok(self.peer(partition)?.first_element(kind)?)
        }
    }

    fn set_seq_first(
        &mut self,
        partition: PartitionId,
        kind: ElementKind,
        id: Option<GlobalId>,
    ) -> Result<(), GraphError> {
        if self.owns(partition)? {
            self.note_local();
            self.local_graph_data_mut().set_first(kind, id);
            Ok(())
        } else {
            Ok(self.peer(partition)?.set_first_element(kind, id)?)
        }
    }

    fn seq_last(
        &mut self,
        partition: PartitionId,
        kind: ElementKind,
    ) -> Result<Option<GlobalId>, GraphError> {
        if self.owns(partition)? {
            self.note_local();
            Ok(self.local_graph_data().last(kind))
        } else {
            Ok(self.peer(partition)?.last_element(kind)?)
        }
    }

    fn set_seq_last(
        &mut self,
        partition: PartitionId,
        kind: ElementKind,
        id: Option<GlobalId>,
    ) -> Result<(), GraphError> {
        if self.owns(partition)? {
            self.note_local();
            self.local_graph_data_mut().set_last(kind, id);
            Ok(())
        } else {
            Ok(self.peer(partition)?.set_last_element(kind, id)?)
        }
    }

    fn free_element_slot(&mut self, el: ElementId) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_free_element(el.kind(), el.local())
        } else {
            Ok(self.peer(el.partition())?.free_element(el.kind(), el.local())?)
        }
    }

    fn free_incidence_slot(&mut self, inc: IncidenceId) -> Result<(), GraphError> {
        if self.owns(inc.partition())? {
            self.note_local();
            self.local_free_incidence(inc.local())
        } else {
            Ok(self.peer(inc.partition())?.free_incidence(inc.local())?)
        }
    }
}

// =============================================================================
// UPWARD INTERFACE: RESOLUTION & PROXIES
// =============================================================================

impl GraphDatabase {
    /// Resolve an element wherever it lives. Remote elements come back as
    /// cached stand-ins; the type is fetched with one remote round trip on
    /// a cache miss. `Ok(None)` means no live element bears this id.
    pub fn resolve_element(&mut self, el: ElementId) -> Result<Option<Element>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.store.element(el.kind(), el.local()).map(|record| {
                Element::Local {
                    id: el,
                    type_id: record.type_id,
                }
            }))
        } else {
            if let Some(proxy) = self.proxies.get(el) {
                return Ok(Some(Element::Remote(proxy)));
            }
            let peer = self.peer(el.partition())?;
            if !peer.element_exists(el.kind(), el.local())? {
                return Ok(None);
            }
            let type_id = peer.element_type_id(el.kind(), el.local())?;
            Ok(Some(Element::Remote(
                self.proxies.put(Proxy::new(el, type_id)),
            )))
        }
    }

    /// Explicitly forget one remote stand-in (the reclamation signal).
    pub fn evict_proxy(&mut self, el: ElementId) -> bool {
        self.proxies.evict(el)
    }

    /// Forget every remote stand-in.
    pub fn clear_proxies(&mut self) {
        self.proxies.clear();
    }
}

// =============================================================================
// UPWARD INTERFACE: STRUCTURAL MUTATION
// =============================================================================

impl GraphDatabase {
    /// Create a vertex in this partition and return its global id.
    pub fn create_vertex(&mut self, type_id: TypeId) -> Result<VertexId, GraphError> {
        let local = self.local_create_element(ElementKind::Vertex, type_id)?;
        self.note_local();
        Ok(VertexId::new(self.partition, local))
    }

    /// Create an edge in this partition together with its two endpoint
    /// incidences (`Out` at `alpha`, `In` at `omega`). The endpoints may
    /// live in any partition.
    pub fn create_edge(
        &mut self,
        type_id: TypeId,
        alpha: VertexId,
        omega: VertexId,
    ) -> Result<EdgeId, GraphError> {
        self.schema.expect_kind(type_id, SlotKind::Edge)?;
        if !self.element_exists(alpha.into())? {
            return Err(GraphError::InvalidReference(alpha.into()));
        }
        if !self.element_exists(omega.into())? {
            return Err(GraphError::InvalidReference(omega.into()));
        }
        let local = self.local_create_element(ElementKind::Edge, type_id)?;
        let edge = EdgeId::new(self.partition, local);
        self.create_incidence(type_id, alpha, edge, Direction::Out)?;
        self.create_incidence(type_id, omega, edge, Direction::In)?;
        Ok(edge)
    }

    /// Attach one more participation to an edge (k-ary edges). The
    /// incidence record lives in the edge's partition; both endpoint
    /// incidence lists gain a tail entry and both versions are bumped.
    pub fn create_incidence(
        &mut self,
        type_id: TypeId,
        vertex: VertexId,
        edge: EdgeId,
        direction: Direction,
    ) -> Result<IncidenceId, GraphError> {
        if !self.element_exists(vertex.into())? {
            return Err(GraphError::InvalidReference(vertex.into()));
        }
        if !self.element_exists(edge.into())? {
            return Err(GraphError::InvalidReference(edge.into()));
        }
        let local = if self.owns(edge.partition())? {
            self.note_local();
            self.local_create_incidence(type_id, vertex, edge, direction)?
        } else {
            self.peer(edge.partition())?
                .create_incidence(type_id, vertex, edge, direction)?
        };
        let inc = IncidenceId::new(edge.partition(), local);
        self.link_incidence(inc, vertex.into())?;
        self.link_incidence(inc, edge.into())?;
        Ok(inc)
    }

    /// Append `inc` at the tail of `owner`'s incidence list and bump the
    /// owner's version.
    fn link_incidence(&mut self, inc: IncidenceId, owner: ElementId) -> Result<(), GraphError> {
        let anchor = owner.kind();
        let old_last = self.last_incidence_of(owner)?;
        self.set_inc_prev(inc, anchor, old_last)?;
        match old_last {
            Some(tail) => self.set_inc_next(tail, anchor, Some(inc))?,
            None => self.set_first_incidence_of(owner, Some(inc))?,
        }
        self.set_last_incidence_of(owner, Some(inc))?;
        self.bump_version_of(owner)
    }

    /// Unlink `inc` from `owner`'s incidence list and bump the owner's
    /// version.
    fn unlink_incidence(&mut self, inc: IncidenceId, owner: ElementId) -> Result<(), GraphError> {
        let anchor = owner.kind();
        let next = self.inc_next(inc, anchor)?;
        let prev = self.inc_prev(inc, anchor)?;
        match prev {
            Some(p) => self.set_inc_next(p, anchor, next)?,
            None => self.set_first_incidence_of(owner, next)?,
        }
        match next {
            Some(n) => self.set_inc_prev(n, anchor, prev)?,
            None => self.set_last_incidence_of(owner, prev)?,
        }
        self.bump_version_of(owner)
    }

    /// Delete one incidence: unlink it from both endpoint lists (bumping
    /// both versions), then free its slot.
    pub fn delete_incidence(&mut self, inc: IncidenceId) -> Result<(), GraphError> {
        let vertex = self.incidence_vertex(inc)?;
        let edge = self.incidence_edge(inc)?;
        self.unlink_incidence(inc, vertex.into())?;
        self.unlink_incidence(inc, edge.into())?;
        self.free_incidence_slot(inc)
    }

    /// Delete an element wherever it lives.
    ///
    /// Runs the deferred-delete worklist: the element is unlinked from its
    /// partition's global sequence, every incidence in its list is deleted
    /// (bumping the version of every endpoint that loses one), elements
    /// composed into it (sigma children, discovered in its owning
    /// partition) are queued for the same treatment, and its local id is
    /// recycled. A vertex additionally queues every edge it participates
    /// in: an edge cannot outlive an endpoint, so deleting a vertex also
    /// scrubs its edges from the surviving endpoints' incidence lists.
    /// Iterative processing bounds stack depth and tolerates containment
    /// cycles.
    pub fn delete_element(&mut self, seed: ElementId) -> Result<(), GraphError> {
        if !self.element_exists(seed)? {
            return Err(GraphError::InvalidReference(seed));
        }
        let mut work: VecDeque<ElementId> = VecDeque::from([seed]);
        let mut visited: BTreeSet<ElementId> = BTreeSet::new();

        while let Some(el) = work.pop_front() {
            if !visited.insert(el) {
                continue;
            }
            // A queued child may already be gone (shared containment).
            if el != seed && !self.element_exists(el)? {
                continue;
            }
            self.collect_sigma_children(el, &mut work)?;
            if el.kind() == ElementKind::Vertex {
                self.collect_incident_edges(el, &mut work)?;
            }
            while let Some(inc) = self.first_incidence_of(el)? {
                self.delete_incidence(inc)?;
            }
            self.unlink_element(el)?;
            self.free_element_slot(el)?;
            self.proxies.evict(el);
        }
        Ok(())
    }

    /// Queue every edge a doomed vertex participates in. Collected before
    /// the vertex's own incidences are torn down, while its list still
    /// names them.
    fn collect_incident_edges(
        &mut self,
        vertex: ElementId,
        work: &mut VecDeque<ElementId>,
    ) -> Result<(), GraphError> {
        let mut cursor = self.first_incidence_of(vertex)?;
        while let Some(inc) = cursor {
            let edge = self.incidence_edge(inc)?;
            work.push_back(edge.into());
            cursor = self.inc_next(inc, ElementKind::Vertex)?;
        }
        Ok(())
    }

    /// Queue every element of the owner partition whose sigma names
    /// `parent`. Cross-partition containment cascades are the higher-level
    /// protocol's responsibility.
    fn collect_sigma_children(
        &mut self,
        parent: ElementId,
        work: &mut VecDeque<ElementId>,
    ) -> Result<(), GraphError> {
        let partition = parent.partition();
        for kind in [ElementKind::Vertex, ElementKind::Edge] {
            let mut cursor = self.seq_first(partition, kind)?;
            while let Some(global) = cursor {
                let el = ElementId::new(kind, global.partition(), global.local());
                if self.sigma(el)? == Some(parent) {
                    work.push_back(el);
                }
                cursor = self.next_of(el)?;
            }
        }
        Ok(())
    }

    /// Unlink an element from its partition's global sequence (O(1) via
    /// the stored prev/next links).
    fn unlink_element(&mut self, el: ElementId) -> Result<(), GraphError> {
        let kind = el.kind();
        let partition = el.partition();
        let next = self.next_of(el)?;
        let prev = self.prev_of(el)?;
        match prev {
            Some(p) => self.set_next_of(ElementId::new(kind, p.partition(), p.local()), next)?,
            None => self.set_seq_first(partition, kind, next)?,
        }
        match next {
            Some(n) => self.set_prev_of(ElementId::new(kind, n.partition(), n.local()), prev)?,
            None => self.set_seq_last(partition, kind, prev)?,
        }
        Ok(())
    }
}

// =============================================================================
// UPWARD INTERFACE: HIERARCHY (SIGMA / KAPPA)
// =============================================================================

impl GraphDatabase {
    /// The hierarchical parent of an element, `None` at top level.
    pub fn sigma(&mut self, el: ElementId) -> Result<Option<ElementId>, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.sigma)
        } else {
            Ok(self.peer(el.partition())?.element_sigma(el.kind(), el.local())?)
        }
    }

    /// Reparent an element. A non-null parent must name a live element;
    /// no tree-shape invariant is imposed here.
    pub fn set_sigma(
        &mut self,
        el: ElementId,
        sigma: Option<ElementId>,
    ) -> Result<(), GraphError> {
        if let Some(parent) = sigma {
            if !self.element_exists(parent)? {
                return Err(GraphError::InvalidReference(parent));
            }
        }
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.sigma = sigma;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_sigma(el.kind(), el.local(), sigma)?)
        }
    }

    /// The abstraction level of an element.
    pub fn kappa(&mut self, el: ElementId) -> Result<u32, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.kappa)
        } else {
            Ok(self.peer(el.partition())?.element_kappa(el.kind(), el.local())?)
        }
    }

    /// Replace the abstraction level of an element.
    pub fn set_kappa(&mut self, el: ElementId, kappa: u32) -> Result<(), GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            self.local_element_mut(el.kind(), el.local())?.kappa = kappa;
            Ok(())
        } else {
            Ok(self
                .peer(el.partition())?
                .set_element_kappa(el.kind(), el.local(), kappa)?)
        }
    }
}

// =============================================================================
// UPWARD INTERFACE: NAVIGATION & VERSIONS
// =============================================================================

impl GraphDatabase {
    /// Head of a partition's vertex sequence; `None` is the end sentinel.
    pub fn first_vertex(&mut self, partition: PartitionId) -> Result<Option<VertexId>, GraphError> {
        Ok(self.seq_first(partition, ElementKind::Vertex)?.map(VertexId))
    }

    /// Tail of a partition's vertex sequence.
    pub fn last_vertex(&mut self, partition: PartitionId) -> Result<Option<VertexId>, GraphError> {
        Ok(self.seq_last(partition, ElementKind::Vertex)?.map(VertexId))
    }

    /// Successor of a vertex in its partition's sequence.
    pub fn next_vertex(&mut self, vertex: VertexId) -> Result<Option<VertexId>, GraphError> {
        Ok(self.next_of(vertex.into())?.map(VertexId))
    }

    /// Predecessor of a vertex in its partition's sequence.
    pub fn prev_vertex(&mut self, vertex: VertexId) -> Result<Option<VertexId>, GraphError> {
        Ok(self.prev_of(vertex.into())?.map(VertexId))
    }

    /// Head of a partition's edge sequence.
    pub fn first_edge(&mut self, partition: PartitionId) -> Result<Option<EdgeId>, GraphError> {
        Ok(self.seq_first(partition, ElementKind::Edge)?.map(EdgeId))
    }

    /// Tail of a partition's edge sequence.
    pub fn last_edge(&mut self, partition: PartitionId) -> Result<Option<EdgeId>, GraphError> {
        Ok(self.seq_last(partition, ElementKind::Edge)?.map(EdgeId))
    }

    /// Successor of an edge in its partition's sequence.
    pub fn next_edge(&mut self, edge: EdgeId) -> Result<Option<EdgeId>, GraphError> {
        Ok(self.next_of(edge.into())?.map(EdgeId))
    }

    /// Predecessor of an edge in its partition's sequence.
    pub fn prev_edge(&mut self, edge: EdgeId) -> Result<Option<EdgeId>, GraphError> {
        Ok(self.prev_of(edge.into())?.map(EdgeId))
    }

    /// First incidence of an element's list.
    pub fn first_incidence(&mut self, el: ElementId) -> Result<Option<IncidenceId>, GraphError> {
        self.first_incidence_of(el)
    }

    /// Last incidence of an element's list.
    pub fn last_incidence(&mut self, el: ElementId) -> Result<Option<IncidenceId>, GraphError> {
        self.last_incidence_of(el)
    }

    /// Successor of an incidence in its vertex's list.
    pub fn next_incidence_at_vertex(
        &mut self,
        inc: IncidenceId,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.inc_next(inc, ElementKind::Vertex)
    }

    /// Predecessor of an incidence in its vertex's list.
    pub fn prev_incidence_at_vertex(
        &mut self,
        inc: IncidenceId,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.inc_prev(inc, ElementKind::Vertex)
    }

    /// Successor of an incidence in its edge's list.
    pub fn next_incidence_at_edge(
        &mut self,
        inc: IncidenceId,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.inc_next(inc, ElementKind::Edge)
    }

    /// Predecessor of an incidence in its edge's list.
    pub fn prev_incidence_at_edge(
        &mut self,
        inc: IncidenceId,
    ) -> Result<Option<IncidenceId>, GraphError> {
        self.inc_prev(inc, ElementKind::Edge)
    }

    /// The participating vertex of an incidence.
    pub fn incidence_vertex(&mut self, inc: IncidenceId) -> Result<VertexId, GraphError> {
        self.incidence_field(inc, |r| r.vertex, |peer, local| peer.incidence_vertex(local))
    }

    /// The participating edge of an incidence.
    pub fn incidence_edge(&mut self, inc: IncidenceId) -> Result<EdgeId, GraphError> {
        self.incidence_field(inc, |r| r.edge, |peer, local| peer.incidence_edge(local))
    }

    /// The direction flag of an incidence.
    pub fn incidence_direction(&mut self, inc: IncidenceId) -> Result<Direction, GraphError> {
        self.incidence_field(
            inc,
            |r| r.direction,
            |peer, local| peer.incidence_direction(local),
        )
    }

    /// The type tag of an element, wherever it lives.
    pub fn element_type(&mut self, el: ElementId) -> Result<TypeId, GraphError> {
        self.type_of(el)
    }

    /// The incidence-list version of an element. Iterators snapshot this
    /// at start; any change means "structure changed, iteration invalid".
    pub fn incidence_list_version(&mut self, el: ElementId) -> Result<u64, GraphError> {
        if self.owns(el.partition())? {
            self.note_local();
            Ok(self.local_element(el.kind(), el.local())?.incidence_version)
        } else {
            Ok(self
                .peer(el.partition())?
                .incidence_list_version(el.kind(), el.local())?)
        }
    }

    /// Live vertex count of a partition.
    pub fn vertex_count(&mut self, partition: PartitionId) -> Result<u64, GraphError> {
        self.count_of(partition, ElementKind::Vertex)
    }

    /// Live edge count of a partition.
    pub fn edge_count(&mut self, partition: PartitionId) -> Result<u64, GraphError> {
        self.count_of(partition, ElementKind::Edge)
    }

    fn count_of(&mut self, partition: PartitionId, kind: ElementKind) -> Result<u64, GraphError> {
        if self.owns(partition)? {
            self.note_local();
            Ok(self.local_graph_data().count(kind))
        } else {
            Ok(self.peer(partition)?.element_count(kind)?)
        }
    }

    /// Live incidence count of a partition.
    pub fn incidence_count(&mut self, partition: PartitionId) -> Result<u64, GraphError> {
        if self.owns(partition)? {
            self.note_local();
            Ok(self.local_graph_data().incidence_count)
        } else {
            Ok(self.peer(partition)?.incidence_count()?)
        }
    }

    /// Structural version of a partition's vertex or edge sequence.
    pub fn sequence_version(
        &mut self,
        partition: PartitionId,
        kind: ElementKind,
    ) -> Result<u64, GraphError> {
        if self.owns(partition)? {
            self.note_local();
            Ok(self.local_graph_data().sequence_version(kind))
        } else {
            Ok(self.peer(partition)?.sequence_version(kind)?)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotKind;

    fn schema() -> Rc<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        registry.register("Node", SlotKind::Vertex).expect("register");
        registry.register("Link", SlotKind::Edge).expect("register");
        registry
            .register("EndPoint", SlotKind::Incidence)
            .expect("register");
        Rc::new(registry)
    }

    fn db() -> GraphDatabase {
        GraphDatabase::standalone(PartitionId(1), schema()).expect("db")
    }

    fn vertex_type() -> TypeId {
        TypeId(0)
    }

    fn edge_type() -> TypeId {
        TypeId(1)
    }

    #[test]
    fn partition_zero_is_rejected() {
        let err = GraphDatabase::standalone(PartitionId(0), schema());
        assert!(matches!(err, Err(GraphError::InvalidPartition)));
    }

    #[test]
    fn create_vertex_returns_partition_qualified_id() {
        let mut db = db();
        let v = db.create_vertex(vertex_type()).expect("create");
        assert_eq!(v.partition(), PartitionId(1));
        assert_eq!(v.local(), LocalId(1));
        assert_eq!(db.vertex_count(PartitionId(1)).expect("count"), 1);
    }

    #[test]
    fn create_vertex_rejects_edge_type() {
        let mut db = db();
        let err = db.create_vertex(edge_type());
        assert!(matches!(err, Err(GraphError::KindMismatch { .. })));
    }

    #[test]
    fn sequence_walk_visits_all_vertices_in_order() {
        let mut db = db();
        let ids: Vec<VertexId> = (0..5)
            .map(|_| db.create_vertex(vertex_type()).expect("create"))
            .collect();

        let mut walked = Vec::new();
        let mut cursor = db.first_vertex(PartitionId(1)).expect("first");
        while let Some(v) = cursor {
            walked.push(v);
            cursor = db.next_vertex(v).expect("next");
        }
        assert_eq!(walked, ids);
        assert_eq!(db.last_vertex(PartitionId(1)).expect("last"), Some(ids[4]));
    }

    #[test]
    fn deleting_interior_vertex_relinks_neighbors() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        let c = db.create_vertex(vertex_type()).expect("create");

        db.delete_element(b.into()).expect("delete");

        assert_eq!(db.next_vertex(a).expect("next"), Some(c));
        assert_eq!(db.prev_vertex(c).expect("prev"), Some(a));
        assert_eq!(db.vertex_count(PartitionId(1)).expect("count"), 2);
    }

    #[test]
    fn deleting_head_and_tail_updates_sequence_pointers() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");

        db.delete_element(a.into()).expect("delete");
        assert_eq!(db.first_vertex(PartitionId(1)).expect("first"), Some(b));
        db.delete_element(b.into()).expect("delete");
        assert_eq!(db.first_vertex(PartitionId(1)).expect("first"), None);
        assert_eq!(db.last_vertex(PartitionId(1)).expect("last"), None);
    }

    #[test]
    fn freed_local_id_is_reused() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        db.create_vertex(vertex_type()).expect("create");
        db.delete_element(a.into()).expect("delete");
        let c = db.create_vertex(vertex_type()).expect("create");
        assert_eq!(c.local(), a.local());
    }

    #[test]
    fn create_edge_links_both_incidence_lists() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        let e = db.create_edge(edge_type(), a, b).expect("create");

        let ia = db.first_incidence(a.into()).expect("first").expect("some");
        let ib = db.first_incidence(b.into()).expect("first").expect("some");
        assert_eq!(db.incidence_edge(ia).expect("edge"), e);
        assert_eq!(db.incidence_edge(ib).expect("edge"), e);
        assert_eq!(db.incidence_direction(ia).expect("dir"), Direction::Out);
        assert_eq!(db.incidence_direction(ib).expect("dir"), Direction::In);

        // The edge's list holds exactly the two endpoint incidences.
        let first = db.first_incidence(e.into()).expect("first").expect("some");
        let second = db
            .next_incidence_at_edge(first)
            .expect("next")
            .expect("some");
        assert_eq!(db.next_incidence_at_edge(second).expect("next"), None);
        assert_eq!(db.incidence_count(PartitionId(1)).expect("count"), 2);
    }

    #[test]
    fn k_ary_edge_walk_counts_every_participation() {
        let mut db = db();
        let e_vertices: Vec<VertexId> = (0..4)
            .map(|_| db.create_vertex(vertex_type()).expect("create"))
            .collect();
        let e = db
            .create_edge(edge_type(), e_vertices[0], e_vertices[1])
            .expect("create");
        db.create_incidence(TypeId(2), e_vertices[2], e, Direction::In)
            .expect("connect");
        db.create_incidence(TypeId(2), e_vertices[3], e, Direction::In)
            .expect("connect");

        let mut walked = 0;
        let mut cursor = db.first_incidence(e.into()).expect("first");
        while let Some(inc) = cursor {
            walked += 1;
            cursor = db.next_incidence_at_edge(inc).expect("next");
        }
        assert_eq!(walked, 4);
    }

    #[test]
    fn deleting_vertex_cascades_to_its_edges() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        let e = db.create_edge(edge_type(), a, b).expect("create");

        let before = db.incidence_list_version(b.into()).expect("version");
        db.delete_element(a.into()).expect("delete");

        // The edge cannot outlive its endpoint: E dies with A, and B's
        // incidence list is scrubbed and versioned.
        assert!(!db.element_exists(e.into()).expect("exists"));
        assert_eq!(db.first_incidence(b.into()).expect("first"), None);
        assert!(db.incidence_list_version(b.into()).expect("version") > before);
        assert_eq!(db.vertex_count(PartitionId(1)).expect("count"), 1);
        assert_eq!(db.edge_count(PartitionId(1)).expect("count"), 0);
        assert_eq!(db.incidence_count(PartitionId(1)).expect("count"), 0);
    }

    #[test]
    fn delete_edge_clears_both_vertex_lists() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        let e = db.create_edge(edge_type(), a, b).expect("create");

        db.delete_element(e.into()).expect("delete");
        assert_eq!(db.first_incidence(a.into()).expect("first"), None);
        assert_eq!(db.first_incidence(b.into()).expect("first"), None);
        assert_eq!(db.incidence_count(PartitionId(1)).expect("count"), 0);
        assert_eq!(db.edge_count(PartitionId(1)).expect("count"), 0);
    }

    #[test]
    fn version_strictly_increases_on_every_structural_change() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");

        let v0 = db.incidence_list_version(a.into()).expect("version");
        let e = db.create_edge(edge_type(), a, b).expect("create");
        let v1 = db.incidence_list_version(a.into()).expect("version");
        assert!(v1 > v0);

        db.delete_element(e.into()).expect("delete");
        let v2 = db.incidence_list_version(a.into()).expect("version");
        assert!(v2 > v1);
    }

    #[test]
    fn sigma_requires_a_live_parent() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let ghost = ElementId::new(ElementKind::Vertex, PartitionId(1), LocalId(99));

        let err = db.set_sigma(a.into(), Some(ghost));
        assert!(matches!(err, Err(GraphError::InvalidReference(_))));

        let b = db.create_vertex(vertex_type()).expect("create");
        db.set_sigma(a.into(), Some(b.into())).expect("set");
        assert_eq!(db.sigma(a.into()).expect("sigma"), Some(b.into()));
        db.set_sigma(a.into(), None).expect("clear");
        assert_eq!(db.sigma(a.into()).expect("sigma"), None);
    }

    #[test]
    fn kappa_roundtrips() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        assert_eq!(db.kappa(a.into()).expect("kappa"), 0);
        db.set_kappa(a.into(), 3).expect("set");
        assert_eq!(db.kappa(a.into()).expect("kappa"), 3);
    }

    #[test]
    fn deleting_parent_cascades_to_local_children() {
        let mut db = db();
        let parent = db.create_vertex(vertex_type()).expect("create");
        let child = db.create_vertex(vertex_type()).expect("create");
        let grandchild = db.create_vertex(vertex_type()).expect("create");
        db.set_sigma(child.into(), Some(parent.into())).expect("set");
        db.set_sigma(grandchild.into(), Some(child.into())).expect("set");

        db.delete_element(parent.into()).expect("delete");
        assert_eq!(db.vertex_count(PartitionId(1)).expect("count"), 0);
    }

    #[test]
    fn containment_cycles_terminate() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        db.set_sigma(a.into(), Some(b.into())).expect("set");
        db.set_sigma(b.into(), Some(a.into())).expect("set");

        db.delete_element(a.into()).expect("delete");
        assert_eq!(db.vertex_count(PartitionId(1)).expect("count"), 0);
    }

    #[test]
    fn deleting_a_dead_id_is_a_contract_violation() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        db.delete_element(a.into()).expect("delete");
        let err = db.delete_element(a.into());
        assert!(matches!(err, Err(GraphError::InvalidReference(_))));
    }

    #[test]
    fn resolve_local_element() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let element = db
            .resolve_element(a.into())
            .expect("resolve")
            .expect("present");
        assert!(!element.is_remote());
        assert_eq!(element.id(), a.into());
        assert_eq!(element.type_id(), vertex_type());

        let ghost = ElementId::new(ElementKind::Vertex, PartitionId(1), LocalId(99));
        assert!(db.resolve_element(ghost).expect("resolve").is_none());
    }

    #[test]
    fn local_operations_never_call_remote_access() {
        let mut db = db();
        let a = db.create_vertex(vertex_type()).expect("create");
        let b = db.create_vertex(vertex_type()).expect("create");
        let e = db.create_edge(edge_type(), a, b).expect("create");
        db.delete_element(e.into()).expect("delete");
        db.delete_element(a.into()).expect("delete");

        // A standalone resolver faults on any remote call; everything above
        // succeeded, and the counters confirm the routing.
        assert_eq!(db.routing_stats().remote_calls, 0);
        assert!(db.routing_stats().local_ops > 0);
    }

    #[test]
    fn remote_partition_without_route_faults() {
        let mut db = db();
        let ghost = ElementId::new(ElementKind::Vertex, PartitionId(2), LocalId(1));
        let err = db.resolve_element(ghost);
        assert!(matches!(err, Err(GraphError::Remote(_))));
    }

    #[test]
    fn capacity_exhaustion_fails_creation() {
        let options = DatabaseOptions {
            max_vertices: 2,
            ..DatabaseOptions::default()
        };
        let mut db = GraphDatabase::new(
            PartitionId(1),
            options,
            schema(),
            Box::new(Standalone),
        )
        .expect("db");
        db.create_vertex(vertex_type()).expect("create");
        db.create_vertex(vertex_type()).expect("create");
        let err = db.create_vertex(vertex_type());
        assert!(matches!(err, Err(GraphError::CapacityExhausted { .. })));
    }

    #[test]
    fn sequence_version_bumps_on_create_and_delete() {
        let mut db = db();
        let v0 = db
            .sequence_version(PartitionId(1), ElementKind::Vertex)
            .expect("version");
        let a = db.create_vertex(vertex_type()).expect("create");
        let v1 = db
            .sequence_version(PartitionId(1), ElementKind::Vertex)
            .expect("version");
        assert!(v1 > v0);
        db.delete_element(a.into()).expect("delete");
        let v2 = db
            .sequence_version(PartitionId(1), ElementKind::Vertex)
            .expect("version");
        assert!(v2 > v1);
    }
}
