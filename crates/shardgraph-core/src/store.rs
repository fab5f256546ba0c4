//! # Local Store
//!
//! Per-partition dense arrays of vertex, edge and incidence records plus
//! the subgraph metadata table, all indexed by local id.
//!
//! The store enforces no structural invariants: link maintenance, version
//! bumping and free-list coordination are the façade's responsibility.
//! This keeps every hot-path accessor allocation-free and O(1); the only
//! allocation is backing-array growth when a slot past the current length
//! is installed.

use crate::types::{Direction, ElementId, ElementKind, GlobalId, IncidenceId, LocalId, TypeId, VertexId, EdgeId};
use serde::{Deserialize, Serialize};

/// Local slot of a partition's canonical top-level subgraph record.
pub const ROOT_SUBGRAPH: LocalId = LocalId(1);

// =============================================================================
// RECORDS
// =============================================================================

/// Storage record of one vertex or edge.
///
/// `next`/`prev` form the partition's doubly linked global sequence for the
/// record's kind (O(1) ordered walk, O(1) unlink). `incidence_version` is
/// bumped by the façade on every structural change touching this element;
/// live iterators snapshot it and treat any change as "structure changed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Schema type tag.
    pub type_id: TypeId,
    /// Next element of the same kind in the partition's global sequence.
    pub next: Option<GlobalId>,
    /// Previous element of the same kind in the partition's global sequence.
    pub prev: Option<GlobalId>,
    /// Head of this element's incidence list.
    pub first_incidence: Option<IncidenceId>,
    /// Tail of this element's incidence list.
    pub last_incidence: Option<IncidenceId>,
    /// Incidence-list version counter; strictly increases on every
    /// structural change at this element.
    pub incidence_version: u64,
    /// Hierarchical parent (containment), `None` = top level.
    pub sigma: Option<ElementId>,
    /// Abstraction/visibility level.
    pub kappa: u32,
}

impl ElementRecord {
    /// A fresh record with an empty incidence list and no links.
    #[must_use]
    pub const fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            next: None,
            prev: None,
            first_incidence: None,
            last_incidence: None,
            incidence_version: 0,
            sigma: None,
            kappa: 0,
        }
    }
}

/// Storage record of one incidence: the participation of exactly one vertex
/// in one edge, doubly linked into both endpoint incidence lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidenceRecord {
    /// Schema type tag of the participation.
    pub type_id: TypeId,
    /// The participating vertex.
    pub vertex: VertexId,
    /// The participating edge.
    pub edge: EdgeId,
    /// Which end of the edge the vertex takes.
    pub direction: Direction,
    /// Next incidence in the vertex's list.
    pub next_at_vertex: Option<IncidenceId>,
    /// Previous incidence in the vertex's list.
    pub prev_at_vertex: Option<IncidenceId>,
    /// Next incidence in the edge's list.
    pub next_at_edge: Option<IncidenceId>,
    /// Previous incidence in the edge's list.
    pub prev_at_edge: Option<IncidenceId>,
}

impl IncidenceRecord {
    /// A fresh unlinked incidence.
    #[must_use]
    pub const fn new(type_id: TypeId, vertex: VertexId, edge: EdgeId, direction: Direction) -> Self {
        Self {
            type_id,
            vertex,
            edge,
            direction,
            next_at_vertex: None,
            prev_at_vertex: None,
            next_at_edge: None,
            prev_at_edge: None,
        }
    }
}

/// Per-partition subgraph metadata: sequence head/tail pointers, element
/// counts, sequence version counters and the containment anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    /// Head of the vertex sequence.
    pub first_vertex: Option<GlobalId>,
    /// Tail of the vertex sequence.
    pub last_vertex: Option<GlobalId>,
    /// Head of the edge sequence.
    pub first_edge: Option<GlobalId>,
    /// Tail of the edge sequence.
    pub last_edge: Option<GlobalId>,
    /// Live vertex count.
    pub vertex_count: u64,
    /// Live edge count.
    pub edge_count: u64,
    /// Live incidence count.
    pub incidence_count: u64,
    /// Bumped on every vertex-sequence change.
    pub vertex_list_version: u64,
    /// Bumped on every edge-sequence change.
    pub edge_list_version: u64,
    /// Element this subgraph is nested inside, `None` for the partition root.
    pub containing_element: Option<ElementId>,
}

impl GraphData {
    /// The all-empty record; also what reads see before the root record is
    /// installed.
    pub const EMPTY: Self = Self {
        first_vertex: None,
        last_vertex: None,
        first_edge: None,
        last_edge: None,
        vertex_count: 0,
        edge_count: 0,
        incidence_count: 0,
        vertex_list_version: 0,
        edge_list_version: 0,
        containing_element: None,
    };

    /// Head of the sequence for `kind`.
    #[must_use]
    pub const fn first(&self, kind: ElementKind) -> Option<GlobalId> {
        match kind {
            ElementKind::Vertex => self.first_vertex,
            ElementKind::Edge => self.first_edge,
        }
    }

    /// Tail of the sequence for `kind`.
    #[must_use]
    pub const fn last(&self, kind: ElementKind) -> Option<GlobalId> {
        match kind {
            ElementKind::Vertex => self.last_vertex,
            ElementKind::Edge => self.last_edge,
        }
    }

    /// Replace the sequence head for `kind`.
    pub fn set_first(&mut self, kind: ElementKind, id: Option<GlobalId>) {
        match kind {
            ElementKind::Vertex => self.first_vertex = id,
            ElementKind::Edge => self.first_edge = id,
        }
    }

    /// Replace the sequence tail for `kind`.
    pub fn set_last(&mut self, kind: ElementKind, id: Option<GlobalId>) {
        match kind {
            ElementKind::Vertex => self.last_vertex = id,
            ElementKind::Edge => self.last_edge = id,
        }
    }

    /// Live element count for `kind`.
    #[must_use]
    pub const fn count(&self, kind: ElementKind) -> u64 {
        match kind {
            ElementKind::Vertex => self.vertex_count,
            ElementKind::Edge => self.edge_count,
        }
    }

    /// Record one created element of `kind`.
    pub fn increment_count(&mut self, kind: ElementKind) {
        match kind {
            ElementKind::Vertex => self.vertex_count = self.vertex_count.saturating_add(1),
            ElementKind::Edge => self.edge_count = self.edge_count.saturating_add(1),
        }
    }

    /// Record one deleted element of `kind`.
    pub fn decrement_count(&mut self, kind: ElementKind) {
        match kind {
            ElementKind::Vertex => self.vertex_count = self.vertex_count.saturating_sub(1),
            ElementKind::Edge => self.edge_count = self.edge_count.saturating_sub(1),
        }
    }

    /// Structural version of the sequence for `kind`.
    #[must_use]
    pub const fn sequence_version(&self, kind: ElementKind) -> u64 {
        match kind {
            ElementKind::Vertex => self.vertex_list_version,
            ElementKind::Edge => self.edge_list_version,
        }
    }

    /// Bump the structural version of the sequence for `kind`.
    pub fn bump_sequence_version(&mut self, kind: ElementKind) {
        match kind {
            ElementKind::Vertex => {
                self.vertex_list_version = self.vertex_list_version.saturating_add(1);
            }
            ElementKind::Edge => {
                self.edge_list_version = self.edge_list_version.saturating_add(1);
            }
        }
    }
}

// =============================================================================
// LOCAL STORE
// =============================================================================

/// Flat, dense slot storage for one partition. Slot 0 of every array is the
/// null slot and stays empty.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    vertices: Vec<Option<ElementRecord>>,
    edges: Vec<Option<ElementRecord>>,
    incidences: Vec<Option<IncidenceRecord>>,
    subgraphs: Vec<Option<GraphData>>,
}

/// Grow-on-demand slot install shared by all record arrays.
fn install<T>(slots: &mut Vec<Option<T>>, id: LocalId, record: T) {
    let index = id.index();
    if index >= slots.len() {
        slots.resize_with(index + 1, || None);
    }
    slots[index] = Some(record);
}

fn slot<T>(slots: &[Option<T>], id: LocalId) -> Option<&T> {
    slots.get(id.index()).and_then(|s| s.as_ref())
}

fn slot_mut<T>(slots: &mut [Option<T>], id: LocalId) -> Option<&mut T> {
    slots.get_mut(id.index()).and_then(|s| s.as_mut())
}

fn clear<T>(slots: &mut [Option<T>], id: LocalId) -> Option<T> {
    slots.get_mut(id.index()).and_then(|s| s.take())
}

impl LocalStore {
    /// An empty store. The façade installs the root subgraph record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn elements(&self, kind: ElementKind) -> &[Option<ElementRecord>] {
        match kind {
            ElementKind::Vertex => &self.vertices,
            ElementKind::Edge => &self.edges,
        }
    }

    fn elements_mut(&mut self, kind: ElementKind) -> &mut Vec<Option<ElementRecord>> {
        match kind {
            ElementKind::Vertex => &mut self.vertices,
            ElementKind::Edge => &mut self.edges,
        }
    }

    /// Get the record at `id`, or `None` if the slot is unallocated.
    #[must_use]
    pub fn element(&self, kind: ElementKind, id: LocalId) -> Option<&ElementRecord> {
        slot(self.elements(kind), id)
    }

    /// Mutable access to the record at `id`.
    #[must_use]
    pub fn element_mut(&mut self, kind: ElementKind, id: LocalId) -> Option<&mut ElementRecord> {
        slot_mut(self.elements_mut(kind), id)
    }

    /// Install a record at its own slot, growing the array on demand.
    pub fn store_element(&mut self, kind: ElementKind, id: LocalId, record: ElementRecord) {
        install(self.elements_mut(kind), id, record);
    }

    /// Clear the slot at `id`, returning the record that occupied it.
    pub fn remove_element(&mut self, kind: ElementKind, id: LocalId) -> Option<ElementRecord> {
        clear(self.elements_mut(kind), id)
    }

    /// Get the incidence record at `id`.
    #[must_use]
    pub fn incidence(&self, id: LocalId) -> Option<&IncidenceRecord> {
        slot(&self.incidences, id)
    }

    /// Mutable access to the incidence record at `id`.
    #[must_use]
    pub fn incidence_mut(&mut self, id: LocalId) -> Option<&mut IncidenceRecord> {
        slot_mut(&mut self.incidences, id)
    }

    /// Install an incidence record at its own slot.
    pub fn store_incidence(&mut self, id: LocalId, record: IncidenceRecord) {
        install(&mut self.incidences, id, record);
    }

    /// Clear the incidence slot at `id`.
    pub fn remove_incidence(&mut self, id: LocalId) -> Option<IncidenceRecord> {
        clear(&mut self.incidences, id)
    }

    /// Get the subgraph metadata at `id`.
    #[must_use]
    pub fn subgraph(&self, id: LocalId) -> Option<&GraphData> {
        slot(&self.subgraphs, id)
    }

    /// Mutable access to the subgraph metadata at `id`.
    #[must_use]
    pub fn subgraph_mut(&mut self, id: LocalId) -> Option<&mut GraphData> {
        slot_mut(&mut self.subgraphs, id)
    }

    /// Install subgraph metadata at its own slot.
    pub fn store_subgraph(&mut self, id: LocalId, record: GraphData) {
        install(&mut self.subgraphs, id, record);
    }

    /// Mutable access to the subgraph metadata at `id`, installing an empty
    /// record first if the slot is unallocated.
    pub fn subgraph_entry(&mut self, id: LocalId) -> &mut GraphData {
        let index = id.index();
        if index >= self.subgraphs.len() {
            self.subgraphs.resize_with(index + 1, || None);
        }
        self.subgraphs[index].get_or_insert_with(GraphData::default)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartitionId;

    #[test]
    fn unallocated_slot_is_absent() {
        let store = LocalStore::new();
        assert!(store.element(ElementKind::Vertex, LocalId(1)).is_none());
        assert!(store.incidence(LocalId(1)).is_none());
        assert!(store.subgraph(ROOT_SUBGRAPH).is_none());
    }

    #[test]
    fn store_and_remove_roundtrip() {
        let mut store = LocalStore::new();
        let record = ElementRecord::new(TypeId(7));
        store.store_element(ElementKind::Vertex, LocalId(3), record.clone());

        assert_eq!(store.element(ElementKind::Vertex, LocalId(3)), Some(&record));
        // Edge array is a separate id space.
        assert!(store.element(ElementKind::Edge, LocalId(3)).is_none());

        let removed = store.remove_element(ElementKind::Vertex, LocalId(3));
        assert_eq!(removed, Some(record));
        assert!(store.element(ElementKind::Vertex, LocalId(3)).is_none());
    }

    #[test]
    fn arrays_grow_on_demand() {
        let mut store = LocalStore::new();
        store.store_element(ElementKind::Edge, LocalId(100), ElementRecord::new(TypeId(1)));
        assert!(store.element(ElementKind::Edge, LocalId(100)).is_some());
        assert!(store.element(ElementKind::Edge, LocalId(99)).is_none());
    }

    #[test]
    fn incidence_slot_semantics() {
        let mut store = LocalStore::new();
        let v = VertexId::new(PartitionId(1), LocalId(1));
        let e = EdgeId::new(PartitionId(1), LocalId(1));
        let record = IncidenceRecord::new(TypeId(2), v, e, Direction::Out);
        store.store_incidence(LocalId(5), record.clone());
        assert_eq!(store.incidence(LocalId(5)), Some(&record));
        assert_eq!(store.remove_incidence(LocalId(5)), Some(record));
        assert_eq!(store.remove_incidence(LocalId(5)), None);
    }

    #[test]
    fn graph_data_counts_saturate_at_zero() {
        let mut data = GraphData::default();
        data.decrement_count(ElementKind::Vertex);
        assert_eq!(data.count(ElementKind::Vertex), 0);
        data.increment_count(ElementKind::Vertex);
        data.increment_count(ElementKind::Vertex);
        data.decrement_count(ElementKind::Vertex);
        assert_eq!(data.count(ElementKind::Vertex), 1);
    }

    #[test]
    fn graph_data_sequence_versions_are_per_kind() {
        let mut data = GraphData::default();
        data.bump_sequence_version(ElementKind::Vertex);
        data.bump_sequence_version(ElementKind::Vertex);
        data.bump_sequence_version(ElementKind::Edge);
        assert_eq!(data.sequence_version(ElementKind::Vertex), 2);
        assert_eq!(data.sequence_version(ElementKind::Edge), 1);
    }
}
