//! # Remote Access Capability
//!
//! The contract a partition exposes to its peers, plus the resolver that
//! hands out capabilities.
//!
//! Every method is a *leaf*: a single field access or single-slot
//! structural operation addressed by local id, touching only the owning
//! partition's state. Multi-step protocols (sequence relinking, incidence
//! ring surgery, cascades) are always driven by the initiating façade, so
//! a peer never calls back into the requester mid-operation. This is what
//! keeps the synchronous, single-thread-per-partition model free of
//! re-entrance.
//!
//! Every call returns a tagged result instead of throwing across the
//! process boundary. The transport implementation behind this trait is an
//! external collaborator; this crate ships only the in-process reference
//! router in [`crate::router`].

use crate::types::{
    Direction, ElementId, ElementKind, GlobalId, IncidenceId, LocalId, PartitionId, TypeId,
    VertexId, EdgeId,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

// =============================================================================
// REMOTE FAULT
// =============================================================================

/// Failure of a cross-partition call.
///
/// Faults are surfaced to the caller as-is and never retried by the
/// façade; retry policy, if any, belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RemoteFault {
    /// No capability could be established for the partition (peer gone or
    /// never registered).
    #[error("partition {0:?} is unreachable")]
    Unreachable(PartitionId),

    /// The transport failed mid-call (peer crashed, connection lost).
    #[error("transport failure talking to partition {partition:?}: {detail}")]
    Transport {
        /// Peer the call was addressed to.
        partition: PartitionId,
        /// Transport-level diagnostic.
        detail: String,
    },

    /// The call reached the peer but the operation failed there (for
    /// example a capacity-bounded id space ran out, or a leaf addressed an
    /// unallocated slot).
    #[error("operation failed on partition {partition:?}: {detail}")]
    Operation {
        /// Peer that rejected the operation.
        partition: PartitionId,
        /// Peer-side diagnostic.
        detail: String,
    },
}

// =============================================================================
// REMOTE ACCESS
// =============================================================================

/// The local-id-addressed mirror of the storage core's operations.
///
/// Methods take `&self`; an implementation that owns mutable peer state
/// uses interior mutability (a transport stub is naturally `&self` — it
/// sends a message).
pub trait RemoteAccess {
    // ---- element fields (vertex/edge records) -------------------------------

    /// Whether the slot holds a live element.
    fn element_exists(&self, kind: ElementKind, local: LocalId) -> Result<bool, RemoteFault>;

    /// Schema type tag of the element.
    fn element_type_id(&self, kind: ElementKind, local: LocalId) -> Result<TypeId, RemoteFault>;

    /// Successor in the partition's global sequence of `kind`.
    fn element_next(&self, kind: ElementKind, local: LocalId)
    -> Result<Option<GlobalId>, RemoteFault>;

    /// Replace the successor link.
    fn set_element_next(
        &self,
        kind: ElementKind,
        local: LocalId,
        next: Option<GlobalId>,
    ) -> Result<(), RemoteFault>;

    /// Predecessor in the partition's global sequence of `kind`.
    fn element_prev(&self, kind: ElementKind, local: LocalId)
    -> Result<Option<GlobalId>, RemoteFault>;

    /// Replace the predecessor link.
    fn set_element_prev(
        &self,
        kind: ElementKind,
        local: LocalId,
        prev: Option<GlobalId>,
    ) -> Result<(), RemoteFault>;

    /// Head of the element's incidence list.
    fn element_first_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<IncidenceId>, RemoteFault>;

    /// Replace the incidence list head.
    fn set_element_first_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), RemoteFault>;

    /// Tail of the element's incidence list.
    fn element_last_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<IncidenceId>, RemoteFault>;

    /// Replace the incidence list tail.
    fn set_element_last_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), RemoteFault>;

    /// Hierarchical parent of the element.
    fn element_sigma(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<ElementId>, RemoteFault>;

    /// Replace the hierarchical parent.
    fn set_element_sigma(
        &self,
        kind: ElementKind,
        local: LocalId,
        sigma: Option<ElementId>,
    ) -> Result<(), RemoteFault>;

    /// Abstraction level of the element.
    fn element_kappa(&self, kind: ElementKind, local: LocalId) -> Result<u32, RemoteFault>;

    /// Replace the abstraction level.
    fn set_element_kappa(
        &self,
        kind: ElementKind,
        local: LocalId,
        kappa: u32,
    ) -> Result<(), RemoteFault>;

    /// Incidence-list version counter of the element.
    fn incidence_list_version(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<u64, RemoteFault>;

    /// Bump the incidence-list version counter.
    fn bump_incidence_list_version(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<(), RemoteFault>;

    // ---- incidence fields ---------------------------------------------------

    /// The participating vertex of an incidence.
    fn incidence_vertex(&self, local: LocalId) -> Result<VertexId, RemoteFault>;

    /// The participating edge of an incidence.
    fn incidence_edge(&self, local: LocalId) -> Result<EdgeId, RemoteFault>;

    /// The direction flag of an incidence.
    fn incidence_direction(&self, local: LocalId) -> Result<Direction, RemoteFault>;

    /// Successor in the incidence list anchored at `anchor` (the vertex's
    /// list or the edge's list).
    fn incidence_next(
        &self,
        local: LocalId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, RemoteFault>;

    /// Replace the successor link of the `anchor`-side list.
    fn set_incidence_next(
        &self,
        local: LocalId,
        anchor: ElementKind,
        next: Option<IncidenceId>,
    ) -> Result<(), RemoteFault>;

    /// Predecessor in the incidence list anchored at `anchor`.
    fn incidence_prev(
        &self,
        local: LocalId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, RemoteFault>;

    /// Replace the predecessor link of the `anchor`-side list.
    fn set_incidence_prev(
        &self,
        local: LocalId,
        anchor: ElementKind,
        prev: Option<IncidenceId>,
    ) -> Result<(), RemoteFault>;

    // ---- structural leaves --------------------------------------------------

    /// Allocate a local id, install an empty-incidence record and append it
    /// to the partition's global sequence of `kind`.
    fn create_element(&self, kind: ElementKind, type_id: TypeId) -> Result<LocalId, RemoteFault>;

    /// Clear an element slot and recycle its id. The element must already
    /// be unlinked from its sequence and hold no incidences.
    fn free_element(&self, kind: ElementKind, local: LocalId) -> Result<(), RemoteFault>;

    /// Install an unlinked incidence record.
    fn create_incidence(
        &self,
        type_id: TypeId,
        vertex: VertexId,
        edge: EdgeId,
        direction: Direction,
    ) -> Result<LocalId, RemoteFault>;

    /// Clear an incidence slot and recycle its id. The incidence must
    /// already be unlinked from both endpoint lists.
    fn free_incidence(&self, local: LocalId) -> Result<(), RemoteFault>;

    // ---- subgraph metadata --------------------------------------------------

    /// Head of the partition's global sequence of `kind`.
    fn first_element(&self, kind: ElementKind) -> Result<Option<GlobalId>, RemoteFault>;

    /// Replace the sequence head.
    fn set_first_element(
        &self,
        kind: ElementKind,
        id: Option<GlobalId>,
    ) -> Result<(), RemoteFault>;

    /// Tail of the partition's global sequence of `kind`.
    fn last_element(&self, kind: ElementKind) -> Result<Option<GlobalId>, RemoteFault>;

    /// Replace the sequence tail.
    fn set_last_element(&self, kind: ElementKind, id: Option<GlobalId>)
    -> Result<(), RemoteFault>;

    /// Live element count of `kind`.
    fn element_count(&self, kind: ElementKind) -> Result<u64, RemoteFault>;

    /// Live incidence count.
    fn incidence_count(&self) -> Result<u64, RemoteFault>;

    /// Structural version of the partition's sequence of `kind`.
    fn sequence_version(&self, kind: ElementKind) -> Result<u64, RemoteFault>;
}

// =============================================================================
// REMOTE RESOLVER
// =============================================================================

/// Hands out the capability for a partition.
///
/// This is the explicit context object replacing ambient global
/// partition-to-capability registries: it is constructed once and passed
/// into the façade, which caches what it resolves.
pub trait RemoteResolver {
    /// Establish (or re-establish) the capability for `partition`.
    fn connect(&self, partition: PartitionId) -> Result<Rc<dyn RemoteAccess>, RemoteFault>;
}

/// Resolver of a standalone deployment: every remote partition is
/// unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

impl RemoteResolver for Standalone {
    fn connect(&self, partition: PartitionId) -> Result<Rc<dyn RemoteAccess>, RemoteFault> {
        Err(RemoteFault::Unreachable(partition))
    }
}

// =============================================================================
// TESTS
// =============================================================================
