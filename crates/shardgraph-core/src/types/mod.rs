//! # Core Type Definitions
//!
//! This module contains the addressing types for the Shardgraph storage core:
//! - Partition-qualified identifiers (`PartitionId`, `LocalId`, `GlobalId`)
//! - Typed element addresses (`VertexId`, `EdgeId`, `IncidenceId`, `ElementId`)
//! - Kind and direction tags (`ElementKind`, `SlotKind`, `Direction`)
//! - Schema type tags (`TypeId`)
//! - Error types (`GraphError`)
//!
//! ## Addressing Format (bit-exact)
//!
//! A global id is a 64-bit address: `(partitionId << 32) | localId`.
//! Partition 0 is reserved/invalid. A partition's canonical top-level
//! subgraph id is `(partitionId << 32) | 1`.
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Are `Copy` and cheap to pass across the capability boundary

use crate::remote::RemoteFault;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PARTITION & LOCAL IDENTIFIERS
// =============================================================================

/// Identifier of one partition (an independently hosted slice of the graph).
///
/// Partition 0 is reserved and never addresses a live partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId(pub u32);

impl PartitionId {
    /// Create a new partition id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Whether this id addresses a real partition (partition 0 is reserved).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Get the raw partition number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Slot index unique within one partition and element kind while allocated.
///
/// Local id 0 is the null slot and is never handed out by a free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalId(pub u32);

impl LocalId {
    /// Create a new local id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw slot index.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Slot index as `usize` for dense array access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// GLOBAL IDENTIFIER (the 64-bit address)
// =============================================================================

/// The process-wide unique 64-bit address combining partition and local id.
///
/// The codec is pure and deterministic: identical on every host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlobalId(pub u64);

impl GlobalId {
    /// Encode `(partitionId, localId)` into one addressable identifier.
    #[must_use]
    pub const fn encode(partition: PartitionId, local: LocalId) -> Self {
        Self(((partition.0 as u64) << 32) | (local.0 as u64))
    }

    /// Decode this address back into `(partitionId, localId)`.
    #[must_use]
    pub const fn decode(self) -> (PartitionId, LocalId) {
        (self.partition(), self.local())
    }

    /// The owning partition (unsigned upper 32 bits).
    #[must_use]
    pub const fn partition(self) -> PartitionId {
        PartitionId((self.0 >> 32) as u32)
    }

    /// The local slot (lower 32 bits).
    #[must_use]
    pub const fn local(self) -> LocalId {
        LocalId(self.0 as u32)
    }

    /// The lower 32 bits reinterpreted as signed.
    ///
    /// The storage core itself addresses kinds through typed ids; this
    /// accessor exists for layers above that keep the historical convention
    /// of encoding vertex/edge polarity in the sign.
    #[must_use]
    pub const fn signed_local(self) -> i32 {
        self.0 as u32 as i32
    }

    /// The canonical id of a partition's top-level subgraph: local slot 1.
    #[must_use]
    pub const fn subgraph_root(partition: PartitionId) -> Self {
        Self::encode(partition, LocalId(1))
    }

    /// Get the raw 64-bit address.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// =============================================================================
// TYPED ELEMENT ADDRESSES
// =============================================================================

/// Global address of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub GlobalId);

/// Global address of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub GlobalId);

/// Global address of an incidence (one vertex/edge participation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidenceId(pub GlobalId);

macro_rules! typed_id {
    ($name:ident) => {
        impl $name {
            /// Build from partition and local slot.
            #[must_use]
            pub const fn new(partition: PartitionId, local: LocalId) -> Self {
                Self(GlobalId::encode(partition, local))
            }

            /// The underlying 64-bit address.
            #[must_use]
            pub const fn global(self) -> GlobalId {
                self.0
            }

            /// The owning partition.
            #[must_use]
            pub const fn partition(self) -> PartitionId {
                self.0.partition()
            }

            /// The local slot within the owning partition.
            #[must_use]
            pub const fn local(self) -> LocalId {
                self.0.local()
            }
        }
    };
}

typed_id!(VertexId);
typed_id!(EdgeId);
typed_id!(IncidenceId);

/// A kind-qualified element address: either a vertex or an edge.
///
/// Sigma (hierarchical parent) fields and kind-generic operations address
/// elements through this type instead of relying on a sign convention in
/// the packed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementId {
    /// A vertex address.
    Vertex(VertexId),
    /// An edge address.
    Edge(EdgeId),
}

impl ElementId {
    /// Build a kind-qualified address from its parts.
    #[must_use]
    pub const fn new(kind: ElementKind, partition: PartitionId, local: LocalId) -> Self {
        match kind {
            ElementKind::Vertex => Self::Vertex(VertexId::new(partition, local)),
            ElementKind::Edge => Self::Edge(EdgeId::new(partition, local)),
        }
    }

    /// The element kind tag.
    #[must_use]
    pub const fn kind(self) -> ElementKind {
        match self {
            Self::Vertex(_) => ElementKind::Vertex,
            Self::Edge(_) => ElementKind::Edge,
        }
    }

    /// The underlying 64-bit address.
    #[must_use]
    pub const fn global(self) -> GlobalId {
        match self {
            Self::Vertex(v) => v.0,
            Self::Edge(e) => e.0,
        }
    }

    /// The owning partition.
    #[must_use]
    pub const fn partition(self) -> PartitionId {
        self.global().partition()
    }

    /// The local slot within the owning partition.
    #[must_use]
    pub const fn local(self) -> LocalId {
        self.global().local()
    }
}

impl From<VertexId> for ElementId {
    fn from(v: VertexId) -> Self {
        Self::Vertex(v)
    }
}

impl From<EdgeId> for ElementId {
    fn from(e: EdgeId) -> Self {
        Self::Edge(e)
    }
}

// =============================================================================
// KIND & DIRECTION TAGS
// =============================================================================

/// Kind of a sequence-bearing graph element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A vertex.
    Vertex,
    /// An edge.
    Edge,
}

/// Which local id space a slot belongs to.
///
/// Free lists and schema descriptors are tagged with this; it is a superset
/// of [`ElementKind`] covering the record kinds that do not form global
/// sequences of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Vertex records.
    Vertex,
    /// Edge records.
    Edge,
    /// Incidence records.
    Incidence,
    /// Subgraph metadata records.
    Subgraph,
}

impl From<ElementKind> for SlotKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Vertex => Self::Vertex,
            ElementKind::Edge => Self::Edge,
        }
    }
}

/// Direction flag of one incidence: which end of the edge the vertex takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The vertex is the alpha (outgoing) end.
    Out,
    /// The vertex is the omega (incoming) end.
    In,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Out => Self::In,
            Self::In => Self::Out,
        }
    }
}

// =============================================================================
// SCHEMA TYPE TAG
// =============================================================================

/// Enumerated schema type tag, resolved through the [`crate::schema::TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Create a new type tag.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw tag value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the storage core.
///
/// - Capacity errors are fatal to the creating operation, never silently
///   handled.
/// - Remote faults are distinctly tagged and never retried internally.
/// - Invalid references are caller contract violations (the layer above is
///   defined to always present live ids); they are surfaced as errors rather
///   than panics so the violation is diagnosable.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Partition 0 was addressed, or an id routed to no known partition.
    #[error("partition 0 is reserved and cannot be addressed")]
    InvalidPartition,

    /// The id does not name a live element. Caller contract violation.
    #[error("invalid reference: {0:?} does not name a live element")]
    InvalidReference(ElementId),

    /// The id does not name a live incidence. Caller contract violation.
    #[error("invalid incidence reference: {0:?}")]
    InvalidIncidence(IncidenceId),

    /// A capacity-bounded free list is exhausted with no growth possible.
    #[error("partition {partition:?} exhausted its {space:?} id space")]
    CapacityExhausted {
        /// Partition whose id space ran out.
        partition: PartitionId,
        /// Which id space ran out.
        space: SlotKind,
    },

    /// The type tag is not registered in the type registry.
    #[error("unknown type: {0:?}")]
    UnknownType(TypeId),

    /// A type tag of the wrong kind was used to create an element.
    #[error("type {type_id:?} is a {actual:?} type, expected {expected:?}")]
    KindMismatch {
        /// The offending type tag.
        type_id: TypeId,
        /// The kind required by the operation.
        expected: SlotKind,
        /// The kind the registry holds for the tag.
        actual: SlotKind,
    },

    /// A cross-partition call failed. Surfaced unrecoverably, never retried
    /// here; callers can decide whether a higher-level reconnect is
    /// meaningful.
    #[error("remote fault: {0}")]
    Remote(#[from] RemoteFault),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_bit_exact() {
        let id = GlobalId::encode(PartitionId(1), LocalId(42));
        assert_eq!(id.raw(), (1u64 << 32) | 42);
    }

    #[test]
    fn decode_roundtrips() {
        let id = GlobalId::encode(PartitionId(7), LocalId(123_456));
        assert_eq!(id.decode(), (PartitionId(7), LocalId(123_456)));
    }

    #[test]
    fn subgraph_root_is_local_one() {
        let root = GlobalId::subgraph_root(PartitionId(3));
        assert_eq!(root.raw(), (3u64 << 32) | 1);
        assert_eq!(root.local(), LocalId(1));
    }

    #[test]
    fn partition_zero_is_invalid() {
        assert!(!PartitionId(0).is_valid());
        assert!(PartitionId(1).is_valid());
    }

    #[test]
    fn signed_local_preserves_bits() {
        let id = GlobalId::encode(PartitionId(1), LocalId(u32::MAX));
        assert_eq!(id.signed_local(), -1);
        assert_eq!(id.local(), LocalId(u32::MAX));
    }

    #[test]
    fn element_id_carries_kind() {
        let v = ElementId::new(ElementKind::Vertex, PartitionId(2), LocalId(5));
        let e = ElementId::new(ElementKind::Edge, PartitionId(2), LocalId(5));
        assert_eq!(v.kind(), ElementKind::Vertex);
        assert_eq!(e.kind(), ElementKind::Edge);
        // Same packed address, distinct typed addresses.
        assert_eq!(v.global(), e.global());
        assert_ne!(v, e);
    }

    #[test]
    fn direction_reverses() {
        assert_eq!(Direction::Out.reversed(), Direction::In);
        assert_eq!(Direction::In.reversed(), Direction::Out);
    }

    #[test]
    fn ids_order_deterministically() {
        let a = VertexId::new(PartitionId(1), LocalId(2));
        let b = VertexId::new(PartitionId(1), LocalId(3));
        let c = VertexId::new(PartitionId(2), LocalId(1));
        assert!(a < b);
        assert!(b < c);
    }
}
