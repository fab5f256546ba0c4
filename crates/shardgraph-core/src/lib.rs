//! # shardgraph-core
//!
//! The partitioned storage core of Shardgraph - THE SUBSTRATE.
//!
//! A logical graph is split across partitions; every vertex, edge and
//! incidence carries a 64-bit global id whose high half names its owning
//! partition. Each partition runs one [`GraphDatabase`] that serves its
//! own elements from flat local arrays and reaches every other element
//! through an explicit remote-access capability, so callers never care
//! where an element lives.
//!
//! ## Architectural Constraints
//!
//! - The façade is the ONLY place where structural invariants are
//!   maintained; the local store is dumb slot storage
//! - Remote capabilities are leaf-level: a served call never re-enters
//!   the calling partition
//! - Deterministic: ordered maps everywhere, LIFO id recycling, no
//!   ambient global state
//! - No async, no network dependencies (transports plug in behind the
//!   `RemoteAccess` trait)

// =============================================================================
// MODULES
// =============================================================================

pub mod database;
pub mod freelist;
pub mod proxy;
pub mod remote;
pub mod router;
pub mod schema;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Identity & Errors (from types module)
// =============================================================================

pub use types::{
    Direction, EdgeId, ElementId, ElementKind, GlobalId, GraphError, IncidenceId, LocalId,
    PartitionId, SlotKind, TypeId, VertexId,
};

// =============================================================================
// RE-EXPORTS: Storage Engine
// =============================================================================

pub use database::{DatabaseOptions, Element, GraphDatabase, RoutingStats};
pub use freelist::FreeIndexList;
pub use proxy::{Proxy, ProxyCache};
pub use schema::{TypeDescriptor, TypeRegistry};
pub use store::{ElementRecord, GraphData, IncidenceRecord, LocalStore, ROOT_SUBGRAPH};

// =============================================================================
// RE-EXPORTS: Distribution
// =============================================================================

pub use remote::{RemoteAccess, RemoteFault, RemoteResolver, Standalone};
pub use router::PartitionRouter;
