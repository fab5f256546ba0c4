//! # In-Process Partition Router
//!
//! Wires several `GraphDatabase` instances living in one process into a
//! cluster: each database resolves peer partitions through a shared
//! [`PartitionRouter`], and every remote leaf call lands directly on the
//! target partition's local leaf operations.
//!
//! Routes hold `Weak` references, so dropping a partition's database turns
//! it unreachable instead of keeping it alive through its peers' caches.
//! Because capabilities expose only leaf operations, a served call never
//! re-enters the calling partition, and the per-partition `RefCell`
//! borrows stay strictly nested.

use crate::database::GraphDatabase;
use crate::remote::{RemoteAccess, RemoteFault, RemoteResolver};
use crate::types::{
    Direction, EdgeId, ElementId, ElementKind, GlobalId, GraphError, IncidenceId, LocalId,
    PartitionId, TypeId, VertexId,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

// =============================================================================
// PARTITION ROUTER
// =============================================================================

/// Shared routing table of an in-process cluster.
#[derive(Debug, Default)]
pub struct PartitionRouter {
    routes: RefCell<BTreeMap<PartitionId, Weak<RefCell<GraphDatabase>>>>,
}

impl PartitionRouter {
    /// An empty routing table.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A resolver handle to pass into `GraphDatabase::new`.
    #[must_use]
    pub fn resolver(self: &Rc<Self>) -> Box<dyn RemoteResolver> {
        Box::new(Rc::clone(self))
    }

    /// Make a partition's database reachable by its peers.
    pub fn register(&self, db: &Rc<RefCell<GraphDatabase>>) {
        let partition = db.borrow().partition();
        self.routes
            .borrow_mut()
            .insert(partition, Rc::downgrade(db));
    }

    /// Drop the route for a partition. Peers holding a cached capability
    /// keep faulting through the dead `Weak` either way.
    pub fn deregister(&self, partition: PartitionId) {
        self.routes.borrow_mut().remove(&partition);
    }

    /// The partitions currently routed, dead entries included.
    #[must_use]
    pub fn partitions(&self) -> Vec<PartitionId> {
        self.routes.borrow().keys().copied().collect()
    }

    fn route(&self, partition: PartitionId) -> Result<Weak<RefCell<GraphDatabase>>, RemoteFault> {
        self.routes
            .borrow()
            .get(&partition)
            .cloned()
            .ok_or(RemoteFault::Unreachable(partition))
    }
}

impl RemoteResolver for Rc<PartitionRouter> {
    fn connect(&self, partition: PartitionId) -> Result<Rc<dyn RemoteAccess>, RemoteFault> {
        let target = self.route(partition)?;
        if target.upgrade().is_none() {
            return Err(RemoteFault::Unreachable(partition));
        }
        Ok(Rc::new(InProcessAccess { partition, target }))
    }
}

// =============================================================================
// IN-PROCESS CAPABILITY
// =============================================================================

/// Capability for one peer partition in the same process. Every call
/// upgrades the route and applies exactly one local leaf operation on the
/// target database.
struct InProcessAccess {
    partition: PartitionId,
    target: Weak<RefCell<GraphDatabase>>,
}

impl InProcessAccess {
    fn with<T>(
        &self,
        op: impl FnOnce(&GraphDatabase) -> Result<T, GraphError>,
    ) -> Result<T, RemoteFault> {
        let cell = self
            .target
            .upgrade()
            .ok_or(RemoteFault::Unreachable(self.partition))?;
        let db = cell.try_borrow().map_err(|_| RemoteFault::Transport {
            partition: self.partition,
            detail: "partition is busy".to_string(),
        })?;
        op(&db).map_err(|err| RemoteFault::Operation {
            partition: self.partition,
            detail: err.to_string(),
        })
    }

    fn with_mut<T>(
        &self,
        op: impl FnOnce(&mut GraphDatabase) -> Result<T, GraphError>,
    ) -> Result<T, RemoteFault> {
        let cell = self
            .target
            .upgrade()
            .ok_or(RemoteFault::Unreachable(self.partition))?;
        let mut db = cell.try_borrow_mut().map_err(|_| RemoteFault::Transport {
            partition: self.partition,
            detail: "partition is busy".to_string(),
        })?;
        op(&mut db).map_err(|err| RemoteFault::Operation {
            partition: self.partition,
            detail: err.to_string(),
        })
    }
}

impl RemoteAccess for InProcessAccess {
    fn element_exists(&self, kind: ElementKind, local: LocalId) -> Result<bool, RemoteFault> {
        self.with(|db| Ok(db.local_element_exists(kind, local)))
    }

    fn element_type_id(&self, kind: ElementKind, local: LocalId) -> Result<TypeId, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.type_id))
    }

    fn element_next(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<GlobalId>, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.next))
    }

    fn set_element_next(
        &self,
        kind: ElementKind,
        local: LocalId,
        next: Option<GlobalId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.next = next;
            Ok(())
        })
    }

    fn element_prev(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<GlobalId>, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.prev))
    }

    fn set_element_prev(
        &self,
        kind: ElementKind,
        local: LocalId,
        prev: Option<GlobalId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.prev = prev;
            Ok(())
        })
    }

    fn element_first_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<IncidenceId>, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.first_incidence))
    }

    fn set_element_first_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.first_incidence = incidence;
            Ok(())
        })
    }

    fn element_last_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<IncidenceId>, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.last_incidence))
    }

    fn set_element_last_incidence(
        &self,
        kind: ElementKind,
        local: LocalId,
        incidence: Option<IncidenceId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.last_incidence = incidence;
            Ok(())
        })
    }

    fn element_sigma(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<Option<ElementId>, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.sigma))
    }

    fn set_element_sigma(
        &self,
        kind: ElementKind,
        local: LocalId,
        sigma: Option<ElementId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.sigma = sigma;
            Ok(())
        })
    }

    fn element_kappa(&self, kind: ElementKind, local: LocalId) -> Result<u32, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.kappa))
    }

    fn set_element_kappa(
        &self,
        kind: ElementKind,
        local: LocalId,
        kappa: u32,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_element_mut(kind, local)?.kappa = kappa;
            Ok(())
        })
    }

    fn incidence_list_version(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<u64, RemoteFault> {
        self.with(|db| Ok(db.local_element(kind, local)?.incidence_version))
    }

    fn bump_incidence_list_version(
        &self,
        kind: ElementKind,
        local: LocalId,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| db.local_bump_incidence_version(kind, local))
    }

    fn incidence_vertex(&self, local: LocalId) -> Result<VertexId, RemoteFault> {
        self.with(|db| Ok(db.local_incidence(local)?.vertex))
    }

    fn incidence_edge(&self, local: LocalId) -> Result<EdgeId, RemoteFault> {
        self.with(|db| Ok(db.local_incidence(local)?.edge))
    }

    fn incidence_direction(&self, local: LocalId) -> Result<Direction, RemoteFault> {
        self.with(|db| Ok(db.local_incidence(local)?.direction))
    }

    fn incidence_next(
        &self,
        local: LocalId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, RemoteFault> {
        self.with(|db| {
            let record = db.local_incidence(local)?;
            Ok(match anchor {
                ElementKind::Vertex => record.next_at_vertex,
                ElementKind::Edge => record.next_at_edge,
            })
        })
    }

    fn set_incidence_next(
        &self,
        local: LocalId,
        anchor: ElementKind,
        next: Option<IncidenceId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            let record = db.local_incidence_mut(local)?;
            match anchor {
                ElementKind::Vertex => record.next_at_vertex = next,
                ElementKind::Edge => record.next_at_edge = next,
            }
            Ok(())
        })
    }

    fn incidence_prev(
        &self,
        local: LocalId,
        anchor: ElementKind,
    ) -> Result<Option<IncidenceId>, RemoteFault> {
        self.with(|db| {
            let record = db.local_incidence(local)?;
            Ok(match anchor {
                ElementKind::Vertex => record.prev_at_vertex,
                ElementKind::Edge => record.prev_at_edge,
            })
        })
    }

    fn set_incidence_prev(
        &self,
        local: LocalId,
        anchor: ElementKind,
        prev: Option<IncidenceId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            let record = db.local_incidence_mut(local)?;
            match anchor {
                ElementKind::Vertex => record.prev_at_vertex = prev,
                ElementKind::Edge => record.prev_at_edge = prev,
            }
            Ok(())
        })
    }

    fn create_element(&self, kind: ElementKind, type_id: TypeId) -> Result<LocalId, RemoteFault> {
        self.with_mut(|db| db.local_create_element(kind, type_id))
    }

    fn free_element(&self, kind: ElementKind, local: LocalId) -> Result<(), RemoteFault> {
        self.with_mut(|db| db.local_free_element(kind, local))
    }

    fn create_incidence(
        &self,
        type_id: TypeId,
        vertex: VertexId,
        edge: EdgeId,
        direction: Direction,
    ) -> Result<LocalId, RemoteFault> {
        self.with_mut(|db| db.local_create_incidence(type_id, vertex, edge, direction))
    }

    fn free_incidence(&self, local: LocalId) -> Result<(), RemoteFault> {
        self.with_mut(|db| db.local_free_incidence(local))
    }

    fn first_element(&self, kind: ElementKind) -> Result<Option<GlobalId>, RemoteFault> {
        self.with(|db| Ok(db.local_graph_data().first(kind)))
    }

    fn set_first_element(
        &self,
        kind: ElementKind,
        id: Option<GlobalId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_graph_data_mut().set_first(kind, id);
            Ok(())
        })
    }

    fn last_element(&self, kind: ElementKind) -> Result<Option<GlobalId>, RemoteFault> {
        self.with(|db| Ok(db.local_graph_data().last(kind)))
    }

    fn set_last_element(
        &self,
        kind: ElementKind,
        id: Option<GlobalId>,
    ) -> Result<(), RemoteFault> {
        self.with_mut(|db| {
            db.local_graph_data_mut().set_last(kind, id);
            Ok(())
        })
    }

    fn element_count(&self, kind: ElementKind) -> Result<u64, RemoteFault> {
        self.with(|db| Ok(db.local_graph_data().count(kind)))
    }

    fn incidence_count(&self) -> Result<u64, RemoteFault> {
        self.with(|db| Ok(db.local_graph_data().incidence_count))
    }

    fn sequence_version(&self, kind: ElementKind) -> Result<u64, RemoteFault> {
        self.with(|db| Ok(db.local_graph_data().sequence_version(kind)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
