//! # Distributed Scenarios
//!
//! End-to-end tests over an in-process cluster: cross-partition edges,
//! proxy identity, cascade deletion and partition failure.

use shardgraph_core::{
    DatabaseOptions, Direction, Element, ElementId, ElementKind, GraphDatabase, GraphError,
    LocalId, PartitionId, PartitionRouter, Proxy, RemoteFault, SlotKind, TypeId, TypeRegistry,
};
use std::cell::RefCell;
use std::rc::Rc;

fn as_remote(element: Element) -> Option<Rc<Proxy>> {
    match element {
        Element::Remote(proxy) => Some(proxy),
        Element::Local { .. } => None,
    }
}

const NODE: TypeId = TypeId(0);
const LINK: TypeId = TypeId(1);

fn schema() -> Rc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register("Node", SlotKind::Vertex).expect("register");
    registry.register("Link", SlotKind::Edge).expect("register");
    registry
        .register("EndPoint", SlotKind::Incidence)
        .expect("register");
    Rc::new(registry)
}

fn cluster(partitions: &[u32]) -> Vec<Rc<RefCell<GraphDatabase>>> {
    let router = PartitionRouter::new();
    let schema = schema();
    let dbs: Vec<_> = partitions
        .iter()
        .map(|&p| {
            let db = GraphDatabase::new(
                PartitionId(p),
                DatabaseOptions::default(),
                Rc::clone(&schema),
                router.resolver(),
            )
            .expect("db");
            Rc::new(RefCell::new(db))
        })
        .collect();
    for db in &dbs {
        router.register(db);
    }
    dbs
}

// =============================================================================
// CROSS-PARTITION EDGES
// =============================================================================

#[test]
fn cross_partition_edge_links_both_sides() {
    let dbs = cluster(&[1, 2]);
    let a = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");

    // The edge lives in partition 1; its omega endpoint lives in 2.
    let e = dbs[0].borrow_mut().create_edge(LINK, a, b).expect("create");
    assert_eq!(e.partition(), PartitionId(1));

    let inc_b = dbs[0]
        .borrow_mut()
        .first_incidence(b.into())
        .expect("first")
        .expect("some");
    assert_eq!(
        dbs[0].borrow_mut().incidence_edge(inc_b).expect("edge"),
        e
    );
    assert_eq!(
        dbs[0]
            .borrow_mut()
            .incidence_direction(inc_b)
            .expect("dir"),
        Direction::In
    );

    // Partition 2 sees the same record through its own façade.
    let seen = dbs[1]
        .borrow_mut()
        .first_incidence(b.into())
        .expect("first")
        .expect("some");
    assert_eq!(seen, inc_b);
}

#[test]
fn deleting_remote_vertex_takes_its_edge_with_it() {
    let dbs = cluster(&[1, 2]);
    let a = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let e = dbs[0].borrow_mut().create_edge(LINK, a, b).expect("create");

    let a_version_before = dbs[0]
        .borrow_mut()
        .incidence_list_version(a.into())
        .expect("version");

    // Partition 2 drives the deletion of its own vertex; the edge in
    // partition 1 cannot outlive its endpoint and dies with it, scrubbing
    // the surviving endpoint's incidence list.
    dbs[1].borrow_mut().delete_element(b.into()).expect("delete");

    assert_eq!(
        dbs[1].borrow_mut().vertex_count(PartitionId(2)).expect("count"),
        0
    );
    assert!(!dbs[0].borrow_mut().element_exists(e.into()).expect("exists"));
    assert_eq!(
        dbs[0].borrow_mut().first_incidence(a.into()).expect("first"),
        None
    );
    assert_eq!(
        dbs[0].borrow_mut().edge_count(PartitionId(1)).expect("count"),
        0
    );
    assert_eq!(
        dbs[0]
            .borrow_mut()
            .incidence_count(PartitionId(1))
            .expect("count"),
        0
    );
    let a_version_after = dbs[0]
        .borrow_mut()
        .incidence_list_version(a.into())
        .expect("version");
    assert!(a_version_after > a_version_before);
}

#[test]
fn deleting_the_edge_cleans_both_partitions() {
    let dbs = cluster(&[1, 2]);
    let a = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let e = dbs[0].borrow_mut().create_edge(LINK, a, b).expect("create");

    // Drive the delete from the partition that owns nothing but a view.
    dbs[1].borrow_mut().delete_element(e.into()).expect("delete");

    assert_eq!(
        dbs[0].borrow_mut().first_incidence(a.into()).expect("first"),
        None
    );
    assert_eq!(
        dbs[1].borrow_mut().first_incidence(b.into()).expect("first"),
        None
    );
    assert_eq!(
        dbs[0].borrow_mut().edge_count(PartitionId(1)).expect("count"),
        0
    );
    assert_eq!(
        dbs[0]
            .borrow_mut()
            .incidence_count(PartitionId(1))
            .expect("count"),
        0
    );
}

#[test]
fn k_ary_edge_spans_three_partitions() {
    let dbs = cluster(&[1, 2, 3]);
    let a = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let c = dbs[2].borrow_mut().create_vertex(NODE).expect("create");

    let e = dbs[0].borrow_mut().create_edge(LINK, a, b).expect("create");
    dbs[0]
        .borrow_mut()
        .create_incidence(TypeId(2), c, e, Direction::In)
        .expect("connect");

    let mut participants = Vec::new();
    let mut cursor = dbs[2].borrow_mut().first_incidence(e.into()).expect("first");
    while let Some(inc) = cursor {
        participants.push(dbs[2].borrow_mut().incidence_vertex(inc).expect("vertex"));
        cursor = dbs[2].borrow_mut().next_incidence_at_edge(inc).expect("next");
    }
    assert_eq!(participants, vec![a, b, c]);
}

#[test]
fn participation_added_through_a_facade_that_does_not_own_the_edge() {
    let dbs = cluster(&[1, 2]);
    let a = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let c = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let e = dbs[0].borrow_mut().create_edge(LINK, a, b).expect("create");

    // Partition 2 grows an edge owned by partition 1: the record is
    // installed in the edge's partition through its capability.
    let inc = dbs[1]
        .borrow_mut()
        .create_incidence(TypeId(2), c, e, Direction::In)
        .expect("connect");
    assert_eq!(inc.partition(), PartitionId(1));

    // The owner sees the new participation at the tail of the edge's list.
    let mut participants = Vec::new();
    let mut cursor = dbs[0].borrow_mut().first_incidence(e.into()).expect("first");
    while let Some(i) = cursor {
        participants.push(dbs[0].borrow_mut().incidence_vertex(i).expect("vertex"));
        cursor = dbs[0].borrow_mut().next_incidence_at_edge(i).expect("next");
    }
    assert_eq!(participants, vec![a, b, c]);
    assert_eq!(
        dbs[1].borrow_mut().first_incidence(c.into()).expect("first"),
        Some(inc)
    );
    assert_eq!(
        dbs[0]
            .borrow_mut()
            .incidence_count(PartitionId(1))
            .expect("count"),
        3
    );
}

// =============================================================================
// PROXIES
// =============================================================================

#[test]
fn repeated_resolution_yields_the_same_proxy_instance() {
    let dbs = cluster(&[1, 2]);
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");

    let first = as_remote(
        dbs[0]
            .borrow_mut()
            .resolve_element(b.into())
            .expect("resolve")
            .expect("present"),
    )
    .expect("remote");
    let second = as_remote(
        dbs[0]
            .borrow_mut()
            .resolve_element(b.into())
            .expect("resolve")
            .expect("present"),
    )
    .expect("remote");

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.type_id, NODE);
    assert_eq!(dbs[0].borrow().proxy_cache().hits(), 1);
}

#[test]
fn evicted_proxy_is_rebuilt_as_a_new_instance() {
    let dbs = cluster(&[1, 2]);
    let b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");

    let first = as_remote(
        dbs[0]
            .borrow_mut()
            .resolve_element(b.into())
            .expect("resolve")
            .expect("present"),
    )
    .expect("remote");

    assert!(dbs[0].borrow_mut().evict_proxy(b.into()));
    let second = as_remote(
        dbs[0]
            .borrow_mut()
            .resolve_element(b.into())
            .expect("resolve")
            .expect("present"),
    )
    .expect("remote");
    assert!(!Rc::ptr_eq(&first, &second));
}

#[test]
fn proxy_cache_capacity_bounds_residency() {
    let router = PartitionRouter::new();
    let schema = schema();
    let options = DatabaseOptions {
        proxy_cache_capacity: 2,
        ..DatabaseOptions::default()
    };
    let db1 = Rc::new(RefCell::new(
        GraphDatabase::new(PartitionId(1), options, Rc::clone(&schema), router.resolver())
            .expect("db"),
    ));
    let db2 = Rc::new(RefCell::new(
        GraphDatabase::new(
            PartitionId(2),
            DatabaseOptions::default(),
            schema,
            router.resolver(),
        )
        .expect("db"),
    ));
    router.register(&db1);
    router.register(&db2);

    for _ in 0..5 {
        let v = db2.borrow_mut().create_vertex(NODE).expect("create");
        db1.borrow_mut()
            .resolve_element(v.into())
            .expect("resolve")
            .expect("present");
    }
    assert!(db1.borrow().proxy_cache().len() <= 2);
}

// =============================================================================
// HIERARCHY ACROSS PARTITIONS
// =============================================================================

#[test]
fn sigma_and_kappa_work_across_partitions() {
    let dbs = cluster(&[1, 2]);
    let parent = dbs[0].borrow_mut().create_vertex(NODE).expect("create");
    let child = dbs[1].borrow_mut().create_vertex(NODE).expect("create");

    // Partition 1 reparents the remote child under its local parent.
    dbs[0]
        .borrow_mut()
        .set_sigma(child.into(), Some(parent.into()))
        .expect("set");
    assert_eq!(
        dbs[1].borrow_mut().sigma(child.into()).expect("sigma"),
        Some(ElementId::from(parent))
    );

    dbs[0].borrow_mut().set_kappa(child.into(), 7).expect("set");
    assert_eq!(dbs[1].borrow_mut().kappa(child.into()).expect("kappa"), 7);
}

#[test]
fn cascade_delete_covers_children_in_the_parents_partition() {
    let dbs = cluster(&[1, 2]);
    let parent = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let child_a = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    let child_b = dbs[1].borrow_mut().create_vertex(NODE).expect("create");
    dbs[1]
        .borrow_mut()
        .set_sigma(child_a.into(), Some(parent.into()))
        .expect("set");
    dbs[1]
        .borrow_mut()
        .set_sigma(child_b.into(), Some(parent.into()))
        .expect("set");

    // Partition 1 drives the delete of the remote parent.
    dbs[0]
        .borrow_mut()
        .delete_element(parent.into())
        .expect("delete");
    assert_eq!(
        dbs[1].borrow_mut().vertex_count(PartitionId(2)).expect("count"),
        0
    );
}

// =============================================================================
// FAULTS
// =============================================================================

#[test]
fn operations_on_a_dropped_partition_fault_cleanly() {
    let router = PartitionRouter::new();
    let schema = schema();
    let db1 = Rc::new(RefCell::new(
        GraphDatabase::new(
            PartitionId(1),
            DatabaseOptions::default(),
            Rc::clone(&schema),
            router.resolver(),
        )
        .expect("db"),
    ));
    let db2 = Rc::new(RefCell::new(
        GraphDatabase::new(
            PartitionId(2),
            DatabaseOptions::default(),
            schema,
            router.resolver(),
        )
        .expect("db"),
    ));
    router.register(&db1);
    router.register(&db2);

    let a = db1.borrow_mut().create_vertex(NODE).expect("create");
    let b = db2.borrow_mut().create_vertex(NODE).expect("create");
    db1.borrow_mut().create_edge(LINK, a, b).expect("create");

    drop(db2);

    let err = db1.borrow_mut().kappa(b.into());
    assert!(matches!(
        err,
        Err(GraphError::Remote(RemoteFault::Unreachable(PartitionId(2))))
    ));
    // Local state stays fully usable.
    assert_eq!(
        db1.borrow_mut().vertex_count(PartitionId(1)).expect("count"),
        1
    );
}

#[test]
fn ghost_ids_resolve_to_none_not_errors() {
    let dbs = cluster(&[1, 2]);
    let ghost = ElementId::new(ElementKind::Edge, PartitionId(2), LocalId(17));
    assert!(dbs[0]
        .borrow_mut()
        .resolve_element(ghost)
        .expect("resolve")
        .is_none());
}
