//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use serde::Deserialize;
use shardgraph_core::{
    DatabaseOptions, GlobalId, GraphDatabase, GraphError, LocalId, PartitionId, PartitionRouter,
    SlotKind, TypeRegistry, VertexId,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

// =============================================================================
// APP ERRORS
// =============================================================================

/// Errors surfaced by the CLI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The storage core rejected an operation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Reading a config file failed.
    #[error("io error: {0}")]
    Io(String),

    /// Parsing a config file or CLI argument combination failed.
    #[error("config error: {0}")]
    Config(String),
}

// =============================================================================
// DEMO CONFIG
// =============================================================================

/// Maximum config file size (1 MB). A cluster config is a handful of lines.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// `[cluster]` table of the demo config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of partitions in the demo cluster.
    pub partitions: u32,
    /// Proxy cache capacity per partition.
    pub proxy_cache: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            partitions: 3,
            proxy_cache: 1024,
        }
    }
}

/// `[workload]` table of the demo config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Vertices created in each partition.
    pub vertices_per_partition: u32,
    /// Cross-partition edges created from each partition to its successor.
    pub cross_edges: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            vertices_per_partition: 100,
            cross_edges: 50,
        }
    }
}

/// Full demo config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Cluster shape.
    pub cluster: ClusterConfig,
    /// Workload mix.
    pub workload: WorkloadConfig,
}

impl DemoConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::Io(format!("cannot read '{}': {}", path.display(), e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(AppError::Config(format!(
                "config file '{}' exceeds {} bytes",
                path.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("cannot read '{}': {}", path.display(), e)))?;
        toml::from_str(&text)
            .map_err(|e| AppError::Config(format!("invalid config '{}': {}", path.display(), e)))
    }
}

// =============================================================================
// DEMO SCHEMA
// =============================================================================

/// The registry used by the demo cluster and the `schema` command.
fn demo_schema() -> Result<Rc<TypeRegistry>, GraphError> {
    let mut registry = TypeRegistry::new();
    registry.register("Node", SlotKind::Vertex)?;
    registry.register("Link", SlotKind::Edge)?;
    registry.register("EndPoint", SlotKind::Incidence)?;
    Ok(Rc::new(registry))
}

// =============================================================================
// DEMO COMMAND
// =============================================================================

/// Run a deterministic workload on an in-process cluster and report
/// per-partition statistics.
pub fn cmd_demo(
    json_mode: bool,
    config: Option<&Path>,
    partitions: u32,
    vertices: u32,
    cross_edges: u32,
) -> Result<(), AppError> {
    let config = match config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig {
            cluster: ClusterConfig {
                partitions,
                ..ClusterConfig::default()
            },
            workload: WorkloadConfig {
                vertices_per_partition: vertices,
                cross_edges,
            },
        },
    };
    if config.cluster.partitions == 0 {
        return Err(AppError::Config("partitions must be at least 1".to_string()));
    }

    let schema = demo_schema()?;
    let node = schema
        .lookup("Node")
        .ok_or_else(|| AppError::Config("demo schema is missing 'Node'".to_string()))?;
    let link = schema
        .lookup("Link")
        .ok_or_else(|| AppError::Config("demo schema is missing 'Link'".to_string()))?;

    tracing::info!(
        partitions = config.cluster.partitions,
        vertices = config.workload.vertices_per_partition,
        cross_edges = config.workload.cross_edges,
        "starting demo cluster"
    );

    // Build the cluster. Partition ids start at 1: 0 is not addressable.
    let router = PartitionRouter::new();
    let options = DatabaseOptions {
        proxy_cache_capacity: config.cluster.proxy_cache,
        ..DatabaseOptions::default()
    };
    let dbs: Vec<Rc<RefCell<GraphDatabase>>> = (1..=config.cluster.partitions)
        .map(|p| {
            GraphDatabase::new(
                PartitionId(p),
                options.clone(),
                Rc::clone(&schema),
                router.resolver(),
            )
            .map(|db| Rc::new(RefCell::new(db)))
        })
        .collect::<Result<_, _>>()?;
    for db in &dbs {
        router.register(db);
    }

    // Phase 1: populate every partition.
    let mut created: Vec<Vec<VertexId>> = Vec::with_capacity(dbs.len());
    for db in &dbs {
        let mut ids = Vec::with_capacity(config.workload.vertices_per_partition as usize);
        for _ in 0..config.workload.vertices_per_partition {
            ids.push(db.borrow_mut().create_vertex(node)?);
        }
        created.push(ids);
    }

    // Phase 2: connect each partition to its successor, round-robin over
    // the vertices on both sides.
    let n = dbs.len();
    if n > 1 {
        for (i, db) in dbs.iter().enumerate() {
            let here = &created[i];
            let there = &created[(i + 1) % n];
            if here.is_empty() || there.is_empty() {
                continue;
            }
            for k in 0..config.workload.cross_edges as usize {
                let alpha = here[k % here.len()];
                let omega = there[k % there.len()];
                db.borrow_mut().create_edge(link, alpha, omega)?;
            }
        }
    }

    // Phase 3: delete every tenth vertex of each partition through the
    // NEXT partition's façade, exercising remote deletion end to end.
    for (i, ids) in created.iter().enumerate() {
        let driver = &dbs[(i + 1) % n];
        for v in ids.iter().step_by(10) {
            driver.borrow_mut().delete_element((*v).into())?;
        }
    }

    report_demo(json_mode, &dbs)?;
    Ok(())
}

/// Print per-partition statistics after the workload.
fn report_demo(json_mode: bool, dbs: &[Rc<RefCell<GraphDatabase>>]) -> Result<(), AppError> {
    if json_mode {
        let mut rows = Vec::with_capacity(dbs.len());
        for db in dbs {
            let mut db = db.borrow_mut();
            let p = db.partition();
            let stats = db.routing_stats();
            rows.push(serde_json::json!({
                "partition": p.value(),
                "vertices": db.vertex_count(p)?,
                "edges": db.edge_count(p)?,
                "incidences": db.incidence_count(p)?,
                "local_ops": stats.local_ops,
                "remote_calls": stats.remote_calls,
                "proxies_resident": db.proxy_cache().len(),
                "proxy_hits": db.proxy_cache().hits(),
                "proxy_misses": db.proxy_cache().misses(),
            }));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "partitions": rows }))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!("Demo Cluster Results");
    println!();
    for db in dbs {
        let mut db = db.borrow_mut();
        let p = db.partition();
        let stats = db.routing_stats();
        println!("Partition {}:", p.value());
        println!("  Vertices:     {}", db.vertex_count(p)?);
        println!("  Edges:        {}", db.edge_count(p)?);
        println!("  Incidences:   {}", db.incidence_count(p)?);
        println!("  Local ops:    {}", stats.local_ops);
        println!("  Remote calls: {}", stats.remote_calls);
        println!(
            "  Proxies:      {} resident ({} hits, {} misses)",
            db.proxy_cache().len(),
            db.proxy_cache().hits(),
            db.proxy_cache().misses()
        );
        println!();
    }
    Ok(())
}

// =============================================================================
// CODEC COMMAND
// =============================================================================

/// Encode or decode a 64-bit global id.
pub fn cmd_codec(
    json_mode: bool,
    id: Option<u64>,
    partition: Option<u32>,
    local: Option<u32>,
) -> Result<(), AppError> {
    let global = match (id, partition, local) {
        (Some(raw), None, None) => GlobalId(raw),
        (None, Some(p), Some(l)) => {
            if p == 0 {
                return Err(AppError::Graph(GraphError::InvalidPartition));
            }
            GlobalId::encode(PartitionId(p), LocalId(l))
        }
        _ => {
            return Err(AppError::Config(
                "provide either --id, or --partition together with --local".to_string(),
            ));
        }
    };

    let (p, l) = global.decode();
    let is_root = global == GlobalId::subgraph_root(p);
    if json_mode {
        let output = serde_json::json!({
            "id": global.raw(),
            "partition": p.value(),
            "partition_valid": p.is_valid(),
            "local": l.value(),
            "signed_local": global.signed_local(),
            "is_subgraph_root": is_root,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!("Global id {}", global.raw());
        println!("  Partition:    {}{}", p.value(), if p.is_valid() { "" } else { " (invalid)" });
        println!("  Local:        {}", l.value());
        println!("  Signed local: {}", global.signed_local());
        if is_root {
            println!("  This is partition {}'s subgraph root", p.value());
        }
    }
    Ok(())
}

// =============================================================================
// SCHEMA COMMAND
// =============================================================================

/// Show the demo type registry.
pub fn cmd_schema(json_mode: bool) -> Result<(), AppError> {
    let schema = demo_schema()?;

    if json_mode {
        let types: Vec<_> = schema
            .descriptors()
            .map(|d| {
                serde_json::json!({
                    "id": d.id.value(),
                    "name": d.name,
                    "kind": format!("{:?}", d.kind),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "types": types }))
                .unwrap_or_default()
        );
    } else {
        println!("Demo Type Registry");
        println!();
        for d in schema.descriptors() {
            println!("  [{}] {:<12} {:?}", d.id.value(), d.name, d.kind);
        }
    }
    Ok(())
}
