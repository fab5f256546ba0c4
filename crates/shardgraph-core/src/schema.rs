//! # Type Registry
//!
//! Enumerated type-id to descriptor table, built once at schema-load time.
//!
//! The registry replaces reflective type resolution: every element record
//! carries a plain [`TypeId`] and the registry is the single place that
//! maps it back to a named, kind-tagged descriptor. All partitions of one
//! logical graph share the same registry.

use crate::types::{GraphError, SlotKind, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// TYPE DESCRIPTOR
// =============================================================================

/// One schema type: tag, qualified name and element kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// The enumerated tag stored in element records.
    pub id: TypeId,
    /// Qualified schema name, unique within the registry.
    pub name: String,
    /// Which record kind instances of this type occupy.
    pub kind: SlotKind,
}

// =============================================================================
// TYPE REGISTRY
// =============================================================================

/// The type table of one schema. Tags are assigned densely in registration
/// order, so the same schema loaded on every host yields identical tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    descriptors: Vec<TypeDescriptor>,
    by_name: BTreeMap<String, TypeId>,
}

impl TypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type and return its tag. Registering a name twice returns
    /// the existing tag (kinds must agree; a conflicting kind is a schema
    /// definition error surfaced as [`GraphError::KindMismatch`]).
    pub fn register(&mut self, name: &str, kind: SlotKind) -> Result<TypeId, GraphError> {
        if let Some(&id) = self.by_name.get(name) {
            let existing = &self.descriptors[id.value() as usize];
            if existing.kind != kind {
                return Err(GraphError::KindMismatch {
                    type_id: id,
                    expected: kind,
                    actual: existing.kind,
                });
            }
            return Ok(id);
        }
        let id = TypeId(self.descriptors.len() as u32);
        self.descriptors.push(TypeDescriptor {
            id,
            name: name.to_string(),
            kind,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolve a tag to its descriptor.
    pub fn descriptor(&self, id: TypeId) -> Result<&TypeDescriptor, GraphError> {
        self.descriptors
            .get(id.value() as usize)
            .ok_or(GraphError::UnknownType(id))
    }

    /// Resolve a qualified name to its tag.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Check that `id` is registered with the given kind.
    pub fn expect_kind(&self, id: TypeId, kind: SlotKind) -> Result<(), GraphError> {
        let descriptor = self.descriptor(id)?;
        if descriptor.kind != kind {
            return Err(GraphError::KindMismatch {
                type_id: id,
                expected: kind,
                actual: descriptor.kind,
            });
        }
        Ok(())
    }

    /// All descriptors in tag order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
