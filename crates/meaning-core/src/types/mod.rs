//! # Core Type Definitions
//!
//! This module contains the plain data records the engine consumes and
//! produces:
//! - Graph records (`GraphNode`, `GraphEdge`, `SeedData`)
//! - Catalog records (`Catalog`, `CatalogEntry`)
//! - World configuration (`WorldConfig`)
//! - Soft validation outputs (`ValidationResult`, `EdgeCheck`)
//! - Error types (`EngineError`, `LoadError`)
//!
//! ## Shape Guarantees
//!
//! All records:
//! - Serialize with camelCase field names, matching the JSON documents hosts load
//! - Keep vocabulary-specific fields in a flattened `serde_json::Map`, opaque to the engine
//! - Preserve field insertion order (`serde_json` is built with `preserve_order`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::primitives::{NESTED_DATA_FIELD, POINTER_TAG_PREFIX};

// =============================================================================
// GRAPH RECORDS
// =============================================================================

/// A node of a world graph.
///
/// Only `id` is structurally required; `type` may be absent in candidate
/// data so that validation can report it instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier within one graph snapshot.
    #[serde(default)]
    pub id: String,
    /// Node type id, checked against the schema.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Every other field, vocabulary-specific.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GraphNode {
    /// Create a node with the given id and type and no extra fields.
    #[must_use]
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: Some(node_type.into()),
            fields: Map::new(),
        }
    }

    /// Builder-style helper to attach a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The node type, or `""` when absent.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.node_type.as_deref().unwrap_or("")
    }

    /// Look up a field directly on the node.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a field is present directly on the node or inside its
    /// nested `data` record.
    #[must_use]
    pub fn has_field(&self, key: &str) -> bool {
        if key == "id" || (key == "type" && self.node_type.is_some()) {
            return true;
        }
        if self.fields.contains_key(key) {
            return true;
        }
        self.fields
            .get(NESTED_DATA_FIELD)
            .and_then(Value::as_object)
            .is_some_and(|data| data.contains_key(key))
    }

    /// The node's direct `tags` sequence (string elements only).
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        string_list(self.fields.get("tags"))
    }

    /// The node's `pointerTags` sequence as written (`cap:` prefixes kept).
    #[must_use]
    pub fn pointer_tags(&self) -> Vec<String> {
        string_list(self.fields.get("pointerTags"))
    }

    /// Union of `tags` and `pointerTags`, with the pointer-tag prefix
    /// stripped. First occurrence wins; order is `tags` then `pointerTags`.
    #[must_use]
    pub fn effective_tags(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let stripped = self.pointer_tags().into_iter().map(|tag| {
            tag.strip_prefix(POINTER_TAG_PREFIX)
                .map(str::to_string)
                .unwrap_or(tag)
        });
        for tag in self.tags().into_iter().chain(stripped) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        out
    }

    /// The raw `catalogRefs` value, if any.
    #[must_use]
    pub fn catalog_refs(&self) -> Option<&Value> {
        self.fields.get("catalogRefs")
    }

    /// Entry ids referenced for one catalog via `catalogRefs[catalog_id]`.
    ///
    /// Returns an empty list when the ref map or the key is missing, or
    /// when the value is not a sequence.
    #[must_use]
    pub fn catalog_ref_ids(&self, catalog_id: &str) -> Vec<String> {
        string_list(
            self.catalog_refs()
                .and_then(Value::as_object)
                .and_then(|refs| refs.get(catalog_id)),
        )
    }
}

/// An edge of a world graph. `source` and `target` are node-id references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Optional edge identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source node id; empty when absent in candidate data.
    #[serde(default)]
    pub source: String,
    /// Target node id; empty when absent in candidate data.
    #[serde(default)]
    pub target: String,
    /// Edge type id, checked against the schema.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    /// Every other field, vocabulary-specific.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GraphEdge {
    /// Create a typed edge between two node ids.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            edge_type: Some(edge_type.into()),
            fields: Map::new(),
        }
    }

    /// The edge type, or `""` when absent.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.edge_type.as_deref().unwrap_or("")
    }

    /// Whether the edge touches `node_id` at either end.
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Seed data: the node and edge lists a world graph is derived from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    /// Any additional top-level seed fields (metadata, provenance).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SeedData {
    /// Seed data with no nodes and no edges.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed data from node and edge lists.
    #[must_use]
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            nodes,
            edges,
            extra: Map::new(),
        }
    }
}

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// A single entry of a catalog. Only `id` is interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogEntry {
    /// Create an entry with no fields besides its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper to attach a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Look up a field. `"id"` resolves to the entry id.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == "id" {
            return Some(Value::String(self.id.clone()));
        }
        self.fields.get(key).cloned()
    }

    /// Borrow a non-id field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The entry's `tags` sequence (string elements only).
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        string_list(self.fields.get("tags"))
    }
}

/// A named collection of reference entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Must equal the key the catalog is registered under.
    pub id: String,
    /// Optional descriptive schema for the entries; must be an object if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create a catalog from an id and its entries.
    #[must_use]
    pub fn new(id: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            id: id.into(),
            schema: None,
            entries,
        }
    }

    /// Builder-style helper to attach a catalog schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A set of catalogs keyed by registry id.
pub type CatalogSet = BTreeMap<String, Catalog>;

// =============================================================================
// WORLD CONFIGURATION
// =============================================================================

/// Opaque configuration carried by a world. The engine stores it and hands
/// it back; it never changes engine behavior.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldConfig {
    pub settings: Map<String, Value>,
}

impl WorldConfig {
    #[must_use]
    pub fn new(settings: Map<String, Value>) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.settings.get(key).and_then(Value::as_bool)
    }
}

// =============================================================================
// SOFT VALIDATION OUTPUTS
// =============================================================================

/// The soft result every contract validator returns.
///
/// Only `errors` flip `valid` to false; `warnings` are informational.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no messages.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build a result from collected errors and warnings.
    #[must_use]
    pub fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: Self) {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Prefix every error and warning of `other` with `context` and merge.
    pub fn merge_with_context(&mut self, context: &str, other: Self) {
        self.valid = self.valid && other.valid;
        self.errors
            .extend(other.errors.into_iter().map(|e| format!("{context}: {e}")));
        self.warnings
            .extend(other.warnings.into_iter().map(|w| format!("{context}: {w}")));
    }
}

/// Outcome of an edge-endpoint compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EdgeCheck {
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Fatal errors of the engine.
///
/// These abort construction or loading; soft problems are reported through
/// `ValidationResult` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A Schema was constructed without a definition.
    #[error("Schema requires a schema definition")]
    MissingSchema,

    /// A world adapter was constructed without schema data.
    #[error("World adapter requires schema data")]
    MissingSchemaData,

    /// A world was asked for a graph it never received.
    #[error("World has neither a graph nor seed data")]
    MissingGraph,

    /// A world failed contract validation.
    #[error("Invalid world: {}", .0.join("; "))]
    InvalidWorld(Vec<String>),

    /// A single catalog failed its definition checks.
    #[error("Invalid catalog '{id}': {}", errors.join("; "))]
    InvalidCatalog { id: String, errors: Vec<String> },

    /// A catalog set failed registry-level validation.
    #[error("Invalid catalog set: {}", .0.join("; "))]
    InvalidCatalogSet(Vec<String>),

    /// A world accessor failed while being read.
    #[error("{accessor}() failed: {reason}")]
    AccessorFailed {
        accessor: &'static str,
        reason: String,
    },

    /// Raw input could not be converted into a typed record.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

/// Failure of a single catalog resolution. Never aborts a whole load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Catalog not found: {0}")]
    NotFound(String),

    #[error("I/O error reading '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Could not parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("{0}")]
    Other(String),
}

// =============================================================================
// HELPERS
// =============================================================================

/// Collect the string elements of an optional JSON sequence.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// TESTS
// =============================================================================
