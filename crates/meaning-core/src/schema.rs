//! # Schema
//!
//! Immutable wrapper around a schema definition.
//!
//! The Schema indexes node and edge type definitions by id and answers
//! type-compatibility and required-field questions. It never enforces
//! limits itself; callers ask and act.

use crate::primitives::{MINIMAL_EDGE_TYPE, MINIMAL_NODE_TYPE, SCHEMA_FORMAT_VERSION};
use crate::{EdgeCheck, EngineError, GraphEdge, GraphNode, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// DEFINITIONS
// =============================================================================

/// Definition of one node type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDef {
    pub id: String,
    pub label: String,
    /// Upper bound on graph nodes of this type. Unset means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u64>,
    /// Fields every node of this type must carry, directly or under `data`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeTypeDef {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_count(mut self, max: u64) -> Self {
        self.max_count = Some(max);
        self
    }

    #[must_use]
    pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
        self.required_fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }
}

/// Definition of one edge type. Empty allow-lists admit any type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTypeDef {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_source_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_target_types: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeTypeDef {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, sources: &[&str], targets: &[&str]) -> Self {
        self.allowed_source_types = sources.iter().map(|s| (*s).to_string()).collect();
        self.allowed_target_types = targets.iter().map(|t| (*t).to_string()).collect();
        self
    }
}

/// A raw schema definition as hosts write it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub node_types: Vec<NodeTypeDef>,
    #[serde(default)]
    pub edge_types: Vec<EdgeTypeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Value>,
}

// =============================================================================
// SCHEMA
// =============================================================================

/// The Schema owns its definition and two id indexes into it.
///
/// Indexes point into the definition's type vectors so that listings keep
/// declaration order. When a definition repeats a type id, the first
/// declaration is the one indexed.
#[derive(Debug, Clone)]
pub struct Schema {
    definition: SchemaDefinition,
    node_index: BTreeMap<String, usize>,
    edge_index: BTreeMap<String, usize>,
}

impl Schema {
    /// Wrap a definition and build its indexes.
    #[must_use]
    pub fn new(definition: SchemaDefinition) -> Self {
        let mut node_index = BTreeMap::new();
        for (pos, def) in definition.node_types.iter().enumerate() {
            node_index.entry(def.id.clone()).or_insert(pos);
        }
        let mut edge_index = BTreeMap::new();
        for (pos, def) in definition.edge_types.iter().enumerate() {
            edge_index.entry(def.id.clone()).or_insert(pos);
        }
        Self {
            definition,
            node_index,
            edge_index,
        }
    }

    /// Build a schema from raw JSON.
    ///
    /// Fails with `MissingSchema` when the value is `null`.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        if value.is_null() {
            return Err(EngineError::MissingSchema);
        }
        let definition: SchemaDefinition = serde_json::from_value(value.clone())?;
        Ok(Self::new(definition))
    }

    /// A schema with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(SchemaDefinition {
            version: SCHEMA_FORMAT_VERSION.to_string(),
            name: "empty".to_string(),
            description: Some("Schema with no types".to_string()),
            ..SchemaDefinition::default()
        })
    }

    /// A schema with exactly one unrestricted node type and one
    /// unrestricted edge type.
    #[must_use]
    pub fn minimal() -> Self {
        Self::new(SchemaDefinition {
            version: SCHEMA_FORMAT_VERSION.to_string(),
            name: "minimal".to_string(),
            description: Some("Schema with one node type and one edge type".to_string()),
            node_types: vec![NodeTypeDef::new(MINIMAL_NODE_TYPE, "Node")],
            edge_types: vec![EdgeTypeDef::new(MINIMAL_EDGE_TYPE, "Link")],
            constraints: None,
        })
    }

    // ==================== Metadata ====================

    #[must_use]
    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.definition.version
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.definition.description.as_deref()
    }

    // ==================== Type Lookups ====================

    /// All node type definitions in declaration order.
    #[must_use]
    pub fn node_types(&self) -> &[NodeTypeDef] {
        &self.definition.node_types
    }

    /// All edge type definitions in declaration order.
    #[must_use]
    pub fn edge_types(&self) -> &[EdgeTypeDef] {
        &self.definition.edge_types
    }

    /// Number of distinct node type ids.
    #[must_use]
    pub fn node_type_count(&self) -> usize {
        self.node_index.len()
    }

    /// Number of distinct edge type ids.
    #[must_use]
    pub fn edge_type_count(&self) -> usize {
        self.edge_index.len()
    }

    #[must_use]
    pub fn is_valid_node_type(&self, node_type: &str) -> bool {
        self.node_index.contains_key(node_type)
    }

    #[must_use]
    pub fn is_valid_edge_type(&self, edge_type: &str) -> bool {
        self.edge_index.contains_key(edge_type)
    }

    #[must_use]
    pub fn node_type_definition(&self, node_type: &str) -> Option<&NodeTypeDef> {
        self.node_index
            .get(node_type)
            .and_then(|&pos| self.definition.node_types.get(pos))
    }

    #[must_use]
    pub fn edge_type_definition(&self, edge_type: &str) -> Option<&EdgeTypeDef> {
        self.edge_index
            .get(edge_type)
            .and_then(|&pos| self.definition.edge_types.get(pos))
    }

    // ==================== Constraints ====================

    /// Whether `current_count` nodes already exhaust the type's `maxCount`.
    ///
    /// Unknown types and types without a limit are never at their limit.
    #[must_use]
    pub fn is_node_type_limit_reached(&self, node_type: &str, current_count: u64) -> bool {
        self.node_type_definition(node_type)
            .and_then(|def| def.max_count)
            .is_some_and(|max| current_count >= max)
    }

    /// Check whether an edge type may connect a source and target type.
    ///
    /// The first failing constraint determines the reason.
    #[must_use]
    pub fn is_edge_allowed(
        &self,
        edge_type: &str,
        source_type: &str,
        target_type: &str,
    ) -> EdgeCheck {
        let Some(def) = self.edge_type_definition(edge_type) else {
            return EdgeCheck::denied(format!("Unknown edge type: {edge_type}"));
        };

        if !def.allowed_source_types.is_empty()
            && !def.allowed_source_types.iter().any(|t| t == source_type)
        {
            return EdgeCheck::denied(format!(
                "Source type '{source_type}' is not allowed for edge type '{edge_type}'"
            ));
        }

        if !def.allowed_target_types.is_empty()
            && !def.allowed_target_types.iter().any(|t| t == target_type)
        {
            return EdgeCheck::denied(format!(
                "Target type '{target_type}' is not allowed for edge type '{edge_type}'"
            ));
        }

        EdgeCheck::allowed()
    }

    // ==================== Record Validation ====================

    /// Validate a node: id, known type, and the type's required fields.
    #[must_use]
    pub fn validate_node(&self, node: &GraphNode) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if node.id.is_empty() {
            result.error("Node must have an id");
        }

        match node.node_type.as_deref() {
            None | Some("") => result.error("Node must have a type"),
            Some(node_type) => match self.node_type_definition(node_type) {
                None => result.error(format!("Invalid node type: {node_type}")),
                Some(def) => {
                    for field in &def.required_fields {
                        if !node.has_field(field) {
                            result.error(format!("Missing required field: {field}"));
                        }
                    }
                }
            },
        }

        result
    }

    /// Validate an edge: endpoints present, known type and, when a node-type
    /// lookup is supplied and both endpoints resolve, endpoint compatibility.
    #[must_use]
    pub fn validate_edge(
        &self,
        edge: &GraphEdge,
        node_type_of: Option<&dyn Fn(&str) -> Option<String>>,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if edge.source.is_empty() {
            result.error("Edge must have a source");
        }
        if edge.target.is_empty() {
            result.error("Edge must have a target");
        }

        let edge_type = match edge.edge_type.as_deref() {
            None | Some("") => {
                result.error("Edge must have a type");
                return result;
            }
            Some(t) => t,
        };
        if !self.is_valid_edge_type(edge_type) {
            result.error(format!("Invalid edge type: {edge_type}"));
            return result;
        }

        if let Some(lookup) = node_type_of {
            let source_type = lookup(&edge.source).filter(|t| self.is_valid_node_type(t));
            let target_type = lookup(&edge.target).filter(|t| self.is_valid_node_type(t));
            if let (Some(source_type), Some(target_type)) = (source_type, target_type) {
                let check = self.is_edge_allowed(edge_type, &source_type, &target_type);
                if let Some(reason) = check.reason {
                    result.error(reason);
                }
            }
        }

        result
    }
}

// =============================================================================
// TESTS
// =============================================================================
