//! Schema contract: required metadata and well-formed type lists.

use crate::{Schema, ValidationResult};
use serde_json::Value;
use std::collections::BTreeSet;

/// Checks that a schema carries a version, a name and two lists of type
/// definitions whose elements each have an id and a label.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate a constructed Schema.
    ///
    /// Serde guarantees the field types, so this checks for empty strings
    /// where an identifier is required and for repeated type ids.
    #[must_use]
    pub fn validate(schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if schema.version().is_empty() {
            result.error("Schema must have a string version");
        }
        if schema.name().is_empty() {
            result.error("Schema must have a string name");
        }

        let node_types = schema.node_types().iter().map(|t| (t.id.as_str(), t.label.as_str()));
        check_type_list(&mut result, "nodeTypes", node_types);

        let edge_types = schema.edge_types().iter().map(|t| (t.id.as_str(), t.label.as_str()));
        check_type_list(&mut result, "edgeTypes", edge_types);

        result
    }

    /// Validate a raw schema definition before it is deserialized.
    #[must_use]
    pub fn validate_json(value: &Value) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let Some(schema) = value.as_object() else {
            if value.is_null() {
                result.error("Schema is required");
            } else {
                result.error("Schema must be an object");
            }
            return result;
        };

        if !schema.get("version").is_some_and(Value::is_string) {
            result.error("Schema must have a string version");
        }
        if !schema.get("name").is_some_and(Value::is_string) {
            result.error("Schema must have a string name");
        }

        for list in ["nodeTypes", "edgeTypes"] {
            match schema.get(list).and_then(Value::as_array) {
                None => result.error(format!("Schema {list} must be an array")),
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if !item.get("id").is_some_and(Value::is_string) {
                            result.error(format!("{list}[{index}] must have a string id"));
                        }
                        if !item.get("label").is_some_and(Value::is_string) {
                            result.error(format!("{list}[{index}] must have a string label"));
                        }
                    }
                }
            }
        }

        result
    }
}

fn check_type_list<'a>(
    result: &mut ValidationResult,
    list: &str,
    types: impl Iterator<Item = (&'a str, &'a str)>,
) {
    let mut seen = BTreeSet::new();
    for (index, (id, label)) in types.enumerate() {
        if id.is_empty() {
            result.error(format!("{list}[{index}] must have a string id"));
        } else if !seen.insert(id) {
            result.error(format!("{list}[{index}] repeats type id '{id}'"));
        }
        if label.is_empty() {
            result.error(format!("{list}[{index}] must have a string label"));
        }
    }
}
