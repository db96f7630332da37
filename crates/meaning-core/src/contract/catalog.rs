//! Catalog contract: catalog definitions and node catalog references.

use crate::{Catalog, CatalogSet, GraphNode, ValidationResult};
use serde_json::Value;
use std::collections::BTreeSet;

/// Checks catalog sets and the node references that point into them.
///
/// Catalogs are optional, so an absent set is always valid.
pub struct CatalogValidator;

impl CatalogValidator {
    /// Validate a typed catalog set.
    #[must_use]
    pub fn validate(catalogs: &CatalogSet) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for (key, catalog) in catalogs {
            result.merge(Self::validate_catalog(key, catalog));
        }
        result
    }

    /// Validate one typed catalog registered under `key`.
    ///
    /// Repeated entry ids are a warning: the registry index keeps the last
    /// entry carrying the id.
    #[must_use]
    pub fn validate_catalog(key: &str, catalog: &Catalog) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if catalog.id.is_empty() {
            result.error(format!("Catalog '{key}' must have a string id"));
        } else if catalog.id != key {
            result.error(format!(
                "Catalog id '{}' does not match registry key '{key}'",
                catalog.id
            ));
        }

        if catalog.schema.as_ref().is_some_and(|s| !s.is_object()) {
            result.error(format!("Catalog '{key}' schema must be an object"));
        }

        let mut seen = BTreeSet::new();
        for (index, entry) in catalog.entries.iter().enumerate() {
            if entry.id.is_empty() {
                result.error(format!("Catalog '{key}' entry {index} must have a string id"));
            } else if !seen.insert(entry.id.as_str()) {
                result.warn(format!(
                    "Catalog '{key}' entry {index} repeats id '{}'",
                    entry.id
                ));
            }
        }

        result
    }

    /// Validate a raw catalog set before it is deserialized.
    ///
    /// `null` is valid; any other non-object is not.
    #[must_use]
    pub fn validate_json(catalogs: &Value) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if catalogs.is_null() {
            return result;
        }
        let Some(set) = catalogs.as_object() else {
            result.error("Catalogs must be an object keyed by catalog id");
            return result;
        };

        for (key, catalog) in set {
            result.merge(Self::validate_catalog_json(key, catalog));
        }
        result
    }

    /// Validate one raw catalog registered under `key`.
    #[must_use]
    pub fn validate_catalog_json(key: &str, catalog: &Value) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let Some(fields) = catalog.as_object() else {
            result.error(format!("Catalog '{key}' must be an object"));
            return result;
        };

        match fields.get("id").and_then(Value::as_str) {
            None => result.error(format!("Catalog '{key}' must have a string id")),
            Some(id) if id != key => result.error(format!(
                "Catalog id '{id}' does not match registry key '{key}'"
            )),
            Some(_) => {}
        }

        match fields.get("schema") {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => result.error(format!("Catalog '{key}' schema must be an object")),
        }

        let Some(entries) = fields.get("entries").and_then(Value::as_array) else {
            result.error(format!("Catalog '{key}' must have an entries array"));
            return result;
        };

        let mut seen = BTreeSet::new();
        for (index, entry) in entries.iter().enumerate() {
            match entry.get("id").and_then(Value::as_str) {
                None => {
                    result.error(format!("Catalog '{key}' entry {index} must have a string id"));
                }
                Some(id) => {
                    if !seen.insert(id) {
                        result.warn(format!("Catalog '{key}' entry {index} repeats id '{id}'"));
                    }
                }
            }
        }

        result
    }

    /// Cross-check node `catalogRefs` against a catalog set.
    ///
    /// Unknown catalogs and unknown entries are warnings; a ref value that is
    /// not a sequence (or a ref map that is not an object) is an error.
    #[must_use]
    pub fn validate_catalog_refs(nodes: &[GraphNode], catalogs: &CatalogSet) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for node in nodes {
            let Some(refs) = node.catalog_refs() else {
                continue;
            };
            let Some(refs) = refs.as_object() else {
                result.error(format!("Node '{}' catalogRefs must be an object", node.id));
                continue;
            };

            for (catalog_id, ids) in refs {
                let Some(ids) = ids.as_array() else {
                    result.error(format!(
                        "Node '{}' catalogRefs.{catalog_id} must be a sequence",
                        node.id
                    ));
                    continue;
                };
                let Some(catalog) = catalogs.get(catalog_id) else {
                    result.warn(format!(
                        "Node '{}' references unknown catalog '{catalog_id}'",
                        node.id
                    ));
                    continue;
                };
                for id in ids {
                    let known = id
                        .as_str()
                        .is_some_and(|id| catalog.entries.iter().any(|e| e.id == id));
                    if !known {
                        result.warn(format!(
                            "Node '{}' references unknown entry {id} in catalog '{catalog_id}'",
                            node.id
                        ));
                    }
                }
            }
        }

        result
    }
}
