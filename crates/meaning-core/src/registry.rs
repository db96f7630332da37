//! # Catalog Registry
//!
//! Owns a set of named catalogs and a per-catalog entry-id index.
//!
//! All mutation happens in `load`/`load_all`; every query takes `&self`.
//! A host sharing one registry across threads wraps it in a
//! single-writer/multi-reader lock (e.g. `tokio::sync::RwLock`).

use crate::contract::CatalogValidator;
use crate::query::{TagMatch, contains_or_equals};
use crate::{Catalog, CatalogEntry, CatalogSet, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// STATISTICS
// =============================================================================

/// Per-catalog statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub entry_count: usize,
    pub has_schema: bool,
}

/// Aggregate registry statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub catalog_count: usize,
    pub catalogs: BTreeMap<String, CatalogStats>,
    pub total_entries: usize,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// The catalog registry.
///
/// The entry index maps entry id to position in the catalog's entry list.
/// It is rebuilt from scratch whenever a catalog id is (re)loaded; when a
/// catalog repeats an entry id, the last entry carrying it wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    catalogs: BTreeMap<String, Catalog>,
    index: BTreeMap<String, BTreeMap<String, usize>>,
}

impl CatalogRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every catalog of `catalogs`.
    pub fn from_catalogs(catalogs: &CatalogSet) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        registry.load_all(catalogs)?;
        Ok(registry)
    }

    // ==================== Loading ====================

    /// Load (or replace) one catalog.
    ///
    /// On failure the registry is left unchanged for `catalog_id`.
    pub fn load(&mut self, catalog_id: &str, catalog: Catalog) -> Result<&mut Self, EngineError> {
        let check = CatalogValidator::validate_catalog(catalog_id, &catalog);
        if !check.valid {
            return Err(EngineError::InvalidCatalog {
                id: catalog_id.to_string(),
                errors: check.errors,
            });
        }

        let mut entry_index = BTreeMap::new();
        for (pos, entry) in catalog.entries.iter().enumerate() {
            entry_index.insert(entry.id.clone(), pos);
        }

        tracing::trace!(
            catalog = catalog_id,
            entries = catalog.entries.len(),
            "catalog loaded"
        );

        self.index.insert(catalog_id.to_string(), entry_index);
        self.catalogs.insert(catalog_id.to_string(), catalog);
        Ok(self)
    }

    /// Load a whole catalog set. Nothing is loaded if any catalog is
    /// invalid.
    pub fn load_all(&mut self, catalogs: &CatalogSet) -> Result<&mut Self, EngineError> {
        let check = CatalogValidator::validate(catalogs);
        if !check.valid {
            return Err(EngineError::InvalidCatalogSet(check.errors));
        }
        for (id, catalog) in catalogs {
            self.load(id, catalog.clone())?;
        }
        Ok(self)
    }

    /// Load one raw catalog after checking its shape.
    pub fn load_json(
        &mut self,
        catalog_id: &str,
        catalog: &Value,
    ) -> Result<&mut Self, EngineError> {
        let check = CatalogValidator::validate_catalog_json(catalog_id, catalog);
        if !check.valid {
            return Err(EngineError::InvalidCatalog {
                id: catalog_id.to_string(),
                errors: check.errors,
            });
        }
        let catalog: Catalog = serde_json::from_value(catalog.clone())?;
        self.load(catalog_id, catalog)
    }

    /// Load a raw catalog set after checking its shape. `null` loads nothing.
    pub fn load_all_json(&mut self, catalogs: &Value) -> Result<&mut Self, EngineError> {
        let check = CatalogValidator::validate_json(catalogs);
        if !check.valid {
            return Err(EngineError::InvalidCatalogSet(check.errors));
        }
        if catalogs.is_null() {
            return Ok(self);
        }
        let set: CatalogSet = serde_json::from_value(catalogs.clone())?;
        self.load_all(&set)
    }

    // ==================== Lookups ====================

    #[must_use]
    pub fn get(&self, catalog_id: &str) -> Option<&Catalog> {
        self.catalogs.get(catalog_id)
    }

    #[must_use]
    pub fn has(&self, catalog_id: &str) -> bool {
        self.catalogs.contains_key(catalog_id)
    }

    /// Registered catalog ids in key order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Number of registered catalogs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// A copy of a catalog's entries, in catalog order. Empty for unknown ids.
    #[must_use]
    pub fn entries(&self, catalog_id: &str) -> Vec<CatalogEntry> {
        self.catalogs
            .get(catalog_id)
            .map(|c| c.entries.clone())
            .unwrap_or_default()
    }

    /// One entry by id.
    #[must_use]
    pub fn entry(&self, catalog_id: &str, entry_id: &str) -> Option<&CatalogEntry> {
        let pos = *self.index.get(catalog_id)?.get(entry_id)?;
        self.catalogs.get(catalog_id)?.entries.get(pos)
    }

    /// Entries for the requested ids, in requested order. Unknown ids are
    /// skipped.
    #[must_use]
    pub fn entries_by_ids<S: AsRef<str>>(
        &self,
        catalog_id: &str,
        entry_ids: &[S],
    ) -> Vec<CatalogEntry> {
        entry_ids
            .iter()
            .filter_map(|id| self.entry(catalog_id, id.as_ref()))
            .cloned()
            .collect()
    }

    // ==================== Filters ====================

    /// Entries satisfying `predicate`, in catalog order.
    #[must_use]
    pub fn filter<F>(&self, catalog_id: &str, predicate: F) -> Vec<CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        self.catalogs
            .get(catalog_id)
            .map(|c| c.entries.iter().filter(|e| predicate(*e)).cloned().collect())
            .unwrap_or_default()
    }

    /// Entries whose fields match every requested attribute.
    ///
    /// A sequence-valued field matches when it contains the requested
    /// value; any other field must equal it exactly. A sequence on the
    /// request side is compared by exact equality only.
    #[must_use]
    pub fn filter_by_attrs(
        &self,
        catalog_id: &str,
        attrs: &Map<String, Value>,
    ) -> Vec<CatalogEntry> {
        self.filter(catalog_id, |entry| {
            attrs
                .iter()
                .all(|(key, expected)| contains_or_equals(entry.get(key).as_ref(), expected))
        })
    }

    /// Entries whose `tags` match the requested tags under `mode`.
    #[must_use]
    pub fn filter_by_tags<S: AsRef<str>>(
        &self,
        catalog_id: &str,
        tags: &[S],
        mode: TagMatch,
    ) -> Vec<CatalogEntry> {
        let requested: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self.filter(catalog_id, |entry| mode.matches(&entry.tags(), &requested))
    }

    // ==================== Statistics ====================

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let catalogs: BTreeMap<String, CatalogStats> = self
            .catalogs
            .iter()
            .map(|(id, catalog)| {
                (
                    id.clone(),
                    CatalogStats {
                        entry_count: catalog.entries.len(),
                        has_schema: catalog.schema.is_some(),
                    },
                )
            })
            .collect();

        RegistryStats {
            catalog_count: catalogs.len(),
            total_entries: catalogs.values().map(|s| s.entry_count).sum(),
            catalogs,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tools() -> Catalog {
        serde_json::from_value(json!({
            "id": "tools",
            "entries": [
                {"id": "vscode", "tags": ["editor", "free"], "kind": "ide"},
                {"id": "cursor", "tags": ["editor", "ai"], "kind": "ide"},
                {"id": "copilot", "tags": ["ai"], "kind": "assistant"}
            ]
        }))
        .expect("catalog")
    }

    fn registry() -> CatalogRegistry {
        let mut registry = CatalogRegistry::new();
        registry.load("tools", tools()).expect("load");
        registry
    }

    #[test]
    fn load_rejects_mismatched_id_and_keeps_state() {
        let mut registry = registry();
        let err = registry.load("other", tools());
        assert!(matches!(err, Err(EngineError::InvalidCatalog { .. })));
        assert!(!registry.has("other"));
        assert!(registry.has("tools"));
    }

    #[test]
    fn reload_replaces_instead_of_merging() {
        let mut registry = registry();
        registry
            .load("tools", Catalog::new("tools", vec![CatalogEntry::new("vim")]))
            .expect("reload");
        assert_eq!(registry.entries("tools").len(), 1);
        assert!(registry.entry("tools", "vscode").is_none());
        assert!(registry.entry("tools", "vim").is_some());
    }

    #[test]
    fn load_chains() {
        let mut registry = CatalogRegistry::new();
        registry
            .load("tools", tools())
            .and_then(|r| r.load("ai", Catalog::new("ai", vec![])))
            .expect("chain");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn load_all_is_fail_fast() {
        let mut set = CatalogSet::new();
        set.insert("tools".into(), tools());
        set.insert("broken".into(), Catalog::new("mismatch", vec![]));

        let mut registry = CatalogRegistry::new();
        assert!(registry.load_all(&set).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn entries_by_ids_keeps_request_order_and_skips_unknown() {
        let registry = registry();
        let picked = registry.entries_by_ids("tools", &["copilot", "nope", "vscode"]);
        let ids: Vec<_> = picked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["copilot", "vscode"]);
        assert!(registry.entries_by_ids("missing", &["vscode"]).is_empty());
    }

    #[test]
    fn filter_by_attrs_sequence_or_equality() {
        let registry = registry();
        let attrs = json!({"tags": "ai", "kind": "ide"});
        let found = registry.filter_by_attrs("tools", attrs.as_object().expect("object"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "cursor");

        // A sequence on the request side only matches by exact equality.
        let attrs = json!({"tags": ["editor", "ai"]});
        let found = registry.filter_by_attrs("tools", attrs.as_object().expect("object"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "cursor");
    }

    #[test]
    fn filter_by_tags_any_and_all() {
        let registry = registry();
        assert_eq!(registry.filter_by_tags("tools", &["ai"], TagMatch::Any).len(), 2);
        assert_eq!(
            registry.filter_by_tags("tools", &["editor", "ai"], TagMatch::All).len(),
            1
        );
        assert_eq!(
            registry.filter_by_tags("tools", &["editor", "ai"], TagMatch::Any).len(),
            3
        );
    }

    #[test]
    fn duplicate_entry_ids_resolve_last_write_wins() {
        let mut registry = CatalogRegistry::new();
        let catalog = Catalog::new(
            "dup",
            vec![
                CatalogEntry::new("x").with_field("rev", json!(1)),
                CatalogEntry::new("x").with_field("rev", json!(2)),
            ],
        );
        registry.load("dup", catalog).expect("load");
        let entry = registry.entry("dup", "x").expect("entry");
        assert_eq!(entry.field("rev"), Some(&json!(2)));
        // The entry list itself is untouched.
        assert_eq!(registry.entries("dup").len(), 2);
    }

    #[test]
    fn load_all_json_validates_shape() {
        let mut registry = CatalogRegistry::new();
        assert!(registry.load_all_json(&Value::Null).is_ok());
        assert!(registry.load_all_json(&json!({"a": {"id": "a"}})).is_err());
        registry
            .load_all_json(&json!({"a": {"id": "a", "schema": {}, "entries": [{"id": "1"}]}}))
            .expect("load");
        let stats = registry.stats();
        assert_eq!(stats.catalog_count, 1);
        assert_eq!(stats.total_entries, 1);
        assert!(stats.catalogs["a"].has_schema);
    }

    #[test]
    fn load_json_checks_one_catalog() {
        let mut registry = registry();

        let bad_schema = json!({"id": "tools", "schema": "x", "entries": []});
        let expected = vec!["Catalog 'tools' schema must be an object".to_string()];
        let err = registry.load_json("tools", &bad_schema);
        assert!(matches!(
            err,
            Err(EngineError::InvalidCatalog { ref id, ref errors })
                if id == "tools" && *errors == expected
        ));
        // A rejected reload leaves the previous catalog in place.
        assert_eq!(registry.entries("tools").len(), 3);

        registry
            .load_json("langs", &json!({"id": "langs", "entries": [{"id": "rust"}]}))
            .expect("load")
            .load_json("tools", &json!({"id": "tools", "entries": []}))
            .expect("chain");
        assert!(registry.entry("langs", "rust").is_some());
        assert!(registry.entries("tools").is_empty());
    }
}
