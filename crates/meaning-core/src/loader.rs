//! # Catalog Loader
//!
//! Resolves a registry description into a concrete catalog set.
//!
//! A registry description maps catalog ids to either an inline catalog
//! object or a path string. Paths are resolved through an injected
//! [`CatalogSource`] (or [`AsyncCatalogSource`]); the loader itself never
//! opens a file.
//!
//! Loading is best effort: a path that fails to resolve is logged and left
//! out of the result, it never aborts the load.

use crate::contract::CatalogValidator;
use crate::primitives::{RESERVED_KEY_PREFIX, RESERVED_REGISTRY_KEYS};
use crate::{CatalogSet, EngineError, LoadError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

// =============================================================================
// RESOLVER CAPABILITIES
// =============================================================================

/// Synchronous path resolution: `path -> raw catalog`.
pub trait CatalogSource {
    fn load(&self, path: &str) -> Result<Value, LoadError>;
}

impl<F> CatalogSource for F
where
    F: Fn(&str) -> Result<Value, LoadError>,
{
    fn load(&self, path: &str) -> Result<Value, LoadError> {
        self(path)
    }
}

/// Asynchronous path resolution. Resolutions for different keys run
/// concurrently, so implementations must be shareable across tasks.
pub trait AsyncCatalogSource: Send + Sync + 'static {
    fn fetch(&self, path: String) -> impl Future<Output = Result<Value, LoadError>> + Send;
}

impl<F, Fut> AsyncCatalogSource for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, LoadError>> + Send,
{
    fn fetch(&self, path: String) -> impl Future<Output = Result<Value, LoadError>> + Send {
        self(path)
    }
}

// =============================================================================
// KEY AND PATH RULES
// =============================================================================

/// Whether a registry-description key describes the registry itself
/// rather than naming a catalog.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_KEY_PREFIX) || RESERVED_REGISTRY_KEYS.contains(&key)
}

/// Whether a path is absolute: a leading `/` or a drive letter.
#[must_use]
pub fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Resolve a catalog path against an optional base path.
///
/// Absolute paths pass through unchanged. Relative paths lose a leading
/// `./` and are joined to the base with a single `/`, after any trailing
/// `/` or `\` on the base is dropped. Without a base the cleaned relative
/// path is returned.
#[must_use]
pub fn resolve_path(path: &str, base_path: Option<&str>) -> String {
    if is_absolute_path(path) {
        return path.to_string();
    }
    let cleaned = path.strip_prefix("./").unwrap_or(path);
    match base_path.filter(|b| !b.is_empty()) {
        Some(base) => format!("{}/{}", base.trim_end_matches(['/', '\\']), cleaned),
        None => cleaned.to_string(),
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// What to do for one description key.
#[derive(Debug, Clone)]
enum Step {
    Inline(Value),
    Resolve(String),
}

/// Loads registry descriptions relative to an optional base path.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    base_path: Option<String>,
}

impl CatalogLoader {
    /// A loader that resolves relative paths as-is.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that joins relative paths to `base_path`.
    #[must_use]
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Resolve a path against this loader's base path.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> String {
        resolve_path(path, self.base_path())
    }

    /// Turn a description into per-key steps, skipping reserved keys.
    ///
    /// Only strings are resolved. Every other value is kept inline as-is so
    /// a malformed catalog reaches validation instead of vanishing.
    fn plan(&self, description: &Value) -> Vec<(String, Step)> {
        let Some(entries) = description.as_object() else {
            tracing::warn!("registry description is not an object; nothing to load");
            return Vec::new();
        };

        let mut steps = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if is_reserved_key(key) {
                tracing::trace!(key = key.as_str(), "skipping reserved registry key");
                continue;
            }
            let step = match value {
                Value::String(path) => Step::Resolve(self.resolve_path(path)),
                inline => Step::Inline(inline.clone()),
            };
            steps.push((key.clone(), step));
        }
        steps
    }

    /// Merge inline catalogs and resolver outcomes, keyed, in description
    /// order. Failed resolutions are logged and dropped.
    fn merge(
        steps: Vec<(String, Step)>,
        mut outcomes: BTreeMap<String, Result<Value, LoadError>>,
    ) -> Map<String, Value> {
        let mut loaded = Map::new();
        for (key, step) in steps {
            match step {
                Step::Inline(catalog) => {
                    loaded.insert(key, catalog);
                }
                Step::Resolve(path) => match outcomes.remove(&key) {
                    Some(Ok(catalog)) => {
                        loaded.insert(key, catalog);
                    }
                    Some(Err(err)) => {
                        tracing::warn!(
                            catalog = key.as_str(),
                            path = path.as_str(),
                            error = %err,
                            "catalog not loaded"
                        );
                    }
                    None => {
                        tracing::warn!(
                            catalog = key.as_str(),
                            path = path.as_str(),
                            "catalog resolution did not complete"
                        );
                    }
                },
            }
        }
        loaded
    }

    /// Load every catalog of a description, resolving paths one by one.
    pub fn load<S: CatalogSource + ?Sized>(
        &self,
        description: &Value,
        source: &S,
    ) -> Map<String, Value> {
        let steps = self.plan(description);
        let outcomes = steps
            .iter()
            .filter_map(|(key, step)| match step {
                Step::Resolve(path) => Some((key.clone(), source.load(path))),
                Step::Inline(_) => None,
            })
            .collect();
        Self::merge(steps, outcomes)
    }

    /// Load every catalog of a description, resolving all paths
    /// concurrently and merging once every resolution has finished.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn load_async<S: AsyncCatalogSource>(
        &self,
        description: &Value,
        source: Arc<S>,
    ) -> Map<String, Value> {
        let steps = self.plan(description);

        let mut tasks = JoinSet::new();
        for (key, step) in &steps {
            if let Step::Resolve(path) = step {
                let source = Arc::clone(&source);
                let key = key.clone();
                let path = path.clone();
                tasks.spawn(async move {
                    let outcome = source.fetch(path).await;
                    (key, outcome)
                });
            }
        }

        let mut outcomes = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, outcome)) => {
                    outcomes.insert(key, outcome);
                }
                Err(err) => tracing::warn!(error = %err, "catalog resolution task failed"),
            }
        }

        Self::merge(steps, outcomes)
    }

    /// Load, then check the result against the catalog-set contract.
    pub fn load_and_validate<S: CatalogSource + ?Sized>(
        &self,
        description: &Value,
        source: &S,
    ) -> Result<CatalogSet, EngineError> {
        Self::validated(self.load(description, source))
    }

    /// Concurrent form of [`CatalogLoader::load_and_validate`].
    pub async fn load_and_validate_async<S: AsyncCatalogSource>(
        &self,
        description: &Value,
        source: Arc<S>,
    ) -> Result<CatalogSet, EngineError> {
        Self::validated(self.load_async(description, source).await)
    }

    fn validated(loaded: Map<String, Value>) -> Result<CatalogSet, EngineError> {
        let loaded = Value::Object(loaded);
        let check = CatalogValidator::validate_json(&loaded);
        if !check.valid {
            return Err(EngineError::InvalidCatalogSet(check.errors));
        }
        Ok(serde_json::from_value(loaded)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
