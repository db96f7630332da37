//! # Operator Engine
//!
//! Pure, graph-invariant query functions over a graph and a catalog
//! registry: projection, filtering, expansion and entry-set algebra.
//!
//! Every result is recomputed from scratch on each call. Nothing here
//! mutates the graph or the registry.

use crate::graph::GraphStore;
use crate::query::{AttrQuery, ProjectOptions};
use crate::registry::CatalogRegistry;
use crate::CatalogEntry;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Operators bound to one graph and one registry.
#[derive(Clone, Copy)]
pub struct OperatorEngine<'a> {
    graph: &'a dyn GraphStore,
    registry: &'a CatalogRegistry,
}

impl<'a> OperatorEngine<'a> {
    #[must_use]
    pub fn new(graph: &'a dyn GraphStore, registry: &'a CatalogRegistry) -> Self {
        Self { graph, registry }
    }

    #[must_use]
    pub fn graph(&self) -> &'a dyn GraphStore {
        self.graph
    }

    #[must_use]
    pub fn registry(&self) -> &'a CatalogRegistry {
        self.registry
    }

    // =========================================================================
    // PROJECTION
    // =========================================================================

    /// Catalog entries a node points at.
    ///
    /// Entries referenced through `catalogRefs[catalog_id]` come first, in
    /// reference order, followed by entries whose tags match the node's
    /// effective tags, in catalog order. An entry reachable both ways
    /// appears once. Unknown nodes or catalogs give an empty result.
    #[must_use]
    pub fn project(
        &self,
        node_id: &str,
        catalog_id: &str,
        options: ProjectOptions,
    ) -> Vec<CatalogEntry> {
        let Some(node) = self.graph.node_by_id(node_id) else {
            return Vec::new();
        };
        if !self.registry.has(catalog_id) {
            return Vec::new();
        }

        let mut projected = Vec::new();

        if options.use_refs {
            let ref_ids = node.catalog_ref_ids(catalog_id);
            projected.extend(self.registry.entries_by_ids(catalog_id, &ref_ids));
        }

        if options.use_tags {
            let tags = node.effective_tags();
            if !tags.is_empty() {
                projected.extend(
                    self.registry.filter_by_tags(catalog_id, &tags, options.tag_match),
                );
            }
        }

        dedup_by_id(projected)
    }

    /// Union of the projections of several nodes, in listed order.
    #[must_use]
    pub fn project_multiple<S: AsRef<str>>(
        &self,
        node_ids: &[S],
        catalog_id: &str,
        options: ProjectOptions,
    ) -> Vec<CatalogEntry> {
        node_ids.iter().fold(Vec::new(), |acc, node_id| {
            Self::union(&acc, &self.project(node_id.as_ref(), catalog_id, options))
        })
    }

    /// Project, then keep only the entries matching `query`.
    #[must_use]
    pub fn project_and_filter(
        &self,
        node_id: &str,
        catalog_id: &str,
        query: &AttrQuery,
        options: ProjectOptions,
    ) -> Vec<CatalogEntry> {
        Self::filter(&self.project(node_id, catalog_id, options), query)
    }

    // =========================================================================
    // FILTERING
    // =========================================================================

    /// Entries matching every condition of `query`, in input order.
    #[must_use]
    pub fn filter(entries: &[CatalogEntry], query: &AttrQuery) -> Vec<CatalogEntry> {
        Self::filter_by(entries, |entry| query.matches(entry))
    }

    /// Entries satisfying an arbitrary predicate, in input order.
    #[must_use]
    pub fn filter_by<F>(entries: &[CatalogEntry], predicate: F) -> Vec<CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        entries.iter().filter(|e| predicate(*e)).cloned().collect()
    }

    // =========================================================================
    // EXPANSION
    // =========================================================================

    /// Node ids reachable from `node_id` within `depth` hops. See
    /// [`expand`].
    #[must_use]
    pub fn expand(&self, node_id: &str, depth: usize) -> Vec<String> {
        expand(self.graph, node_id, depth)
    }

    // =========================================================================
    // ENTRY-SET ALGEBRA
    // =========================================================================

    /// Entries of `a` whose id also appears in `b`, in `a` order.
    #[must_use]
    pub fn intersect(a: &[CatalogEntry], b: &[CatalogEntry]) -> Vec<CatalogEntry> {
        let in_b: BTreeSet<&str> = b.iter().map(|e| e.id.as_str()).collect();
        dedup_by_id(a.iter().filter(|e| in_b.contains(e.id.as_str())).cloned().collect())
    }

    /// Entries of `a` followed by the entries of `b` not already present.
    #[must_use]
    pub fn union(a: &[CatalogEntry], b: &[CatalogEntry]) -> Vec<CatalogEntry> {
        dedup_by_id(a.iter().chain(b).cloned().collect())
    }
}

impl std::fmt::Debug for OperatorEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorEngine")
            .field("nodes", &self.graph.node_count())
            .field("catalogs", &self.registry.len())
            .finish()
    }
}

/// Node ids reachable from `node_id` within `depth` hops, with edges
/// treated as undirected. The origin is never included.
///
/// Results come in breadth-first order. A node is queued at most once, so
/// cycles terminate.
#[must_use]
pub fn expand<G: GraphStore + ?Sized>(graph: &G, node_id: &str, depth: usize) -> Vec<String> {
    if depth < 1 {
        return Vec::new();
    }

    let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in graph.edges() {
        adjacency.entry(edge.source.clone()).or_default().push(edge.target.clone());
        adjacency.entry(edge.target).or_default().push(edge.source);
    }

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    let mut reached = Vec::new();

    visited.insert(node_id.to_string());
    queue.push_back((node_id.to_string(), 0_usize));

    while let Some((current, current_depth)) = queue.pop_front() {
        if current_depth >= depth {
            continue;
        }
        let Some(neighbors) = adjacency.get(&current) else {
            continue;
        };
        for neighbor in neighbors {
            if visited.insert(neighbor.clone()) {
                reached.push(neighbor.clone());
                queue.push_back((neighbor.clone(), current_depth.saturating_add(1)));
            }
        }
    }

    reached
}

/// Keep the first entry seen for each id.
fn dedup_by_id(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = BTreeSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
