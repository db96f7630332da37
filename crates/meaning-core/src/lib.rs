//! # meaning-core
//!
//! A domain-agnostic meaning engine: typed graphs, external reference
//! catalogs, and the pure operators that relate the two.
//!
//! A host describes its domain with a [`Schema`], supplies a graph (or seed
//! data to derive one from) and optionally a set of [`Catalog`]s. The
//! [`WorldAdapter`] assembles those into a [`World`], the contract
//! validators check it, and the [`Engine`] serves queries over it.
//!
//! ## Architectural Constraints
//!
//! - The core never opens a file or a socket: catalog paths are resolved
//!   through an injected [`CatalogSource`] or [`AsyncCatalogSource`]
//! - Queries never mutate; all mutation happens while loading
//! - Lookup misses return empty results, never errors
//! - Validators report problems as data ([`ValidationResult`]); only
//!   construction fails with [`EngineError`]

// =============================================================================
// MODULES
// =============================================================================

pub mod contract;
pub mod engine;
pub mod graph;
pub mod loader;
pub mod operators;
pub mod primitives;
pub mod query;
pub mod registry;
pub mod schema;
pub mod types;
pub mod world;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Catalog, CatalogEntry, CatalogSet, EdgeCheck, EngineError, GraphEdge, GraphNode, LoadError,
    SeedData, ValidationResult, WorldConfig,
};

// =============================================================================
// RE-EXPORTS: Schema, Graph and World
// =============================================================================

pub use graph::{GraphCapability, GraphStore, SeedGraph};
pub use schema::{EdgeTypeDef, NodeTypeDef, Schema, SchemaDefinition};
pub use world::{World, WorldAccessor, WorldAdapter, WorldInput};

// =============================================================================
// RE-EXPORTS: Validation
// =============================================================================

pub use contract::{CatalogValidator, GraphValidator, SchemaValidator, WorldValidator};

// =============================================================================
// RE-EXPORTS: Catalogs and Operators
// =============================================================================

pub use engine::{Engine, EngineStats};
pub use loader::{AsyncCatalogSource, CatalogLoader, CatalogSource, is_reserved_key, resolve_path};
pub use operators::OperatorEngine;
pub use query::{AttrQuery, FilterCondition, ProjectOptions, TagMatch};
pub use registry::{CatalogRegistry, CatalogStats, RegistryStats};
