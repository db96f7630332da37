//! # Engine Primitives
//!
//! Hardcoded constants shared across the engine.
//!
//! The engine starts with no vocabulary: these are the only names it ever
//! interprets, and none of them is a node or edge type.

/// Engine version reported by `Engine::stats`.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix marking a pointer-tag (`cap:<capability>`).
///
/// During projection a pointer-tag contributes the bare `<capability>` tag.
pub const POINTER_TAG_PREFIX: &str = "cap:";

/// Nested sub-record searched for required fields when they are not set
/// directly on a node.
pub const NESTED_DATA_FIELD: &str = "data";

/// Prefix of registry-description keys that describe the registry itself.
pub const RESERVED_KEY_PREFIX: &str = "$";

/// Literal registry-description keys that never name a catalog.
pub const RESERVED_REGISTRY_KEYS: [&str; 2] = ["version", "description"];

/// Id of the single node type of a minimal schema.
pub const MINIMAL_NODE_TYPE: &str = "node";

/// Id of the single edge type of a minimal schema.
pub const MINIMAL_EDGE_TYPE: &str = "link";

/// Schema format version written by the factory schemas.
pub const SCHEMA_FORMAT_VERSION: &str = "1.0.0";
