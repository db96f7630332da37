//! # Contract Module
//!
//! Stateless conformance checks run before the engine trusts a candidate
//! schema, graph, catalog set or world.
//!
//! Every validator returns a `ValidationResult` instead of failing, so a
//! host can act on each problem rather than stopping at the first one.
//! Warnings never make a result invalid.

mod catalog;
mod graph;
mod schema;
mod world;

pub use catalog::CatalogValidator;
pub use graph::GraphValidator;
pub use schema::SchemaValidator;
pub use world::WorldValidator;
