//! # CLI Command Implementations
//!
//! Each command renders its result as text or JSON and returns it; the
//! caller decides where it goes.

use super::MatchMode;
use crate::error::AppError;
use meaning_core::{
    AttrQuery, CatalogEntry, Engine, GraphNode, ProjectOptions, ValidationResult, World,
};
use serde::Serialize;
use std::fmt::Write as _;

/// Entries shown in text mode before the listing is truncated.
const TEXT_LISTING_LIMIT: usize = 50;

// =============================================================================
// RENDERING HELPERS
// =============================================================================

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn parse_query(raw: &str) -> Result<AttrQuery, AppError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Argument(format!("--where is not valid JSON: {e}")))?;
    Ok(AttrQuery::from_json(&value)?)
}

fn entry_line(entry: &CatalogEntry) -> String {
    let tags = entry.tags();
    if tags.is_empty() {
        format!("  {}", entry.id)
    } else {
        format!("  {} [{}]", entry.id, tags.join(", "))
    }
}

fn render_entries(
    title: &str,
    entries: &[CatalogEntry],
    json_mode: bool,
) -> Result<String, AppError> {
    if json_mode {
        return to_json(entries);
    }

    let noun = if entries.len() == 1 { "entry" } else { "entries" };
    let mut out = format!("{title}: {} {noun}", entries.len());
    for entry in entries.iter().take(TEXT_LISTING_LIMIT) {
        let _ = write!(out, "\n{}", entry_line(entry));
    }
    if entries.len() > TEXT_LISTING_LIMIT {
        let _ = write!(out, "\n  ... and {} more", entries.len() - TEXT_LISTING_LIMIT);
    }
    Ok(out)
}

fn render_ids(title: &str, ids: &[String], json_mode: bool) -> Result<String, AppError> {
    if json_mode {
        return to_json(ids);
    }
    if ids.is_empty() {
        return Ok(format!("{title}: none"));
    }
    Ok(format!("{title}: {}", ids.join(", ")))
}

/// Build projection options from the command-line switches.
#[must_use]
pub fn project_options(tags_only: bool, refs_only: bool, match_mode: MatchMode) -> ProjectOptions {
    let options = if tags_only {
        ProjectOptions::tags_only()
    } else if refs_only {
        ProjectOptions::refs_only()
    } else {
        ProjectOptions::default()
    };
    options.with_tag_match(match_mode.into())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Render a validation report.
pub fn cmd_validate(result: &ValidationResult, json_mode: bool) -> Result<String, AppError> {
    if json_mode {
        return to_json(result);
    }

    let mut out = String::from(if result.valid { "World is valid" } else { "World is INVALID" });
    for error in &result.errors {
        let _ = write!(out, "\n  error:   {error}");
    }
    for warning in &result.warnings {
        let _ = write!(out, "\n  warning: {warning}");
    }
    Ok(out)
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show engine, world, graph and catalog statistics.
pub fn cmd_stats<W: World>(engine: &Engine<W>, json_mode: bool) -> Result<String, AppError> {
    let stats = engine.stats();
    if json_mode {
        return to_json(&stats);
    }

    let mut out = String::from("World Statistics\n================");
    let _ = write!(out, "\nEngine:      {}", stats.engine_version);
    let _ = write!(out, "\nWorld:       {} {}", stats.world_name, stats.world_version);
    let _ = write!(out, "\nNode types:  {}", stats.node_type_count);
    let _ = write!(out, "\nEdge types:  {}", stats.edge_type_count);
    let _ = write!(out, "\nNodes:       {}", stats.node_count);
    let _ = write!(out, "\nEdges:       {}", stats.edge_count);
    match &stats.catalogs {
        Some(catalogs) => {
            let _ = write!(
                out,
                "\nCatalogs:    {} ({} entries)",
                catalogs.catalog_count, catalogs.total_entries
            );
        }
        None => out.push_str("\nCatalogs:    none"),
    }
    Ok(out)
}

// =============================================================================
// GRAPH COMMANDS
// =============================================================================

/// Show one node.
pub fn cmd_node<W: World>(
    engine: &Engine<W>,
    id: &str,
    json_mode: bool,
) -> Result<String, AppError> {
    let node: Option<GraphNode> = engine.node(id);
    if json_mode {
        return to_json(&node);
    }

    let Some(node) = node else {
        return Ok(format!("Node {id} not found"));
    };
    let mut out = format!("Node {} ({})", node.id, node.type_name());
    for (key, value) in &node.fields {
        let _ = write!(out, "\n  {key} = {value}");
    }
    let edges = engine.edges_of_node(id);
    let _ = write!(out, "\n  edges: {}", edges.len());
    Ok(out)
}

/// List a node's neighbors.
pub fn cmd_neighbors<W: World>(
    engine: &Engine<W>,
    id: &str,
    json_mode: bool,
) -> Result<String, AppError> {
    render_ids(&format!("Neighbors of {id}"), &engine.neighbors(id), json_mode)
}

/// List node ids within `depth` hops.
pub fn cmd_expand<W: World>(
    engine: &Engine<W>,
    id: &str,
    depth: usize,
    json_mode: bool,
) -> Result<String, AppError> {
    render_ids(
        &format!("Within {depth} hop(s) of {id}"),
        &engine.expand(id, depth),
        json_mode,
    )
}

// =============================================================================
// CATALOG COMMANDS
// =============================================================================

/// Project a node onto a catalog, optionally filtering the result.
pub fn cmd_project<W: World>(
    engine: &Engine<W>,
    node: &str,
    catalog: &str,
    options: ProjectOptions,
    query: Option<&str>,
    json_mode: bool,
) -> Result<String, AppError> {
    let entries = match query {
        Some(raw) => engine.project_and_filter(node, catalog, &parse_query(raw)?, options),
        None => engine.project(node, catalog, options),
    };
    render_entries(&format!("{node} -> {catalog}"), &entries, json_mode)
}

/// Filter a catalog's entries with a JSON attribute query.
pub fn cmd_filter<W: World>(
    engine: &Engine<W>,
    catalog: &str,
    query: &str,
    json_mode: bool,
) -> Result<String, AppError> {
    let entries = engine.filter(catalog, &parse_query(query)?);
    render_entries(catalog, &entries, json_mode)
}

/// List loaded catalogs.
pub fn cmd_catalogs<W: World>(engine: &Engine<W>, json_mode: bool) -> Result<String, AppError> {
    let stats = engine.registry().map(|r| r.stats()).unwrap_or_default();
    if json_mode {
        return to_json(&stats);
    }

    if stats.catalog_count == 0 {
        return Ok("No catalogs loaded".to_string());
    }
    let mut out = format!("Catalogs: {}", stats.catalog_count);
    for (id, catalog) in &stats.catalogs {
        let schema = if catalog.has_schema { ", schema" } else { "" };
        let _ = write!(out, "\n  {id} ({} entries{schema})", catalog.entry_count);
    }
    Ok(out)
}
