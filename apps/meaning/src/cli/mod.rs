//! # Meaning CLI Module
//!
//! This module implements the CLI interface for the meaning engine.
//!
//! ## Available Commands
//!
//! - `validate` - Run the World contract checks and report every problem
//! - `stats` - Show engine, world, graph and catalog statistics
//! - `node` - Show one node
//! - `neighbors` - List a node's neighbors
//! - `expand` - List nodes within N hops
//! - `project` - Project a node onto a catalog
//! - `filter` - Filter a catalog's entries
//! - `catalogs` - List loaded catalogs

mod commands;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::world_file::load_world;
use clap::{Parser, Subcommand, ValueEnum};
use meaning_core::{Engine, TagMatch};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Meaning - a domain-agnostic meaning engine
///
/// Loads a world (schema, graph, catalogs) and answers read queries over it.
#[derive(Parser, Debug)]
#[command(name = "meaning")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the world document
    #[arg(short = 'w', long, global = true, default_value = "world.json")]
    pub world: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base directory for relative catalog paths (overrides the config file)
    #[arg(long, global = true)]
    pub base_path: Option<PathBuf>,

    /// Resolve catalog files one at a time instead of concurrently
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Tag match mode for projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatchMode {
    /// Entry shares at least one tag with the node
    #[default]
    Any,
    /// Entry carries every tag of the node
    All,
}

impl From<MatchMode> for TagMatch {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Any => Self::Any,
            MatchMode::All => Self::All,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the world and list errors and warnings
    Validate,

    /// Show world statistics
    Stats,

    /// Show a node by id
    Node {
        /// Node ID
        id: String,
    },

    /// List the neighbors of a node
    Neighbors {
        /// Node ID
        id: String,
    },

    /// List node ids reachable within a number of hops
    Expand {
        /// Origin node ID
        id: String,

        /// Maximum number of hops
        #[arg(short, long, default_value = "1")]
        depth: usize,
    },

    /// Project a node onto a catalog
    Project {
        /// Node ID
        node: String,

        /// Catalog ID
        catalog: String,

        /// Ignore the node's catalogRefs
        #[arg(long, conflicts_with = "refs_only")]
        tags_only: bool,

        /// Ignore the node's tags
        #[arg(long)]
        refs_only: bool,

        /// Tag match mode
        #[arg(short = 'm', long = "match", value_enum, default_value_t = MatchMode::Any)]
        match_mode: MatchMode,

        /// Attribute query applied to the projection (JSON object)
        #[arg(long = "where")]
        query: Option<String>,
    },

    /// Filter the entries of a catalog
    Filter {
        /// Catalog ID
        catalog: String,

        /// Attribute query (JSON object, e.g. '{"year": {"$gte": 2019}}')
        #[arg(long = "where", default_value = "{}")]
        query: String,
    },

    /// List loaded catalogs
    Catalogs,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let config =
        AppConfig::load(cli.config.as_deref())?.with_overrides(cli.base_path, cli.sequential);
    let world = load_world(&cli.world, &config).await?;
    let json_mode = cli.json;

    let command = cli.command.unwrap_or(Commands::Stats);
    if matches!(command, Commands::Validate) {
        let result = world.validate();
        println!("{}", cmd_validate(&result, json_mode)?);
        if !result.valid {
            return Err(AppError::InvalidWorld(result.errors.len()));
        }
        return Ok(());
    }

    let engine = Engine::new(world)?;
    let output = match command {
        Commands::Validate | Commands::Stats => cmd_stats(&engine, json_mode)?,
        Commands::Node { id } => cmd_node(&engine, &id, json_mode)?,
        Commands::Neighbors { id } => cmd_neighbors(&engine, &id, json_mode)?,
        Commands::Expand { id, depth } => cmd_expand(&engine, &id, depth, json_mode)?,
        Commands::Project {
            node,
            catalog,
            tags_only,
            refs_only,
            match_mode,
            query,
        } => {
            let options = project_options(tags_only, refs_only, match_mode);
            cmd_project(&engine, &node, &catalog, options, query.as_deref(), json_mode)?
        }
        Commands::Filter { catalog, query } => cmd_filter(&engine, &catalog, &query, json_mode)?,
        Commands::Catalogs => cmd_catalogs(&engine, json_mode)?,
    };
    println!("{output}");
    Ok(())
}
