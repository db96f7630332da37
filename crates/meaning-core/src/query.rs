//! # Query Module
//!
//! Structured predicate and option types for catalog queries.
//!
//! - Attribute predicates are typed `FilterCondition` values, not operator strings
//! - `AttrQuery` composes per-field conditions with logical AND
//! - The `$gt`-style JSON form is accepted at the boundary and parsed once

use crate::{CatalogEntry, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

// =============================================================================
// TAG MATCHING
// =============================================================================

/// How a set of requested tags matches an entry's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// At least one requested tag is present.
    #[default]
    Any,
    /// Every requested tag is present.
    All,
}

impl TagMatch {
    /// Match requested tags against an entry's tags.
    ///
    /// An empty request matches nothing under `Any` and everything under
    /// `All`.
    #[must_use]
    pub fn matches(self, entry_tags: &[String], requested: &[String]) -> bool {
        match self {
            Self::Any => requested.iter().any(|t| entry_tags.contains(t)),
            Self::All => requested.iter().all(|t| entry_tags.contains(t)),
        }
    }
}

// =============================================================================
// PROJECTION OPTIONS
// =============================================================================

/// Options for projecting a node onto a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectOptions {
    /// Include entries listed in the node's `catalogRefs`.
    pub use_refs: bool,
    /// Include entries sharing tags with the node.
    pub use_tags: bool,
    /// Tag match mode for the tag channel.
    pub tag_match: TagMatch,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            use_refs: true,
            use_tags: true,
            tag_match: TagMatch::Any,
        }
    }
}

impl ProjectOptions {
    /// Refs channel only.
    #[must_use]
    pub fn refs_only() -> Self {
        Self {
            use_tags: false,
            ..Self::default()
        }
    }

    /// Tags channel only.
    #[must_use]
    pub fn tags_only() -> Self {
        Self {
            use_refs: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag_match(mut self, tag_match: TagMatch) -> Self {
        self.tag_match = tag_match;
        self
    }
}

// =============================================================================
// FILTER CONDITIONS
// =============================================================================

/// A condition on one entry field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Bare value: sequence fields must contain it, other fields must equal it.
    Equals(Value),
    NotEquals(Value),
    GreaterThan(Value),
    GreaterOrEqual(Value),
    LessThan(Value),
    LessOrEqual(Value),
    /// Field value is one of the listed values.
    In(Vec<Value>),
    /// Field value is none of the listed values.
    NotIn(Vec<Value>),
    /// Sequence field contains the value.
    Contains(Value),
}

impl FilterCondition {
    /// Evaluate against a field value (`None` when the field is absent).
    ///
    /// Ordering comparisons hold only between two numbers or two strings.
    #[must_use]
    pub fn matches(&self, field: Option<&Value>) -> bool {
        match self {
            Self::Equals(expected) => contains_or_equals(field, expected),
            Self::NotEquals(expected) => field != Some(expected),
            Self::GreaterThan(bound) => compare(field, bound) == Some(Ordering::Greater),
            Self::GreaterOrEqual(bound) => {
                matches!(compare(field, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            Self::LessThan(bound) => compare(field, bound) == Some(Ordering::Less),
            Self::LessOrEqual(bound) => {
                matches!(compare(field, bound), Some(Ordering::Less | Ordering::Equal))
            }
            Self::In(options) => field.is_some_and(|v| options.contains(v)),
            Self::NotIn(options) => !field.is_some_and(|v| options.contains(v)),
            Self::Contains(item) => field
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(item)),
        }
    }

    /// Parse one `{"$op": operand}` object or a bare value.
    ///
    /// An object whose keys are all operators becomes an AND of its
    /// conditions; any other value is a bare `Equals`.
    pub fn parse(value: &Value) -> Result<Vec<Self>, EngineError> {
        let operators = value
            .as_object()
            .filter(|o| !o.is_empty() && o.keys().all(|k| k.starts_with('$')));
        let Some(ops) = operators else {
            return Ok(vec![Self::Equals(value.clone())]);
        };

        ops.iter()
            .map(|(op, operand)| {
                Ok(match op.as_str() {
                    "$gt" => Self::GreaterThan(operand.clone()),
                    "$gte" => Self::GreaterOrEqual(operand.clone()),
                    "$lt" => Self::LessThan(operand.clone()),
                    "$lte" => Self::LessOrEqual(operand.clone()),
                    "$ne" => Self::NotEquals(operand.clone()),
                    "$in" => Self::In(operand_list(op, operand)?),
                    "$nin" => Self::NotIn(operand_list(op, operand)?),
                    "$contains" => Self::Contains(operand.clone()),
                    other => {
                        return Err(EngineError::Deserialization(format!(
                            "Unknown filter operator: {other}"
                        )));
                    }
                })
            })
            .collect()
    }
}

fn operand_list(op: &str, operand: &Value) -> Result<Vec<Value>, EngineError> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| EngineError::Deserialization(format!("{op} expects an array operand")))
}

/// Sequence fields contain `expected`, scalar fields equal it.
pub(crate) fn contains_or_equals(field: Option<&Value>, expected: &Value) -> bool {
    match field {
        Some(Value::Array(items)) => items.contains(expected) || field == Some(expected),
        Some(value) => value == expected,
        None => false,
    }
}

fn compare(field: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (field?, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// =============================================================================
// ATTRIBUTE QUERY
// =============================================================================

/// Per-field conditions combined with logical AND.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttrQuery {
    conditions: Vec<(String, FilterCondition)>,
}

impl AttrQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: FilterCondition) -> Self {
        self.conditions.push((field.into(), condition));
        self
    }

    #[must_use]
    pub fn equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::Equals(value.into()))
    }

    #[must_use]
    pub fn not_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::NotEquals(value.into()))
    }

    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::GreaterThan(value.into()))
    }

    #[must_use]
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::GreaterOrEqual(value.into()))
    }

    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::LessThan(value.into()))
    }

    #[must_use]
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::LessOrEqual(value.into()))
    }

    #[must_use]
    pub fn one_of(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.with(field, FilterCondition::In(values))
    }

    #[must_use]
    pub fn none_of(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.with(field, FilterCondition::NotIn(values))
    }

    #[must_use]
    pub fn contains(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterCondition::Contains(value.into()))
    }

    /// Parse the JSON operator-object form, e.g.
    /// `{"year": {"$gte": 2019}, "tags": "ai"}`.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        let fields = value.as_object().ok_or_else(|| {
            EngineError::Deserialization("Attribute query must be an object".to_string())
        })?;

        let mut query = Self::new();
        for (field, spec) in fields {
            for condition in FilterCondition::parse(spec)? {
                query.conditions.push((field.clone(), condition));
            }
        }
        Ok(query)
    }

    #[must_use]
    pub fn conditions(&self) -> &[(String, FilterCondition)] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether every condition holds for the entry. An empty query matches
    /// every entry.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            if field == "id" {
                condition.matches(Some(&Value::String(entry.id.clone())))
            } else {
                condition.matches(entry.field(field))
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
