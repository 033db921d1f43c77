//! Persisted procedure model.
//!
//! A procedure is an ordered list of operation rows grouped under a method
//! name. Procedures are authored elsewhere (recorder plus an external
//! editor), persisted externally, loaded once per execution context and
//! never mutated by the engine.

use crate::bookmark::Bookmark;
use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, instrument};

/// One typed operation argument.
///
/// A closed sum type with exhaustive matching, not a loosely-typed object
/// with a string type field: misrouting an element where a literal belongs
/// fails to compile instead of failing at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ProcArg {
    /// A persisted bookmark resolved to a live element at execution time.
    Element(Bookmark),
    /// String literal.
    Str(String),
    /// Numeric literal, rendered to a string at dispatch time.
    Number(f64),
    /// Reference to a slot in the run's variable scope.
    Var(String),
}

/// One argument slot of a row. The flag is independent of the stored value:
/// a disabled slot is excluded from the operation call even when populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSlot {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub arg: ProcArg,
}

fn default_enabled() -> bool {
    true
}

impl ArgSlot {
    pub fn new(arg: ProcArg) -> Self {
        Self { enabled: true, arg }
    }

    pub fn disabled(arg: ProcArg) -> Self {
        Self {
            enabled: false,
            arg,
        }
    }
}

/// One step of a procedure: an operation identifier, up to three argument
/// slots, and an optional output variable binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcOpRow {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg1: Option<ArgSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg2: Option<ArgSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg3: Option<ArgSlot>,
    /// Scope slot the produced value is stored under, overwriting any prior
    /// binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_var: Option<String>,
    /// Cached preview of the last produced value. Presentation only, never
    /// authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl ProcOpRow {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            arg1: None,
            arg2: None,
            arg3: None,
            output_var: None,
            preview: None,
        }
    }

    /// The three slots in row order.
    pub fn slots(&self) -> [Option<&ArgSlot>; 3] {
        [self.arg1.as_ref(), self.arg2.as_ref(), self.arg3.as_ref()]
    }
}

/// Mapping from method name to its ordered row list. Serializes as the
/// plain map, which is the on-disk format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcedureStore {
    methods: HashMap<String, Vec<ProcOpRow>>,
}

impl ProcedureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file.
    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AutomationError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AutomationError::PlatformError(format!("failed to read procedure store: {e}"))
        })?;
        let store: Self = serde_json::from_str(&content).map_err(|e| {
            AutomationError::InvalidArgument(format!("malformed procedure store: {e}"))
        })?;
        info!(methods = store.methods.len(), "loaded procedure store");
        Ok(store)
    }

    pub fn insert(&mut self, method: impl Into<String>, rows: Vec<ProcOpRow>) {
        self.methods.insert(method.into(), rows);
    }

    pub fn rows(&self, method: &str) -> Option<&[ProcOpRow]> {
        self.methods.get(method).map(Vec::as_slice)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}
