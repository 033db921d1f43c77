//! Procedure execution.
//!
//! A run walks its rows strictly in order on one logical thread of control;
//! asynchronous operations are awaited inline, never fanned out, because
//! later rows may read variables or cached elements produced by earlier
//! ones. The run exclusively owns its variable scope and element cache;
//! concurrent runs each get their own, and nothing at this layer is shared
//! or locked.

use crate::bookmark::Bookmark;
use crate::element::UiElement;
use crate::locator::{BookmarkLocator, ResolveMode};
use crate::ops::{LazyArg, OpCall, OperationDispatcher, StepOutcome};
use crate::platforms::{AccessibilityEngine, EngineConfig};
use crate::procedure::{ProcArg, ProcOpRow};
use crate::sync_bridge;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Variable bindings of one run. Created fresh per run, mutated only by
/// rows with a declared output variable, discarded at run end.
#[derive(Debug, Default)]
pub struct VariableScope {
    bindings: HashMap<String, String>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }
}

/// Per-run memo of resolved live elements, keyed by bookmark identity.
///
/// A hit is an optimistic reuse: the foreign tree may have mutated since
/// resolution, and a stale handle surfaces as a recoverable per-operation
/// failure, not a run-fatal one. The cache is exclusively owned by its run.
#[derive(Default)]
pub struct ElementCache {
    entries: HashMap<String, UiElement>,
}

impl ElementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&UiElement> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, element: UiElement) {
        self.entries.insert(key, element);
    }
}

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Completed,
    Aborted,
}

/// Trace entry for one executed row. Every row yields one, failures
/// included, so the step-by-step trace is always inspectable.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTrace {
    pub op: String,
    pub preview: String,
    pub value: Option<String>,
}

/// Result of a run: terminal state plus the full trace.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub state: RunState,
    pub steps: Vec<StepTrace>,
}

/// Executes procedures against the viewer.
pub struct ProcedureInterpreter {
    locator: BookmarkLocator,
    dispatcher: OperationDispatcher,
}

impl ProcedureInterpreter {
    pub fn new(engine: Arc<dyn AccessibilityEngine>, config: EngineConfig) -> Self {
        Self {
            locator: BookmarkLocator::new(engine.clone(), config.clone()),
            dispatcher: OperationDispatcher::new(engine, config),
        }
    }

    /// Run `rows` top to bottom under `root` (the viewer's main window).
    ///
    /// Cancellation is cooperative and checked between rows, never mid-row,
    /// so a stopped run cannot corrupt partial step state; the report keeps
    /// the trace produced so far.
    #[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub async fn run(
        &self,
        rows: &[ProcOpRow],
        root: &UiElement,
        cancel: &CancellationToken,
    ) -> RunReport {
        let mut run = ProcedureRun::new(rows.len());
        run.state = RunState::Running;

        for row in rows {
            if cancel.is_cancelled() {
                warn!("procedure run cancelled");
                run.state = RunState::Aborted;
                break;
            }
            let outcome = self.run_row(row, root, &run.scope, &mut run.cache).await;
            if let Some(var) = &row.output_var {
                run.scope
                    .set(var.clone(), outcome.value.clone().unwrap_or_default());
            }
            run.steps.push(StepTrace {
                op: row.op.clone(),
                preview: outcome.preview,
                value: outcome.value,
            });
        }

        if run.state == RunState::Running {
            run.state = RunState::Completed;
        }
        RunReport {
            state: run.state,
            steps: run.steps,
        }
    }

    /// Synchronous counterpart of [`run`](Self::run), bridged through the
    /// one blocking adapter.
    pub fn run_blocking(
        &self,
        rows: &[ProcOpRow],
        root: &UiElement,
        cancel: &CancellationToken,
    ) -> RunReport {
        sync_bridge::block_on(self.run(rows, root, cancel))
    }

    /// Execute one row. Failures never escape: resolution faults and
    /// operation faults alike collapse into the outcome's preview, keeping
    /// the dispatcher's best-effort boundary the primary failure path.
    async fn run_row(
        &self,
        row: &ProcOpRow,
        root: &UiElement,
        scope: &VariableScope,
        cache: &mut ElementCache,
    ) -> StepOutcome {
        // Element-typed first argument resolves once per row, through the
        // run's cache, under the row's own retry policy.
        let mut element = None;
        if let Some(slot) = &row.arg1 {
            if slot.enabled {
                if let ProcArg::Element(bookmark) = &slot.arg {
                    match self.resolve_element(&row.op, bookmark, root, cache).await {
                        Ok(resolved) => element = resolved,
                        Err(e) => return StepOutcome::failure(e),
                    }
                }
            }
        }

        // Disabled slots never contribute a resolver; element slots are
        // covered above and excluded here.
        let args: Vec<LazyArg<'_>> = row
            .slots()
            .into_iter()
            .flatten()
            .filter(|slot| slot.enabled)
            .filter_map(|slot| match &slot.arg {
                ProcArg::Element(_) => None,
                ProcArg::Str(text) => Some(LazyArg::Literal(text.clone())),
                ProcArg::Number(number) => Some(LazyArg::Literal(number.to_string())),
                ProcArg::Var(name) => Some(LazyArg::Var {
                    name: name.clone(),
                    scope,
                }),
            })
            .collect();

        self.dispatcher
            .execute_async(&row.op, OpCall::new(element, args))
            .await
    }

    async fn resolve_element(
        &self,
        op: &str,
        bookmark: &Bookmark,
        root: &UiElement,
        cache: &mut ElementCache,
    ) -> Result<Option<UiElement>, crate::errors::AutomationError> {
        let key = bookmark.cache_key();
        if let Some(element) = cache.get(&key) {
            debug!("element cache hit");
            return Ok(Some(element.clone()));
        }

        let mode = if OperationDispatcher::is_fail_fast(op) {
            ResolveMode::SingleAttempt
        } else {
            ResolveMode::Retrying
        };
        let resolved = self.locator.resolve(bookmark, root, mode).await?;
        if let Some(element) = &resolved {
            cache.insert(key, element.clone());
        }
        Ok(resolved)
    }
}

/// Mutable state of one run in flight.
struct ProcedureRun {
    state: RunState,
    scope: VariableScope,
    cache: ElementCache,
    steps: Vec<StepTrace>,
}

impl ProcedureRun {
    fn new(row_count: usize) -> Self {
        Self {
            state: RunState::Ready,
            scope: VariableScope::new(),
            cache: ElementCache::new(),
            steps: Vec::with_capacity(row_count),
        }
    }
}
