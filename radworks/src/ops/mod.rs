//! Named-operation dispatch.
//!
//! The dispatcher is a closed registry keyed by operation identifier. It
//! exposes exactly two entry points with the same shape: [`OperationDispatcher::execute`]
//! (synchronous) and [`OperationDispatcher::execute_async`]. Async-only
//! operations reached through the synchronous entry are bridged via
//! [`crate::sync_bridge::block_on`] and nowhere else; callers on a
//! UI/foreground thread pay that blocking cost knowingly.
//!
//! Every operation yields a [`StepOutcome`]: a short human-readable preview
//! (always present, failures included, as an inline bracketed diagnostic)
//! and an optional untruncated value.

mod element_ops;
mod system;
mod table_ops;

use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::interpreter::VariableScope;
use crate::platforms::{AccessibilityEngine, EngineConfig};
use crate::sync_bridge;
use std::sync::Arc;
use tracing::instrument;

/// Whether an operation can complete on the calling thread or must suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFlavor {
    Sync,
    AsyncOnly,
}

/// Out-of-band declaration of one catalog operation.
#[derive(Debug)]
pub struct OperationSpec {
    pub id: &'static str,
    pub flavor: OpFlavor,
    /// Fail-fast operations resolve their element argument with a single
    /// attempt instead of the retry budget.
    pub fail_fast: bool,
}

/// The operation catalog. System operations take only string/number
/// arguments; element operations take one element argument in the first
/// slot; table operations read list-like containers.
pub const CATALOG: &[OperationSpec] = &[
    OperationSpec { id: "MouseClick", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "SetClipboard", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "SendTab", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "SendPaste", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "SendSelectAll", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "SendDelete", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "Delay", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "GetText", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "GetTextOnce", flavor: OpFlavor::Sync, fail_fast: true },
    OperationSpec { id: "GetTextOCR", flavor: OpFlavor::AsyncOnly, fail_fast: false },
    OperationSpec { id: "GetHTML", flavor: OpFlavor::AsyncOnly, fail_fast: false },
    OperationSpec { id: "ReadColumnHeaders", flavor: OpFlavor::Sync, fail_fast: false },
    OperationSpec { id: "ReadRowCells", flavor: OpFlavor::Sync, fail_fast: false },
];

/// Outcome of one dispatched operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Always present, even on failure; failures read `(error: ...)`.
    pub preview: String,
    /// Absent on failure and for operations with no meaningful return.
    pub value: Option<String>,
}

impl StepOutcome {
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            preview: format!("(error: {message})"),
            value: None,
        }
    }

    /// An action that succeeded but produces no value.
    pub fn acted(preview: impl Into<String>) -> Self {
        Self {
            preview: preview.into(),
            value: None,
        }
    }
}

/// A lazily-resolved string/number argument slot.
///
/// Variable references are looked up in the run's scope only when the
/// operation actually asks for the slot.
pub enum LazyArg<'run> {
    Literal(String),
    Var {
        name: String,
        scope: &'run VariableScope,
    },
}

impl LazyArg<'_> {
    pub fn resolve(&self) -> Result<String, AutomationError> {
        match self {
            LazyArg::Literal(text) => Ok(text.clone()),
            LazyArg::Var { name, scope } => scope.get(name).map(str::to_string).ok_or_else(|| {
                AutomationError::InvalidArgument(format!("variable '{name}' is not bound"))
            }),
        }
    }
}

/// One dispatch request: the pre-resolved element argument (when the row's
/// first argument is element-typed) plus the enabled string/number slots in
/// row order. Disabled slots are never present here.
pub struct OpCall<'run> {
    pub element: Option<UiElement>,
    pub args: Vec<LazyArg<'run>>,
}

impl<'run> OpCall<'run> {
    pub fn new(element: Option<UiElement>, args: Vec<LazyArg<'run>>) -> Self {
        Self { element, args }
    }

    fn arg_text(&self, index: usize) -> Result<String, AutomationError> {
        self.args
            .get(index)
            .ok_or_else(|| {
                AutomationError::InvalidArgument(format!("missing argument {}", index + 1))
            })?
            .resolve()
    }
}

/// Dispatches catalog operations against the platform engine.
pub struct OperationDispatcher {
    engine: Arc<dyn AccessibilityEngine>,
    config: EngineConfig,
}

impl OperationDispatcher {
    pub fn new(engine: Arc<dyn AccessibilityEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    pub fn spec(op: &str) -> Option<&'static OperationSpec> {
        CATALOG.iter().find(|spec| spec.id == op)
    }

    pub fn is_async_only(op: &str) -> bool {
        matches!(Self::spec(op), Some(spec) if spec.flavor == OpFlavor::AsyncOnly)
    }

    pub fn is_fail_fast(op: &str) -> bool {
        matches!(Self::spec(op), Some(spec) if spec.fail_fast)
    }

    /// Asynchronous entry point.
    #[instrument(level = "debug", skip(self, call))]
    pub async fn execute_async(&self, op: &str, call: OpCall<'_>) -> StepOutcome {
        let Some(spec) = Self::spec(op) else {
            return StepOutcome::failure(format!("unknown operation '{op}'"));
        };
        match spec.flavor {
            OpFlavor::AsyncOnly => match spec.id {
                "GetTextOCR" => self.read_text_ocr(&call).await,
                "GetHTML" => self.read_markup(&call).await,
                _ => StepOutcome::failure(format!("unknown operation '{op}'")),
            },
            // Delay suspends on the async path instead of blocking a
            // runtime worker.
            OpFlavor::Sync if spec.id == "Delay" => self.delay_suspending(&call).await,
            OpFlavor::Sync => self.run_sync(spec.id, &call),
        }
    }

    /// Synchronous entry point. Async-only operations are run to completion
    /// through the bridge adapter, blocking the calling thread.
    #[instrument(level = "debug", skip(self, call))]
    pub fn execute(&self, op: &str, call: OpCall<'_>) -> StepOutcome {
        let Some(spec) = Self::spec(op) else {
            return StepOutcome::failure(format!("unknown operation '{op}'"));
        };
        match spec.flavor {
            OpFlavor::AsyncOnly => sync_bridge::block_on(self.execute_async(op, call)),
            OpFlavor::Sync if spec.id == "Delay" => self.delay_blocking(&call),
            OpFlavor::Sync => self.run_sync(spec.id, &call),
        }
    }

    fn run_sync(&self, id: &'static str, call: &OpCall<'_>) -> StepOutcome {
        match id {
            "MouseClick" => self.mouse_click(call),
            "SetClipboard" => self.set_clipboard(call),
            "SendTab" => self.send_catalog_key(crate::platforms::KeyAction::Tab),
            "SendPaste" => self.send_catalog_key(crate::platforms::KeyAction::Paste),
            "SendSelectAll" => self.send_catalog_key(crate::platforms::KeyAction::SelectAll),
            "SendDelete" => self.send_catalog_key(crate::platforms::KeyAction::Delete),
            "GetText" | "GetTextOnce" => self.read_text(call),
            "ReadColumnHeaders" => self.read_headers(call),
            "ReadRowCells" => self.read_row(call),
            other => StepOutcome::failure(format!("unknown operation '{other}'")),
        }
    }

    pub(crate) fn engine(&self) -> &Arc<dyn AccessibilityEngine> {
        &self.engine
    }

    /// Build a success outcome from produced text: the stored value is the
    /// untruncated string, the preview a capped prefix.
    pub(crate) fn outcome_from_text(&self, text: String) -> StepOutcome {
        let cap = self.config.preview_cap;
        let preview = if text.chars().count() > cap {
            let mut prefix: String = text.chars().take(cap).collect();
            prefix.push('…');
            prefix
        } else {
            text.clone()
        };
        StepOutcome {
            preview,
            value: Some(text),
        }
    }
}
