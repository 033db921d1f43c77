//! Recorded-procedure automation for a radiology viewer/worklist
//! application.
//!
//! The viewer is an external, uncontrolled process; this crate drives its
//! UI surfaces through accessibility trees. Persisted bookmarks identify
//! elements structurally, a locator replays them against the live tree, and
//! a procedure interpreter executes ordered operation rows with a shared
//! variable scope and a per-run element cache.

use std::sync::Arc;
use tracing::instrument;

pub mod bookmark;
pub mod element;
pub mod errors;
pub mod interpreter;
pub mod locator;
pub mod ops;
pub mod platforms;
pub mod procedure;
pub mod recorder;
pub mod sync_bridge;
pub mod table;
#[cfg(test)]
mod tests;

pub use bookmark::{Bookmark, NodeSpec};
pub use element::{ControlKind, UiAttributes, UiElement, UiElementImpl};
pub use errors::AutomationError;
pub use interpreter::{ProcedureInterpreter, RunReport, RunState, StepTrace, VariableScope};
pub use locator::{BookmarkLocator, ResolveMode};
pub use ops::{LazyArg, OpCall, OpFlavor, OperationDispatcher, StepOutcome};
pub use platforms::{AccessibilityEngine, EngineConfig, KeyAction, OcrOutcome};
pub use procedure::{ArgSlot, ProcArg, ProcOpRow, ProcedureStore};
pub use recorder::{BookmarkRecorder, RecordOptions};

/// The main entry point: one automated viewer workstation.
///
/// Owns the platform engine handle; locators, recorders and interpreters
/// created from it share that handle and the workstation's configuration.
pub struct Workstation {
    engine: Arc<dyn AccessibilityEngine>,
    config: EngineConfig,
}

impl Workstation {
    /// Create a workstation backed by the current platform's engine.
    #[instrument(skip(config))]
    pub fn new(config: EngineConfig) -> Result<Self, AutomationError> {
        let engine = platforms::create_engine(&config)?;
        Ok(Self { engine, config })
    }

    /// Convenience constructor with default configuration.
    pub fn new_default() -> Result<Self, AutomationError> {
        Self::new(EngineConfig::default())
    }

    /// Create a workstation over an explicit engine. Used to inject
    /// alternative backends.
    pub fn with_engine(engine: Arc<dyn AccessibilityEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    /// Root element of the desktop.
    pub fn root(&self) -> UiElement {
        self.engine.root_element()
    }

    /// The viewer's top-level window, by process name. Absence means the
    /// viewer is not currently running a visible window.
    #[instrument(skip(self))]
    pub fn attach(&self, process_name: &str) -> Result<Option<UiElement>, AutomationError> {
        self.engine.window_by_process(process_name)
    }

    pub fn locator(&self) -> BookmarkLocator {
        BookmarkLocator::new(self.engine.clone(), self.config.clone())
    }

    pub fn recorder(&self) -> BookmarkRecorder {
        BookmarkRecorder::new(self.engine.clone(), self.config.clone())
    }

    pub fn interpreter(&self) -> ProcedureInterpreter {
        ProcedureInterpreter::new(self.engine.clone(), self.config.clone())
    }

    /// Single-attempt existence probe for a bookmark, without waiting out
    /// the retry budget.
    #[instrument(skip(self, bookmark, root))]
    pub async fn probe(
        &self,
        bookmark: &Bookmark,
        root: &UiElement,
    ) -> Result<bool, AutomationError> {
        Ok(self
            .locator()
            .resolve(bookmark, root, ResolveMode::SingleAttempt)
            .await?
            .is_some())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<dyn AccessibilityEngine> {
        self.engine.clone()
    }
}

impl Clone for Workstation {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            config: self.config.clone(),
        }
    }
}
