use crate::bookmark::NodeSpec;
use crate::element::UiElement;
use crate::errors::AutomationError;
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for locator retries, recording depth and the system
/// operations. One config is shared by every component of a workstation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempts made by the retrying resolution mode before giving up.
    pub resolve_attempts: u32,
    /// Pause between resolution attempts.
    pub resolve_backoff: Duration,
    /// Ancestor-walk cap for the recorder, bounding runaway chains in
    /// extremely deep trees.
    pub max_chain_depth: usize,
    /// Display length of step previews. Cosmetic only; stored values are
    /// never truncated.
    pub preview_cap: usize,
    /// Bounded wait when joining the dedicated clipboard thread.
    pub clipboard_join_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolve_attempts: 10,
            resolve_backoff: Duration::from_millis(250),
            max_chain_depth: 24,
            preview_cap: 64,
            clipboard_join_timeout: Duration::from_secs(2),
        }
    }
}

/// Keystroke population the procedure catalog can send to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Tab,
    Paste,
    SelectAll,
    Delete,
}

/// Result of an OCR read against an element's screen region.
#[derive(Debug, Clone, Default)]
pub struct OcrOutcome {
    /// False when no OCR engine could be constructed on this machine.
    pub engine_available: bool,
    /// Recognized text; absent when recognition produced nothing or the
    /// engine was unavailable.
    pub text: Option<String>,
}

/// The capability surface the engine consumes from the platform.
///
/// Tree queries must be deterministic for the same live tree state and
/// return matches in document order; the locator and recorder depend on
/// that ordering to agree with each other. Everything else here is a thin
/// OS binding (input, clipboard, OCR, markup) that the operation catalog
/// drives best-effort.
#[async_trait::async_trait]
pub trait AccessibilityEngine: Send + Sync {
    /// Root element of the desktop.
    fn root_element(&self) -> UiElement;

    /// Top-level window of a running process, by executable name.
    fn window_by_process(&self, process_name: &str) -> Result<Option<UiElement>, AutomationError>;

    /// All descendants of `scope` (excluding `scope` itself) whose
    /// attributes satisfy `spec`'s enabled content predicates, in document
    /// order. `spec.index` is the locator's tie-break and is ignored here.
    fn find_all(
        &self,
        scope: &UiElement,
        spec: &NodeSpec,
    ) -> Result<Vec<UiElement>, AutomationError> {
        let mut matches = Vec::new();
        collect_matches(scope, spec, &mut matches)?;
        Ok(matches)
    }

    /// Click at absolute screen coordinates.
    fn click_at(&self, x: i32, y: i32) -> Result<(), AutomationError>;

    /// Send one of the catalog keystrokes to the focused control.
    fn send_key(&self, action: KeyAction) -> Result<(), AutomationError>;

    /// Place text on the system clipboard. Implementations that need a
    /// UI-affinity thread spin one up for the call and join it with a
    /// bounded wait.
    fn set_clipboard_text(&self, text: &str) -> Result<(), AutomationError>;

    /// OCR the element's screen region.
    async fn ocr_element(&self, element: &UiElement) -> Result<OcrOutcome, AutomationError>;

    /// Markup (HTML) content of an element hosted in an embedded browser
    /// surface.
    async fn element_markup(&self, element: &UiElement) -> Result<String, AutomationError>;

    /// Enable downcasting to concrete engine types
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Depth-first document-order walk shared by engine implementations.
fn collect_matches(
    scope: &UiElement,
    spec: &NodeSpec,
    matches: &mut Vec<UiElement>,
) -> Result<(), AutomationError> {
    for child in scope.children()? {
        if spec.matches(&child.attributes()) {
            matches.push(child.clone());
        }
        collect_matches(&child, spec, matches)?;
    }
    Ok(())
}

#[cfg(target_os = "windows")]
pub mod windows;

/// Create the appropriate engine for the current platform
pub fn create_engine(config: &EngineConfig) -> Result<Arc<dyn AccessibilityEngine>, AutomationError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsEngine::new(config.clone())?))
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = config;
        Err(AutomationError::UnsupportedPlatform(
            "the viewer automation backend is only available on Windows".to_string(),
        ))
    }
}
