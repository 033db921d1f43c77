use crate::bookmark::Bookmark;
use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::platforms::{AccessibilityEngine, EngineConfig};
use std::sync::Arc;
use tracing::{debug, instrument};

/// How hard resolution tries before reporting absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Bounded retries with a short backoff, tolerating transient staleness
    /// while the viewer is still building its window.
    Retrying,
    /// One pass, fast failure. Used to probe whether an element currently
    /// exists without waiting out the retry budget.
    SingleAttempt,
}

/// Replays persisted bookmark chains against the live tree.
///
/// Absence is a result, not a fault: `Ok(None)` means the chain did not
/// resolve, and callers decide whether that matters. Only platform faults
/// surface as errors.
#[derive(Clone)]
pub struct BookmarkLocator {
    engine: Arc<dyn AccessibilityEngine>,
    config: EngineConfig,
}

impl BookmarkLocator {
    pub fn new(engine: Arc<dyn AccessibilityEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    /// Resolve `bookmark` inside `root`, which is normally the viewer's
    /// main window.
    #[instrument(level = "debug", skip(self, bookmark, root))]
    pub async fn resolve(
        &self,
        bookmark: &Bookmark,
        root: &UiElement,
        mode: ResolveMode,
    ) -> Result<Option<UiElement>, AutomationError> {
        let attempts = match mode {
            ResolveMode::SingleAttempt => 1,
            ResolveMode::Retrying => self.config.resolve_attempts.max(1),
        };

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.resolve_backoff).await;
            }
            if let Some(element) = self.resolve_once(bookmark, root)? {
                return Ok(Some(element));
            }
            debug!(
                attempt = attempt + 1,
                attempts, "bookmark chain did not resolve"
            );
        }
        Ok(None)
    }

    /// One pass over the chain. Each node narrows the scope to the
    /// `index`-th element of its match set; an out-of-range index or an
    /// empty match set is a not-found for the whole chain. Missing
    /// ancestors are never skipped.
    fn resolve_once(
        &self,
        bookmark: &Bookmark,
        root: &UiElement,
    ) -> Result<Option<UiElement>, AutomationError> {
        let mut scope = root.clone();
        for spec in &bookmark.chain {
            let matches = self.engine.find_all(&scope, spec)?;
            match matches.into_iter().nth(spec.index) {
                Some(next) => scope = next,
                None => return Ok(None),
            }
        }
        Ok(Some(scope))
    }
}
