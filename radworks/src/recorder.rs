use crate::bookmark::{Bookmark, NodeSpec};
use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::platforms::{AccessibilityEngine, EngineConfig};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Policy knobs for a single recording.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Prefer automation-id equality over the structural
    /// name/class/control-type conjunction when the captured node carries an
    /// automation id.
    pub prefer_automation_id: bool,
}

/// Produces the bookmark chains the locator replays.
///
/// The stored index of each node is computed by re-querying the *current*
/// scope with the exact predicate that will be persisted, then finding the
/// captured node inside that match set by handle identity. Replay therefore
/// computes the same candidate ordering the recording saw, instead of
/// trusting an arbitrary recording-time child index.
pub struct BookmarkRecorder {
    engine: Arc<dyn AccessibilityEngine>,
    config: EngineConfig,
}

impl BookmarkRecorder {
    pub fn new(engine: Arc<dyn AccessibilityEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    /// Record a bookmark for `target`, treating `root` as the window the
    /// chain will later be replayed under.
    #[instrument(level = "debug", skip(self, target, root, options))]
    pub fn record(
        &self,
        target: &UiElement,
        root: &UiElement,
        process_name: &str,
        options: &RecordOptions,
    ) -> Result<Bookmark, AutomationError> {
        // Walk parent references target -> root (exclusive), then flip to
        // the root-first order the chain is stored in.
        let mut path = vec![target.clone()];
        let mut current = target.clone();
        loop {
            if path.len() > self.config.max_chain_depth {
                return Err(AutomationError::InvalidArgument(format!(
                    "ancestor chain exceeds the configured depth cap of {}",
                    self.config.max_chain_depth
                )));
            }
            match current.parent()? {
                Some(parent) if parent == *root => break,
                Some(parent) => {
                    path.push(parent.clone());
                    current = parent;
                }
                None => {
                    return Err(AutomationError::InvalidArgument(
                        "target element is not a descendant of the given root".to_string(),
                    ));
                }
            }
        }
        path.reverse();

        let mut chain = Vec::with_capacity(path.len());
        let mut scope = root.clone();
        for node in path {
            let mut spec =
                NodeSpec::from_attributes(&node.attributes(), options.prefer_automation_id);

            // The index must be consistent with what the locator computes at
            // replay time, so it is derived from the same query.
            let matches = self.engine.find_all(&scope, &spec)?;
            spec.index = matches
                .iter()
                .position(|candidate| candidate == &node)
                .ok_or_else(|| {
                    AutomationError::Internal(
                        "captured node is missing from its own match set; the tree mutated mid-recording".to_string(),
                    )
                })?;

            debug!(index = spec.index, candidates = matches.len(), "recorded chain node");
            chain.push(spec);
            scope = node;
        }

        Ok(Bookmark {
            process_name: process_name.to_string(),
            chain,
        })
    }
}
