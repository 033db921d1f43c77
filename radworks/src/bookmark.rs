//! Persisted element bookmarks.
//!
//! A bookmark is the replayable root-to-target chain of match conditions the
//! recorder emits and the locator consumes. Only the structural pattern is
//! stored; the exact object identities seen at recording time never survive
//! the round-trip.

use crate::element::{ControlKind, UiAttributes};
use serde::{Deserialize, Serialize};

/// One link in a bookmark chain: a composite, selectively-enabled match
/// predicate plus a positional tie-break.
///
/// The `use_*` flags are independent of value presence. A stored value with
/// its flag off is deliberately ignored at replay time; the flag must
/// round-trip exactly through serialization. With every content flag off the
/// node degenerates to pure positional selection, which stays deterministic
/// for a stable sibling order but breaks when the sibling population
/// changes. That degenerate form is accepted and documented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub use_name: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub use_class_name: bool,

    /// Omitted when the captured control type was the generic/custom
    /// category, since that category is not discriminating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlKind>,
    #[serde(default)]
    pub use_control: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(default)]
    pub use_automation_id: bool,

    /// 0-based position of the target within the predicate's match set.
    /// Always participates in resolution.
    #[serde(default)]
    pub index: usize,
}

impl NodeSpec {
    /// Capture a match specification from a live element's attributes.
    ///
    /// With `prefer_automation_id` set and an automation id present, the id
    /// becomes the sole enabled predicate; the structural values are still
    /// stored so a later editor can re-enable them.
    pub fn from_attributes(attrs: &UiAttributes, prefer_automation_id: bool) -> Self {
        let control = attrs.control.is_discriminating().then_some(attrs.control);

        let automation_preferred = prefer_automation_id && attrs.automation_id.is_some();

        Self {
            name: attrs.name.clone(),
            use_name: !automation_preferred && attrs.name.is_some(),
            class_name: attrs.class_name.clone(),
            use_class_name: !automation_preferred && attrs.class_name.is_some(),
            control,
            use_control: !automation_preferred && control.is_some(),
            automation_id: attrs.automation_id.clone(),
            use_automation_id: automation_preferred,
            index: 0,
        }
    }

    /// Composite predicate over the enabled fields, AND semantics.
    ///
    /// A node with no enabled field matches every candidate; the positional
    /// index is applied by the locator, not here.
    pub fn matches(&self, attrs: &UiAttributes) -> bool {
        if self.use_name && self.name != attrs.name {
            return false;
        }
        if self.use_class_name && self.class_name != attrs.class_name {
            return false;
        }
        if self.use_control && self.control != Some(attrs.control) {
            return false;
        }
        if self.use_automation_id && self.automation_id != attrs.automation_id {
            return false;
        }
        true
    }

    /// Whether any content predicate participates in matching.
    pub fn has_enabled_predicate(&self) -> bool {
        self.use_name || self.use_class_name || self.use_control || self.use_automation_id
    }
}

/// A persisted root-to-target chain identifying one UI element inside the
/// viewer's window hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Process name of the application the chain was recorded against.
    pub process_name: String,
    /// Match chain in root-to-target order.
    pub chain: Vec<NodeSpec>,
}

impl Bookmark {
    /// Stable identity used as the per-run element-cache key.
    ///
    /// Two bookmarks with the same stored pattern share cache entries within
    /// a run; serialization order is fixed by the struct layout, so the key
    /// is deterministic.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
