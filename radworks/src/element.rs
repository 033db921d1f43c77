use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Categorical control type of an accessibility node.
///
/// The viewer builds most of its worklist out of a small set of control
/// categories. `Custom` is the platform's generic bucket and carries no
/// discriminating power, so recorded match conditions never rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlKind {
    Button,
    CheckBox,
    ComboBox,
    DataGrid,
    DataItem,
    Document,
    Edit,
    Group,
    Header,
    HeaderItem,
    Image,
    List,
    ListItem,
    Menu,
    MenuItem,
    Pane,
    Table,
    Text,
    ToolBar,
    Tree,
    TreeItem,
    Window,
    #[default]
    Custom,
}

impl ControlKind {
    /// Whether this category is usable as a match predicate.
    pub fn is_discriminating(&self) -> bool {
        !matches!(self, ControlKind::Custom)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Snapshot of the identifying attributes of a live element.
///
/// Empty strings from the platform are normalized to `None` so that match
/// predicates compare presence consistently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub control: ControlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
}

/// Interface for platform-specific element implementations
pub trait UiElementImpl: Send + Sync + Debug {
    /// Stable identity of the underlying live node for the lifetime of the
    /// handle. Used to find a captured node inside its own match set while
    /// recording; never persisted.
    fn object_id(&self) -> usize;

    fn attributes(&self) -> UiAttributes;

    fn name(&self) -> Option<String> {
        self.attributes().name
    }

    fn parent(&self) -> Result<Option<UiElement>, AutomationError>;

    fn children(&self) -> Result<Vec<UiElement>, AutomationError>;

    /// Content of the element's value pattern, if the element exposes one.
    fn value_text(&self) -> Result<Option<String>, AutomationError>;

    /// Accessible name reported through the legacy accessibility pattern.
    fn legacy_name(&self) -> Result<Option<String>, AutomationError>;

    /// Screen bounds as (x, y, width, height).
    fn bounds(&self) -> Result<(f64, f64, f64, f64), AutomationError>;

    fn clone_boxed(&self) -> Box<dyn UiElementImpl>;

    fn as_any(&self) -> &dyn std::any::Any;
}

/// A live handle into the foreign application's accessibility tree.
///
/// Handles are optimistic: the foreign tree can mutate at any time, and a
/// handle that has gone stale surfaces as a per-operation failure, never as
/// a run-fatal condition.
pub struct UiElement {
    inner: Box<dyn UiElementImpl>,
}

impl UiElement {
    pub fn new(inner: Box<dyn UiElementImpl>) -> Self {
        Self { inner }
    }

    pub fn object_id(&self) -> usize {
        self.inner.object_id()
    }

    pub fn attributes(&self) -> UiAttributes {
        self.inner.attributes()
    }

    pub fn name(&self) -> Option<String> {
        self.inner.name()
    }

    pub fn parent(&self) -> Result<Option<UiElement>, AutomationError> {
        self.inner.parent()
    }

    pub fn children(&self) -> Result<Vec<UiElement>, AutomationError> {
        self.inner.children()
    }

    pub fn value_text(&self) -> Result<Option<String>, AutomationError> {
        self.inner.value_text()
    }

    pub fn legacy_name(&self) -> Result<Option<String>, AutomationError> {
        self.inner.legacy_name()
    }

    pub fn bounds(&self) -> Result<(f64, f64, f64, f64), AutomationError> {
        self.inner.bounds()
    }

    pub fn as_any(&self) -> &dyn std::any::Any {
        self.inner.as_any()
    }
}

impl Clone for UiElement {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
        }
    }
}

impl PartialEq for UiElement {
    fn eq(&self, other: &Self) -> bool {
        self.inner.object_id() == other.inner.object_id()
    }
}

impl Eq for UiElement {}

impl Debug for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiElement")
            .field("attributes", &self.inner.attributes())
            .finish()
    }
}
