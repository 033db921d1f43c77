#![allow(clippy::arc_with_non_send_sync)]

//! Thin Windows adapter over the UI Automation stack.
//!
//! This module only binds the capability surface the engine consumes; all
//! resolution policy lives above it. Tree queries go through the shared
//! document-order walk, so the locator and recorder see identical ordering
//! on every backend.

use crate::element::{ControlKind, UiAttributes, UiElement, UiElementImpl};
use crate::errors::AutomationError;
use crate::platforms::{AccessibilityEngine, EngineConfig, KeyAction, OcrOutcome};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, warn};
use uiautomation::controls::ControlType;
use uiautomation::inputs::{Keyboard, Mouse};
use uiautomation::patterns;
use uiautomation::types::{Point, TreeScope};
use uiautomation::UIAutomation;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};

// thread-safety
#[derive(Clone)]
struct ThreadSafeWinUIAutomation(Arc<UIAutomation>);

// send and sync for wrapper
unsafe impl Send for ThreadSafeWinUIAutomation {}
unsafe impl Sync for ThreadSafeWinUIAutomation {}

#[derive(Clone)]
struct ThreadSafeWinUIElement(Arc<uiautomation::UIElement>);

unsafe impl Send for ThreadSafeWinUIElement {}
unsafe impl Sync for ThreadSafeWinUIElement {}

/// Executable name of a process by PID, without the `.exe` suffix.
fn process_name_by_pid(pid: i32) -> Result<String, AutomationError> {
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).map_err(|e| {
            AutomationError::PlatformError(format!("failed to create process snapshot: {e}"))
        })?;

        // Ensure we close the handle when done
        let _guard = HandleGuard(snapshot);

        let mut process_entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        if Process32FirstW(snapshot, &mut process_entry).is_err() {
            return Err(AutomationError::PlatformError(
                "failed to enumerate processes".to_string(),
            ));
        }

        loop {
            if process_entry.th32ProcessID == pid as u32 {
                let name_slice = &process_entry.szExeFile;
                let name_len = name_slice
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(name_slice.len());
                let process_name = String::from_utf16_lossy(&name_slice[..name_len]);

                let clean_name = process_name
                    .strip_suffix(".exe")
                    .or_else(|| process_name.strip_suffix(".EXE"))
                    .unwrap_or(&process_name);

                return Ok(clean_name.to_string());
            }

            if Process32NextW(snapshot, &mut process_entry).is_err() {
                break;
            }
        }

        Err(AutomationError::PlatformError(format!(
            "process with PID {pid} not found"
        )))
    }
}

// RAII guard to ensure handle is closed
struct HandleGuard(HANDLE);

impl Drop for HandleGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn map_control(control_type: ControlType) -> ControlKind {
    match control_type {
        ControlType::Button => ControlKind::Button,
        ControlType::CheckBox => ControlKind::CheckBox,
        ControlType::ComboBox => ControlKind::ComboBox,
        ControlType::DataGrid => ControlKind::DataGrid,
        ControlType::DataItem => ControlKind::DataItem,
        ControlType::Document => ControlKind::Document,
        ControlType::Edit => ControlKind::Edit,
        ControlType::Group => ControlKind::Group,
        ControlType::Header => ControlKind::Header,
        ControlType::HeaderItem => ControlKind::HeaderItem,
        ControlType::Image => ControlKind::Image,
        ControlType::List => ControlKind::List,
        ControlType::ListItem => ControlKind::ListItem,
        ControlType::Menu => ControlKind::Menu,
        ControlType::MenuItem => ControlKind::MenuItem,
        ControlType::Pane => ControlKind::Pane,
        ControlType::Table => ControlKind::Table,
        ControlType::Text => ControlKind::Text,
        ControlType::ToolBar => ControlKind::ToolBar,
        ControlType::Tree => ControlKind::Tree,
        ControlType::TreeItem => ControlKind::TreeItem,
        ControlType::Window => ControlKind::Window,
        // Everything else is treated as the non-discriminating bucket.
        _ => ControlKind::Custom,
    }
}

fn filter_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

struct WindowsUiElement {
    automation: ThreadSafeWinUIAutomation,
    element: ThreadSafeWinUIElement,
}

impl WindowsUiElement {
    fn wrap(&self, element: uiautomation::UIElement) -> UiElement {
        UiElement::new(Box::new(WindowsUiElement {
            automation: self.automation.clone(),
            element: ThreadSafeWinUIElement(Arc::new(element)),
        }))
    }
}

impl Debug for WindowsUiElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsUiElement").finish()
    }
}

impl UiElementImpl for WindowsUiElement {
    fn object_id(&self) -> usize {
        let mut hasher = DefaultHasher::new();
        if let Ok(runtime_id) = self.element.0.get_runtime_id() {
            runtime_id.hash(&mut hasher);
        }
        hasher.finish() as usize
    }

    fn attributes(&self) -> UiAttributes {
        UiAttributes {
            name: filter_empty(self.element.0.get_name().ok()),
            class_name: filter_empty(self.element.0.get_classname().ok()),
            control: self
                .element
                .0
                .get_control_type()
                .map(map_control)
                .unwrap_or_default(),
            automation_id: filter_empty(self.element.0.get_automation_id().ok()),
        }
    }

    fn parent(&self) -> Result<Option<UiElement>, AutomationError> {
        let walker = self.automation.0.create_tree_walker().map_err(|e| {
            AutomationError::PlatformError(format!("failed to create tree walker: {e}"))
        })?;
        // The desktop root has no parent; the platform reports that as an
        // error, which reads as absence here.
        match walker.get_parent(&self.element.0) {
            Ok(parent) => Ok(Some(self.wrap(parent))),
            Err(_) => Ok(None),
        }
    }

    fn children(&self) -> Result<Vec<UiElement>, AutomationError> {
        let condition = self.automation.0.create_true_condition().map_err(|e| {
            AutomationError::PlatformError(format!("failed to create true condition: {e}"))
        })?;
        let children = self
            .element
            .0
            .find_all(TreeScope::Children, &condition)
            .map_err(|e| {
                AutomationError::PlatformError(format!("failed to list children: {e}"))
            })?;
        Ok(children.into_iter().map(|child| self.wrap(child)).collect())
    }

    fn value_text(&self) -> Result<Option<String>, AutomationError> {
        match self.element.0.get_pattern::<patterns::UIValuePattern>() {
            Ok(pattern) => Ok(filter_empty(pattern.get_value().ok())),
            Err(_) => Ok(None),
        }
    }

    fn legacy_name(&self) -> Result<Option<String>, AutomationError> {
        match self
            .element
            .0
            .get_pattern::<patterns::UILegacyIAccessiblePattern>()
        {
            Ok(pattern) => Ok(filter_empty(pattern.get_name().ok())),
            Err(_) => Ok(None),
        }
    }

    fn bounds(&self) -> Result<(f64, f64, f64, f64), AutomationError> {
        let rect = self.element.0.get_bounding_rectangle().map_err(|e| {
            AutomationError::PlatformError(format!("failed to get bounding rectangle: {e}"))
        })?;
        Ok((
            rect.get_left() as f64,
            rect.get_top() as f64,
            rect.get_width() as f64,
            rect.get_height() as f64,
        ))
    }

    fn clone_boxed(&self) -> Box<dyn UiElementImpl> {
        Box::new(WindowsUiElement {
            automation: self.automation.clone(),
            element: self.element.clone(),
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// UI Automation backed engine.
pub struct WindowsEngine {
    automation: ThreadSafeWinUIAutomation,
    config: EngineConfig,
}

impl WindowsEngine {
    pub fn new(config: EngineConfig) -> Result<Self, AutomationError> {
        let automation = UIAutomation::new().map_err(|e| {
            AutomationError::PlatformError(format!("failed to initialize UI Automation: {e}"))
        })?;
        Ok(Self {
            automation: ThreadSafeWinUIAutomation(Arc::new(automation)),
            config,
        })
    }

    fn wrap(&self, element: uiautomation::UIElement) -> UiElement {
        UiElement::new(Box::new(WindowsUiElement {
            automation: self.automation.clone(),
            element: ThreadSafeWinUIElement(Arc::new(element)),
        }))
    }
}

#[async_trait::async_trait]
impl AccessibilityEngine for WindowsEngine {
    fn root_element(&self) -> UiElement {
        let root = self
            .automation
            .0
            .get_root_element()
            .map(|root| self.wrap(root));
        match root {
            Ok(root) => root,
            Err(root_err) => {
                // No sensible fallback exists without a desktop; surface the
                // broken handle as an element with no children.
                warn!("failed to get desktop root: {root_err:?}");
                UiElement::new(Box::new(DetachedElement))
            }
        }
    }

    fn window_by_process(&self, process_name: &str) -> Result<Option<UiElement>, AutomationError> {
        let root = self.automation.0.get_root_element().map_err(|e| {
            AutomationError::PlatformError(format!("failed to get desktop root: {e}"))
        })?;
        let condition = self.automation.0.create_true_condition().map_err(|e| {
            AutomationError::PlatformError(format!("failed to create true condition: {e}"))
        })?;
        let windows = root
            .find_all(TreeScope::Children, &condition)
            .map_err(|e| {
                AutomationError::PlatformError(format!("failed to list top-level windows: {e}"))
            })?;

        let wanted = process_name
            .strip_suffix(".exe")
            .or_else(|| process_name.strip_suffix(".EXE"))
            .unwrap_or(process_name);

        for window in windows {
            let Ok(pid) = window.get_process_id() else {
                continue;
            };
            match process_name_by_pid(pid as i32) {
                Ok(name) if name.eq_ignore_ascii_case(wanted) => {
                    debug!(pid, "attached to viewer window");
                    return Ok(Some(self.wrap(window)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn click_at(&self, x: i32, y: i32) -> Result<(), AutomationError> {
        let mouse = Mouse::default();
        mouse
            .click(Point::new(x, y))
            .map_err(|e| AutomationError::OperationFailed(format!("mouse click failed: {e}")))
    }

    fn send_key(&self, action: KeyAction) -> Result<(), AutomationError> {
        let keys = match action {
            KeyAction::Tab => "{tab}",
            KeyAction::Paste => "{ctrl}v",
            KeyAction::SelectAll => "{ctrl}a",
            KeyAction::Delete => "{delete}",
        };
        let keyboard = Keyboard::default();
        keyboard
            .send_keys(keys)
            .map_err(|e| AutomationError::OperationFailed(format!("keystroke failed: {e}")))
    }

    fn set_clipboard_text(&self, text: &str) -> Result<(), AutomationError> {
        // Clipboard access needs OLE-initialized thread affinity, so the
        // write happens on a dedicated short-lived thread joined with a
        // bounded wait.
        let (tx, rx) = mpsc::channel();
        let payload = text.to_string();
        thread::spawn(move || {
            let result = uiautomation::clipboards::Clipboard::new()
                .and_then(|clipboard| clipboard.set_text(&payload));
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.config.clipboard_join_timeout) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AutomationError::OperationFailed(format!(
                "clipboard write failed: {e}"
            ))),
            Err(_) => Err(AutomationError::Timeout(
                "clipboard thread did not finish within the join timeout".to_string(),
            )),
        }
    }

    async fn ocr_element(&self, element: &UiElement) -> Result<OcrOutcome, AutomationError> {
        let (x, y, width, height) = element.bounds()?;

        let engine = match uni_ocr::OcrEngine::new(uni_ocr::OcrProvider::Auto) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("no OCR engine available: {e}");
                return Ok(OcrOutcome {
                    engine_available: false,
                    text: None,
                });
            }
        };

        let monitors = xcap::Monitor::all().map_err(|e| {
            AutomationError::PlatformError(format!("failed to enumerate monitors: {e}"))
        })?;
        let monitor = monitors
            .into_iter()
            .find(|m| {
                let (mx, my) = (m.x() as f64, m.y() as f64);
                x >= mx
                    && y >= my
                    && x < mx + m.width() as f64
                    && y < my + m.height() as f64
            })
            .ok_or_else(|| {
                AutomationError::PlatformError(
                    "element bounds are outside every monitor".to_string(),
                )
            })?;

        let capture = monitor.capture_image().map_err(|e| {
            AutomationError::PlatformError(format!("failed to capture monitor: {e}"))
        })?;

        let rel_x = (x - monitor.x() as f64).max(0.0) as u32;
        let rel_y = (y - monitor.y() as f64).max(0.0) as u32;
        let crop_w = (width.max(1.0) as u32).min(capture.width().saturating_sub(rel_x));
        let crop_h = (height.max(1.0) as u32).min(capture.height().saturating_sub(rel_y));
        let region =
            image::imageops::crop_imm(&capture, rel_x, rel_y, crop_w, crop_h).to_image();
        let dynamic_image = image::DynamicImage::ImageRgba8(region);

        let (text, _language, _confidence) = engine
            .recognize_image(&dynamic_image)
            .await
            .map_err(|e| AutomationError::OperationFailed(format!("OCR recognition failed: {e}")))?;

        Ok(OcrOutcome {
            engine_available: true,
            text: Some(text).filter(|t| !t.trim().is_empty()),
        })
    }

    async fn element_markup(&self, _element: &UiElement) -> Result<String, AutomationError> {
        // The viewer's embedded browser surface is not reachable through UI
        // Automation; markup reads require the browser-side bridge.
        Err(AutomationError::UnsupportedOperation(
            "markup extraction is not available through the UI Automation backend".to_string(),
        ))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Placeholder element used when the desktop root itself cannot be
/// obtained. Every query on it reads as empty.
#[derive(Debug)]
struct DetachedElement;

impl UiElementImpl for DetachedElement {
    fn object_id(&self) -> usize {
        0
    }

    fn attributes(&self) -> UiAttributes {
        UiAttributes::default()
    }

    fn parent(&self) -> Result<Option<UiElement>, AutomationError> {
        Ok(None)
    }

    fn children(&self) -> Result<Vec<UiElement>, AutomationError> {
        Ok(Vec::new())
    }

    fn value_text(&self) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    fn legacy_name(&self) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    fn bounds(&self) -> Result<(f64, f64, f64, f64), AutomationError> {
        Ok((0.0, 0.0, 0.0, 0.0))
    }

    fn clone_boxed(&self) -> Box<dyn UiElementImpl> {
        Box::new(DetachedElement)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
