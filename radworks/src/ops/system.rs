//! System/OS operations: mouse, clipboard, keystrokes, delay.
//!
//! These are best-effort UI nudges, never correctness-critical: every
//! failure is caught at the operation boundary and reported as an inline
//! `(error: ...)` preview instead of propagating.

use super::{OpCall, OperationDispatcher, StepOutcome};
use crate::errors::AutomationError;
use crate::platforms::KeyAction;
use std::time::Duration;
use tracing::debug;

impl OperationDispatcher {
    pub(super) fn mouse_click(&self, call: &OpCall<'_>) -> StepOutcome {
        match self.mouse_click_inner(call) {
            Ok(outcome) => outcome,
            Err(e) => StepOutcome::failure(e),
        }
    }

    fn mouse_click_inner(&self, call: &OpCall<'_>) -> Result<StepOutcome, AutomationError> {
        let x = parse_coordinate(&call.arg_text(0)?, "x")?;
        let y = parse_coordinate(&call.arg_text(1)?, "y")?;
        self.engine().click_at(x, y)?;
        debug!(x, y, "clicked");
        Ok(StepOutcome::acted(format!("(clicked {x}, {y})")))
    }

    pub(super) fn set_clipboard(&self, call: &OpCall<'_>) -> StepOutcome {
        match self.set_clipboard_inner(call) {
            Ok(outcome) => outcome,
            Err(e) => StepOutcome::failure(e),
        }
    }

    fn set_clipboard_inner(&self, call: &OpCall<'_>) -> Result<StepOutcome, AutomationError> {
        let text = call.arg_text(0)?;
        self.engine().set_clipboard_text(&text)?;
        Ok(StepOutcome::acted(format!(
            "(clipboard set, {} chars)",
            text.chars().count()
        )))
    }

    pub(super) fn send_catalog_key(&self, action: KeyAction) -> StepOutcome {
        match self.engine().send_key(action) {
            Ok(()) => StepOutcome::acted(format!("(sent {action:?})")),
            Err(e) => StepOutcome::failure(e),
        }
    }

    pub(super) async fn delay_suspending(&self, call: &OpCall<'_>) -> StepOutcome {
        match parse_delay(call) {
            Ok(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                StepOutcome::acted(format!("(waited {ms} ms)"))
            }
            Err(e) => StepOutcome::failure(e),
        }
    }

    pub(super) fn delay_blocking(&self, call: &OpCall<'_>) -> StepOutcome {
        match parse_delay(call) {
            Ok(ms) => {
                std::thread::sleep(Duration::from_millis(ms));
                StepOutcome::acted(format!("(waited {ms} ms)"))
            }
            Err(e) => StepOutcome::failure(e),
        }
    }
}

fn parse_coordinate(raw: &str, axis: &str) -> Result<i32, AutomationError> {
    raw.trim().parse::<i32>().map_err(|_| {
        AutomationError::InvalidArgument(format!("non-numeric {axis} coordinate '{raw}'"))
    })
}

fn parse_delay(call: &OpCall<'_>) -> Result<u64, AutomationError> {
    let raw = call.arg_text(0)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AutomationError::InvalidArgument(format!("invalid delay '{raw}'")))
}
