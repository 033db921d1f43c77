//! Element read operations.
//!
//! `GetText` and `GetTextOnce` share one handler; they differ only in the
//! resolution policy the interpreter applies before dispatch (retrying vs.
//! single-attempt). The OCR and markup reads are async-only.

use super::{OpCall, OperationDispatcher, StepOutcome};
use crate::table;

impl OperationDispatcher {
    pub(super) fn read_text(&self, call: &OpCall<'_>) -> StepOutcome {
        let Some(element) = &call.element else {
            return StepOutcome::failure("element not found");
        };
        // Same read policy as a worklist cell: value pattern, name, legacy
        // name, then one level of children.
        self.outcome_from_text(table::cell_text(element))
    }

    pub(super) async fn read_text_ocr(&self, call: &OpCall<'_>) -> StepOutcome {
        let Some(element) = &call.element else {
            return StepOutcome::failure("element not found");
        };
        match self.engine().ocr_element(element).await {
            Ok(outcome) if !outcome.engine_available => {
                StepOutcome::failure("OCR engine unavailable")
            }
            Ok(outcome) => self.outcome_from_text(outcome.text.unwrap_or_default()),
            Err(e) => StepOutcome::failure(e),
        }
    }

    pub(super) async fn read_markup(&self, call: &OpCall<'_>) -> StepOutcome {
        let Some(element) = &call.element else {
            return StepOutcome::failure("element not found");
        };
        match self.engine().element_markup(element).await {
            Ok(markup) => self.outcome_from_text(markup),
            Err(e) => StepOutcome::failure(e),
        }
    }
}
