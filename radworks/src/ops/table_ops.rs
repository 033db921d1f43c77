//! Worklist table operations.
//!
//! Cell lists are joined with tabs in the produced value; the variable
//! scope is string-typed, and tab-joined cells keep downstream splitting
//! unambiguous for the labels the viewer uses.

use super::{OpCall, OperationDispatcher, StepOutcome};
use crate::table;

impl OperationDispatcher {
    pub(super) fn read_headers(&self, call: &OpCall<'_>) -> StepOutcome {
        let Some(element) = &call.element else {
            return StepOutcome::failure("element not found");
        };
        self.outcome_from_text(table::read_column_headers(element).join("\t"))
    }

    pub(super) fn read_row(&self, call: &OpCall<'_>) -> StepOutcome {
        let Some(element) = &call.element else {
            return StepOutcome::failure("element not found");
        };
        self.outcome_from_text(table::read_row_cells(element).join("\t"))
    }
}
