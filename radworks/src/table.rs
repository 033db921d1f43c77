//! Worklist table reads.
//!
//! The viewer renders its worklist as a list-like container whose first
//! child row holds the column headers. Reads here are strictly best-effort:
//! any fault during the walk collapses to a blank cell and never aborts a
//! procedure.

use crate::element::UiElement;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Exact synonym remapping applied to extracted header text, keeping
/// header-keyed lookups stable across minor label variants in the viewer.
static HEADER_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Accession", "Accession No."),
        ("Accession#", "Accession No."),
        ("AccessionNumber", "Accession No."),
        ("BirthDate", "Birth Date"),
        ("DOB", "Birth Date"),
        ("PatientName", "Patient Name"),
        ("PatientID", "Patient ID"),
        ("MRN", "Patient ID"),
        ("StudyDesc", "Study Description"),
        ("StudyDate", "Study Date"),
        ("RefPhysician", "Referring Physician"),
    ])
});

/// Normalize a raw header label through the fixed synonym table.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    HEADER_SYNONYMS
        .get(trimmed)
        .map(|mapped| (*mapped).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Three-step text read: value pattern, then accessible name, then the
/// legacy accessible-name pattern. Faults read as absent.
fn direct_text(element: &UiElement) -> Option<String> {
    non_blank(element.value_text().ok().flatten())
        .or_else(|| non_blank(element.name()))
        .or_else(|| non_blank(element.legacy_name().ok().flatten()))
}

/// Text content of one cell.
///
/// Falls back one level into the cell's own children, repeating the
/// three-step read on each and stopping at the first non-blank result.
pub fn cell_text(cell: &UiElement) -> String {
    if let Some(text) = direct_text(cell) {
        return text;
    }
    if let Ok(children) = cell.children() {
        for child in children {
            if let Some(text) = direct_text(&child) {
                return text;
            }
        }
    }
    String::new()
}

/// Column headers of a list-like container: the cells of its first child
/// row, normalized through the synonym table.
pub fn read_column_headers(list: &UiElement) -> Vec<String> {
    let first_row = match list.children() {
        Ok(rows) => rows.into_iter().next(),
        Err(e) => {
            debug!("header read failed listing rows: {e}");
            None
        }
    };
    let Some(row) = first_row else {
        return Vec::new();
    };
    match row.children() {
        Ok(cells) => cells
            .iter()
            .map(|cell| normalize_header(&cell_text(cell)))
            .collect(),
        Err(e) => {
            debug!("header read failed listing cells: {e}");
            Vec::new()
        }
    }
}

/// Cell values of one worklist row.
pub fn read_row_cells(row: &UiElement) -> Vec<String> {
    match row.children() {
        Ok(cells) => cells.iter().map(cell_text).collect(),
        Err(e) => {
            debug!("row read failed listing cells: {e}");
            Vec::new()
        }
    }
}
