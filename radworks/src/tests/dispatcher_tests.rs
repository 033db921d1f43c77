//! Tests for operation dispatch.

use crate::element::ControlKind;
use crate::interpreter::VariableScope;
use crate::ops::{LazyArg, OpCall, OperationDispatcher};
use crate::platforms::{EngineConfig, KeyAction, OcrOutcome};
use crate::tests::mock::{attrs, MockTree};

fn literal(text: &str) -> LazyArg<'static> {
    LazyArg::Literal(text.to_string())
}

#[tokio::test]
async fn unknown_operation_reports_an_inline_error() {
    let tree = MockTree::new();
    let dispatcher = OperationDispatcher::new(tree.engine(), EngineConfig::default());

    let outcome = dispatcher
        .execute_async("Teleport", OpCall::new(None, vec![]))
        .await;

    assert_eq!(outcome.preview, "(error: unknown operation 'Teleport')");
    assert_eq!(outcome.value, None);
}

#[tokio::test]
async fn mouse_click_dispatches_and_previews() {
    let tree = MockTree::new();
    let engine = tree.engine();
    let dispatcher = OperationDispatcher::new(engine.clone(), EngineConfig::default());

    let outcome = dispatcher
        .execute_async(
            "MouseClick",
            OpCall::new(None, vec![literal("640"), literal("480")]),
        )
        .await;

    assert_eq!(outcome.preview, "(clicked 640, 480)");
    assert_eq!(outcome.value, None);
    assert_eq!(*engine.click_log.lock().unwrap(), vec![(640, 480)]);
}

#[tokio::test]
async fn non_numeric_coordinates_become_a_diagnostic_preview() {
    let tree = MockTree::new();
    let engine = tree.engine();
    let dispatcher = OperationDispatcher::new(engine.clone(), EngineConfig::default());

    let outcome = dispatcher
        .execute_async(
            "MouseClick",
            OpCall::new(None, vec![literal("abc"), literal("480")]),
        )
        .await;

    assert!(outcome.preview.starts_with("(error:"), "{}", outcome.preview);
    assert!(engine.click_log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn clipboard_and_keystrokes_reach_the_engine() {
    let tree = MockTree::new();
    let engine = tree.engine();
    let dispatcher = OperationDispatcher::new(engine.clone(), EngineConfig::default());

    let outcome = dispatcher
        .execute_async("SetClipboard", OpCall::new(None, vec![literal("DOE^JOHN")]))
        .await;
    assert_eq!(outcome.preview, "(clipboard set, 8 chars)");

    dispatcher
        .execute_async("SendTab", OpCall::new(None, vec![]))
        .await;
    dispatcher
        .execute_async("SendSelectAll", OpCall::new(None, vec![]))
        .await;

    assert_eq!(*engine.clipboard_log.lock().unwrap(), vec!["DOE^JOHN"]);
    assert_eq!(
        *engine.key_log.lock().unwrap(),
        vec![KeyAction::Tab, KeyAction::SelectAll]
    );
}

#[tokio::test]
async fn variable_arguments_resolve_lazily_from_scope() {
    let tree = MockTree::new();
    let engine = tree.engine();
    let dispatcher = OperationDispatcher::new(engine.clone(), EngineConfig::default());

    let mut scope = VariableScope::new();
    scope.set("accession", "CR20260801-0042");

    let outcome = dispatcher
        .execute_async(
            "SetClipboard",
            OpCall::new(
                None,
                vec![LazyArg::Var {
                    name: "accession".to_string(),
                    scope: &scope,
                }],
            ),
        )
        .await;

    assert!(outcome.preview.starts_with("(clipboard set"));
    assert_eq!(*engine.clipboard_log.lock().unwrap(), vec!["CR20260801-0042"]);
}

#[tokio::test]
async fn unbound_variable_is_an_inline_error() {
    let tree = MockTree::new();
    let dispatcher = OperationDispatcher::new(tree.engine(), EngineConfig::default());

    let scope = VariableScope::new();
    let outcome = dispatcher
        .execute_async(
            "SetClipboard",
            OpCall::new(
                None,
                vec![LazyArg::Var {
                    name: "missing".to_string(),
                    scope: &scope,
                }],
            ),
        )
        .await;

    assert!(outcome.preview.contains("variable 'missing'"), "{}", outcome.preview);
    assert_eq!(outcome.value, None);
}

#[tokio::test]
async fn get_text_previews_are_capped_but_values_are_not() {
    let tree = MockTree::new();
    let field = tree.add(0, attrs(Some("Findings"), None, ControlKind::Edit, None));
    let long_text = "No acute cardiopulmonary abnormality. ".repeat(4);
    tree.set_value(field, &long_text);

    let config = EngineConfig {
        preview_cap: 24,
        ..Default::default()
    };
    let dispatcher = OperationDispatcher::new(tree.engine(), config);

    let outcome = dispatcher
        .execute_async("GetText", OpCall::new(Some(tree.element(field)), vec![]))
        .await;

    assert_eq!(outcome.value.as_deref(), Some(long_text.as_str()));
    assert_eq!(outcome.preview.chars().count(), 25);
    assert!(outcome.preview.ends_with('…'));
}

#[tokio::test]
async fn element_ops_without_an_element_fail_inline() {
    let tree = MockTree::new();
    let dispatcher = OperationDispatcher::new(tree.engine(), EngineConfig::default());

    let outcome = dispatcher
        .execute_async("GetText", OpCall::new(None, vec![]))
        .await;

    assert_eq!(outcome.preview, "(error: element not found)");
    assert_eq!(outcome.value, None);
}

#[tokio::test]
async fn ocr_reports_engine_unavailability() {
    let tree = MockTree::new();
    let field = tree.add(0, attrs(Some("Scanned Form"), None, ControlKind::Image, None));
    let engine = tree.engine();
    *engine.ocr_outcome.lock().unwrap() = OcrOutcome {
        engine_available: false,
        text: None,
    };
    let dispatcher = OperationDispatcher::new(engine, EngineConfig::default());

    let outcome = dispatcher
        .execute_async("GetTextOCR", OpCall::new(Some(tree.element(field)), vec![]))
        .await;

    assert_eq!(outcome.preview, "(error: OCR engine unavailable)");
}

#[tokio::test]
async fn ocr_produces_recognized_text() {
    let tree = MockTree::new();
    let field = tree.add(0, attrs(Some("Scanned Form"), None, ControlKind::Image, None));
    let engine = tree.engine();
    *engine.ocr_outcome.lock().unwrap() = OcrOutcome {
        engine_available: true,
        text: Some("IMPRESSION: NORMAL".to_string()),
    };
    let dispatcher = OperationDispatcher::new(engine, EngineConfig::default());

    let outcome = dispatcher
        .execute_async("GetTextOCR", OpCall::new(Some(tree.element(field)), vec![]))
        .await;

    assert_eq!(outcome.value.as_deref(), Some("IMPRESSION: NORMAL"));
}

#[test]
fn sync_entry_bridges_async_only_operations() {
    let tree = MockTree::new();
    let field = tree.add(0, attrs(Some("Report"), None, ControlKind::Document, None));
    let engine = tree.engine();
    *engine.markup.lock().unwrap() = Some("<p>IMPRESSION</p>".to_string());
    let dispatcher = OperationDispatcher::new(engine, EngineConfig::default());

    // No runtime on this thread: the bridge supplies one.
    let outcome = dispatcher.execute("GetHTML", OpCall::new(Some(tree.element(field)), vec![]));

    assert_eq!(outcome.value.as_deref(), Some("<p>IMPRESSION</p>"));
}

#[test]
fn invalid_delay_is_an_inline_error() {
    let tree = MockTree::new();
    let dispatcher = OperationDispatcher::new(tree.engine(), EngineConfig::default());

    let outcome = dispatcher.execute("Delay", OpCall::new(None, vec![literal("soon")]));

    assert!(outcome.preview.starts_with("(error:"), "{}", outcome.preview);
}

#[tokio::test]
async fn table_operations_join_cells_with_tabs() {
    let tree = MockTree::new();
    let list = tree.add(0, attrs(Some("Worklist"), None, ControlKind::List, None));
    let header_row = tree.add(list, attrs(None, None, ControlKind::Custom, None));
    for label in ["Accession", "PatientName", "Modality"] {
        tree.add(header_row, attrs(Some(label), None, ControlKind::Custom, None));
    }

    let dispatcher = OperationDispatcher::new(tree.engine(), EngineConfig::default());
    let outcome = dispatcher
        .execute_async(
            "ReadColumnHeaders",
            OpCall::new(Some(tree.element(list)), vec![]),
        )
        .await;

    assert_eq!(
        outcome.value.as_deref(),
        Some("Accession No.\tPatient Name\tModality")
    );
}
