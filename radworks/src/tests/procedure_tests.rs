//! Tests for the persisted procedure model.

use crate::bookmark::{Bookmark, NodeSpec};
use crate::procedure::{ArgSlot, ProcArg, ProcOpRow, ProcedureStore};

#[test]
fn rows_round_trip_with_disabled_slots() {
    let mut row = ProcOpRow::new("MouseClick");
    row.arg1 = Some(ArgSlot::new(ProcArg::Str("640".to_string())));
    row.arg2 = Some(ArgSlot::disabled(ProcArg::Str("480".to_string())));
    row.output_var = Some("last".to_string());
    row.preview = Some("(clicked 640, 480)".to_string());

    let json = serde_json::to_string(&row).expect("serialize");
    let restored: ProcOpRow = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, row);
    let arg2 = restored.arg2.expect("slot kept");
    assert!(!arg2.enabled);
    assert_eq!(arg2.arg, ProcArg::Str("480".to_string()));
}

#[test]
fn element_args_keep_their_bookmark() {
    let bookmark = Bookmark {
        process_name: "radviewer".to_string(),
        chain: vec![NodeSpec {
            name: Some("Worklist".to_string()),
            use_name: true,
            ..Default::default()
        }],
    };
    let mut row = ProcOpRow::new("ReadRowCells");
    row.arg1 = Some(ArgSlot::new(ProcArg::Element(bookmark.clone())));

    let json = serde_json::to_string(&row).expect("serialize");
    let restored: ProcOpRow = serde_json::from_str(&json).expect("deserialize");

    match &restored.arg1.expect("slot kept").arg {
        ProcArg::Element(restored_bookmark) => assert_eq!(restored_bookmark, &bookmark),
        other => panic!("expected an element argument, got {other:?}"),
    }
}

#[test]
fn store_loads_method_row_lists_from_json() {
    let mut store = ProcedureStore::new();
    let mut wait = ProcOpRow::new("Delay");
    wait.arg1 = Some(ArgSlot::new(ProcArg::Number(250.0)));
    store.insert("OpenNextStudy", vec![wait]);

    let path = std::env::temp_dir().join(format!(
        "radworks-store-test-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        serde_json::to_string(&store).expect("serialize store"),
    )
    .expect("write store");

    let loaded = ProcedureStore::load(&path).expect("load store");
    std::fs::remove_file(&path).ok();

    let rows = loaded.rows("OpenNextStudy").expect("method present");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].op, "Delay");
    assert_eq!(loaded.rows("Missing"), None);
}
