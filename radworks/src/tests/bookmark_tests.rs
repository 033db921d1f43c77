//! Tests for the persisted bookmark model.

use crate::bookmark::{Bookmark, NodeSpec};
use crate::element::ControlKind;
use crate::tests::mock::attrs;

#[test]
fn serde_round_trip_preserves_flags_and_presence() {
    // A stored value with its flag off must survive the round-trip: the
    // flag suppresses the predicate at replay time, not the data.
    let spec = NodeSpec {
        name: Some("Open Study".to_string()),
        use_name: false,
        class_name: Some("ViewerButton".to_string()),
        use_class_name: true,
        control: Some(ControlKind::Button),
        use_control: true,
        automation_id: None,
        use_automation_id: false,
        index: 3,
    };
    let bookmark = Bookmark {
        process_name: "radviewer".to_string(),
        chain: vec![spec.clone()],
    };

    let json = serde_json::to_string(&bookmark).expect("serialize");
    let restored: Bookmark = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, bookmark);
    assert_eq!(restored.chain[0].name.as_deref(), Some("Open Study"));
    assert!(!restored.chain[0].use_name);
    assert!(restored.chain[0].use_class_name);
    assert_eq!(restored.chain[0].index, 3);
}

#[test]
fn disabled_predicate_is_ignored_in_matching() {
    let spec = NodeSpec {
        name: Some("Open Study".to_string()),
        use_name: false,
        ..Default::default()
    };
    // The stored name differs from the live one, but the flag is off.
    let live = attrs(Some("Close Study"), None, ControlKind::Button, None);
    assert!(spec.matches(&live));
}

#[test]
fn all_flags_off_matches_everything() {
    let spec = NodeSpec::default();
    assert!(!spec.has_enabled_predicate());
    assert!(spec.matches(&attrs(Some("anything"), Some("AnyClass"), ControlKind::Pane, None)));
    assert!(spec.matches(&attrs(None, None, ControlKind::Custom, None)));
}

#[test]
fn enabled_predicates_use_and_semantics() {
    let spec = NodeSpec {
        name: Some("Worklist".to_string()),
        use_name: true,
        class_name: Some("GridHost".to_string()),
        use_class_name: true,
        ..Default::default()
    };
    assert!(spec.matches(&attrs(Some("Worklist"), Some("GridHost"), ControlKind::List, None)));
    assert!(!spec.matches(&attrs(Some("Worklist"), Some("Other"), ControlKind::List, None)));
    assert!(!spec.matches(&attrs(Some("Other"), Some("GridHost"), ControlKind::List, None)));
}

#[test]
fn capture_omits_custom_control_category() {
    let captured = NodeSpec::from_attributes(
        &attrs(Some("cell"), Some("CellHost"), ControlKind::Custom, None),
        false,
    );
    // The generic category is not discriminating and is not stored.
    assert_eq!(captured.control, None);
    assert!(!captured.use_control);
    assert!(captured.use_name);
    assert!(captured.use_class_name);
}

#[test]
fn capture_prefers_automation_id_when_asked() {
    let captured = NodeSpec::from_attributes(
        &attrs(
            Some("Send Report"),
            Some("ViewerButton"),
            ControlKind::Button,
            Some("btnSendReport"),
        ),
        true,
    );
    assert!(captured.use_automation_id);
    assert!(!captured.use_name);
    assert!(!captured.use_class_name);
    assert!(!captured.use_control);
    // Structural values stay stored for later re-enabling.
    assert_eq!(captured.name.as_deref(), Some("Send Report"));
}

#[test]
fn cache_key_is_stable_for_equal_bookmarks() {
    let make = || Bookmark {
        process_name: "radviewer".to_string(),
        chain: vec![NodeSpec {
            name: Some("Worklist".to_string()),
            use_name: true,
            ..Default::default()
        }],
    };
    assert_eq!(make().cache_key(), make().cache_key());
}
