//! Tests for the workstation entry point.

use crate::bookmark::{Bookmark, NodeSpec};
use crate::element::ControlKind;
use crate::platforms::EngineConfig;
use crate::tests::mock::{attrs, MockTree, VIEWER_PROCESS};
use crate::Workstation;

#[test]
fn attach_finds_the_viewer_by_process_name() {
    let tree = MockTree::new();
    let workstation = Workstation::with_engine(tree.engine(), EngineConfig::default());

    let window = workstation.attach(VIEWER_PROCESS).expect("no platform fault");
    assert!(window.is_some());

    let missing = workstation.attach("notepad").expect("no platform fault");
    assert!(missing.is_none());
}

#[tokio::test]
async fn probe_is_a_single_attempt_existence_check() {
    let tree = MockTree::new();
    let late = tree.add(0, attrs(Some("Report Panel"), None, ControlKind::Pane, None));
    tree.set_visible_after(late, 1);

    let workstation = Workstation::with_engine(tree.engine(), EngineConfig::default());
    let bookmark = Bookmark {
        process_name: VIEWER_PROCESS.to_string(),
        chain: vec![NodeSpec {
            name: Some("Report Panel".to_string()),
            use_name: true,
            ..Default::default()
        }],
    };

    let root = workstation.root();
    // First probe sees nothing; the element appears afterwards and the next
    // probe finds it without any retry loop.
    assert!(!workstation.probe(&bookmark, &root).await.expect("no fault"));
    assert!(workstation.probe(&bookmark, &root).await.expect("no fault"));
}
