use flowcanvas::{
    config::EditorConfig,
    editor::interaction::{CanvasRect, Modifiers, PointerButton, PointerDown, PointerTarget},
    viewport::Transform,
    workflow::storage::WorkflowStorage,
    EditorSession, NodeData, NodeKind, Point, Workflow,
};

#[test]
fn trigger_agent_add_then_delete() {
    let mut wf = Workflow::new();
    let trigger = wf
        .add_node("Telegram Trigger", NodeData::empty(NodeKind::Trigger), None)
        .unwrap();
    assert_eq!(trigger.position, Point::new(400.0, 300.0));

    let agent = wf
        .add_node("AI Agent", NodeData::empty(NodeKind::AiAgent), Some(&trigger.id))
        .unwrap();
    assert_eq!(agent.position, trigger.position + Point::new(400.0, 0.0));
    assert!(wf.has_children(&trigger.id));

    assert!(wf.remove_node(&agent.id));
    assert!(!wf.has_children(&trigger.id));
    assert_eq!(wf.node(&trigger.id).unwrap().position, Point::new(400.0, 300.0));
}

#[test]
fn zoom_about_cursor_scenario() {
    let old = Transform { x: 0.0, y: 0.0, scale: 1.0 };
    let cursor = Point::new(100.0, 100.0);
    let new = old.zoom(0.2, cursor);

    assert!((new.scale - 1.2).abs() < 1e-12);
    let a = new.screen_to_canvas(cursor);
    let b = old.screen_to_canvas(cursor);
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
}

#[tokio::test]
async fn edits_survive_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let storage = WorkflowStorage::open(dir.path()).await.unwrap();

    let (mut session, _) = EditorSession::open(&storage, None, EditorConfig::default())
        .await
        .unwrap();
    let id = session.workflow().id.clone();

    let trigger = session
        .add_node("Start", NodeData::empty(NodeKind::Trigger), None)
        .unwrap();
    assert!(session.open_node_picker(Some(&trigger.id)));
    let oracle = session.pick_node(NodeKind::Oracle, Some("ETH/USD")).unwrap();

    let rect = CanvasRect { left: 0.0, top: 50.0, width: 1000.0, height: 700.0 };
    session.wheel(-500.0, Point::new(200.0, 250.0), Some(rect));
    let down = PointerDown {
        client: session.workflow().transform.canvas_to_screen(oracle.position) + Point::new(0.0, 50.0),
        button: PointerButton::Primary,
        modifiers: Modifiers::default(),
        target: PointerTarget::NodeBody(oracle.id.clone()),
    };
    assert!(session.pointer_down(&down, Some(rect)));
    session.pointer_move(down.client + Point::new(30.0, 15.0), Some(rect));
    session.pointer_up();

    let expected = session.workflow().clone();
    session.close().await.unwrap();

    let reloaded = storage.get_workflow(&id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, expected.title);
    assert_eq!(reloaded.nodes, expected.nodes);
    assert_eq!(reloaded.transform, expected.transform);
    assert!((reloaded.transform.scale - 1.5).abs() < 1e-9);

    let moved = reloaded.node(&oracle.id).unwrap().position;
    assert!((moved.x - (oracle.position.x + 20.0)).abs() < 1e-9);
    assert!((moved.y - (oracle.position.y + 10.0)).abs() < 1e-9);
}
