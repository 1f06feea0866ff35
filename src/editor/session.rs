/// Editor session: one open workflow and everything the canvas needs around it
///
/// The session owns the workflow, the interaction controller, the open panel
/// and the notices. Every mutation republishes the workflow to the snapshot
/// cell the autosave task reads. User-level failures (bad parent, rejected
/// credentials, invalid config) become error notices; they never propagate and
/// never leave the graph half-changed.

use crate::config::EditorConfig;
use crate::editor::{
    interaction::{
        shortcut, AuxHandles, CanvasRect, InteractionController, KeyCommand, KeyPress, Outcome,
        PointerDown,
    },
    notice::{NoticeLevel, Notices},
    panel::Panel,
};
use crate::services::{CredentialVerifier, InboundUpdate, UpdatePoller};
use crate::viewport::ZoomStep;
use crate::workflow::{
    autosave::{self, AutosaveHandle},
    graph::RemovalPolicy,
    snapshot::WorkflowSnapshot,
    storage::WorkflowStorage,
    types::{Node, NodeData, NodeKind, Point, TriggerData, Workflow},
};
use anyhow::Result;
use serde_json::Value;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// How `open` obtained its workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Loaded,
    /// A new workflow was created; `requested` is the id that was asked for but not found
    Created { requested: Option<String> },
}

/// An open workflow plus its canvas state
pub struct EditorSession {
    /// Workflow being edited; the source of every published snapshot
    workflow: Workflow,
    /// Pointer/keyboard state machine
    controller: InteractionController,
    /// Decorative handle positions, session only
    handles: AuxHandles,
    /// Currently open panel or modal
    panel: Panel,
    /// Toasts raised by operations
    notices: Notices,
    /// Latest workflow as seen by the autosave task
    snapshot: Arc<WorkflowSnapshot>,
    /// None for detached sessions
    autosave: Option<AutosaveHandle>,
    config: EditorConfig,
}

impl EditorSession {
    /// Session without persistence, e.g. for previews and tests
    pub fn detached(workflow: Workflow, config: EditorConfig) -> Self {
        let snapshot = WorkflowSnapshot::new();
        snapshot.publish(&workflow);
        Self {
            workflow,
            controller: InteractionController::new(),
            handles: AuxHandles::default(),
            panel: Panel::Closed,
            notices: Notices::default(),
            snapshot,
            autosave: None,
            config,
        }
    }

    /// Load `id` from storage, or create a fresh workflow, and start autosave
    ///
    /// A new workflow is not written until the first save; its id is addressable
    /// through `route()` straight away.
    pub async fn open(
        storage: &WorkflowStorage,
        id: Option<&str>,
        config: EditorConfig,
    ) -> Result<(Self, OpenOutcome)> {
        let (workflow, outcome) = match id {
            Some(id) => match storage.get_workflow(id).await? {
                Some(workflow) => {
                    tracing::info!("📂 Loaded workflow '{}' ({})", workflow.title, workflow.id);
                    (workflow, OpenOutcome::Loaded)
                }
                None => {
                    tracing::warn!("Workflow '{}' not found, starting a new one", id);
                    (
                        storage.create_new_workflow(),
                        OpenOutcome::Created {
                            requested: Some(id.to_string()),
                        },
                    )
                }
            },
            None => (
                storage.create_new_workflow(),
                OpenOutcome::Created { requested: None },
            ),
        };

        if let OpenOutcome::Created { .. } = outcome {
            tracing::info!("🆕 Created workflow {}", workflow.id);
        }

        let graph = workflow.connection_graph();
        if !graph.is_acyclic() {
            tracing::warn!("Workflow '{}' has cyclic parent links", workflow.id);
        }
        let dangling = workflow.dangling().len();
        if dangling > 0 {
            tracing::warn!("Workflow '{}' has {} node(s) with a missing parent", workflow.id, dangling);
        }

        let period = config.autosave_interval();
        let mut session = Self::detached(workflow, config);
        session.autosave = Some(autosave::spawn(
            storage.clone(),
            Arc::clone(&session.snapshot),
            period,
        ));
        Ok((session, outcome))
    }

    /// Stop autosave after a final save of the current state
    pub async fn close(mut self) -> Result<()> {
        self.publish();
        if let Some(handle) = self.autosave.take() {
            handle.shutdown().await?;
        }
        tracing::info!("👋 Closed workflow {}", self.workflow.id);
        Ok(())
    }

    /// Current in-memory workflow
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Addressable location of this workflow
    pub fn route(&self) -> String {
        format!("/flow?id={}", self.workflow.id)
    }

    /// Open panel, `Panel::Closed` if none
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Toasts; use `Notices::latest(now)` to read the visible one
    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Decorative handle positions
    pub fn handles(&self) -> &AuxHandles {
        &self.handles
    }

    /// Interaction state machine
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Autosave task, absent for detached sessions
    pub fn autosave(&self) -> Option<&AutosaveHandle> {
        self.autosave.as_ref()
    }

    /// Shared snapshot cell read by autosave
    pub fn snapshot(&self) -> Arc<WorkflowSnapshot> {
        Arc::clone(&self.snapshot)
    }

    fn publish(&self) {
        self.snapshot.publish(&self.workflow);
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>, ttl_ms: u64) {
        let message = message.into();
        if level == NoticeLevel::Error {
            tracing::warn!("{}", message);
        }
        self.notices
            .push(level, message, Instant::now(), Duration::from_millis(ttl_ms));
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message, self.config.error_toast_ms);
    }

    // ---- graph ----

    /// Rename the workflow
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.workflow.title = title.into();
        self.publish();
    }

    /// Add a node and raise a "node added" notice; `None` if it was rejected
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        data: NodeData,
        parent_id: Option<&str>,
    ) -> Option<Node> {
        match self.workflow.add_node(name, data, parent_id) {
            Ok(node) => {
                self.publish();
                let message = format!("{} added to canvas", node.name);
                self.notify(NoticeLevel::Success, message, self.config.node_added_toast_ms);
                Some(node)
            }
            Err(e) => {
                self.notify_error(format!("Could not add node: {}", e));
                None
            }
        }
    }

    /// Delete a node, leaving its children with a dangling parent
    pub fn remove_node(&mut self, id: &str) -> bool {
        !self.remove_node_with(id, RemovalPolicy::LeaveDangling).is_empty()
    }

    /// Delete a node using `policy` for its children; returns the removed ids
    pub fn remove_node_with(&mut self, id: &str, policy: RemovalPolicy) -> Vec<String> {
        let removed = self.workflow.remove_node_with(id, policy);
        for node_id in &removed {
            self.handles.forget(node_id);
            if self.panel.config_target() == Some(node_id.as_str()) {
                self.panel = Panel::Closed;
            }
        }
        if !removed.is_empty() {
            self.publish();
        }
        removed
    }

    /// Place a node at a canvas position
    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        let moved = self.workflow.move_node(id, position);
        if moved {
            self.publish();
        }
        moved
    }

    /// Re-parent a node; cycles become an error notice
    pub fn connect(&mut self, id: &str, parent_id: Option<&str>) -> bool {
        match self.workflow.connect(id, parent_id) {
            Ok(changed) => {
                if changed {
                    self.publish();
                }
                changed
            }
            Err(e) => {
                self.notify_error(format!("Could not connect nodes: {}", e));
                false
            }
        }
    }

    /// Shallow-merge `patch` into a node payload
    pub fn update_node_data(&mut self, id: &str, patch: Value) -> bool {
        match self.workflow.update_node_data(id, patch) {
            Ok(changed) => {
                if changed {
                    self.publish();
                }
                changed
            }
            Err(e) => {
                self.notify_error(format!("Could not save configuration: {}", e));
                false
            }
        }
    }

    /// Only childless nodes offer the "add connection" affordance
    pub fn can_add_child(&self, id: &str) -> bool {
        self.workflow.contains(id) && !self.workflow.has_children(id)
    }

    // ---- pointer and keyboard ----

    /// Button press on the canvas
    pub fn pointer_down(&mut self, event: &PointerDown, rect: Option<CanvasRect>) -> bool {
        self.controller
            .pointer_down(event, rect, &self.workflow, &self.handles)
    }

    /// Pointer moved; publishes when the workflow changed
    pub fn pointer_move(&mut self, client: Point, rect: Option<CanvasRect>) -> Outcome {
        let outcome = self
            .controller
            .pointer_move(client, rect, &mut self.workflow, &mut self.handles);
        if outcome.touches_workflow() {
            self.publish();
        }
        outcome
    }

    /// Button released: ends any pan or drag
    pub fn pointer_up(&mut self) {
        self.controller.release();
    }

    /// Pointer left the canvas: same as a release
    pub fn pointer_leave(&mut self) {
        self.controller.release();
    }

    /// Wheel zoom about the cursor
    pub fn wheel(&mut self, delta_y: f64, client: Point, rect: Option<CanvasRect>) -> Outcome {
        let outcome = self.controller.wheel(
            delta_y,
            client,
            rect,
            self.config.wheel_sensitivity,
            &mut self.workflow,
        );
        if outcome.touches_workflow() {
            self.publish();
        }
        outcome
    }

    /// Button or keyboard zoom by one step
    pub fn zoom_step(&mut self, step: ZoomStep) {
        self.workflow.transform = self.workflow.transform.step(step);
        self.publish();
    }

    /// Back to the identity transform
    pub fn reset_view(&mut self) {
        self.workflow.transform.reset();
        self.publish();
    }

    /// Handle a global key press; returns the shortcut it triggered
    pub fn key_down(&mut self, press: &KeyPress) -> Option<KeyCommand> {
        let command = shortcut(press)?;
        match command {
            KeyCommand::ResetView => self.reset_view(),
            KeyCommand::Zoom(step) => self.zoom_step(step),
            KeyCommand::SaveNow => {
                self.save_now();
            }
        }
        Some(command)
    }

    /// Queue an immediate save independent of the autosave timer
    pub fn save_now(&mut self) -> bool {
        self.publish();
        let queued = self
            .autosave
            .as_ref()
            .is_some_and(AutosaveHandle::request_flush);
        if queued {
            self.notify(NoticeLevel::Success, "Workflow saved", self.config.saved_toast_ms);
        } else {
            self.notify_error("Workflow could not be saved: storage is not attached");
        }
        queued
    }

    // ---- panels ----

    /// Close whatever panel is open
    pub fn close_panel(&mut self) {
        self.panel = Panel::Closed;
    }

    /// First step of adding a trigger
    pub fn open_trigger_picker(&mut self) {
        self.panel = Panel::TriggerPicker;
    }

    /// Pick the trigger event; moves on to credential entry
    pub fn choose_trigger(&mut self, trigger_type: impl Into<String>) -> bool {
        if self.panel != Panel::TriggerPicker {
            return false;
        }
        self.panel = Panel::CredentialEntry {
            trigger_type: trigger_type.into(),
        };
        true
    }

    /// Verify a bot token; on success the trigger config panel opens
    pub async fn submit_credentials(&mut self, token: &str, verifier: &dyn CredentialVerifier) -> bool {
        let Panel::CredentialEntry { trigger_type } = &self.panel else {
            return false;
        };
        let trigger_type = trigger_type.clone();
        let token = token.trim();
        if token.is_empty() {
            return false;
        }

        match verifier.verify(token).await {
            Ok(bot) => {
                self.panel = Panel::TriggerConfig {
                    trigger_type,
                    bot_token: token.to_string(),
                    bot,
                };
                true
            }
            Err(e) => {
                self.notify_error(format!("Failed to verify bot token: {}", e));
                false
            }
        }
    }

    /// Newest message the configured bot has received, for the live preview
    pub async fn preview_latest_update(&mut self, poller: &dyn UpdatePoller) -> Option<InboundUpdate> {
        let Panel::TriggerConfig { bot_token, .. } = &self.panel else {
            return None;
        };
        let token = bot_token.clone();
        match poller.latest_update(&token).await {
            Ok(update) => update,
            Err(e) => {
                self.notify_error(format!("Could not fetch updates: {}", e));
                None
            }
        }
    }

    /// Add the configured trigger as a root node and close the panel
    pub fn confirm_trigger(&mut self) -> Option<Node> {
        if !matches!(self.panel, Panel::TriggerConfig { .. }) {
            return None;
        }
        let Panel::TriggerConfig {
            trigger_type,
            bot_token,
            bot,
        } = std::mem::take(&mut self.panel)
        else {
            return None;
        };

        let data = NodeData::Trigger(TriggerData {
            source: Some("telegram".to_string()),
            trigger_type: Some(trigger_type),
            bot_token: Some(bot_token),
            bot: Some(bot),
            icon: Some("telegram".to_string()),
            color: Some("#0088cc".to_string()),
        });
        self.add_node("Telegram Trigger", data, None)
    }

    /// Open the node picker, optionally to add a child of `parent_id`
    pub fn open_node_picker(&mut self, parent_id: Option<&str>) -> bool {
        if let Some(pid) = parent_id {
            if !self.can_add_child(pid) {
                return false;
            }
        }
        self.panel = Panel::NodePicker {
            parent_id: parent_id.map(str::to_string),
        };
        true
    }

    /// Add the picked node kind under the picker's parent and close the panel
    ///
    /// If the parent was deleted while the picker was open the node is added as a root.
    pub fn pick_node(&mut self, kind: NodeKind, name: Option<&str>) -> Option<Node> {
        if !matches!(self.panel, Panel::NodePicker { .. }) {
            return None;
        }
        let Panel::NodePicker { parent_id } = std::mem::take(&mut self.panel) else {
            return None;
        };

        let parent = parent_id.filter(|pid| self.workflow.contains(pid));
        let name = name.unwrap_or(kind.default_name()).to_string();
        self.add_node(name, NodeData::empty(kind), parent.as_deref())
    }

    /// Double-click on a configurable node opens its config panel
    pub fn open_node_config(&mut self, node_id: &str) -> bool {
        let configurable = self
            .workflow
            .node(node_id)
            .is_some_and(|n| n.kind().is_configurable());
        if configurable {
            self.panel = Panel::NodeConfig {
                node_id: node_id.to_string(),
            };
        }
        configurable
    }

    /// Merge the config panel's fields into its node and close the panel
    ///
    /// On a rejected patch the panel stays open so the user can fix it.
    pub fn save_node_config(&mut self, patch: Value) -> bool {
        let Some(node_id) = self.panel.config_target().map(str::to_string) else {
            return false;
        };
        let saved = self.update_node_data(&node_id, patch);
        if saved {
            self.panel = Panel::Closed;
        }
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::interaction::{Modifiers, PointerButton, PointerTarget};
    use crate::services::ServiceError;
    use crate::workflow::types::BotInfo;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedVerifier(Option<BotInfo>);

    #[async_trait]
    impl CredentialVerifier for FixedVerifier {
        async fn verify(&self, _token: &str) -> Result<BotInfo, ServiceError> {
            self.0
                .clone()
                .ok_or_else(|| ServiceError::rejected("Unauthorized"))
        }
    }

    struct FixedPoller;

    #[async_trait]
    impl UpdatePoller for FixedPoller {
        async fn latest_update(&self, token: &str) -> Result<Option<InboundUpdate>, ServiceError> {
            Ok(Some(InboundUpdate {
                update_id: 1,
                chat_id: Some(5),
                from: Some("tester".into()),
                text: Some(format!("hello {token}")),
            }))
        }
    }

    fn bot() -> BotInfo {
        BotInfo {
            id: 77,
            username: Some("flow_bot".into()),
            display_name: "Flow Bot".into(),
        }
    }

    fn session() -> EditorSession {
        EditorSession::detached(Workflow::new(), EditorConfig::default())
    }

    #[tokio::test]
    async fn test_trigger_flow_adds_configured_node() {
        let mut s = session();
        s.open_trigger_picker();
        assert!(s.choose_trigger("on-message"));
        assert!(s.submit_credentials(" 123:abc ", &FixedVerifier(Some(bot()))).await);

        let preview = s.preview_latest_update(&FixedPoller).await.unwrap();
        assert_eq!(preview.text.as_deref(), Some("hello 123:abc"));

        let node = s.confirm_trigger().unwrap();
        assert_eq!(s.panel(), &Panel::Closed);
        assert_eq!(node.position, Point::new(400.0, 300.0));
        match node.data {
            NodeData::Trigger(t) => {
                assert_eq!(t.trigger_type.as_deref(), Some("on-message"));
                assert_eq!(t.bot_token.as_deref(), Some("123:abc"));
                assert_eq!(t.bot, Some(bot()));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(s.notices().latest(Instant::now()).unwrap().level, NoticeLevel::Success);
        assert_eq!(s.snapshot().latest().unwrap().nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_verification_leaves_graph_alone() {
        let mut s = session();
        s.open_trigger_picker();
        s.choose_trigger("on-message");
        assert!(!s.submit_credentials("bad", &FixedVerifier(None)).await);

        assert!(matches!(s.panel(), Panel::CredentialEntry { .. }));
        assert!(s.workflow().nodes.is_empty());
        assert_eq!(s.notices().latest(Instant::now()).unwrap().level, NoticeLevel::Error);
        assert!(s.confirm_trigger().is_none());
    }

    #[test]
    fn test_node_picker_only_for_childless_parents() {
        let mut s = session();
        let root = s.add_node("Start", NodeData::empty(NodeKind::Trigger), None).unwrap();

        assert!(s.open_node_picker(Some(&root.id)));
        let child = s.pick_node(NodeKind::AiAgent, None).unwrap();
        assert_eq!(child.name, "AI Agent");
        assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
        assert_eq!(child.position, Point::new(800.0, 300.0));

        assert!(!s.open_node_picker(Some(&root.id)));
        assert!(!s.open_node_picker(Some("node-ghost")));
        assert!(s.open_node_picker(Some(&child.id)));
    }

    #[test]
    fn test_pick_node_falls_back_to_root_when_parent_vanished() {
        let mut s = session();
        let root = s.add_node("Start", NodeData::empty(NodeKind::Trigger), None).unwrap();
        s.open_node_picker(Some(&root.id));
        s.remove_node(&root.id);

        let node = s.pick_node(NodeKind::Oracle, Some("ETH/USD")).unwrap();
        assert!(node.parent_id.is_none());
    }

    #[test]
    fn test_node_config_round() {
        let mut s = session();
        let ai = s.add_node("Agent", NodeData::empty(NodeKind::AiAgent), None).unwrap();
        let trigger = s.add_node("T", NodeData::empty(NodeKind::Trigger), None).unwrap();
        assert!(!s.open_node_config(&trigger.id));
        assert!(s.open_node_config(&ai.id));

        assert!(!s.save_node_config(json!({"fallbackMode": 3})));
        assert!(s.panel().is_open());

        assert!(s.save_node_config(json!({"prompt": "Summarise the price move", "memory": "window"})));
        assert!(!s.panel().is_open());
        match &s.workflow().node(&ai.id).unwrap().data {
            NodeData::AiAgent(d) => {
                assert_eq!(d.prompt, "Summarise the price move");
                assert_eq!(d.memory, "window");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_removing_configured_node_closes_panel() {
        let mut s = session();
        let ai = s.add_node("Agent", NodeData::empty(NodeKind::AiAgent), None).unwrap();
        s.open_node_config(&ai.id);
        assert!(s.remove_node(&ai.id));
        assert_eq!(s.panel(), &Panel::Closed);
    }

    #[test]
    fn test_shortcuts_drive_viewport() {
        let mut s = session();
        assert_eq!(s.key_down(&KeyPress::new("+")), Some(KeyCommand::Zoom(ZoomStep::In)));
        assert!((s.workflow().transform.scale - 1.1).abs() < 1e-12);
        s.key_down(&KeyPress::new("r"));
        assert_eq!(s.workflow().transform, crate::viewport::Transform::IDENTITY);

        // No storage attached: saving reports an error instead of failing
        assert_eq!(s.key_down(&KeyPress::with_command("s")), Some(KeyCommand::SaveNow));
        assert_eq!(s.notices().latest(Instant::now()).unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn test_drag_publishes_snapshot() {
        let mut s = session();
        let node = s.add_node("T", NodeData::empty(NodeKind::Trigger), None).unwrap();
        let rect = CanvasRect { left: 0.0, top: 0.0, width: 800.0, height: 600.0 };
        let down = PointerDown {
            client: Point::new(410.0, 310.0),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
            target: PointerTarget::NodeBody(node.id.clone()),
        };
        assert!(s.pointer_down(&down, Some(rect)));
        s.pointer_move(Point::new(460.0, 330.0), Some(rect));
        s.pointer_leave();

        let published = s.snapshot().latest().unwrap();
        assert_eq!(published.node(&node.id).unwrap().position, Point::new(450.0, 320.0));
        assert!(s.controller().is_idle());
    }

    #[tokio::test]
    async fn test_open_creates_then_reloads() {
        let storage = WorkflowStorage::in_memory().await.unwrap();
        let (mut s, outcome) = EditorSession::open(&storage, None, EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Created { requested: None });
        let id = s.workflow().id.clone();
        assert_eq!(s.route(), format!("/flow?id={id}"));
        assert!(storage.get_workflow(&id).await.unwrap().is_none());

        s.set_title("Bridge watcher");
        s.add_node("T", NodeData::empty(NodeKind::Trigger), None).unwrap();
        s.close().await.unwrap();

        let (s, outcome) = EditorSession::open(&storage, Some(&id), EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Loaded);
        assert_eq!(s.workflow().title, "Bridge watcher");
        assert_eq!(s.workflow().nodes.len(), 1);
        s.close().await.unwrap();

        let (s, outcome) = EditorSession::open(&storage, Some("wf-unknown"), EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            OpenOutcome::Created {
                requested: Some("wf-unknown".into())
            }
        );
        assert_ne!(s.workflow().id, "wf-unknown");
    }

    #[tokio::test]
    async fn test_manual_save_reaches_storage() {
        let storage = WorkflowStorage::in_memory().await.unwrap();
        let (mut s, _) = EditorSession::open(&storage, None, EditorConfig::default())
            .await
            .unwrap();
        s.add_node("T", NodeData::empty(NodeKind::Trigger), None).unwrap();
        assert!(s.save_now());
        s.autosave().unwrap().flush().await.unwrap();

        let saved = storage.get_workflow(&s.workflow().id).await.unwrap().unwrap();
        assert_eq!(saved.nodes.len(), 1);
        assert_eq!(s.notices().latest(Instant::now()).unwrap().message, "Workflow saved");
    }

    #[test]
    fn test_toasts_are_dismissed_after_their_lifetime() {
        let config = EditorConfig {
            node_added_toast_ms: 10,
            ..EditorConfig::default()
        };
        let mut s = EditorSession::detached(Workflow::new(), config);
        for i in 0..50 {
            s.add_node(format!("n{i}"), NodeData::empty(NodeKind::GenericAction), None)
                .unwrap();
        }
        assert!(s.notices().latest(Instant::now()).is_some());

        std::thread::sleep(Duration::from_millis(30));
        assert!(s.notices().latest(Instant::now()).is_none());

        s.add_node("last", NodeData::empty(NodeKind::GenericAction), None).unwrap();
        assert_eq!(s.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_autosave_period_still_saves_on_close() {
        let storage = WorkflowStorage::in_memory().await.unwrap();
        let config = EditorConfig {
            autosave_interval_ms: 0,
            ..EditorConfig::default()
        };
        let (mut s, _) = EditorSession::open(&storage, None, config).await.unwrap();
        s.add_node("T", NodeData::empty(NodeKind::Trigger), None).unwrap();
        assert!(s.autosave().unwrap().flush().await.unwrap().is_some());

        let id = s.workflow().id.clone();
        s.set_title("Closed cleanly");
        s.close().await.unwrap();
        assert_eq!(storage.get_workflow(&id).await.unwrap().unwrap().title, "Closed cleanly");
    }
}
