/// Pointer and keyboard interaction state machine
///
/// Input is serialized through one event queue, so the controller holds plain
/// state: idle, panning the canvas, dragging a node, or dragging a node's
/// decorative handle. Any button-down starts the matching drag immediately and
/// any button-up or pointer-leave ends it.

use crate::viewport::ZoomStep;
use crate::workflow::types::{Point, Workflow};
use std::collections::HashMap;

/// Client-space bounding box of the canvas element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Client point relative to the canvas' top-left corner
    pub fn local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

/// What the pointer went down on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    /// The draggable body of a node
    NodeBody(String),
    /// Buttons and inputs inside a node; never start a drag
    NodeControl(String),
    /// Decorative handle inside a node
    AuxiliaryHandle(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerDown {
    pub client: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub target: PointerTarget,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// `anchor` is the pointer position minus the translation at press time
    PanningCanvas { anchor: Point },
    /// `offset` is the pointer's canvas position minus the node position
    DraggingNode { node_id: String, offset: Point },
    DraggingAuxiliaryHandle { node_id: String, offset: Point },
}

/// Effect of one event on editor state
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Unchanged,
    ViewChanged,
    NodeMoved(String),
    HandleMoved(String),
}

impl Outcome {
    /// True when the persisted workflow changed
    pub fn touches_workflow(&self) -> bool {
        matches!(self, Outcome::ViewChanged | Outcome::NodeMoved(_))
    }
}

/// Default handle position, in node-local canvas units
pub const DEFAULT_HANDLE_POSITION: Point = Point::new(100.0, 250.0);

/// Positions of decorative per-node handles; never persisted
#[derive(Debug, Clone, Default)]
pub struct AuxHandles {
    positions: HashMap<String, Point>,
}

impl AuxHandles {
    pub fn position(&self, node_id: &str) -> Point {
        self.positions
            .get(node_id)
            .copied()
            .unwrap_or(DEFAULT_HANDLE_POSITION)
    }

    pub fn set(&mut self, node_id: &str, position: Point) {
        self.positions.insert(node_id.to_string(), position);
    }

    pub fn forget(&mut self, node_id: &str) {
        self.positions.remove(node_id);
    }

    /// Number of handles moved away from the default
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Global keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ResetView,
    Zoom(ZoomStep),
    SaveNow,
}

/// A key press as reported by the host (`key` is the produced character or key name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_command(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }
}

/// Map a key press to a shortcut
pub fn shortcut(press: &KeyPress) -> Option<KeyCommand> {
    let command_held = press.modifiers.ctrl || press.modifiers.meta;
    match press.key.as_str() {
        "s" if command_held => Some(KeyCommand::SaveNow),
        "r" | "R" => Some(KeyCommand::ResetView),
        "+" | "=" => Some(KeyCommand::Zoom(ZoomStep::In)),
        "-" | "_" => Some(KeyCommand::Zoom(ZoomStep::Out)),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Begin a pan or drag. Presses while already dragging are ignored.
    ///
    /// Node and handle drags need the canvas rectangle; without it the press is
    /// skipped and the next one retries.
    pub fn pointer_down(
        &mut self,
        event: &PointerDown,
        rect: Option<CanvasRect>,
        workflow: &Workflow,
        handles: &AuxHandles,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }

        let transform = workflow.transform;
        let next = match (&event.target, event.button) {
            (PointerTarget::Background, PointerButton::Middle) => InteractionState::PanningCanvas {
                anchor: event.client - transform.translation(),
            },
            (PointerTarget::Background, PointerButton::Primary) if event.modifiers.shift => {
                InteractionState::PanningCanvas {
                    anchor: event.client - transform.translation(),
                }
            }
            (PointerTarget::NodeBody(node_id), PointerButton::Primary) => {
                let Some(rect) = rect else {
                    tracing::debug!("Canvas not measurable, ignoring press on '{}'", node_id);
                    return false;
                };
                let Some(node) = workflow.node(node_id) else {
                    return false;
                };
                let pointer = transform.screen_to_canvas(rect.local(event.client));
                InteractionState::DraggingNode {
                    node_id: node_id.clone(),
                    offset: pointer - node.position,
                }
            }
            (PointerTarget::AuxiliaryHandle(node_id), PointerButton::Primary) => {
                let Some(rect) = rect else {
                    return false;
                };
                if !workflow.contains(node_id) {
                    return false;
                }
                let pointer = transform.screen_to_canvas(rect.local(event.client));
                InteractionState::DraggingAuxiliaryHandle {
                    node_id: node_id.clone(),
                    offset: pointer - handles.position(node_id),
                }
            }
            _ => return false,
        };

        tracing::debug!("Interaction: {:?}", next);
        self.state = next;
        true
    }

    /// Apply a pointer move to whatever is being dragged
    pub fn pointer_move(
        &mut self,
        client: Point,
        rect: Option<CanvasRect>,
        workflow: &mut Workflow,
        handles: &mut AuxHandles,
    ) -> Outcome {
        match &self.state {
            InteractionState::Idle => Outcome::Unchanged,
            InteractionState::PanningCanvas { anchor } => {
                let translation = client - *anchor;
                workflow.transform.x = translation.x;
                workflow.transform.y = translation.y;
                Outcome::ViewChanged
            }
            InteractionState::DraggingNode { node_id, offset } => {
                let Some(rect) = rect else {
                    return Outcome::Unchanged;
                };
                let pointer = workflow.transform.screen_to_canvas(rect.local(client));
                if workflow.move_node(node_id, pointer - *offset) {
                    Outcome::NodeMoved(node_id.clone())
                } else {
                    // Node was deleted mid-drag
                    Outcome::Unchanged
                }
            }
            InteractionState::DraggingAuxiliaryHandle { node_id, offset } => {
                let Some(rect) = rect else {
                    return Outcome::Unchanged;
                };
                if !workflow.contains(node_id) {
                    return Outcome::Unchanged;
                }
                let pointer = workflow.transform.screen_to_canvas(rect.local(client));
                handles.set(node_id, pointer - *offset);
                Outcome::HandleMoved(node_id.clone())
            }
        }
    }

    /// Button-up or pointer-leave: end any drag
    pub fn release(&mut self) -> InteractionState {
        std::mem::take(&mut self.state)
    }

    /// Wheel zoom about the cursor. Allowed in any state.
    pub fn wheel(
        &self,
        delta_y: f64,
        client: Point,
        rect: Option<CanvasRect>,
        sensitivity: f64,
        workflow: &mut Workflow,
    ) -> Outcome {
        let Some(rect) = rect else {
            return Outcome::Unchanged;
        };
        let before = workflow.transform;
        workflow.transform = before.zoom(-delta_y * sensitivity, rect.local(client));
        if workflow.transform == before {
            Outcome::Unchanged
        } else {
            Outcome::ViewChanged
        }
    }
}
