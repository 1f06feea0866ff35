/// Canvas editor layer
///
/// Turns pointer, wheel and keyboard input into graph and viewport changes and
/// keeps the single open-panel state and toast notices alongside the workflow.

// Pointer/keyboard state machine
pub mod interaction;

// Open panel or modal, one at a time
pub mod panel;

// Transient toast notifications
pub mod notice;

// Session tying workflow, input, panels and autosave together
pub mod session;

pub use interaction::{CanvasRect, InteractionController, InteractionState, KeyCommand, KeyPress, PointerDown};
pub use panel::Panel;
pub use session::{EditorSession, OpenOutcome};
