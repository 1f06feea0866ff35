/// Which side panel or modal is open
///
/// Exactly one state at a time, each carrying the data that panel works on,
/// so "config panel open with no node selected" cannot be represented.

use crate::workflow::types::BotInfo;

/// Panel state of the editor
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Panel {
    /// Nothing open; the canvas has focus
    #[default]
    Closed,
    /// Choosing what kind of trigger starts the workflow
    TriggerPicker,
    /// Entering a bot token for the chosen trigger event
    CredentialEntry { trigger_type: String },
    /// Token verified; reviewing the trigger before adding it
    TriggerConfig {
        trigger_type: String,
        bot_token: String,
        bot: BotInfo,
    },
    /// Choosing a node to add, optionally as a child of `parent_id`
    NodePicker { parent_id: Option<String> },
    /// Editing the payload of an existing node
    NodeConfig { node_id: String },
}

impl Panel {
    /// True for every state except `Closed`
    pub fn is_open(&self) -> bool {
        !matches!(self, Panel::Closed)
    }

    /// Node being configured, if this is a config panel
    pub fn config_target(&self) -> Option<&str> {
        match self {
            Panel::NodeConfig { node_id } => Some(node_id),
            _ => None,
        }
    }
}
