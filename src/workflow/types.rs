/// Core workflow type definitions
///
/// Defines workflows, nodes and their per-kind payloads. These types are the
/// JSON record persisted by the storage layer: `{id, title, nodes, transform}`.

use crate::services::pyth::ETH_USD_FEED_ID;
use crate::viewport::Transform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{Add, Sub};

/// Title given to freshly created workflows
pub const DEFAULT_WORKFLOW_TITLE: &str = "My workflow";

/// A 2D point in canvas space (or screen space, depending on the caller)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A complete workflow as edited on the canvas
///
/// Nodes keep insertion order (creation order). The transform is persisted so
/// reopening the workflow restores the last view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow identifier (e.g., "wf-2f0c...")
    pub id: String,
    /// User-editable display title
    pub title: String,
    /// Nodes in creation order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Last known viewport
    #[serde(default)]
    pub transform: Transform,
}

impl Workflow {
    /// Fresh, empty workflow with a newly generated id and identity transform
    pub fn new() -> Self {
        Self {
            id: format!("wf-{}", uuid::Uuid::new_v4()),
            title: DEFAULT_WORKFLOW_TITLE.to_string(),
            nodes: Vec::new(),
            transform: Transform::IDENTITY,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

/// A single node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Opaque unique identifier, never reused
    pub id: String,
    /// Display label, not necessarily unique
    pub name: String,
    /// Canvas-space position
    pub position: Point,
    /// Node whose output feeds this one; `None` marks a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Kind-specific payload; its tag is the node's type
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Trigger,
    AiAgent,
    Conditional,
    BlockchainAction,
    Oracle,
    GenericAction,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::AiAgent => "ai-agent",
            NodeKind::Conditional => "conditional",
            NodeKind::BlockchainAction => "blockchain-action",
            NodeKind::Oracle => "oracle",
            NodeKind::GenericAction => "generic-action",
        }
    }

    /// Label used when the caller does not name a node
    pub fn default_name(&self) -> &'static str {
        match self {
            NodeKind::Trigger => "Trigger",
            NodeKind::AiAgent => "AI Agent",
            NodeKind::Conditional => "If / Else",
            NodeKind::BlockchainAction => "Base Action",
            NodeKind::Oracle => "Pyth Price Feed",
            NodeKind::GenericAction => "Action",
        }
    }

    /// Kinds that open a configuration panel on double click
    pub fn is_configurable(&self) -> bool {
        matches!(self, NodeKind::AiAgent | NodeKind::Conditional)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific node payload
///
/// Serialized with an internal `type` tag, so every variant's fields are known
/// statically while the JSON stays a flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeData {
    Trigger(TriggerData),
    AiAgent(AiAgentData),
    Conditional(ConditionalData),
    BlockchainAction(BlockchainActionData),
    Oracle(OracleData),
    GenericAction(GenericActionData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Trigger(_) => NodeKind::Trigger,
            NodeData::AiAgent(_) => NodeKind::AiAgent,
            NodeData::Conditional(_) => NodeKind::Conditional,
            NodeData::BlockchainAction(_) => NodeKind::BlockchainAction,
            NodeData::Oracle(_) => NodeKind::Oracle,
            NodeData::GenericAction(_) => NodeKind::GenericAction,
        }
    }

    /// Empty payload for a kind, as created from the node picker
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Trigger => NodeData::Trigger(TriggerData::default()),
            NodeKind::AiAgent => NodeData::AiAgent(AiAgentData::default()),
            NodeKind::Conditional => NodeData::Conditional(ConditionalData::default()),
            NodeKind::BlockchainAction => {
                NodeData::BlockchainAction(BlockchainActionData::default())
            }
            NodeKind::Oracle => NodeData::Oracle(OracleData {
                price_feed_id: Some(ETH_USD_FEED_ID.to_string()),
                symbol: Some("ETH/USD".to_string()),
            }),
            NodeKind::GenericAction => NodeData::GenericAction(GenericActionData::default()),
        }
    }
}

/// Trigger payload (Telegram bot trigger is the one source wired today)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerData {
    /// Event source, e.g. "telegram"
    pub source: Option<String>,
    /// Event that fires the trigger, e.g. "on-message"
    pub trigger_type: Option<String>,
    /// Verified bot token
    pub bot_token: Option<String>,
    /// Bot the token belongs to
    pub bot: Option<BotInfo>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Bot metadata returned by credential verification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotInfo {
    /// Numeric bot user id
    pub id: i64,
    /// Handle without the leading '@'
    pub username: Option<String>,
    /// First name shown in chats
    pub display_name: String,
}

/// AI agent payload, edited in the agent config panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiAgentData {
    /// Model provider (default: "groq")
    pub chat_model: String,
    /// Conversation memory backend (default: "none")
    pub memory: String,
    /// Free-form note shown on the node
    pub remark: String,
    /// System prompt sent with every request
    pub prompt: String,
    /// Ask the model for structured output
    pub output_format: bool,
    /// Continue with a fallback reply when the model call fails
    pub fallback_mode: bool,
}

impl Default for AiAgentData {
    fn default() -> Self {
        Self {
            chat_model: "groq".to_string(),
            memory: "none".to_string(),
            remark: String::new(),
            prompt: String::new(),
            output_format: false,
            fallback_mode: false,
        }
    }
}

/// If/else payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionalData {
    /// Conditions evaluated in order
    pub conditions: Vec<Condition>,
    /// Coerce operands to a common type before comparing
    pub convert_types: bool,
}

/// One branch condition of an if/else node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    /// Left operand, usually a reference into the incoming data
    pub expression: String,
    /// Comparison, e.g. "equals" or "greater-than"
    pub operator: String,
    /// Right operand
    pub value: String,
}

/// Contract call parameters carried for an external chain client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockchainActionData {
    /// Contract call to make
    pub action: Option<ChainActionKind>,
    /// Token contract, hex encoded
    pub contract_address: Option<String>,
    /// EVM chain id (e.g. 84532 for Base Sepolia)
    pub chain_id: Option<u64>,
    /// Call arguments such as `to`, `amount`, `owner`, `dstEid`
    pub params: Map<String, Value>,
}

/// Supported OFT token calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainActionKind {
    BalanceOf,
    TotalSupply,
    Mint,
    Send,
    QuoteSend,
}

/// Price oracle payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OracleData {
    /// Pyth feed id, hex encoded
    pub price_feed_id: Option<String>,
    /// Display pair, e.g. "ETH/USD"
    pub symbol: Option<String>,
}

/// Payload of actions without a dedicated editor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericActionData {
    /// Action identifier picked in the node picker
    pub action: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}
