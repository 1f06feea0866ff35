/// Contract calls carried by blockchain-action nodes
///
/// The editor only stores what an external chain client needs to execute an
/// action against an OFT-style token (ERC-20 reads, mint, LayerZero send with a
/// fee quote). `ChainRequest::from_node_data` checks that a node's payload is
/// complete before anything is handed over.

use crate::services::ServiceError;
use crate::workflow::types::{BlockchainActionData, ChainActionKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fully specified contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ChainRequest {
    BalanceOf { target: Target, owner: String },
    TotalSupply { target: Target },
    Mint { target: Target, to: String, amount: u128 },
    QuoteSend { target: Target, params: SendParams },
    Send { target: Target, params: SendParams },
}

/// Contract address on a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub chain_id: u64,
    pub contract_address: String,
}

/// Cross-chain transfer parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendParams {
    /// LayerZero endpoint id of the destination chain
    pub dst_eid: u32,
    pub to: String,
    pub amount: u128,
}

/// Messaging fee returned by a send quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub native_fee: u128,
    pub lz_token_fee: u128,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn balance_of(&self, target: &Target, owner: &str) -> Result<u128, ServiceError>;
    async fn total_supply(&self, target: &Target) -> Result<u128, ServiceError>;
    /// Returns the transaction hash
    async fn mint(&self, target: &Target, to: &str, amount: u128) -> Result<String, ServiceError>;
    async fn quote_send(&self, target: &Target, params: &SendParams) -> Result<Fee, ServiceError>;
    /// Returns the transaction hash
    async fn send(&self, target: &Target, params: &SendParams, fee: Fee) -> Result<String, ServiceError>;
}

fn param_str(data: &BlockchainActionData, key: &str) -> Result<String, ServiceError> {
    data.params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::rejected(format!("missing parameter '{}'", key)))
}

/// Amounts are decimal strings of base units, or plain JSON integers
fn param_amount(data: &BlockchainActionData) -> Result<u128, ServiceError> {
    match data.params.get("amount") {
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ServiceError::rejected(format!("invalid amount '{}'", s))),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ServiceError::rejected(format!("invalid amount {}", n))),
        _ => Err(ServiceError::rejected("missing parameter 'amount'")),
    }
}

fn param_eid(data: &BlockchainActionData) -> Result<u32, ServiceError> {
    data.params
        .get("dstEid")
        .and_then(Value::as_u64)
        .and_then(|eid| u32::try_from(eid).ok())
        .ok_or_else(|| ServiceError::rejected("missing or invalid parameter 'dstEid'"))
}

impl ChainRequest {
    pub fn from_node_data(data: &BlockchainActionData) -> Result<Self, ServiceError> {
        let action = data
            .action
            .ok_or_else(|| ServiceError::rejected("no action selected"))?;
        let target = Target {
            chain_id: data
                .chain_id
                .ok_or_else(|| ServiceError::rejected("no chain selected"))?,
            contract_address: data
                .contract_address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| ServiceError::rejected("no contract address"))?,
        };

        let send_params = || -> Result<SendParams, ServiceError> {
            Ok(SendParams {
                dst_eid: param_eid(data)?,
                to: param_str(data, "to")?,
                amount: param_amount(data)?,
            })
        };

        Ok(match action {
            ChainActionKind::BalanceOf => ChainRequest::BalanceOf {
                target,
                owner: param_str(data, "owner")?,
            },
            ChainActionKind::TotalSupply => ChainRequest::TotalSupply { target },
            ChainActionKind::Mint => ChainRequest::Mint {
                target,
                to: param_str(data, "to")?,
                amount: param_amount(data)?,
            },
            ChainActionKind::QuoteSend => ChainRequest::QuoteSend {
                target,
                params: send_params()?,
            },
            ChainActionKind::Send => ChainRequest::Send {
                target,
                params: send_params()?,
            },
        })
    }

    pub fn target(&self) -> &Target {
        match self {
            ChainRequest::BalanceOf { target, .. }
            | ChainRequest::TotalSupply { target }
            | ChainRequest::Mint { target, .. }
            | ChainRequest::QuoteSend { target, .. }
            | ChainRequest::Send { target, .. } => target,
        }
    }
}
