// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wizard submissions.
//!
//! The wizard performs no chain writes. On submit it hands the final form data
//! to a [`SubmissionHandler`]; the default handler records it as a
//! [`DeploymentIntent`] in memory for a signer or relayer to pick up.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::blockchain::NetworkConfig;
use crate::format::{format_eth_value, wei_to_eth};
use crate::wizard::{FlowKind, TokenFields};

/// Cost of one destination leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DestinationCost {
    pub chain_id: u64,
    pub network: String,
    /// Estimated gas cost in wei (decimal string)
    pub estimate_wei: String,
    /// Estimated gas cost in ETH, display formatted
    pub estimate_eth: String,
}

impl DestinationCost {
    pub fn new(network: &NetworkConfig, wei: U256) -> Self {
        Self {
            chain_id: network.id,
            network: network.name.to_string(),
            estimate_wei: wei.to_string(),
            estimate_eth: format_eth_value(wei_to_eth(wei)),
        }
    }
}

/// Final form data of a wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Submission {
    pub flow: FlowKind,
    pub source_chain_id: u64,
    pub source_network: String,
    /// Token details (deploy flow)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenFields>,
    /// Existing token contract (register flow)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    pub destinations: Vec<DestinationCost>,
    /// Aggregate estimated gas cost in wei (decimal string)
    pub total_cost_wei: String,
}

/// A recorded submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeploymentIntent {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Submitting wallet address
    pub wallet: String,
    pub submission: Submission,
}

/// Receives the form data of a completed wizard.
#[async_trait]
pub trait SubmissionHandler: Send + Sync {
    async fn submit(
        &self,
        wallet: Address,
        submission: Submission,
    ) -> Result<DeploymentIntent, SubmissionError>;
}

/// In-memory record of submitted intents.
#[derive(Default)]
pub struct IntentStore {
    intents: RwLock<Vec<DeploymentIntent>>,
}

impl IntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<DeploymentIntent> {
        let intents = self.intents.read().await;
        intents.iter().rev().cloned().collect()
    }

    pub async fn list_for_wallet(&self, wallet: &Address) -> Vec<DeploymentIntent> {
        let wallet = wallet.to_checksum(None);
        self.list()
            .await
            .into_iter()
            .filter(|intent| intent.wallet == wallet)
            .collect()
    }
}

#[async_trait]
impl SubmissionHandler for IntentStore {
    async fn submit(
        &self,
        wallet: Address,
        submission: Submission,
    ) -> Result<DeploymentIntent, SubmissionError> {
        if submission.flow == FlowKind::Register && submission.destinations.is_empty() {
            return Err(SubmissionError::Rejected(
                "registration needs at least one destination".to_string(),
            ));
        }

        let intent = DeploymentIntent {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            wallet: wallet.to_checksum(None),
            submission,
        };
        self.intents.write().await.push(intent.clone());

        tracing::info!(
            intent_id = %intent.id,
            flow = ?intent.submission.flow,
            destinations = intent.submission.destinations.len(),
            "Recorded deployment intent"
        );

        Ok(intent)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Submission failed: {0}")]
    Failed(String),
}
