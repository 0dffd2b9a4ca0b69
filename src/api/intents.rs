// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recorded deployment intents.

use alloy::primitives::U256;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    blockchain::parse_address,
    error::ApiError,
    format::{format_eth_amount, shorten_hash},
    intents::DeploymentIntent,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct IntentQuery {
    /// Only intents submitted by this wallet address
    pub wallet: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntentSummary {
    #[serde(flatten)]
    pub intent: DeploymentIntent,
    /// Wallet address shortened for display
    pub wallet_short: String,
    /// Total estimated gas, e.g. "0.0000031 ETH"
    pub total_cost: String,
}

impl From<DeploymentIntent> for IntentSummary {
    fn from(intent: DeploymentIntent) -> Self {
        let total_wei: U256 = intent.submission.total_cost_wei.parse().unwrap_or_default();
        Self {
            wallet_short: shorten_hash(&intent.wallet, 4),
            total_cost: format_eth_amount(total_wei),
            intent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntentListResponse {
    pub intents: Vec<IntentSummary>,
    pub total: usize,
}

/// List recorded deployment intents, newest first.
#[utoipa::path(
    get,
    path = "/v1/intents",
    tag = "Intents",
    params(IntentQuery),
    responses(
        (status = 200, description = "Recorded intents", body = IntentListResponse),
        (status = 400, description = "Invalid wallet address")
    )
)]
pub async fn list_intents(
    State(state): State<AppState>,
    Query(query): Query<IntentQuery>,
) -> Result<Json<IntentListResponse>, ApiError> {
    let intents = match query.wallet.as_deref() {
        Some(raw) => {
            let wallet = parse_address(raw).map_err(|e| ApiError::bad_request(e.to_string()))?;
            state.intents.list_for_wallet(&wallet).await
        }
        None => state.intents.list().await,
    };

    let intents: Vec<IntentSummary> = intents.into_iter().map(IntentSummary::from).collect();
    Ok(Json(IntentListResponse {
        total: intents.len(),
        intents,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::Submission;
    use crate::wizard::FlowKind;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn summary_keeps_testnet_gas_visible() {
        let intent = DeploymentIntent {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            wallet: "0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63".to_string(),
            submission: Submission {
                flow: FlowKind::Register,
                source_chain_id: 11_155_111,
                source_network: "Sepolia".to_string(),
                token: None,
                token_address: Some("0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63".to_string()),
                destinations: Vec::new(),
                total_cost_wei: "3100000000000".to_string(),
            },
        };

        let summary = IntentSummary::from(intent);
        assert_eq!(summary.total_cost, "0.00000310 ETH");
        assert_eq!(summary.wallet_short, "0x7656...1A63");
    }
}
