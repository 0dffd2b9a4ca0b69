// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network registry and price endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{blockchain::NetworkInfo, feeds::Reading, format::format_usd, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct NetworkListResponse {
    pub networks: Vec<NetworkInfo>,
    pub total: usize,
}

/// Current ETH/USD reading.
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceResponse {
    /// "ready", "loading" or "unavailable"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl From<Reading<f64>> for PriceResponse {
    fn from(reading: Reading<f64>) -> Self {
        let status = match reading {
            Reading::Loading => "loading",
            Reading::Ready(_) => "ready",
            Reading::Unavailable => "unavailable",
        };
        let usd = reading.value().copied();
        Self {
            status: status.to_string(),
            usd,
            formatted: usd.map(format_usd),
        }
    }
}

/// List the supported networks.
#[utoipa::path(
    get,
    path = "/v1/networks",
    tag = "Networks",
    responses(
        (status = 200, description = "Supported networks", body = NetworkListResponse)
    )
)]
pub async fn list_networks(State(state): State<AppState>) -> Json<NetworkListResponse> {
    let networks: Vec<NetworkInfo> = state.registry.all().iter().map(NetworkInfo::from).collect();
    Json(NetworkListResponse {
        total: networks.len(),
        networks,
    })
}

/// Latest native-asset USD price.
#[utoipa::path(
    get,
    path = "/v1/price",
    tag = "Networks",
    responses(
        (status = 200, description = "Price reading", body = PriceResponse)
    )
)]
pub async fn get_price(State(state): State<AppState>) -> Json<PriceResponse> {
    let reading = *state.price.borrow();
    Json(PriceResponse::from(reading))
}
