// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wizard session endpoints.
//!
//! Every response that carries the session view also drains the session's
//! pending notifications, so a client polling `GET /v1/wizards/{id}` sees
//! each notification exactly once.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    blockchain::parse_address,
    error::ApiError,
    intents::DeploymentIntent,
    notify::Notification,
    state::AppState,
    wizard::{Flow, FlowKind, SessionView, TokenField, WizardSession},
};

/// Request to open a wizard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenWizardRequest {
    pub flow: FlowKind,
    /// Network the wizard runs on
    pub source_chain_id: u64,
    /// Connected wallet address
    pub wallet_address: String,
    /// Existing token contract, required for the register flow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
}

/// Request to edit one token field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditFieldRequest {
    pub field: TokenField,
    pub value: String,
}

/// Session view plus the notifications raised since the last response.
#[derive(Debug, Serialize, ToSchema)]
pub struct WizardResponse {
    pub session: SessionView,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub intent: DeploymentIntent,
    pub notifications: Vec<Notification>,
}

async fn respond(session: &WizardSession) -> Json<WizardResponse> {
    let view = session.view().await;
    let notifications = session.drain_notifications().await;
    Json(WizardResponse {
        session: view,
        notifications,
    })
}

async fn find_session(
    state: &AppState,
    session_id: Uuid,
) -> Result<Arc<WizardSession>, ApiError> {
    state.sessions.read().await.get(&session_id)
}

/// Open a deploy or register wizard for a wallet.
///
/// Opening a wizard closes any wizard the same wallet still has open.
#[utoipa::path(
    post,
    path = "/v1/wizards",
    tag = "Wizards",
    request_body = OpenWizardRequest,
    responses(
        (status = 201, description = "Wizard opened", body = WizardResponse),
        (status = 400, description = "Invalid address or unknown network")
    )
)]
pub async fn open_wizard(
    State(state): State<AppState>,
    Json(request): Json<OpenWizardRequest>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let wallet =
        parse_address(&request.wallet_address).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let flow = match (request.flow, request.token_address.as_deref()) {
        (FlowKind::Deploy, _) => Flow::Deploy,
        (FlowKind::Register, Some(raw)) => Flow::Register {
            token_address: parse_address(raw).map_err(|e| ApiError::bad_request(e.to_string()))?,
        },
        (FlowKind::Register, None) => {
            return Err(ApiError::bad_request(
                "token_address is required to register a token",
            ))
        }
    };

    let session = state
        .open_wizard(flow, request.source_chain_id, wallet)
        .await?;

    Ok((StatusCode::CREATED, respond(&session).await))
}

/// Get a wizard's current view.
#[utoipa::path(
    get,
    path = "/v1/wizards/{session_id}",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    responses(
        (status = 200, description = "Wizard view", body = WizardResponse),
        (status = 404, description = "Wizard not found or closed")
    )
)]
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    Ok(respond(&session).await)
}

/// Close a wizard, discarding any estimate still in flight.
#[utoipa::path(
    delete,
    path = "/v1/wizards/{session_id}",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    responses(
        (status = 204, description = "Wizard closed"),
        (status = 404, description = "Wizard not found")
    )
)]
pub async fn close_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.write().await.remove(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Edit one token field.
///
/// Input the field's filter refuses is rejected with 422 and leaves the
/// field unchanged.
#[utoipa::path(
    put,
    path = "/v1/wizards/{session_id}/fields",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    request_body = EditFieldRequest,
    responses(
        (status = 200, description = "Field updated", body = WizardResponse),
        (status = 404, description = "Wizard not found"),
        (status = 422, description = "Input rejected or wrong step")
    )
)]
pub async fn edit_field(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<EditFieldRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    session.edit_field(request.field, request.value).await?;
    Ok(respond(&session).await)
}

/// Select or unselect a destination network.
///
/// Selecting starts a gas estimate in the background; the returned view
/// shows the destination as estimating until it resolves.
#[utoipa::path(
    post,
    path = "/v1/wizards/{session_id}/destinations/{chain_id}",
    tag = "Wizards",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session ID"),
        ("chain_id" = u64, Path, description = "Destination chain ID")
    ),
    responses(
        (status = 200, description = "Selection updated", body = WizardResponse),
        (status = 400, description = "Unknown or source network"),
        (status = 404, description = "Wizard not found"),
        (status = 409, description = "Another estimate is in progress"),
        (status = 500, description = "Network has no gas service mapping")
    )
)]
pub async fn toggle_destination(
    State(state): State<AppState>,
    Path((session_id, chain_id)): Path<(Uuid, u64)>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    session.toggle_destination(chain_id).await?;
    Ok(respond(&session).await)
}

/// Advance to the next step.
#[utoipa::path(
    post,
    path = "/v1/wizards/{session_id}/next",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    responses(
        (status = 200, description = "Moved forward", body = WizardResponse),
        (status = 404, description = "Wizard not found"),
        (status = 409, description = "A gas estimate is in progress"),
        (status = 422, description = "Step requirements not met")
    )
)]
pub async fn next_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    session.next().await?;
    Ok(respond(&session).await)
}

/// Go back one step, keeping everything entered so far.
#[utoipa::path(
    post,
    path = "/v1/wizards/{session_id}/back",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    responses(
        (status = 200, description = "Moved back", body = WizardResponse),
        (status = 404, description = "Wizard not found"),
        (status = 422, description = "Already at the first step")
    )
)]
pub async fn previous_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    session.back().await?;
    Ok(respond(&session).await)
}

/// Submit the reviewed wizard. The wizard closes on success.
#[utoipa::path(
    post,
    path = "/v1/wizards/{session_id}/submit",
    tag = "Wizards",
    params(("session_id" = Uuid, Path, description = "Wizard session ID")),
    responses(
        (status = 201, description = "Submission recorded", body = SubmitResponse),
        (status = 404, description = "Wizard not found"),
        (status = 422, description = "Not at review or balance insufficient"),
        (status = 502, description = "Submission failed")
    )
)]
pub async fn submit_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let session = find_session(&state, session_id).await?;
    let intent = session.submit().await?;
    let notifications = session.drain_notifications().await;
    state.sessions.write().await.prune_closed();

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            intent,
            notifications,
        }),
    ))
}
