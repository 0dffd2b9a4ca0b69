// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wizard Session
//!
//! Runs a [`WizardState`] against its collaborators: gas estimation, the
//! balance and price readings, and the submission handler.
//!
//! ## Liveness
//!
//! Each session owns a `CancellationToken`. Closing the session (explicitly,
//! by opening another wizard for the same wallet, or by a successful submit)
//! cancels it; estimate tasks still in flight then abandon their result
//! instead of applying it to a discarded session, and the session's balance
//! poller stops. Sessions nobody touches are closed the same way once they
//! have been idle for the store's TTL.

use std::fmt;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::affordability::Funds;
use super::fields::TokenField;
use super::machine::{ChainId, EstimateTicket, Flow, Outcome, WizardError, WizardEvent, WizardState};
use super::view::{render, WizardView};
use crate::blockchain::{
    gas_service_chain_name, EstimateLeg, GasEstimateError, GasEstimator, NetworkConfig,
    NetworkError, NetworkRegistry, TokenMetadata,
};
use crate::feeds::Reading;
use crate::format::{format_eth_value, wei_to_eth};
use crate::intents::{DeploymentIntent, SubmissionHandler};
use crate::notify::{Notification, NotificationQueue};

/// Default upper bound on one gas-estimate call.
pub const DEFAULT_ESTIMATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborators a session runs against, passed in explicitly.
#[derive(Clone)]
pub struct WizardContext {
    pub registry: NetworkRegistry,
    pub gas: Arc<dyn GasEstimator>,
    pub submissions: Arc<dyn SubmissionHandler>,
    pub price: watch::Receiver<Reading<f64>>,
    pub balance: watch::Receiver<Reading<U256>>,
    pub estimate_timeout: Duration,
}

struct SessionInner {
    state: WizardState,
    notifications: NotificationQueue,
    /// Set while the submission handler runs with the lock released.
    submitting: bool,
}

/// One open wizard.
pub struct WizardSession {
    id: Uuid,
    wallet: Address,
    opened_at: DateTime<Utc>,
    token: Option<TokenMetadata>,
    ctx: WizardContext,
    inner: Mutex<SessionInner>,
    alive: CancellationToken,
    last_active: StdMutex<Instant>,
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("id", &self.id)
            .field("wallet", &self.wallet)
            .field("opened_at", &self.opened_at)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

/// Result of a destination toggle.
#[derive(Debug)]
pub enum Toggle {
    Deselected,
    /// The destination was selected and is being priced in the background.
    Estimating(EstimateHandle),
}

/// Background gas estimate for one destination.
#[derive(Debug)]
pub struct EstimateHandle(JoinHandle<()>);

impl EstimateHandle {
    /// Wait until the estimate has been applied or discarded.
    pub async fn settled(self) {
        if let Err(e) = self.0.await {
            warn!(error = %e, "Gas estimate task did not complete");
        }
    }
}

/// Session view returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub id: Uuid,
    pub wallet: String,
    pub opened_at: DateTime<Utc>,
    pub open: bool,
    /// On-chain metadata of the token being registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenMetadata>,
    #[serde(flatten)]
    pub wizard: WizardView,
}

impl WizardSession {
    /// Open a session for `wallet` on the network `source_chain_id`.
    pub fn open(
        flow: Flow,
        source_chain_id: ChainId,
        wallet: Address,
        token: Option<TokenMetadata>,
        ctx: WizardContext,
    ) -> Result<Arc<Self>, WizardError> {
        let source = *ctx.registry.require(source_chain_id)?;
        let state = WizardState::open(flow, source, &ctx.registry);

        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            wallet,
            opened_at: Utc::now(),
            token,
            ctx,
            inner: Mutex::new(SessionInner {
                state,
                notifications: NotificationQueue::default(),
                submitting: false,
            }),
            alive: CancellationToken::new(),
            last_active: StdMutex::new(Instant::now()),
        });

        info!(
            session_id = %session.id,
            wallet = %wallet,
            flow = ?flow.kind(),
            source = %source.name,
            "Wizard session opened"
        );

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    pub fn is_open(&self) -> bool {
        !self.alive.is_cancelled()
    }

    /// Token cancelled when the session closes; tie per-session tasks to it.
    pub fn liveness(&self) -> CancellationToken {
        self.alive.clone()
    }

    /// Record client activity, pushing back idle expiry.
    pub fn touch(&self) {
        if let Ok(mut last_active) = self.last_active.lock() {
            *last_active = Instant::now();
        }
    }

    /// Time since the last [`touch`](Self::touch) or since opening.
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .map(|last_active| last_active.elapsed())
            .unwrap_or_default()
    }

    /// Discard the session. Idempotent.
    pub fn close(&self) {
        if !self.alive.is_cancelled() {
            self.alive.cancel();
            info!(session_id = %self.id, "Wizard session closed");
        }
    }

    /// Latest balance and price readings.
    pub fn funds(&self) -> Funds {
        Funds::new(*self.ctx.balance.borrow(), *self.ctx.price.borrow())
    }

    pub async fn view(&self) -> SessionView {
        let funds = self.funds();
        let inner = self.inner.lock().await;
        SessionView {
            id: self.id,
            wallet: self.wallet.to_checksum(None),
            opened_at: self.opened_at,
            open: self.is_open(),
            token: self.token.clone(),
            wizard: render(&inner.state, &funds),
        }
    }

    pub async fn notify(&self, notification: Notification) {
        self.inner.lock().await.notifications.push(notification);
    }

    pub async fn drain_notifications(&self) -> Vec<Notification> {
        self.inner.lock().await.notifications.drain()
    }

    pub async fn edit_field(&self, field: TokenField, value: String) -> Result<(), WizardError> {
        self.apply(WizardEvent::EditField { field, value }).await
    }

    pub async fn next(&self) -> Result<(), WizardError> {
        self.apply(WizardEvent::Next).await
    }

    pub async fn back(&self) -> Result<(), WizardError> {
        self.apply(WizardEvent::Back).await
    }

    async fn apply(&self, event: WizardEvent) -> Result<(), WizardError> {
        self.ensure_open()?;
        let funds = self.funds();
        let mut inner = self.inner.lock().await;
        ensure_not_submitting(&inner)?;
        inner.state.apply(event, &funds)?;
        Ok(())
    }

    /// Select or unselect a destination.
    ///
    /// Selecting spawns the gas estimate and returns at once; the session
    /// shows the destination as estimating until the handle settles.
    pub async fn toggle_destination(
        self: &Arc<Self>,
        chain_id: ChainId,
    ) -> Result<Toggle, WizardError> {
        self.ensure_open()?;
        let funds = self.funds();
        let mut inner = self.inner.lock().await;
        ensure_not_submitting(&inner)?;

        let Outcome::EstimateRequested { chain_id, ticket } = inner
            .state
            .apply(WizardEvent::ToggleDestination(chain_id), &funds)?
        else {
            return Ok(Toggle::Deselected);
        };

        let destination = *inner
            .state
            .destination(chain_id)
            .ok_or(NetworkError::UnknownChain(chain_id))?;
        let leg = match self.estimate_leg(inner.state.source(), &destination, inner.state.flow()) {
            Ok(leg) => leg,
            Err(e) => {
                error!(
                    kind = "configuration",
                    session_id = %self.id,
                    chain_id,
                    error = %e,
                    "No gas service mapping for network"
                );
                inner.state.apply(
                    WizardEvent::EstimateFailed {
                        chain_id,
                        ticket,
                        reason: e.to_string(),
                    },
                    &funds,
                )?;
                inner.notifications.push(Notification::error(format!(
                    "Failed to estimate gas for {}",
                    destination.name
                )));
                return Err(e.into());
            }
        };

        debug!(session_id = %self.id, chain_id, "Estimating gas for destination");
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            session.run_estimate(destination, ticket, leg).await;
        });
        Ok(Toggle::Estimating(EstimateHandle(handle)))
    }

    fn estimate_leg(
        &self,
        source: &NetworkConfig,
        destination: &NetworkConfig,
        flow: Flow,
    ) -> Result<EstimateLeg, NetworkError> {
        Ok(EstimateLeg {
            source_chain: gas_service_chain_name(source.name)?,
            destination_chain: gas_service_chain_name(destination.name)?,
            token_address: flow.token_address(),
        })
    }

    async fn run_estimate(&self, destination: NetworkConfig, ticket: EstimateTicket, leg: EstimateLeg) {
        let timeout = self.ctx.estimate_timeout;
        let result = tokio::select! {
            result = tokio::time::timeout(timeout, self.ctx.gas.estimate(&leg)) => {
                result.unwrap_or(Err(GasEstimateError::Timeout(timeout)))
            }
            _ = self.alive.cancelled() => {
                debug!(session_id = %self.id, chain_id = destination.id, "Session closed, abandoning gas estimate");
                return;
            }
        };

        let funds = self.funds();
        let mut inner = self.inner.lock().await;
        if !self.is_open() {
            return;
        }

        let event = match &result {
            Ok(wei) => WizardEvent::EstimateSucceeded {
                chain_id: destination.id,
                ticket,
                wei: *wei,
            },
            Err(e) => WizardEvent::EstimateFailed {
                chain_id: destination.id,
                ticket,
                reason: e.to_string(),
            },
        };

        match inner.state.apply(event, &funds) {
            Ok(Outcome::EstimateStored { wei, .. }) => {
                let eth = format_eth_value(wei_to_eth(wei));
                info!(
                    session_id = %self.id,
                    destination = %destination.name,
                    estimate_wei = %wei,
                    "Gas estimate stored"
                );
                inner.notifications.push(Notification::success(format!(
                    "Estimated gas for {}: {eth} ETH",
                    destination.name
                )));
            }
            Ok(Outcome::SelectionRolledBack { reason, .. }) => {
                warn!(
                    session_id = %self.id,
                    destination = %destination.name,
                    error = %reason,
                    "Gas estimate failed, destination unselected"
                );
                inner.notifications.push(Notification::error(format!(
                    "Failed to estimate gas for {}",
                    destination.name
                )));
            }
            Ok(_) => {
                debug!(
                    session_id = %self.id,
                    destination = %destination.name,
                    "Discarded stale gas estimate"
                );
            }
            Err(e) => warn!(session_id = %self.id, error = %e, "Could not apply gas estimate"),
        }
    }

    /// Submit the reviewed wizard.
    ///
    /// Affordability is checked again against the readings at submit time.
    /// The handler runs without holding the session lock; edits and other
    /// submits are refused until it answers. On success the session closes.
    pub async fn submit(&self) -> Result<DeploymentIntent, WizardError> {
        self.ensure_open()?;
        let funds = self.funds();
        let submission = {
            let mut inner = self.inner.lock().await;
            ensure_not_submitting(&inner)?;
            inner.state.can_submit(&funds)?;
            inner.submitting = true;
            inner.state.submission()
        };

        let result = self.ctx.submissions.submit(self.wallet, submission).await;

        let mut inner = self.inner.lock().await;
        inner.submitting = false;
        match result {
            Ok(intent) => {
                info!(
                    session_id = %self.id,
                    intent_id = %intent.id,
                    "Wizard submitted"
                );
                if !self.is_open() {
                    debug!(session_id = %self.id, "Session closed while submitting");
                    return Ok(intent);
                }
                inner
                    .notifications
                    .push(Notification::success("Submission received"));
                drop(inner);
                self.close();
                Ok(intent)
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Submission failed");
                inner
                    .notifications
                    .push(Notification::error(format!("Submission failed: {e}")));
                Err(e.into())
            }
        }
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(WizardError::Closed)
        }
    }
}

fn ensure_not_submitting(inner: &SessionInner) -> Result<(), WizardError> {
    if inner.submitting {
        Err(WizardError::SubmissionInFlight)
    } else {
        Ok(())
    }
}
