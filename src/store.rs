// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory registry of open wizard sessions.
//!
//! A wallet has at most one open wizard: opening another closes the previous
//! one, which cancels its balance poller and any estimate still in flight.
//! Sessions no client has touched for the idle TTL are closed by
//! [`SessionSweeper`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::wizard::WizardSession;

/// Default time a session may go untouched before it is closed.
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(15 * 60);

pub struct SessionStore {
    sessions: HashMap<Uuid, Arc<WizardSession>>,
    by_wallet: HashMap<Address, Uuid>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            by_wallet: HashMap::new(),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Track a newly opened session, closing the wallet's previous one.
    pub fn insert(&mut self, session: Arc<WizardSession>) {
        if let Some(previous) = self.by_wallet.insert(session.wallet(), session.id()) {
            if let Some(old) = self.sessions.remove(&previous) {
                old.close();
            }
        }
        self.sessions.insert(session.id(), session);
    }

    /// Look up an open session and mark it active.
    pub fn get(&self, session_id: &Uuid) -> Result<Arc<WizardSession>, ApiError> {
        let session = self
            .sessions
            .get(session_id)
            .filter(|session| session.is_open())
            .ok_or_else(|| ApiError::not_found("Wizard session not found"))?;
        session.touch();
        Ok(session.clone())
    }

    /// Close and forget a session.
    pub fn remove(&mut self, session_id: &Uuid) -> Result<(), ApiError> {
        let session = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| ApiError::not_found("Wizard session not found"))?;
        if self.by_wallet.get(&session.wallet()) == Some(session_id) {
            self.by_wallet.remove(&session.wallet());
        }
        session.close();
        Ok(())
    }

    /// Forget sessions that closed themselves (e.g. after a submit).
    pub fn prune_closed(&mut self) -> usize {
        let closed: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|(_, session)| !session.is_open())
            .map(|(id, _)| *id)
            .collect();
        for id in &closed {
            if let Some(session) = self.sessions.remove(id) {
                if self.by_wallet.get(&session.wallet()) == Some(id) {
                    self.by_wallet.remove(&session.wallet());
                }
            }
        }
        closed.len()
    }

    /// Close sessions idle for longer than the TTL and forget every closed
    /// session. Returns how many were closed for inactivity.
    pub fn sweep_idle(&mut self) -> usize {
        let mut expired = 0;
        for session in self.sessions.values() {
            if session.is_open() && session.idle_for() >= self.idle_ttl {
                debug!(session_id = %session.id(), "Closing idle wizard session");
                session.close();
                expired += 1;
            }
        }
        self.prune_closed();
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session, e.g. at shutdown.
    pub fn close_all(&mut self) {
        for session in self.sessions.values() {
            session.close();
        }
        self.sessions.clear();
        self.by_wallet.clear();
    }
}

/// Background task closing idle sessions at a fixed interval.
pub struct SessionSweeper {
    sessions: Arc<RwLock<SessionStore>>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<RwLock<SessionStore>>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => break,
            }

            let mut sessions = self.sessions.write().await;
            let expired = sessions.sweep_idle();
            if expired > 0 {
                info!(expired, open = sessions.len(), "Closed idle wizard sessions");
            }
        }

        debug!("Session sweeper shutting down");
    }
}
