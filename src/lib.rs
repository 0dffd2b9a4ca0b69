// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Interchain Launchpad - Multi-chain Token Deployment Wizard Service
//!
//! Hosts the deploy-new-token and register-existing-token wizards: token
//! details entry, destination network selection with per-destination gas
//! estimates, and a review step gated on the wallet's native balance.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Network registry, EVM RPC access, gas estimation
//! - `feeds` - Price and balance pollers
//! - `wizard` - Wizard state machine, rendering and sessions
//! - `intents` - Submission handling

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod feeds;
pub mod format;
pub mod intents;
pub mod notify;
pub mod state;
pub mod store;
pub mod wizard;
