// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Launch Wizard
//!
//! Deploy-new-token and register-existing-token wizards.
//!
//! ```text
//! fields ──┐
//!          ├─> machine (pure transitions) ──> view (pure rendering)
//! funds ───┘          ▲
//!                     │ events
//!               session (gas estimates, readings, submission, liveness)
//! ```

pub mod affordability;
pub mod fields;
pub mod machine;
pub mod session;
pub mod view;

pub use affordability::{Affordability, Funds};
pub use fields::{
    accepts_decimals_input, accepts_supply_input, FieldError, FieldErrors, InputRejected,
    TokenField, TokenFields, DEFAULT_DECIMALS, MAX_DECIMALS,
};
pub use machine::{
    ChainId, EstimateTicket, Flow, FlowKind, Outcome, Step, WizardError, WizardEvent, WizardState,
};
pub use session::{
    EstimateHandle, SessionView, Toggle, WizardContext, WizardSession, DEFAULT_ESTIMATE_TIMEOUT,
};
pub use view::{
    render, DestinationRow, FundsStatus, ReviewSummary, StepIndicator, StepStatus, WizardView,
};
