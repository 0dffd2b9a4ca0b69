// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wizard State Machine
//!
//! Pure transition function over one wizard session:
//! `WizardState::apply(event, funds) -> Result<Outcome, WizardError>`.
//! A rejected event leaves the state untouched.
//!
//! ## Steps
//!
//! | Flow | Steps |
//! |------|-------|
//! | Deploy new token | Details → NetworkSelection → Review |
//! | Register existing token | NetworkSelection → Review |
//!
//! ## Gas estimates
//!
//! Selecting a destination is optimistic: the chain ID joins the selection at
//! once and an [`Outcome::EstimateRequested`] carrying a fresh
//! [`EstimateTicket`] tells the caller to price the leg. The result comes back
//! as an event with that ticket and is only applied while the ticket is still
//! the pending one for that chain; a destination that was deselected (or
//! deselected and picked again) in the meantime makes the result stale.

use std::collections::BTreeMap;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::affordability::{Affordability, Funds};
use super::fields::{FieldErrors, InputRejected, TokenField, TokenFields};
use crate::blockchain::{NetworkConfig, NetworkError, NetworkRegistry};
use crate::intents::{DestinationCost, Submission, SubmissionError};

pub type ChainId = u64;

/// Which wizard is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Deploy a new token on the source network and any destinations.
    Deploy,
    /// Register an existing token on additional networks.
    Register { token_address: Address },
}

impl Flow {
    pub fn kind(&self) -> FlowKind {
        match self {
            Flow::Deploy => FlowKind::Deploy,
            Flow::Register { .. } => FlowKind::Register,
        }
    }

    pub fn token_address(&self) -> Option<Address> {
        match self {
            Flow::Deploy => None,
            Flow::Register { token_address } => Some(*token_address),
        }
    }

    pub fn steps(&self) -> &'static [Step] {
        match self {
            Flow::Deploy => &[Step::Details, Step::NetworkSelection, Step::Review],
            Flow::Register { .. } => &[Step::NetworkSelection, Step::Review],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Deploy,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Details,
    NetworkSelection,
    Review,
}

impl Step {
    pub fn label(self, flow: FlowKind) -> &'static str {
        match (self, flow) {
            (Step::Details, _) => "Token Details",
            (Step::NetworkSelection, FlowKind::Deploy) => "Register & Deploy",
            (Step::NetworkSelection, FlowKind::Register) => "Select Networks",
            (Step::Review, _) => "Review",
        }
    }
}

/// Identifies one gas-estimate request for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EstimateTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    EditField { field: TokenField, value: String },
    Next,
    Back,
    ToggleDestination(ChainId),
    EstimateSucceeded {
        chain_id: ChainId,
        ticket: EstimateTicket,
        wei: U256,
    },
    EstimateFailed {
        chain_id: ChainId,
        ticket: EstimateTicket,
        reason: String,
    },
}

/// What an accepted event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    StepChanged(Step),
    /// The destination was selected; the caller must price it.
    EstimateRequested {
        chain_id: ChainId,
        ticket: EstimateTicket,
    },
    Deselected {
        chain_id: ChainId,
    },
    EstimateStored {
        chain_id: ChainId,
        wei: U256,
    },
    /// The estimate failed and the destination was unselected again.
    SelectionRolledBack {
        chain_id: ChainId,
        reason: String,
    },
    /// The result belonged to a request that is no longer pending.
    StaleEstimateDiscarded {
        chain_id: ChainId,
    },
}

/// State of one wizard session.
#[derive(Debug, Clone)]
pub struct WizardState {
    flow: Flow,
    source: NetworkConfig,
    destinations: Vec<NetworkConfig>,
    step: Step,
    fields: Option<TokenFields>,
    /// Selected destinations, in selection order.
    selected: Vec<ChainId>,
    estimates: BTreeMap<ChainId, U256>,
    pending: BTreeMap<ChainId, EstimateTicket>,
    next_ticket: u64,
}

impl WizardState {
    /// Start a fresh session on `source`; every other registry network is a
    /// possible destination.
    pub fn open(flow: Flow, source: NetworkConfig, registry: &NetworkRegistry) -> Self {
        let (step, fields) = match flow {
            Flow::Deploy => (Step::Details, Some(TokenFields::default())),
            Flow::Register { .. } => (Step::NetworkSelection, None),
        };

        Self {
            flow,
            source,
            destinations: registry.destinations_for(source.id).copied().collect(),
            step,
            fields,
            selected: Vec::new(),
            estimates: BTreeMap::new(),
            pending: BTreeMap::new(),
            next_ticket: 0,
        }
    }

    pub fn apply(&mut self, event: WizardEvent, funds: &Funds) -> Result<Outcome, WizardError> {
        match event {
            WizardEvent::EditField { field, value } => self.edit_field(field, &value),
            WizardEvent::Next => self.next(funds),
            WizardEvent::Back => self.back(),
            WizardEvent::ToggleDestination(chain_id) => self.toggle(chain_id),
            WizardEvent::EstimateSucceeded {
                chain_id,
                ticket,
                wei,
            } => Ok(self.estimate_succeeded(chain_id, ticket, wei)),
            WizardEvent::EstimateFailed {
                chain_id,
                ticket,
                reason,
            } => Ok(self.estimate_failed(chain_id, ticket, reason)),
        }
    }

    fn edit_field(&mut self, field: TokenField, value: &str) -> Result<Outcome, WizardError> {
        if self.step != Step::Details {
            return Err(WizardError::WrongStep {
                action: "edit token details",
                step: self.step,
            });
        }
        let fields = self.fields.as_mut().ok_or(WizardError::WrongStep {
            action: "edit token details",
            step: self.step,
        })?;
        fields.set(field, value)?;
        Ok(Outcome::Updated)
    }

    fn next(&mut self, funds: &Funds) -> Result<Outcome, WizardError> {
        self.can_advance(funds)?;
        let next = match self.step {
            Step::Details => Step::NetworkSelection,
            Step::NetworkSelection | Step::Review => Step::Review,
        };
        self.step = next;
        Ok(Outcome::StepChanged(next))
    }

    fn back(&mut self) -> Result<Outcome, WizardError> {
        self.step = match (self.step, self.flow) {
            (Step::Review, _) => Step::NetworkSelection,
            (Step::NetworkSelection, Flow::Deploy) => Step::Details,
            (step, _) => {
                return Err(WizardError::WrongStep {
                    action: "go back",
                    step,
                })
            }
        };
        Ok(Outcome::StepChanged(self.step))
    }

    fn toggle(&mut self, chain_id: ChainId) -> Result<Outcome, WizardError> {
        if self.step != Step::NetworkSelection {
            return Err(WizardError::WrongStep {
                action: "change destinations",
                step: self.step,
            });
        }
        if chain_id == self.source.id {
            return Err(WizardError::SourceNotSelectable(chain_id));
        }
        if self.destination(chain_id).is_none() {
            return Err(NetworkError::UnknownChain(chain_id).into());
        }

        if self.is_selected(chain_id) {
            self.unselect(chain_id);
            return Ok(Outcome::Deselected { chain_id });
        }

        if self.is_estimating() {
            return Err(WizardError::EstimateInFlight);
        }

        let ticket = EstimateTicket(self.next_ticket);
        self.next_ticket += 1;
        self.selected.push(chain_id);
        self.pending.insert(chain_id, ticket);

        Ok(Outcome::EstimateRequested { chain_id, ticket })
    }

    fn estimate_succeeded(&mut self, chain_id: ChainId, ticket: EstimateTicket, wei: U256) -> Outcome {
        if !self.take_pending(chain_id, ticket) {
            return Outcome::StaleEstimateDiscarded { chain_id };
        }
        self.estimates.insert(chain_id, wei);
        Outcome::EstimateStored { chain_id, wei }
    }

    fn estimate_failed(&mut self, chain_id: ChainId, ticket: EstimateTicket, reason: String) -> Outcome {
        if !self.take_pending(chain_id, ticket) {
            return Outcome::StaleEstimateDiscarded { chain_id };
        }
        self.unselect(chain_id);
        Outcome::SelectionRolledBack { chain_id, reason }
    }

    fn take_pending(&mut self, chain_id: ChainId, ticket: EstimateTicket) -> bool {
        if self.pending.get(&chain_id) == Some(&ticket) {
            self.pending.remove(&chain_id);
            true
        } else {
            false
        }
    }

    fn unselect(&mut self, chain_id: ChainId) {
        self.selected.retain(|id| *id != chain_id);
        self.estimates.remove(&chain_id);
        self.pending.remove(&chain_id);
    }

    /// Whether the current step may be left forwards.
    pub fn can_advance(&self, funds: &Funds) -> Result<(), WizardError> {
        match self.step {
            Step::Details => {
                let errors = self.field_errors().unwrap_or_default();
                if errors.is_valid() {
                    Ok(())
                } else {
                    Err(WizardError::InvalidFields(errors))
                }
            }
            Step::NetworkSelection => {
                if matches!(self.flow, Flow::Register { .. }) && self.selected.is_empty() {
                    return Err(WizardError::NoDestinations);
                }
                if self.is_estimating() {
                    return Err(WizardError::EstimateInFlight);
                }
                self.ensure_affordable(funds)
            }
            Step::Review => Err(WizardError::WrongStep {
                action: "advance",
                step: Step::Review,
            }),
        }
    }

    /// Whether the session may be submitted with the current readings.
    pub fn can_submit(&self, funds: &Funds) -> Result<(), WizardError> {
        if self.step != Step::Review {
            return Err(WizardError::WrongStep {
                action: "submit",
                step: self.step,
            });
        }
        if self.is_estimating() {
            return Err(WizardError::EstimateInFlight);
        }
        self.ensure_affordable(funds)
    }

    fn ensure_affordable(&self, funds: &Funds) -> Result<(), WizardError> {
        match self.affordability(funds) {
            Affordability::Affordable => Ok(()),
            Affordability::Insufficient { .. } => Err(WizardError::InsufficientBalance),
            Affordability::Unknown => Err(WizardError::FundsUnknown),
        }
    }

    pub fn affordability(&self, funds: &Funds) -> Affordability {
        Affordability::check(self.total_cost(), funds)
    }

    /// Sum of all stored estimates, in wei.
    pub fn total_cost(&self) -> U256 {
        self.estimates
            .values()
            .fold(U256::ZERO, |acc, wei| acc.saturating_add(*wei))
    }

    /// Final form data handed to the submission handler.
    pub fn submission(&self) -> Submission {
        let destinations = self
            .selected
            .iter()
            .filter_map(|id| {
                let network = self.destination(*id)?;
                let wei = self.estimates.get(id).copied().unwrap_or_default();
                Some(DestinationCost::new(network, wei))
            })
            .collect();

        Submission {
            flow: self.flow.kind(),
            source_chain_id: self.source.id,
            source_network: self.source.name.to_string(),
            token: self.fields.clone(),
            token_address: self.flow.token_address().map(|a| a.to_checksum(None)),
            destinations,
            total_cost_wei: self.total_cost().to_string(),
        }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn source(&self) -> &NetworkConfig {
        &self.source
    }

    /// Networks that may be chosen as destinations.
    pub fn destinations(&self) -> &[NetworkConfig] {
        &self.destinations
    }

    pub fn destination(&self, chain_id: ChainId) -> Option<&NetworkConfig> {
        self.destinations.iter().find(|n| n.id == chain_id)
    }

    pub fn fields(&self) -> Option<&TokenFields> {
        self.fields.as_ref()
    }

    pub fn field_errors(&self) -> Option<FieldErrors> {
        self.fields.as_ref().map(TokenFields::validate)
    }

    pub fn selected(&self) -> &[ChainId] {
        &self.selected
    }

    pub fn is_selected(&self, chain_id: ChainId) -> bool {
        self.selected.contains(&chain_id)
    }

    pub fn estimate(&self, chain_id: ChainId) -> Option<U256> {
        self.estimates.get(&chain_id).copied()
    }

    pub fn is_pending(&self, chain_id: ChainId) -> bool {
        self.pending.contains_key(&chain_id)
    }

    pub fn is_estimating(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Why an action was refused.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} at the {step:?} step")]
    WrongStep { action: &'static str, step: Step },

    #[error("Token details are incomplete or invalid")]
    InvalidFields(FieldErrors),

    #[error(transparent)]
    InputRejected(#[from] InputRejected),

    #[error("Select at least one network")]
    NoDestinations,

    #[error("A gas estimate is still in progress")]
    EstimateInFlight,

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Insufficient balance for estimated gas")]
    InsufficientBalance,

    #[error("Balance or price is not available yet")]
    FundsUnknown,

    #[error("Chain {0} is the source network and cannot be a destination")]
    SourceNotSelectable(ChainId),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Wizard session is closed")]
    Closed,
}
