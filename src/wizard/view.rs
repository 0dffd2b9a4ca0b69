// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pure view model of a wizard session.
//!
//! [`render`] maps state plus the current readings to everything a client
//! needs to draw the wizard: step indicator, per-destination rows, totals and
//! which controls are enabled. It performs no I/O.

use alloy::primitives::U256;
use serde::Serialize;
use utoipa::ToSchema;

use super::affordability::{Affordability, Funds};
use super::fields::{FieldErrors, TokenFields};
use super::machine::{FlowKind, Step, WizardState};
use crate::blockchain::NetworkInfo;
use crate::format::{format_eth_value, format_usd, wei_to_eth};
use crate::intents::DestinationCost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepIndicator {
    /// 1-based position
    pub number: usize,
    pub step: Step,
    pub label: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DestinationRow {
    pub chain_id: u64,
    pub name: String,
    pub selected: bool,
    /// Spinner: the estimate for this row is in flight
    pub estimating: bool,
    /// Formatted ETH estimate, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_eth: Option<String>,
    /// Checkbox enabled
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FundsStatus {
    Affordable,
    Insufficient,
    Unknown,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewSummary {
    /// Source network, listed first as the primary deployment
    pub primary_network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_explorer_url: Option<String>,
    pub destinations: Vec<DestinationCost>,
    pub total_gas_eth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_gas_usd: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WizardView {
    pub flow: FlowKind,
    pub title: String,
    pub step: Step,
    pub steps: Vec<StepIndicator>,
    pub source: NetworkInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<TokenFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    pub destinations: Vec<DestinationRow>,
    pub is_estimating: bool,
    pub total_gas_eth: String,
    /// `None` while the price is loading or unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_gas_usd: Option<String>,
    /// `None` while the balance is loading or unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_eth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_usd: Option<String>,
    pub funds_loading: bool,
    pub funds_status: FundsStatus,
    pub insufficient_balance: bool,
    pub next_enabled: bool,
    pub back_enabled: bool,
    pub submit_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewSummary>,
}

pub fn render(state: &WizardState, funds: &Funds) -> WizardView {
    let flow = state.flow().kind();
    let step = state.step();
    let total = state.total_cost();
    let affordability = state.affordability(funds);

    let title = match flow {
        FlowKind::Deploy => format!("Deploy token on {}", state.source().name),
        FlowKind::Register => "Register token on multiple chains".to_string(),
    };

    let steps_in_flow = state.flow().steps();
    let active_index = steps_in_flow.iter().position(|s| *s == step).unwrap_or(0);
    let steps = steps_in_flow
        .iter()
        .enumerate()
        .map(|(index, s)| StepIndicator {
            number: index + 1,
            step: *s,
            label: s.label(flow).to_string(),
            status: match index.cmp(&active_index) {
                std::cmp::Ordering::Less => StepStatus::Completed,
                std::cmp::Ordering::Equal => StepStatus::Active,
                std::cmp::Ordering::Greater => StepStatus::Upcoming,
            },
        })
        .collect();

    let toggles_enabled = step == Step::NetworkSelection && !state.is_estimating();
    let destinations = state
        .destinations()
        .iter()
        .map(|network| {
            let selected = state.is_selected(network.id);
            DestinationRow {
                chain_id: network.id,
                name: network.name.to_string(),
                selected,
                estimating: state.is_pending(network.id),
                estimate_eth: state.estimate(network.id).map(display_eth),
                // a selected row can always be unticked
                enabled: step == Step::NetworkSelection && (toggles_enabled || selected),
            }
        })
        .collect();

    let token_address = state.flow().token_address().map(|a| a.to_checksum(None));
    let total_gas_eth = display_eth(total);
    let total_gas_usd = funds.usd_value(total).map(format_usd);

    let review = (step == Step::Review).then(|| ReviewSummary {
        primary_network: state.source().name.to_string(),
        token: state.fields().cloned(),
        token_address: token_address.clone(),
        token_explorer_url: token_address
            .as_deref()
            .map(|address| state.source().token_url(address)),
        destinations: state.submission().destinations,
        total_gas_eth: total_gas_eth.clone(),
        total_gas_usd: total_gas_usd.clone(),
    });

    let balance = funds.balance.value().copied();

    WizardView {
        flow,
        title,
        step,
        steps,
        source: state.source().into(),
        fields: state.fields().cloned(),
        field_errors: state.field_errors(),
        token_address,
        destinations,
        is_estimating: state.is_estimating(),
        total_gas_eth,
        total_gas_usd,
        balance_eth: balance.map(display_eth),
        balance_usd: balance.and_then(|wei| funds.usd_value(wei)).map(format_usd),
        funds_loading: funds.balance.is_loading() || funds.price_usd.is_loading(),
        funds_status: match affordability {
            Affordability::Affordable => FundsStatus::Affordable,
            Affordability::Insufficient { .. } => FundsStatus::Insufficient,
            Affordability::Unknown => FundsStatus::Unknown,
        },
        insufficient_balance: !affordability.is_affordable(),
        next_enabled: step != Step::Review && state.can_advance(funds).is_ok(),
        back_enabled: step != state.flow().steps()[0],
        submit_enabled: state.can_submit(funds).is_ok(),
        review,
    }
}

fn display_eth(wei: U256) -> String {
    format_eth_value(wei_to_eth(wei))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{NetworkRegistry, BASE_SEPOLIA, OPTIMISM_SEPOLIA, SEPOLIA};
    use crate::feeds::Reading;
    use crate::wizard::{Flow, Outcome, WizardEvent};
    use alloy::primitives::{address, utils::parse_ether};

    fn funds() -> Funds {
        Funds::new(
            Reading::Ready(parse_ether("0.5").unwrap()),
            Reading::Ready(2000.0),
        )
    }

    fn register_state() -> WizardState {
        WizardState::open(
            Flow::Register {
                token_address: address!("76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63"),
            },
            BASE_SEPOLIA,
            &NetworkRegistry::default(),
        )
    }

    #[test]
    fn deploy_view_starts_on_details() {
        let state = WizardState::open(Flow::Deploy, SEPOLIA, &NetworkRegistry::default());
        let view = render(&state, &funds());

        assert_eq!(view.title, "Deploy token on Sepolia");
        assert_eq!(view.steps.len(), 3);
        assert_eq!(view.steps[0].status, StepStatus::Active);
        assert_eq!(view.steps[1].label, "Register & Deploy");
        assert_eq!(view.steps[2].status, StepStatus::Upcoming);
        assert!(!view.next_enabled);
        assert!(!view.back_enabled);
        assert!(!view.submit_enabled);
        assert!(view.field_errors.is_some());
        assert!(view.destinations.iter().all(|row| !row.enabled));
    }

    #[test]
    fn estimating_disables_other_rows() {
        let mut state = register_state();
        let outcome = state
            .apply(WizardEvent::ToggleDestination(SEPOLIA.id), &funds())
            .unwrap();
        assert!(matches!(outcome, Outcome::EstimateRequested { .. }));

        let view = render(&state, &funds());
        assert_eq!(view.title, "Register token on multiple chains");
        assert!(view.is_estimating);
        let sepolia = view.destinations.iter().find(|r| r.chain_id == SEPOLIA.id).unwrap();
        let op = view
            .destinations
            .iter()
            .find(|r| r.chain_id == OPTIMISM_SEPOLIA.id)
            .unwrap();
        assert!(sepolia.estimating && sepolia.selected);
        assert!(sepolia.estimate_eth.is_none());
        assert!(!op.enabled);
        assert!(!view.next_enabled);
    }

    #[test]
    fn totals_and_fiat() {
        let mut state = register_state();
        let Outcome::EstimateRequested { chain_id, ticket } = state
            .apply(WizardEvent::ToggleDestination(SEPOLIA.id), &funds())
            .unwrap()
        else {
            panic!("expected estimate request");
        };
        state
            .apply(
                WizardEvent::EstimateSucceeded {
                    chain_id,
                    ticket,
                    wei: parse_ether("0.01").unwrap(),
                },
                &funds(),
            )
            .unwrap();

        let view = render(&state, &funds());
        assert_eq!(view.total_gas_eth, "0.0100");
        assert_eq!(view.total_gas_usd.as_deref(), Some("$20.00"));
        assert_eq!(view.balance_eth.as_deref(), Some("0.500"));
        assert_eq!(view.balance_usd.as_deref(), Some("$1000.00"));
        assert_eq!(view.funds_status, FundsStatus::Affordable);
        assert!(view.next_enabled);
        assert!(view.destinations.iter().all(|r| r.enabled));
    }

    #[test]
    fn unknown_funds_render_as_loading_and_blocked() {
        let mut state = register_state();
        let Outcome::EstimateRequested { chain_id, ticket } = state
            .apply(WizardEvent::ToggleDestination(SEPOLIA.id), &funds())
            .unwrap()
        else {
            panic!("expected estimate request");
        };
        state
            .apply(
                WizardEvent::EstimateSucceeded {
                    chain_id,
                    ticket,
                    wei: U256::from(1u64),
                },
                &funds(),
            )
            .unwrap();

        let loading = Funds::new(Reading::Loading, Reading::Unavailable);
        let view = render(&state, &loading);
        assert!(view.funds_loading);
        assert_eq!(view.funds_status, FundsStatus::Unknown);
        assert!(view.insufficient_balance);
        assert!(view.balance_eth.is_none());
        assert!(view.total_gas_usd.is_none());
        assert!(!view.next_enabled);
    }

    #[test]
    fn dust_balance_keeps_significant_digits() {
        let state = register_state();
        let dust = Funds::new(
            Reading::Ready(U256::from(100_000_000_000u64)),
            Reading::Ready(2000.0),
        );

        let view = render(&state, &dust);
        assert_eq!(view.balance_eth.as_deref(), Some("0.000000100"));
        assert_eq!(view.balance_usd.as_deref(), Some("$0.00"));
    }
}
