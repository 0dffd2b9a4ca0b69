// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token details entered in the deploy flow.
//!
//! Two layers of checking apply:
//! - input filters reject keystrokes that could never form a valid value
//!   (letters in `decimals`, a second `.` in the supply); rejected input never
//!   reaches the stored fields.
//! - validation runs over the stored fields on every change and decides
//!   whether the Details step may be left.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest accepted `decimals` value.
pub const MAX_DECIMALS: u32 = 36;

/// Default `decimals` for a new token.
pub const DEFAULT_DECIMALS: &str = "18";

/// Editable token field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenField {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
}

impl fmt::Display for TokenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenField::Name => "Token name",
            TokenField::Symbol => "Token symbol",
            TokenField::Decimals => "Decimals",
            TokenField::TotalSupply => "Total supply",
        };
        f.write_str(label)
    }
}

/// Whether `input` may be typed into the decimals field (`^\d*$`).
pub fn accepts_decimals_input(input: &str) -> bool {
    input.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `input` may be typed into the total-supply field (`^\d*\.?\d*$`).
pub fn accepts_supply_input(input: &str) -> bool {
    let mut seen_point = false;
    input.bytes().all(|b| match b {
        b'0'..=b'9' => true,
        b'.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Token metadata as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenFields {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub total_supply: String,
}

impl Default for TokenFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            decimals: DEFAULT_DECIMALS.to_string(),
            total_supply: String::new(),
        }
    }
}

impl TokenFields {
    /// Apply an edit, rejecting input the field's filter does not accept.
    pub fn set(&mut self, field: TokenField, value: &str) -> Result<(), InputRejected> {
        match field {
            TokenField::Name => self.name = value.to_string(),
            TokenField::Symbol => self.symbol = value.to_string(),
            TokenField::Decimals => {
                if !accepts_decimals_input(value) {
                    return Err(InputRejected { field });
                }
                self.decimals = value.to_string();
            }
            TokenField::TotalSupply => {
                if !accepts_supply_input(value) {
                    return Err(InputRejected { field });
                }
                self.total_supply = value.to_string();
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> FieldErrors {
        FieldErrors {
            name: required_text(&self.name),
            symbol: required_text(&self.symbol),
            decimals: validate_decimals(&self.decimals),
            total_supply: validate_supply(&self.total_supply),
        }
    }
}

fn required_text(value: &str) -> Option<FieldError> {
    value.trim().is_empty().then_some(FieldError::Required)
}

fn validate_decimals(value: &str) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required);
    }
    // Input filter guarantees digits only, so a parse failure means overflow.
    match value.parse::<u32>() {
        Ok(decimals) if decimals <= MAX_DECIMALS => None,
        Ok(_) | Err(_) => Some(FieldError::TooManyDecimals),
    }
}

fn validate_supply(value: &str) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required);
    }
    match value.parse::<f64>() {
        Ok(supply) if !supply.is_finite() => Some(FieldError::NotANumber),
        Ok(supply) if supply <= 0.0 => Some(FieldError::NotPositive),
        Ok(_) => None,
        Err(_) => Some(FieldError::NotANumber),
    }
}

/// Why a field value is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    Required,
    NotANumber,
    TooManyDecimals,
    NotPositive,
}

/// Per-field validation result; `None` means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<FieldError>,
}

impl FieldErrors {
    pub fn is_valid(&self) -> bool {
        self.name.is_none()
            && self.symbol.is_none()
            && self.decimals.is_none()
            && self.total_supply.is_none()
    }
}

/// An edit was refused by the field's input filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{field} does not accept that input")]
pub struct InputRejected {
    pub field: TokenField,
}
