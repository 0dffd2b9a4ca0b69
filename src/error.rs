// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::NetworkError;
use crate::wizard::WizardError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        let message = err.to_string();
        match err {
            WizardError::Closed => Self::not_found(message),
            WizardError::Network(NetworkError::UnknownChain(_))
            | WizardError::SourceNotSelectable(_) => Self::bad_request(message),
            // A network without a gas service mapping is a deployment mistake.
            WizardError::Network(NetworkError::Unsupported(_)) => Self::internal(message),
            WizardError::EstimateInFlight | WizardError::SubmissionInFlight => {
                Self::conflict(message)
            }
            WizardError::Submission(_) => Self::bad_gateway(message),
            WizardError::WrongStep { .. }
            | WizardError::InvalidFields(_)
            | WizardError::InputRejected(_)
            | WizardError::NoDestinations
            | WizardError::InsufficientBalance
            | WizardError::FundsUnknown => Self::unprocessable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
