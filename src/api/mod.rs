// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{NetworkInfo, TokenMetadata},
    intents::{DeploymentIntent, DestinationCost, Submission},
    notify::{Notification, NotificationLevel},
    state::AppState,
    wizard::{
        DestinationRow, FieldError, FieldErrors, FlowKind, FundsStatus, ReviewSummary,
        SessionView, Step, StepIndicator, StepStatus, TokenField, TokenFields, WizardView,
    },
};

pub mod health;
pub mod intents;
pub mod networks;
pub mod wizards;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/networks", get(networks::list_networks))
        .route("/price", get(networks::get_price))
        .route("/wizards", post(wizards::open_wizard))
        .route(
            "/wizards/{session_id}",
            get(wizards::get_wizard).delete(wizards::close_wizard),
        )
        .route("/wizards/{session_id}/fields", put(wizards::edit_field))
        .route(
            "/wizards/{session_id}/destinations/{chain_id}",
            post(wizards::toggle_destination),
        )
        .route("/wizards/{session_id}/next", post(wizards::next_step))
        .route("/wizards/{session_id}/back", post(wizards::previous_step))
        .route("/wizards/{session_id}/submit", post(wizards::submit_wizard))
        .route("/intents", get(intents::list_intents))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        networks::list_networks,
        networks::get_price,
        wizards::open_wizard,
        wizards::get_wizard,
        wizards::close_wizard,
        wizards::edit_field,
        wizards::toggle_destination,
        wizards::next_step,
        wizards::previous_step,
        wizards::submit_wizard,
        intents::list_intents
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            networks::NetworkListResponse,
            networks::PriceResponse,
            wizards::OpenWizardRequest,
            wizards::EditFieldRequest,
            wizards::WizardResponse,
            wizards::SubmitResponse,
            intents::IntentListResponse,
            intents::IntentSummary,
            NetworkInfo,
            TokenMetadata,
            FlowKind,
            Step,
            StepStatus,
            StepIndicator,
            TokenField,
            TokenFields,
            FieldError,
            FieldErrors,
            DestinationRow,
            FundsStatus,
            ReviewSummary,
            WizardView,
            SessionView,
            Notification,
            NotificationLevel,
            DestinationCost,
            Submission,
            DeploymentIntent
        )
    ),
    tags(
        (name = "Health", description = "Liveness and feed status"),
        (name = "Networks", description = "Supported networks and price"),
        (name = "Wizards", description = "Deploy and register wizard sessions"),
        (name = "Intents", description = "Recorded submissions")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{
        ChainClientError, EstimateLeg, GasEstimateError, GasEstimator, NetworkConfig,
        NetworkRegistry, TokenMetadataSource,
    };
    use crate::feeds::{BalanceSource, Reading};
    use crate::intents::IntentStore;
    use crate::store::SessionStore;
    use alloy::primitives::{utils::parse_ether, Address, U256};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{watch, RwLock};
    use tower::ServiceExt;

    const WALLET: &str = "0x1111111111111111111111111111111111111111";
    const TOKEN: &str = "0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63";

    struct FixedGas;

    #[async_trait]
    impl GasEstimator for FixedGas {
        async fn estimate(&self, leg: &EstimateLeg) -> Result<U256, GasEstimateError> {
            match leg.destination_chain {
                "base-sepolia" => Ok(U256::from(1_000_000_000_000u64)),
                _ => Err(GasEstimateError::Rejected("unsupported".into())),
            }
        }
    }

    struct OneEth;

    #[async_trait]
    impl BalanceSource for OneEth {
        async fn native_balance(
            &self,
            _network: &NetworkConfig,
            _wallet: Address,
        ) -> Result<U256, ChainClientError> {
            Ok(parse_ether("1").unwrap())
        }
    }

    struct KnownToken;

    #[async_trait]
    impl TokenMetadataSource for KnownToken {
        async fn token_metadata(
            &self,
            _network: &NetworkConfig,
            token_address: &str,
        ) -> Result<TokenMetadata, ChainClientError> {
            Ok(TokenMetadata {
                address: token_address.to_string(),
                name: "MyToken".into(),
                symbol: "MTK".into(),
                decimals: 18,
                total_supply: "1000000".into(),
            })
        }
    }

    fn app() -> Router {
        let (_, price) = watch::channel(Reading::Ready(2500.0));
        router(AppState {
            registry: NetworkRegistry::default(),
            price,
            gas: Arc::new(FixedGas),
            balances: Arc::new(OneEth),
            tokens: Arc::new(KnownToken),
            intents: Arc::new(IntentStore::new()),
            sessions: Arc::new(RwLock::new(SessionStore::new())),
            balance_refresh: Duration::from_secs(30),
            estimate_timeout: Duration::from_secs(5),
        })
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Poll the wizard until estimates have settled and funds are known.
    async fn settle(app: &Router, id: &str) -> (Value, Vec<Value>) {
        let mut notifications = Vec::new();
        for _ in 0..100 {
            let (status, body) = call(app, "GET", &format!("/v1/wizards/{id}"), None).await;
            assert_eq!(status, StatusCode::OK);
            notifications.extend(body["notifications"].as_array().cloned().unwrap_or_default());
            let session = &body["session"];
            let settled = session["is_estimating"] == json!(false)
                && session["funds_status"] != json!("unknown");
            if settled {
                return (body, notifications);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("wizard did not settle");
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let _ = app().into_make_service();
    }

    #[tokio::test]
    async fn health_and_networks() {
        let app = app();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["price_feed"], "ok");

        let (status, body) = call(&app, "GET", "/v1/networks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["networks"][1]["name"], "Base Sepolia");

        let (_, body) = call(&app, "GET", "/v1/price", None).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["formatted"], "$2500.00");
    }

    #[tokio::test]
    async fn register_flow_over_http() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/v1/wizards",
            Some(json!({
                "flow": "register",
                "source_chain_id": 11_155_111,
                "wallet_address": WALLET,
                "token_address": TOKEN,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let session = &body["session"];
        assert_eq!(session["step"], "network_selection");
        assert_eq!(session["token"]["symbol"], "MTK");
        assert_eq!(session["title"], "Register token on multiple chains");
        let id = session["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "POST",
            &format!("/v1/wizards/{id}/destinations/84532"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let mut notifications = body["notifications"].as_array().cloned().unwrap_or_default();

        let (body, more) = settle(&app, &id).await;
        notifications.extend(more);
        assert_eq!(body["session"]["total_gas_eth"], "0.00000100");
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0]["message"],
            "Estimated gas for Base Sepolia: 0.00000100 ETH"
        );

        let (status, body) = call(&app, "POST", &format!("/v1/wizards/{id}/next"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["step"], "review");
        assert_eq!(body["session"]["review"]["primary_network"], "Sepolia");

        let (status, body) = call(&app, "POST", &format!("/v1/wizards/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["intent"]["submission"]["destinations"][0]["chain_id"], 84_532);

        let (status, _) = call(&app, "GET", &format!("/v1/wizards/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = call(&app, "GET", &format!("/v1/intents?wallet={WALLET}"), None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["intents"][0]["total_cost"], "0.00000100 ETH");
        assert_eq!(body["intents"][0]["wallet_short"], "0x1111...1111");
    }

    #[tokio::test]
    async fn rejected_field_input_is_422() {
        let app = app();
        let (_, body) = call(
            &app,
            "POST",
            "/v1/wizards",
            Some(json!({
                "flow": "deploy",
                "source_chain_id": 84_532,
                "wallet_address": WALLET,
            })),
        )
        .await;
        let id = body["session"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/v1/wizards/{id}/fields"),
            Some(json!({ "field": "decimals", "value": "1a" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Decimals"));

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/v1/wizards/{id}/fields"),
            Some(json!({ "field": "name", "value": "MyToken" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["fields"]["name"], "MyToken");
        assert_eq!(body["session"]["fields"]["decimals"], "18");
    }

    #[tokio::test]
    async fn open_validates_request() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/v1/wizards",
            Some(json!({ "flow": "register", "source_chain_id": 11_155_111, "wallet_address": WALLET })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "POST",
            "/v1/wizards",
            Some(json!({ "flow": "deploy", "source_chain_id": 1, "wallet_address": WALLET })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "GET",
            "/v1/wizards/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reopening_closes_the_previous_wizard() {
        let app = app();
        let open = json!({ "flow": "deploy", "source_chain_id": 11_155_111, "wallet_address": WALLET });
        let (_, first) = call(&app, "POST", "/v1/wizards", Some(open.clone())).await;
        let (_, second) = call(&app, "POST", "/v1/wizards", Some(open)).await;
        let first = first["session"]["id"].as_str().unwrap().to_string();
        let second = second["session"]["id"].as_str().unwrap().to_string();

        let (status, _) = call(&app, "GET", &format!("/v1/wizards/{first}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GET", &format!("/v1/wizards/{second}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "DELETE", &format!("/v1/wizards/{second}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "GET", &format!("/v1/wizards/{second}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
