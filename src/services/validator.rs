//! Purchase validator variants.
//!
//! `PicoValidator` calls the platform's verification endpoint; the
//! simulated variant approves fixed test-token prefixes and serves every
//! non-live platform identifier. Both interpret faults into a normalized
//! `ValidationResult` rather than surfacing them as errors: every outcome
//! of a validation attempt is data for the caller.

use crate::{
    config::PicoConfig,
    models::purchase::{PurchaseRequest, ValidationResult},
    services::signing::RequestSigner,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Return code the verification service uses for a valid purchase.
const PICO_RET_OK: i32 = 0;

/// Artificial latency of the simulated validator.
const SIMULATED_LATENCY: Duration = Duration::from_millis(300);

/// Token prefixes the simulated validator approves.
const TEST_TOKEN_PREFIXES: [&str; 2] = ["test_", "simulated_purchase_token_"];

#[async_trait]
pub trait PurchaseValidator: Send + Sync {
    async fn validate(&self, request: &PurchaseRequest) -> ValidationResult;
}

#[derive(Debug, Serialize)]
struct PicoVerifyRequest {
    app_id: String,
    user_id: String,
    product_id: String,
    purchase_token: String,
    sign: String,
}

#[derive(Debug, Deserialize)]
struct PicoVerifyResponse {
    ret: i32,
    #[serde(default)]
    msg: Option<String>,
}

/// Live validator backed by the Pico payment verification endpoint.
pub struct PicoValidator {
    config: PicoConfig,
    http_client: reqwest::Client,
    signer: Arc<dyn RequestSigner>,
}

impl PicoValidator {
    pub fn new(config: &PicoConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            config: config.clone(),
            http_client: reqwest::Client::new(),
            signer,
        }
    }

    fn build_payload(&self, request: &PurchaseRequest) -> PicoVerifyRequest {
        let fields = BTreeMap::from([
            ("app_id", self.config.app_id.as_str()),
            ("user_id", request.user_id.as_str()),
            ("product_id", request.product_id.as_str()),
            ("purchase_token", request.purchase_token.as_str()),
        ]);

        PicoVerifyRequest {
            app_id: self.config.app_id.clone(),
            user_id: request.user_id.clone(),
            product_id: request.product_id.clone(),
            purchase_token: request.purchase_token.clone(),
            sign: self.signer.sign(&fields),
        }
    }
}

#[async_trait]
impl PurchaseValidator for PicoValidator {
    #[instrument(skip(self, request), fields(user_id = %request.user_id, product_id = %request.product_id))]
    async fn validate(&self, request: &PurchaseRequest) -> ValidationResult {
        let payload = self.build_payload(request);
        let timeout = Duration::from_millis(self.config.request_timeout_ms);

        let response = match self
            .http_client
            .post(&self.config.verify_url)
            .json(&payload)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("Verification request timed out after {:?}", timeout);
                return ValidationResult::rejected(
                    &request.product_id,
                    "verification request timed out",
                );
            }
            Err(e) => {
                warn!("Verification transport fault: {}", e);
                return ValidationResult::rejected(
                    &request.product_id,
                    "verification service temporarily unavailable",
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Verification server replied with status {}", status);
            return ValidationResult::rejected(
                &request.product_id,
                format!("verification server error: {}", status.as_u16()),
            );
        }

        let verdict: PicoVerifyResponse = match response.json().await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Unparseable verification reply: {}", e);
                return ValidationResult::rejected(
                    &request.product_id,
                    "verification service temporarily unavailable",
                );
            }
        };

        if verdict.ret == PICO_RET_OK {
            info!("Purchase verified for product {}", request.product_id);
            return ValidationResult::approved(&request.product_id);
        }

        let reason = verdict
            .msg
            .unwrap_or_else(|| format!("code {}", verdict.ret));
        info!("Purchase rejected by verification service: {}", reason);
        ValidationResult::rejected(
            &request.product_id,
            format!("verification failed: {}", reason),
        )
    }
}

/// Validator for non-live platforms. Emulates network latency, then
/// approves only known test-token prefixes.
pub struct SimulatedValidator;

impl SimulatedValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurchaseValidator for SimulatedValidator {
    #[instrument(skip(self, request), fields(user_id = %request.user_id, product_id = %request.product_id))]
    async fn validate(&self, request: &PurchaseRequest) -> ValidationResult {
        tokio::time::sleep(SIMULATED_LATENCY).await;

        let accepted = TEST_TOKEN_PREFIXES
            .iter()
            .any(|prefix| request.purchase_token.starts_with(prefix));

        if accepted {
            info!("Simulated purchase approved for product {}", request.product_id);
            ValidationResult::approved(&request.product_id)
        } else {
            ValidationResult::rejected(&request.product_id, "invalid token")
        }
    }
}
