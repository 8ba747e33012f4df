use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

fn default_platform() -> String {
    "native".to_string()
}

/// Purchase validation request body.
///
/// The three identifying fields are required but deliberately defaulted at
/// the serde level: a request missing them must still parse so the handler
/// can answer with the payload-level "missing required parameters"
/// failure instead of an HTTP error.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PurchaseRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub product_id: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 1000))]
    pub purchase_token: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub user_id: String,

    #[serde(default = "default_platform")]
    pub platform: String,

    #[validate(length(max = 50))]
    pub app_version: Option<String>,

    #[validate(length(max = 100))]
    pub device_id: Option<String>,
}

impl PurchaseRequest {
    /// Composite key used to detect repeated validation submissions.
    pub fn dedup_key(&self) -> String {
        format!("{}_{}", self.user_id, self.purchase_token)
    }
}

/// Normalized outcome of a validation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    pub validated_product_id: String,
    pub is_duplicate: bool,
    /// Epoch milliseconds at the time the result was produced.
    pub server_time: i64,
}

impl ValidationResult {
    fn stamped(
        success: bool,
        message: impl Into<String>,
        product_id: impl Into<String>,
        is_duplicate: bool,
    ) -> Self {
        Self {
            success,
            message: message.into(),
            validated_product_id: product_id.into(),
            is_duplicate,
            server_time: epoch_millis(),
        }
    }

    pub fn approved(product_id: impl Into<String>) -> Self {
        Self::stamped(true, "purchase verified", product_id, false)
    }

    pub fn rejected(product_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::stamped(false, message, product_id, false)
    }

    pub fn duplicate(product_id: impl Into<String>) -> Self {
        Self::stamped(true, "duplicate order (already processed)", product_id, true)
    }

    pub fn missing_params(product_id: impl Into<String>) -> Self {
        Self::stamped(false, "missing required parameters", product_id, false)
    }

    pub fn internal_error(details: impl std::fmt::Display) -> Self {
        Self::stamped(false, format!("internal server error: {}", details), "", false)
    }
}

/// Full response envelope: the validation result plus the correlation id
/// and measured handler latency.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub result: ValidationResult,
    pub request_id: Uuid,
    /// Milliseconds spent inside the handler.
    pub processing_time: u64,
}

pub fn epoch_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_joins_user_and_token() {
        let request = PurchaseRequest {
            product_id: "p1".to_string(),
            purchase_token: "tok123".to_string(),
            user_id: "u1".to_string(),
            ..Default::default()
        };

        assert_eq!(request.dedup_key(), "u1_tok123");
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let request = PurchaseRequest {
            product_id: "p1".to_string(),
            purchase_token: String::new(),
            user_id: "u1".to_string(),
            ..Default::default()
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn platform_defaults_to_native() {
        let request: PurchaseRequest = serde_json::from_str(
            r#"{"product_id":"p1","purchase_token":"t","user_id":"u1"}"#,
        )
        .unwrap();

        assert_eq!(request.platform, "native");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn duplicate_result_is_a_success() {
        let result = ValidationResult::duplicate("p1");

        assert!(result.success);
        assert!(result.is_duplicate);
        assert_eq!(result.validated_product_id, "p1");
        assert!(result.message.contains("duplicate"));
    }
}
