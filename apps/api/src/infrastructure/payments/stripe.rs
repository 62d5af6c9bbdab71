use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::payments::{CreateIntent, PaymentError, PaymentGateway, PaymentIntent};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe Payment Intents over the REST API
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl From<IntentResponse> for PaymentIntent {
    fn from(r: IntentResponse) -> Self {
        Self {
            id: r.id,
            client_secret: r.client_secret.unwrap_or_default(),
            amount: r.amount,
            currency: r.currency,
            status: r.status,
            metadata: r.metadata,
        }
    }
}

impl StripeGateway {
    /// Create a gateway authenticating with `secret_key`
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    async fn parse(response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();
        if status.is_success() {
            let intent: IntentResponse = response
                .json()
                .await
                .map_err(|e| PaymentError::Provider(e.to_string()))?;
            return Ok(intent.into());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::NotFound);
        }
        let body: Option<ErrorEnvelope> = response.json().await.ok();
        let message = body
            .and_then(|b| {
                if b.error.code.as_deref() == Some("resource_missing") {
                    None
                } else {
                    b.error.message
                }
            })
            .unwrap_or_else(|| format!("Stripe responded with {status}"));
        if status.is_client_error() {
            Err(PaymentError::Invalid(message))
        } else {
            Err(PaymentError::Provider(message))
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: CreateIntent) -> Result<PaymentIntent, PaymentError> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        form.extend(
            request
                .metadata
                .into_iter()
                .map(|(k, v)| (format!("metadata[{k}]"), v)),
        );

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Self::parse(response).await
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .client
            .get(format!("{}/payment_intents/{}", self.base_url, id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_response_maps_to_domain() {
        let json = r#"{
            "id": "pi_123",
            "object": "payment_intent",
            "client_secret": "pi_123_secret_abc",
            "amount": 49900,
            "currency": "inr",
            "status": "requires_payment_method",
            "metadata": {"userId": "u1"}
        }"#;
        let parsed: IntentResponse = serde_json::from_str(json).unwrap();
        let intent = PaymentIntent::from(parsed);
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.amount, 49900);
        assert!(!intent.succeeded());
        assert_eq!(intent.metadata.get("userId").map(String::as_str), Some("u1"));
    }
}
