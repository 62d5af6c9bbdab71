use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Currency every intent is created in
pub const CURRENCY: &str = "inr";

/// Gateway-side status meaning the money was collected
pub const STATUS_SUCCEEDED: &str = "succeeded";

/// Payment gateway failures
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment intent not found")]
    NotFound,

    #[error("Invalid payment request: {0}")]
    Invalid(String),

    /// The provider rejected the call or could not be reached
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// Intent to collect `amount` minor units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntent {
    pub amount: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

/// Port to an external payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent the client can confirm
    async fn create_intent(&self, request: CreateIntent) -> Result<PaymentIntent, PaymentError>;

    /// Fetch the current state of an intent
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError>;
}
