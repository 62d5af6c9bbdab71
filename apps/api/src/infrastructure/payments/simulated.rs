use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::payments::{
    CreateIntent, PaymentError, PaymentGateway, PaymentIntent, STATUS_SUCCEEDED,
};

/// Local gateway whose intents are confirmed as soon as they are created
#[derive(Clone, Default)]
pub struct SimulatedGateway {
    intents: Arc<Mutex<HashMap<String, PaymentIntent>>>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force an intent into `status`, e.g. to simulate a declined card
    pub async fn set_status(&self, id: &str, status: &str) -> Result<(), PaymentError> {
        let mut intents = self.intents.lock().await;
        let intent = intents.get_mut(id).ok_or(PaymentError::NotFound)?;
        intent.status = status.to_string();
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_intent(&self, request: CreateIntent) -> Result<PaymentIntent, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::Invalid("Amount must be positive".to_string()));
        }
        let id = format!("pi_sim_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret_{}", Uuid::new_v4().simple()),
            id: id.clone(),
            amount: request.amount,
            currency: request.currency,
            status: STATUS_SUCCEEDED.to_string(),
            metadata: request.metadata,
        };
        tracing::debug!(intent_id = %id, amount = intent.amount, "Simulated payment intent created");
        self.intents.lock().await.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        self.intents
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(PaymentError::NotFound)
    }
}
