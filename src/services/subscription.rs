//! Subscription and checkout endpoints

use anyhow::{Context, Result};

use crate::client::{
    types::{
        ApiEnvelope, CheckoutData, CheckoutRequest, CheckoutSession, Empty, PlansData,
        StatusData, SubscriptionPlan, SubscriptionStatus,
    },
    ApiClient,
};

#[derive(Clone)]
pub struct SubscriptionService {
    client: ApiClient,
}

impl SubscriptionService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Available plans. Public, shown on the paywall before sign-in.
    pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let envelope: ApiEnvelope<PlansData> = self
            .client
            .get("/subscription/plans", false)
            .await
            .context("Failed to load subscription plans")?;

        Ok(envelope
            .into_data()
            .context("Failed to load subscription plans")?
            .plans)
    }

    pub async fn status(&self) -> Result<SubscriptionStatus> {
        let envelope: ApiEnvelope<StatusData> = self
            .client
            .get("/subscription/status", true)
            .await
            .context("Failed to load subscription status")?;

        Ok(envelope
            .into_data()
            .context("Failed to load subscription status")?
            .subscription)
    }

    pub async fn checkout(&self, plan_id: &str) -> Result<CheckoutSession> {
        let request = CheckoutRequest { plan_id };
        let envelope: ApiEnvelope<CheckoutData> = self
            .client
            .post("/subscription/checkout", Some(&request), true)
            .await
            .context("Failed to start checkout")?;

        Ok(envelope
            .into_data()
            .context("Failed to start checkout")?
            .session)
    }

    pub async fn cancel(&self) -> Result<()> {
        let envelope: ApiEnvelope<Empty> = self
            .client
            .post("/subscription/cancel", None::<&()>, true)
            .await
            .context("Failed to cancel subscription")?;

        envelope
            .into_data()
            .context("Failed to cancel subscription")?;
        Ok(())
    }
}
