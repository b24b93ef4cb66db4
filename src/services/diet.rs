//! Diet planning endpoints

use anyhow::{Context, Result};
use std::time::Duration;

use crate::client::{
    types::{
        ActivePlanData, ApiEnvelope, DietPlan, Empty, GenerateDietPlanRequest, GeneratedPlanData,
        PlanListData,
    },
    ApiClient, ApiRequest,
};

/// Plan generation runs a model on the backend and routinely takes a minute
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct DietPlanningService {
    client: ApiClient,
}

impl DietPlanningService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The plan the user is currently following, if any
    pub async fn active_plan(&self) -> Result<Option<DietPlan>> {
        let envelope: ApiEnvelope<ActivePlanData> = self
            .client
            .get("/diet-planning/active", true)
            .await
            .context("Failed to load active diet plan")?;

        Ok(envelope
            .into_data()
            .context("Failed to load active diet plan")?
            .plan)
    }

    pub async fn generate_plan(&self, request: &GenerateDietPlanRequest) -> Result<DietPlan> {
        tracing::info!(
            "Generating {}-day diet plan for goal: {}",
            request.duration_days,
            request.goal
        );

        let body = self.client.json_body(Some(request))?;
        let envelope: ApiEnvelope<GeneratedPlanData> = self
            .client
            .request(
                ApiRequest::post("/diet-planning/generate")
                    .body(body)
                    .timeout(GENERATE_TIMEOUT),
            )
            .await
            .context("Failed to generate diet plan")?;

        let plan = envelope
            .into_data()
            .context("Failed to generate diet plan")?
            .plan;
        tracing::info!("Generated diet plan {}", plan.plan_id);
        Ok(plan)
    }

    pub async fn list_plans(&self) -> Result<Vec<DietPlan>> {
        let envelope: ApiEnvelope<PlanListData> = self
            .client
            .get("/diet-planning/plans", true)
            .await
            .context("Failed to list diet plans")?;

        Ok(envelope
            .into_data()
            .context("Failed to list diet plans")?
            .plans)
    }

    pub async fn delete_plan(&self, plan_id: &str) -> Result<()> {
        let endpoint = format!("/diet-planning/plans/{}", urlencoding::encode(plan_id));
        let envelope: ApiEnvelope<Empty> = self
            .client
            .delete(&endpoint, true)
            .await
            .with_context(|| format!("Failed to delete diet plan {}", plan_id))?;

        envelope
            .into_data()
            .with_context(|| format!("Failed to delete diet plan {}", plan_id))?;
        Ok(())
    }
}
