use pantry_api_client::client::{IdentityProvider, RefreshTokenSession, StaticSession};
use pantry_api_client::{ApiClient, ClientConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!("Using API at {}", config.base_url);

    let identity: Arc<dyn IdentityProvider> = match RefreshTokenSession::from_env() {
        Some(session) => {
            tracing::info!("Using refresh-token session from PANTRY_REFRESH_TOKEN");
            Arc::new(session)
        }
        None => {
            tracing::info!("No session configured, only public endpoints will work");
            Arc::new(StaticSession::signed_out())
        }
    };

    let client = ApiClient::with_config(config, identity.clone())?;

    // Public endpoint: must work with or without a session
    match client.subscription().plans().await {
        Ok(plans) => {
            tracing::info!("Backend reachable, {} subscription plans", plans.len());
            for plan in &plans {
                tracing::info!("  {} - {:.2} {}", plan.name, plan.price, plan.currency);
            }
        }
        Err(e) => {
            tracing::error!("Failed to reach backend: {:#}", e);
            tracing::error!("Please verify:");
            tracing::error!("  - PANTRY_API_URL is correct: {}", client.base_url());
            tracing::error!("  - The backend is running and accessible");
            std::process::exit(1);
        }
    }

    let Some(user) = identity.current_user().await else {
        return Ok(());
    };

    tracing::info!("Testing authenticated access for user {}...", user.uid);
    match client.diet_planning().active_plan().await {
        Ok(Some(plan)) => {
            tracing::info!(
                "Active diet plan: {} ({} days)",
                plan.name.as_deref().unwrap_or(&plan.plan_id),
                plan.days.len()
            );
        }
        Ok(None) => tracing::info!("No active diet plan"),
        Err(e) => {
            tracing::error!("Authenticated request failed: {:#}", e);
            tracing::error!("  - Check PANTRY_REFRESH_TOKEN and PANTRY_API_KEY");
            tracing::error!("  - Check PANTRY_TOKEN_URL if using a custom token service");
            std::process::exit(1);
        }
    }

    Ok(())
}
