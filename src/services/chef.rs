//! Chef content endpoints

use anyhow::{Context, Result};

use crate::client::{
    types::{ApiEnvelope, Chef, ChefData, ChefsData, Recipe, RecipesData},
    ApiClient,
};

#[derive(Clone)]
pub struct ChefService {
    client: ApiClient,
}

impl ChefService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Featured chefs. Public.
    pub async fn featured(&self) -> Result<Vec<Chef>> {
        let envelope: ApiEnvelope<ChefsData> = self
            .client
            .get("/chefs/featured", false)
            .await
            .context("Failed to load featured chefs")?;

        Ok(envelope
            .into_data()
            .context("Failed to load featured chefs")?
            .chefs)
    }

    pub async fn chef(&self, chef_id: &str) -> Result<Chef> {
        let endpoint = format!("/chefs/{}", urlencoding::encode(chef_id));
        let envelope: ApiEnvelope<ChefData> = self
            .client
            .get(&endpoint, true)
            .await
            .with_context(|| format!("Failed to load chef {}", chef_id))?;

        Ok(envelope
            .into_data()
            .with_context(|| format!("Failed to load chef {}", chef_id))?
            .chef)
    }

    pub async fn recipes(&self, chef_id: &str) -> Result<Vec<Recipe>> {
        let endpoint = format!("/chefs/{}/recipes", urlencoding::encode(chef_id));
        let envelope: ApiEnvelope<RecipesData> = self
            .client
            .get(&endpoint, true)
            .await
            .with_context(|| format!("Failed to load recipes for chef {}", chef_id))?;

        Ok(envelope
            .into_data()
            .with_context(|| format!("Failed to load recipes for chef {}", chef_id))?
            .recipes)
    }
}
