//! Pantry endpoints

use anyhow::{Context, Result};

use crate::client::{
    types::{ApiEnvelope, Empty, PantryItem, PantryItemData, PantryItemRequest, PantryItemsData},
    ApiClient,
};

#[derive(Clone)]
pub struct PantryService {
    client: ApiClient,
}

impl PantryService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn items(&self) -> Result<Vec<PantryItem>> {
        let envelope: ApiEnvelope<PantryItemsData> = self
            .client
            .get("/pantry", true)
            .await
            .context("Failed to load pantry")?;

        Ok(envelope.into_data().context("Failed to load pantry")?.items)
    }

    /// Items expiring within `days` days
    pub async fn expiring(&self, days: u32) -> Result<Vec<PantryItem>> {
        let endpoint = format!("/pantry/expiring?days={}", days);
        let envelope: ApiEnvelope<PantryItemsData> = self
            .client
            .get(&endpoint, true)
            .await
            .context("Failed to load expiring pantry items")?;

        Ok(envelope
            .into_data()
            .context("Failed to load expiring pantry items")?
            .items)
    }

    pub async fn add_item(&self, request: &PantryItemRequest) -> Result<PantryItem> {
        let envelope: ApiEnvelope<PantryItemData> = self
            .client
            .post("/pantry/items", Some(request), true)
            .await
            .with_context(|| format!("Failed to add {} to pantry", request.name))?;

        Ok(envelope
            .into_data()
            .with_context(|| format!("Failed to add {} to pantry", request.name))?
            .item)
    }

    pub async fn update_item(&self, item_id: &str, request: &PantryItemRequest) -> Result<PantryItem> {
        let endpoint = format!("/pantry/items/{}", urlencoding::encode(item_id));
        let envelope: ApiEnvelope<PantryItemData> = self
            .client
            .put(&endpoint, Some(request), true)
            .await
            .context("Failed to update pantry item")?;

        Ok(envelope
            .into_data()
            .context("Failed to update pantry item")?
            .item)
    }

    pub async fn remove_item(&self, item_id: &str) -> Result<()> {
        let endpoint = format!("/pantry/items/{}", urlencoding::encode(item_id));
        let envelope: ApiEnvelope<Empty> = self
            .client
            .delete(&endpoint, true)
            .await
            .context("Failed to remove pantry item")?;

        envelope.into_data().context("Failed to remove pantry item")?;
        Ok(())
    }
}
