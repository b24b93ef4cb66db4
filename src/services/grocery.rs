//! Grocery list endpoints

use anyhow::{Context, Result};
use std::time::Duration;

use crate::client::{
    types::{
        AddGroceryItemsRequest, ApiEnvelope, Empty, GroceryItem, GroceryItemData, GroceryItemsData,
        NewGroceryItem, UpdateGroceryItemRequest,
    },
    ApiClient, ApiRequest,
};

const FROM_PLAN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct GroceryService {
    client: ApiClient,
}

impl GroceryService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<GroceryItem>> {
        let envelope: ApiEnvelope<GroceryItemsData> = self
            .client
            .get("/grocery", true)
            .await
            .context("Failed to load grocery list")?;

        Ok(envelope
            .into_data()
            .context("Failed to load grocery list")?
            .items)
    }

    pub async fn add_items(&self, items: &[NewGroceryItem]) -> Result<Vec<GroceryItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let request = AddGroceryItemsRequest { items };
        let envelope: ApiEnvelope<GroceryItemsData> = self
            .client
            .post("/grocery/items", Some(&request), true)
            .await
            .context("Failed to add grocery items")?;

        Ok(envelope
            .into_data()
            .context("Failed to add grocery items")?
            .items)
    }

    pub async fn set_checked(&self, item_id: &str, checked: bool) -> Result<GroceryItem> {
        let endpoint = format!("/grocery/items/{}", urlencoding::encode(item_id));
        let request = UpdateGroceryItemRequest { checked };
        let envelope: ApiEnvelope<GroceryItemData> = self
            .client
            .put(&endpoint, Some(&request), true)
            .await
            .context("Failed to update grocery item")?;

        Ok(envelope
            .into_data()
            .context("Failed to update grocery item")?
            .item)
    }

    pub async fn remove_item(&self, item_id: &str) -> Result<()> {
        let endpoint = format!("/grocery/items/{}", urlencoding::encode(item_id));
        let envelope: ApiEnvelope<Empty> = self
            .client
            .delete(&endpoint, true)
            .await
            .context("Failed to remove grocery item")?;

        envelope.into_data().context("Failed to remove grocery item")?;
        Ok(())
    }

    /// Build grocery items for everything a diet plan needs that the pantry lacks
    pub async fn from_plan(&self, plan_id: &str) -> Result<Vec<GroceryItem>> {
        let endpoint = format!("/grocery/from-plan/{}", urlencoding::encode(plan_id));
        let envelope: ApiEnvelope<GroceryItemsData> = self
            .client
            .request(ApiRequest::post(endpoint).timeout(FROM_PLAN_TIMEOUT))
            .await
            .with_context(|| format!("Failed to build grocery list from plan {}", plan_id))?;

        Ok(envelope
            .into_data()
            .with_context(|| format!("Failed to build grocery list from plan {}", plan_id))?
            .items)
    }
}
