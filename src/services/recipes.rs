//! Recipe endpoints, including AI recipe generation

use anyhow::{Context, Result};
use std::time::Duration;

use crate::client::{
    types::{
        ApiEnvelope, CategoriesData, Category, Empty, GenerateRecipeRequest, Recipe, RecipeData,
        RecipesData,
    },
    ApiClient, ApiRequest,
};

const GENERATE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Clone)]
pub struct RecipeService {
    client: ApiClient,
}

impl RecipeService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Recipe categories. Public, works signed out.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let envelope: ApiEnvelope<CategoriesData> = self
            .client
            .get("/recipes/categories", false)
            .await
            .context("Failed to load recipe categories")?;

        Ok(envelope
            .into_data()
            .context("Failed to load recipe categories")?
            .categories)
    }

    pub async fn search(&self, query: &str, limit: Option<u32>) -> Result<Vec<Recipe>> {
        let mut endpoint = format!("/recipes/search?q={}", urlencoding::encode(query));
        if let Some(l) = limit {
            endpoint.push_str(&format!("&limit={}", l));
        }

        let envelope: ApiEnvelope<RecipesData> = self
            .client
            .get(&endpoint, true)
            .await
            .context("Failed to search recipes")?;

        Ok(envelope
            .into_data()
            .context("Failed to search recipes")?
            .recipes)
    }

    pub async fn recipe(&self, recipe_id: &str) -> Result<Recipe> {
        let endpoint = format!("/recipes/{}", urlencoding::encode(recipe_id));
        let envelope: ApiEnvelope<RecipeData> = self
            .client
            .get(&endpoint, true)
            .await
            .with_context(|| format!("Failed to load recipe {}", recipe_id))?;

        Ok(envelope
            .into_data()
            .with_context(|| format!("Failed to load recipe {}", recipe_id))?
            .recipe)
    }

    pub async fn generate(&self, request: &GenerateRecipeRequest) -> Result<Recipe> {
        tracing::info!(
            "Generating recipe from {} ingredients",
            request.ingredients.len()
        );

        let body = self.client.json_body(Some(request))?;
        let envelope: ApiEnvelope<RecipeData> = self
            .client
            .request(
                ApiRequest::post("/recipes/generate")
                    .body(body)
                    .timeout(GENERATE_TIMEOUT),
            )
            .await
            .context("Failed to generate recipe")?;

        Ok(envelope
            .into_data()
            .context("Failed to generate recipe")?
            .recipe)
    }

    pub async fn save(&self, recipe_id: &str) -> Result<()> {
        let endpoint = format!("/recipes/{}/save", urlencoding::encode(recipe_id));
        let envelope: ApiEnvelope<Empty> = self
            .client
            .post(&endpoint, None::<&()>, true)
            .await
            .context("Failed to save recipe")?;

        envelope.into_data().context("Failed to save recipe")?;
        Ok(())
    }
}
