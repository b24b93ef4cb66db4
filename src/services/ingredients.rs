//! Ingredient detection from photos

use anyhow::{Context, Result};
use std::time::Duration;

use crate::client::{
    types::{ApiEnvelope, DetectedIngredient, DetectionData},
    ApiClient, ApiRequest, MultipartForm,
};

const DETECT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct IngredientDetectionService {
    client: ApiClient,
}

impl IngredientDetectionService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload a photo and get back the ingredients seen in it
    pub async fn detect(
        &self,
        image: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<Vec<DetectedIngredient>> {
        if image.is_empty() {
            anyhow::bail!("Failed to detect ingredients: image is empty");
        }

        tracing::debug!("Uploading {} ({} bytes) for detection", file_name, image.len());
        let form = MultipartForm::new().file("image", image, file_name, Some(mime));

        let envelope: ApiEnvelope<DetectionData> = self
            .client
            .request(
                ApiRequest::post("/ingredients/detect")
                    .form(form)
                    .timeout(DETECT_TIMEOUT),
            )
            .await
            .context("Failed to detect ingredients")?;

        Ok(envelope
            .into_data()
            .context("Failed to detect ingredients")?
            .ingredients)
    }
}
