//! Type definitions for the backend API.
//!
//! Request and response payloads for diet planning, the pantry, grocery
//! lists, recipes, subscriptions, ingredient detection and chef content.
//!
//! ## Key Types
//!
//! - [`ApiEnvelope`] - the `{ success, ... }` wrapper every service answers with
//! - [`DietPlan`] - a generated multi-day meal plan
//! - [`PantryItem`] / [`GroceryItem`] - what the user has and what they need
//! - [`Recipe`] - a stored or AI-generated recipe
//!
//! ## API Compatibility
//!
//! The backend speaks camelCase JSON and omits fields freely, so nearly every
//! field is optional or defaulted. Only identifiers are required.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Response wrapper shared by the backend services.
///
/// `data` holds the service-specific fields that sit next to `success` in the
/// same JSON object.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    /// The payload, or the server's explanation when `success` is false
    pub fn into_data(self) -> anyhow::Result<T> {
        if self.success {
            return Ok(self.data);
        }
        let reason = self
            .error
            .or(self.message)
            .unwrap_or_else(|| "server reported failure without a message".to_string());
        anyhow::bail!(reason)
    }
}

/// Envelope payload with nothing besides `success`/`message`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

// Diet planning

/// A generated diet plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub plan_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// e.g. "weight_loss", "muscle_gain", "maintenance"
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub daily_calories: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub days: Vec<PlanDay>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day: u32,
    #[serde(default)]
    pub meals: Vec<PlannedMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    pub title: String,
    #[serde(default)]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDietPlanRequest {
    pub goal: String,
    pub duration_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals_per_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergies: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivePlanData {
    #[serde(default)]
    pub plan: Option<DietPlan>,
}

#[derive(Debug, Deserialize)]
pub struct PlanListData {
    #[serde(default)]
    pub plans: Vec<DietPlan>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedPlanData {
    pub plan: DietPlan,
}

// Pantry

/// An item the user has at home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PantryItemsData {
    #[serde(default)]
    pub items: Vec<PantryItem>,
}

#[derive(Debug, Deserialize)]
pub struct PantryItemData {
    pub item: PantryItem,
}

// Grocery list

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub checked: bool,
    /// Set when the item was derived from a diet plan
    #[serde(default)]
    pub source_plan_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroceryItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddGroceryItemsRequest<'a> {
    pub items: &'a [NewGroceryItem],
}

#[derive(Debug, Serialize)]
pub struct UpdateGroceryItemRequest {
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct GroceryItemsData {
    #[serde(default)]
    pub items: Vec<GroceryItem>,
}

#[derive(Debug, Deserialize)]
pub struct GroceryItemData {
    pub item: GroceryItem,
}

// Recipes

/// A recipe, either stored or freshly generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub name: String,
    /// Free text, e.g. "1 1/2"
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Per-serving nutrition facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cook_time_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Let the backend pull in items from the user's pantry
    #[serde(default)]
    pub use_pantry: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesData {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct RecipesData {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeData {
    pub recipe: Recipe,
}

// Subscription

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// "month" or "year"
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub active: bool,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub plan_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PlansData {
    #[serde(default)]
    pub plans: Vec<SubscriptionPlan>,
}

#[derive(Debug, Deserialize)]
pub struct StatusData {
    pub subscription: SubscriptionStatus,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutData {
    pub session: CheckoutSession,
}

// Ingredient detection

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIngredient {
    pub name: String,
    /// 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetectionData {
    #[serde(default)]
    pub ingredients: Vec<DetectedIngredient>,
}

// Chef content

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub recipe_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChefsData {
    #[serde(default)]
    pub chefs: Vec<Chef>,
}

#[derive(Debug, Deserialize)]
pub struct ChefData {
    pub chef: Chef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_flattens_service_fields() {
        let envelope: ApiEnvelope<ActivePlanData> =
            serde_json::from_str(r#"{"success":true,"plan":{"planId":"p1"}}"#).unwrap();
        let plan = envelope.into_data().unwrap().plan.unwrap();
        assert_eq!(plan.plan_id, "p1");
        assert!(plan.days.is_empty());
    }

    #[test]
    fn failed_envelope_prefers_error_over_message() {
        let envelope: ApiEnvelope<Empty> = serde_json::from_str(
            r#"{"success":false,"message":"try again","error":"quota exceeded"}"#,
        )
        .unwrap();
        let err = envelope.into_data().unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }
}
