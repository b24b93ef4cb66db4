//! # Backend services
//!
//! Typed call-sites over [`ApiClient`](crate::client::ApiClient). Each service
//! owns its endpoint paths and payload types, funnels every call through the
//! client's verb methods, and wraps failures in a message naming the action
//! that failed. The underlying [`ApiError`](crate::error::ApiError) stays
//! reachable with `anyhow::Error::downcast_ref`.
//!
//! Long-running backend work (plan generation, recipe generation, image
//! analysis) carries its own timeout.

pub mod chef;
pub mod diet;
pub mod grocery;
pub mod ingredients;
pub mod pantry;
pub mod recipes;
pub mod subscription;

pub use chef::ChefService;
pub use diet::DietPlanningService;
pub use grocery::GroceryService;
pub use ingredients::IngredientDetectionService;
pub use pantry::PantryService;
pub use recipes::RecipeService;
pub use subscription::SubscriptionService;
