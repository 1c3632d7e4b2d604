pub mod item;
pub mod plan;

pub use item::{MealCategory, MealPlanItem};
pub use plan::MealPlan;
