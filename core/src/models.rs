use anyhow::bail;
use serde::{Deserialize, Serialize};

/// A pantry item. Ids are assigned by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// A named snapshot of a generated recipe or plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub name: String,
    pub content: String,
}

/// The kinds of meal the assistant can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealIntent {
    Quick,
    Healthy,
    FullDay,
    Breakfast,
    Dinner,
}

pub const MEAL_INTENTS: &[&str] = &["quick", "healthy", "day", "breakfast", "dinner"];

impl MealIntent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealIntent::Quick => "quick",
            MealIntent::Healthy => "healthy",
            MealIntent::FullDay => "day",
            MealIntent::Breakfast => "breakfast",
            MealIntent::Dinner => "dinner",
        }
    }
}

pub fn validate_meal_intent(intent: &str) -> anyhow::Result<MealIntent> {
    match intent.to_lowercase().as_str() {
        "quick" => Ok(MealIntent::Quick),
        "healthy" => Ok(MealIntent::Healthy),
        "day" | "full-day" | "full_day" => Ok(MealIntent::FullDay),
        "breakfast" => Ok(MealIntent::Breakfast),
        "dinner" => Ok(MealIntent::Dinner),
        _ => bail!(
            "Invalid meal intent '{intent}'. Must be one of: {}",
            MEAL_INTENTS.join(", ")
        ),
    }
}
