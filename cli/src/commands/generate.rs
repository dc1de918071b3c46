use anyhow::Result;
use serde_json::{Value, json};
use std::process;

use larder_core::completion::{ChatBackend, CompletionOutcome};
use larder_core::models::{MealIntent, MealPlan, validate_meal_intent};
use larder_core::planner::Planner;
use larder_core::store::PantryStore;

use super::helpers::spawn_loading_indicator;

pub(crate) async fn cmd_generate(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    text: Option<String>,
    intent: &str,
    no_pantry: bool,
    save: Option<String>,
    json: bool,
) -> Result<()> {
    let intent = validate_meal_intent(intent)?;
    planner.set_quick_input(text.as_deref().unwrap_or_default());
    planner.set_include_pantry(!no_pantry);

    let indicator = (!json).then(|| spawn_loading_indicator(planner.loading()));
    let outcome = planner.generate(intent).await;
    if let Some(handle) = indicator {
        handle.abort();
    }

    let saved = match &save {
        Some(name) => planner.save_response_as(name).await?,
        None => None,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&generate_json(intent, &outcome, saved.as_ref()))?
        );
    } else {
        println!("{}", outcome.display_text());
        if let Some(plan) = &saved {
            eprintln!("\nDodano do planu posiłków: {} (id: {})", plan.name, plan.id);
        } else if save.is_some() && outcome.is_completed() {
            eprintln!("\nNot saved: the meal plan name is empty");
        }
    }

    if !outcome.is_completed() {
        process::exit(1);
    }

    Ok(())
}

fn generate_json(
    intent: MealIntent,
    outcome: &CompletionOutcome,
    saved: Option<&MealPlan>,
) -> Value {
    let error = match outcome {
        CompletionOutcome::Failed(e) => Some(e.to_string()),
        CompletionOutcome::Completed(_) => None,
    };
    json!({
        "intent": intent.as_str(),
        "ok": outcome.is_completed(),
        "response": outcome.display_text(),
        "error": error,
        "saved": saved,
    })
}
