use anyhow::Result;
use std::process;

use larder_core::completion::ChatBackend;
use larder_core::models::MealPlan;
use larder_core::planner::{FeasibilityCheck, Planner};
use larder_core::store::PantryStore;

use super::helpers::{json_error, print_meal_plan_table, removal_message, spawn_loading_indicator};

pub(crate) fn cmd_plans_list(
    planner: &Planner<impl PantryStore, impl ChatBackend>,
    json: bool,
) -> Result<()> {
    let plans = &planner.state().meal_plans;

    if json {
        println!("{}", serde_json::to_string_pretty(plans)?);
    } else if plans.is_empty() {
        eprintln!("No saved meal plans. Use `larder generate --save NAME` to keep one.");
    } else {
        print_meal_plan_table(plans);
    }

    Ok(())
}

/// Look a plan up in the loaded list, exiting with status 2 if absent.
fn find_plan_or_exit(
    planner: &Planner<impl PantryStore, impl ChatBackend>,
    id: i64,
    json: bool,
) -> MealPlan {
    if let Some(plan) = planner.state().meal_plans.iter().find(|p| p.id == id) {
        return plan.clone();
    }
    if json {
        println!("{}", json_error(&format!("Meal plan {id} not found")));
    } else {
        eprintln!("Meal plan {id} not found");
    }
    process::exit(2);
}

pub(crate) fn cmd_plans_show(
    planner: &Planner<impl PantryStore, impl ChatBackend>,
    id: i64,
    json: bool,
) -> Result<()> {
    let plan = find_plan_or_exit(planner, id, json);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}\n", plan.name);
        println!("{}", plan.content);
    }

    Ok(())
}

pub(crate) async fn cmd_plans_remove(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    id: i64,
    json: bool,
) -> Result<()> {
    let existed = planner.state().meal_plans.iter().any(|p| p.id == id);
    planner.remove_meal_plan(id).await?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "removed": existed }));
    } else {
        println!("{}", removal_message("meal plan", id, existed));
    }

    Ok(())
}

pub(crate) async fn cmd_plans_clear(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    json: bool,
) -> Result<()> {
    let count = planner.state().meal_plans.len();
    planner.clear_meal_plans().await?;

    if json {
        println!("{}", serde_json::json!({ "cleared": count }));
    } else {
        println!("Meal plans cleared ({count} removed)");
    }

    Ok(())
}

/// Ask whether a saved plan can be cooked from what is in the pantry.
pub(crate) async fn cmd_plans_check(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    id: i64,
    json: bool,
) -> Result<()> {
    let plan = find_plan_or_exit(planner, id, json);

    let indicator = (!json).then(|| spawn_loading_indicator(planner.loading()));
    let check = planner.check_feasibility(&plan.content).await;
    if let Some(handle) = indicator {
        handle.abort();
    }
    let check = check?;

    let ok = match &check {
        FeasibilityCheck::PantryEmpty => true,
        FeasibilityCheck::Answered(outcome) => outcome.is_completed(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "plan_id": plan.id,
                "ok": ok,
                "pantry_empty": check == FeasibilityCheck::PantryEmpty,
                "message": check.display_text(),
            }))?
        );
    } else {
        println!("{}", check.display_text());
    }
    planner.close_modal();

    if !ok {
        process::exit(1);
    }

    Ok(())
}
