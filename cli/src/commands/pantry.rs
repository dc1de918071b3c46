use anyhow::{Result, bail};

use larder_core::completion::ChatBackend;
use larder_core::planner::Planner;
use larder_core::store::PantryStore;

use super::helpers::{print_product_table, read_transcript, removal_message};

/// Parse free text (or a transcript from stdin) into products and store them.
pub(crate) async fn cmd_add(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    text: Option<String>,
    json: bool,
) -> Result<()> {
    match text {
        Some(t) => planner.set_quick_input(&t),
        None => planner.accept_transcript(&read_transcript()?),
    }
    if planner.state().quick_input.trim().is_empty() {
        bail!("Nothing to add. Type some products, e.g. `larder add \"jajka mleko\"`");
    }

    let added = planner.add_products_from_input().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        let names: Vec<&str> = added.iter().map(|p| p.name.as_str()).collect();
        println!("Dodano do spichlerza: {}", names.join(", "));
    }

    Ok(())
}

pub(crate) fn cmd_pantry_list(
    planner: &Planner<impl PantryStore, impl ChatBackend>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let products = planner.visible_products(search.unwrap_or_default());

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else if products.is_empty() {
        if search.is_some() {
            eprintln!("No products match '{}'", search.unwrap_or_default());
        } else {
            eprintln!("Pantry is empty. Use `larder add` to stock it.");
        }
    } else {
        print_product_table(&products);
    }

    Ok(())
}

pub(crate) async fn cmd_pantry_remove(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    id: i64,
    json: bool,
) -> Result<()> {
    let existed = planner.state().products.iter().any(|p| p.id == id);
    planner.remove_product(id).await?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "removed": existed }));
    } else {
        println!("{}", removal_message("product", id, existed));
    }

    Ok(())
}

pub(crate) async fn cmd_pantry_clear(
    planner: &mut Planner<impl PantryStore, impl ChatBackend>,
    json: bool,
) -> Result<()> {
    let count = planner.state().products.len();
    planner.clear_pantry().await?;

    if json {
        println!("{}", serde_json::json!({ "cleared": count }));
    } else {
        println!("Pantry cleared ({count} products removed)");
    }

    Ok(())
}
