use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};
use tokio::task::JoinHandle;

use larder_core::completion::LoadingFlag;
use larder_core::models::{MealPlan, Product};

/// Read one finalized transcript line from stdin.
///
/// Speech-to-text tools pipe their output here; the text is taken as-is.
pub(crate) fn read_transcript() -> Result<String> {
    if io::IsTerminal::is_terminal(&io::stdin()) {
        eprint!("Wpisz produkty: ");
        io::stderr().flush()?;
    }
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print a note to stderr each time the loading flag is raised.
pub(crate) fn spawn_loading_indicator(flag: &LoadingFlag) -> JoinHandle<()> {
    let mut rx = flag.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if *rx.borrow_and_update() {
                eprintln!("Generuję...");
            }
        }
    })
}

pub(crate) fn print_product_table(products: &[&Product]) {
    #[derive(Tabled)]
    struct ProductRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Added")]
        added: String,
    }

    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| ProductRow {
            id: p.id,
            name: truncate(&p.name, 40),
            added: date_part(&p.created_at),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_meal_plan_table(plans: &[MealPlan]) {
    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Preview")]
        preview: String,
        #[tabled(rename = "Saved")]
        saved: String,
    }

    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|p| PlanRow {
            id: p.id,
            name: truncate(&p.name, 30),
            preview: truncate(&first_line(&p.content), 50),
            saved: date_part(&p.created_at),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Removing an unknown id is a no-op, so say so instead of claiming a removal.
pub(crate) fn removal_message(kind: &str, id: i64, existed: bool) -> String {
    if existed {
        format!("Removed {kind} {id}")
    } else {
        format!("No {kind} with ID {id}; nothing removed")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

fn first_line(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// `YYYY-MM-DD` from an RFC 3339 timestamp.
fn date_part(ts: &str) -> String {
    ts.split('T').next().unwrap_or(ts).to_string()
}
