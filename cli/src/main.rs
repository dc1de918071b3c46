mod commands;
mod completion;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_add, cmd_generate, cmd_pantry_clear, cmd_pantry_list, cmd_pantry_remove, cmd_plans_check,
    cmd_plans_clear, cmd_plans_list, cmd_plans_remove, cmd_plans_show,
};
use crate::completion::ChatCompletionClient;
use crate::config::Config;
use larder_core::completion::CompletionGateway;
use larder_core::planner::Planner;
use larder_core::store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "Keep a pantry and ask an assistant what to cook from it",
    long_about = "\n\n  ██╗      █████╗ ██████╗ ██████╗ ███████╗██████╗
  ██║     ██╔══██╗██╔══██╗██╔══██╗██╔════╝██╔══██╗
  ██║     ███████║██████╔╝██║  ██║█████╗  ██████╔╝
  ██║     ██╔══██║██╔══██╗██║  ██║██╔══╝  ██╔══██╗
  ███████╗██║  ██║██║  ██║██████╔╝███████╗██║  ██║
  ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═╝
        cook what you already have.
"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add products to the pantry from free text (reads stdin when omitted)
    Add {
        /// Products, e.g. "jajka mleko oliwa z oliwek"
        text: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage pantry products
    Pantry {
        #[command(subcommand)]
        command: PantryCommands,
    },
    /// Ask for a meal idea from free text and the pantry
    Generate {
        /// Extra ingredients or wishes
        text: Option<String>,
        /// Kind of meal: quick, healthy, day, breakfast, dinner
        #[arg(short, long, default_value = "quick")]
        intent: String,
        /// Leave pantry products out of the prompt
        #[arg(long)]
        no_pantry: bool,
        /// Save the response as a meal plan with this name
        #[arg(long, value_name = "NAME")]
        save: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage saved meal plans
    Plans {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
enum PantryCommands {
    /// List pantry products
    List {
        /// Only show products whose name starts with this text
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a product by ID
    Remove {
        /// Product ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every product
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// List saved meal plans
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a meal plan in full
    Show {
        /// Meal plan ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a meal plan by ID
    Remove {
        /// Meal plan ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every meal plan
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask whether a meal plan can be cooked from the pantry
    Check {
        /// Meal plan ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn needs_completion(&self) -> bool {
        matches!(
            self,
            Commands::Generate { .. }
                | Commands::Plans {
                    command: PlanCommands::Check { .. }
                }
        )
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = SqliteStore::open(&config.db_path)?;

    // Only commands that talk to the completion endpoint require a key.
    let api_key = if cli.command.needs_completion() {
        config.api_key()?
    } else {
        config.api_key().unwrap_or_default()
    };
    let client = ChatCompletionClient::new(&config.api_url, &api_key)?;
    let gateway = CompletionGateway::new(client, &config.model);

    let mut planner = Planner::new(store, gateway);
    planner.load().await?;

    match cli.command {
        Commands::Add { text, json } => cmd_add(&mut planner, text, json).await,
        Commands::Pantry { command } => match command {
            PantryCommands::List { search, json } => {
                cmd_pantry_list(&planner, search.as_deref(), json)
            }
            PantryCommands::Remove { id, json } => cmd_pantry_remove(&mut planner, id, json).await,
            PantryCommands::Clear { json } => cmd_pantry_clear(&mut planner, json).await,
        },
        Commands::Generate {
            text,
            intent,
            no_pantry,
            save,
            json,
        } => cmd_generate(&mut planner, text, &intent, no_pantry, save, json).await,
        Commands::Plans { command } => match command {
            PlanCommands::List { json } => cmd_plans_list(&planner, json),
            PlanCommands::Show { id, json } => cmd_plans_show(&planner, id, json),
            PlanCommands::Remove { id, json } => cmd_plans_remove(&mut planner, id, json).await,
            PlanCommands::Clear { json } => cmd_plans_clear(&mut planner, json).await,
            PlanCommands::Check { id, json } => cmd_plans_check(&mut planner, id, json).await,
        },
    }
}
