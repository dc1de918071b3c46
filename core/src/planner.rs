//! Application state and the flows that drive it.
//!
//! [`Planner`] caches the pantry and the saved meal plans for display. The
//! store stays the source of truth: every mutation goes to the store first
//! and is then reloaded (or, for batch inserts, patched in) before the
//! cache reflects it.

use anyhow::Result;
use tracing::{debug, info};

use crate::completion::{ChatBackend, CompletionGateway, CompletionOutcome, LoadingFlag};
use crate::models::{MealIntent, MealPlan, Product};
use crate::parse::parse_products;
use crate::prompts::{PromptIntent, compose_prompt};
use crate::store::PantryStore;

/// Shown instead of asking the assistant when the pantry has nothing in it.
pub const PANTRY_EMPTY_MESSAGE: &str = "TWÓJ SPICHLERZ JEST PUSTY MÓJ PANIE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Displaying,
}

/// What a feasibility check produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeasibilityCheck {
    /// The pantry was empty; the assistant was not asked.
    PantryEmpty,
    Answered(CompletionOutcome),
}

impl FeasibilityCheck {
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            FeasibilityCheck::PantryEmpty => PANTRY_EMPTY_MESSAGE,
            FeasibilityCheck::Answered(outcome) => outcome.display_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerState {
    pub products: Vec<Product>,
    pub meal_plans: Vec<MealPlan>,
    pub quick_input: String,
    /// Append the pantry to the ingredient list when generating.
    pub include_pantry: bool,
    pub show_pantry: bool,
    pub show_meal_plans: bool,
    pub expanded_meal_plan: Option<i64>,
    pub response: Option<String>,
    pub last_outcome: Option<CompletionOutcome>,
    pub modal_message: Option<String>,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            meal_plans: Vec::new(),
            quick_input: String::new(),
            include_pantry: true,
            show_pantry: false,
            show_meal_plans: false,
            expanded_meal_plan: None,
            response: None,
            last_outcome: None,
            modal_message: None,
        }
    }
}

pub struct Planner<S, B> {
    store: S,
    gateway: CompletionGateway<B>,
    state: PlannerState,
}

impl<S: PantryStore, B: ChatBackend> Planner<S, B> {
    pub fn new(store: S, gateway: CompletionGateway<B>) -> Self {
        Self {
            store,
            gateway,
            state: PlannerState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn gateway(&self) -> &CompletionGateway<B> {
        &self.gateway
    }

    /// The loading flag shared by the generation and feasibility flows.
    #[must_use]
    pub fn loading(&self) -> &LoadingFlag {
        self.gateway.loading()
    }

    /// Populate both collections from the store.
    pub async fn load(&mut self) -> Result<()> {
        self.reload_products().await?;
        self.reload_meal_plans().await
    }

    pub async fn reload_products(&mut self) -> Result<()> {
        self.state.products = self.store.get_products().await?;
        Ok(())
    }

    pub async fn reload_meal_plans(&mut self) -> Result<()> {
        self.state.meal_plans = self.store.get_meal_plans().await?;
        Ok(())
    }

    // --- Input ---

    pub fn set_quick_input(&mut self, text: &str) {
        self.state.quick_input = text.to_string();
    }

    /// A finalized transcript from speech input replaces the quick input.
    pub fn accept_transcript(&mut self, transcript: &str) {
        self.set_quick_input(transcript);
    }

    pub fn set_include_pantry(&mut self, include: bool) {
        self.state.include_pantry = include;
    }

    // --- Pantry ---

    /// Parse the quick input into products and add each to the pantry.
    ///
    /// Items are inserted one at a time. If an insert fails the error is
    /// returned and the items already inserted stay in the store and in the
    /// cached list. The quick input is cleared only on full success.
    pub async fn add_products_from_input(&mut self) -> Result<Vec<Product>> {
        let names = parse_products(&self.state.quick_input);
        let mut added = Vec::with_capacity(names.len());
        for name in &names {
            let product = self.store.add_product(name).await?;
            self.state.products.push(product.clone());
            added.push(product);
        }
        self.state.quick_input.clear();
        info!(count = added.len(), "added products to pantry");
        Ok(added)
    }

    pub async fn remove_product(&mut self, id: i64) -> Result<()> {
        self.store.remove_product(id).await?;
        self.reload_products().await
    }

    pub async fn clear_pantry(&mut self) -> Result<()> {
        self.store.remove_all_products().await?;
        self.state.products.clear();
        self.reload_products().await
    }

    /// Cached products whose name starts with `search`, ignoring case.
    #[must_use]
    pub fn visible_products(&self, search: &str) -> Vec<&Product> {
        let search = search.to_lowercase();
        self.state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().starts_with(&search))
            .collect()
    }

    pub fn toggle_pantry(&mut self) {
        self.state.show_pantry = !self.state.show_pantry;
    }

    // --- Generation ---

    fn pantry_names(&self) -> Vec<String> {
        self.state.products.iter().map(|p| p.name.clone()).collect()
    }

    /// Ask for a meal built from the quick input (and the pantry, when
    /// included). The displayed response is replaced either way.
    pub async fn generate(&mut self, intent: MealIntent) -> CompletionOutcome {
        let names = self.pantry_names();
        let pantry = self.state.include_pantry.then_some(names.as_slice());
        let prompt = compose_prompt(&self.state.quick_input, pantry, intent.into());
        debug!(intent = intent.as_str(), "generating");

        let outcome = self.gateway.fetch_chat_completion(&prompt).await;
        self.state.response = Some(outcome.display_text().to_string());
        self.state.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Ask again for a quick meal from the same input.
    pub async fn regenerate(&mut self) -> CompletionOutcome {
        self.generate(MealIntent::Quick).await
    }

    /// Drop the quick input and the displayed response.
    pub fn clear(&mut self) {
        self.state.quick_input.clear();
        self.state.response = None;
        self.state.last_outcome = None;
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.loading().is_loading() {
            Phase::Loading
        } else if self.state.response.is_some() {
            Phase::Displaying
        } else {
            Phase::Idle
        }
    }

    // --- Meal plans ---

    /// Save the displayed response under `name`.
    ///
    /// Returns `None` without touching the store when the name is empty or
    /// there is no successfully generated response to save.
    pub async fn save_response_as(&mut self, name: &str) -> Result<Option<MealPlan>> {
        let Some(CompletionOutcome::Completed(content)) = &self.state.last_outcome else {
            return Ok(None);
        };
        if name.is_empty() || content.is_empty() {
            return Ok(None);
        }
        let plan = self.store.add_meal_plan(name, content).await?;
        self.reload_meal_plans().await?;
        info!(id = plan.id, "saved meal plan");
        Ok(Some(plan))
    }

    pub async fn remove_meal_plan(&mut self, id: i64) -> Result<()> {
        self.store.remove_meal_plan(id).await?;
        if self.state.expanded_meal_plan == Some(id) {
            self.state.expanded_meal_plan = None;
        }
        self.reload_meal_plans().await
    }

    pub async fn clear_meal_plans(&mut self) -> Result<()> {
        self.store.remove_all_meal_plans().await?;
        self.state.meal_plans.clear();
        self.state.expanded_meal_plan = None;
        self.reload_meal_plans().await
    }

    pub fn toggle_meal_plans(&mut self) {
        self.state.show_meal_plans = !self.state.show_meal_plans;
    }

    /// Expand the plan, or collapse it if it is already expanded.
    pub fn toggle_meal_plan_expanded(&mut self, id: i64) {
        self.state.expanded_meal_plan = if self.state.expanded_meal_plan == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    // --- Feasibility ---

    /// Ask whether `plan_content` can be cooked from the stored pantry.
    ///
    /// Reads the pantry fresh from the store. An empty pantry
    /// short-circuits without calling the assistant. The answer goes to the
    /// modal message. Shares the loading flag with [`Self::generate`].
    pub async fn check_feasibility(&mut self, plan_content: &str) -> Result<FeasibilityCheck> {
        let loading = self.loading().clone();
        loading.set(true);
        let products = match self.store.get_products().await {
            Ok(products) => products,
            Err(e) => {
                loading.set(false);
                return Err(e);
            }
        };

        let check = if products.is_empty() {
            loading.set(false);
            FeasibilityCheck::PantryEmpty
        } else {
            let names: Vec<String> = products.into_iter().map(|p| p.name).collect();
            let prompt = compose_prompt(
                plan_content,
                Some(names.as_slice()),
                PromptIntent::Feasibility,
            );
            FeasibilityCheck::Answered(self.gateway.fetch_chat_completion(&prompt).await)
        };

        self.state.modal_message = Some(check.display_text().to_string());
        Ok(check)
    }

    pub fn close_modal(&mut self) {
        self.state.modal_message = None;
    }
}
