use crate::models::MealIntent;

/// Every prompt template the planner can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptIntent {
    Meal(MealIntent),
    /// Can this saved plan be cooked from what is in the pantry?
    Feasibility,
}

impl From<MealIntent> for PromptIntent {
    fn from(intent: MealIntent) -> Self {
        PromptIntent::Meal(intent)
    }
}

/// The ingredient list sent with a meal request: the free text, followed by
/// the pantry names when `pantry` is given.
#[must_use]
pub fn ingredient_list(free_text: &str, pantry: Option<&[String]>) -> String {
    match pantry {
        Some(names) => format!("{free_text}, {}", names.join(", ")),
        None => free_text.to_string(),
    }
}

/// Build the prompt for `intent`.
///
/// For meal intents `text` is the user's free text; for
/// [`PromptIntent::Feasibility`] it is the saved plan's content and the
/// pantry is always listed. Nothing is escaped or truncated.
#[must_use]
pub fn compose_prompt(text: &str, pantry: Option<&[String]>, intent: PromptIntent) -> String {
    match intent {
        PromptIntent::Meal(meal) => {
            let ingredients = ingredient_list(text, pantry);
            let ask = match meal {
                MealIntent::Quick => "podaj mi prosty i szybki przepis do zrobienia.",
                MealIntent::Healthy => {
                    "podaj mi prosty i ZDROWY przepis do zrobienia, i dorzuć jakąś przyjacielską zdrowostkę."
                }
                MealIntent::FullDay => {
                    "podaj mi jadłospis na cały dzień. jeśli składników jest za mało zasugeruj coś na zakupy"
                }
                MealIntent::Breakfast => "podaj mi prosty i smaczny przepis na super śniadanie",
                MealIntent::Dinner => "podaj mi prosty przepis na jakiś smaczny ciepły syty obiadek",
            };
            format!("Bazując na tych składnikach: {ingredients}, {ask}")
        }
        PromptIntent::Feasibility => {
            let names = pantry.map(|n| n.join(", ")).unwrap_or_default();
            format!(
                "Czy mogę wykonać ten przepis: {text} bazując na składnikach, które mam w moim spichlerzu: {names}. odpisz krótko i na temat, w razie braku składników zasugeruj co dokupić. krótka wiadomość"
            )
        }
    }
}
