//! Splitting free-text pantry input into individual products.
//!
//! Known multi-word items are matched first, on text with diacritics
//! stripped and case folded, and cut out of the input. Whatever remains is
//! split on whitespace. Matching is a plain substring search, so a known
//! item also matches inside a longer word ("ryż" inside "ryżem"), leaving
//! the rest of that word behind as its own token.

use unicode_normalization::UnicodeNormalization;

/// Ingredient names recognised as a single product even when they span
/// several words. Checked in order.
pub const KNOWN_PRODUCTS: &[&str] = &[
    "oliwa z oliwek",
    "olej rzepakowy",
    "sos sojowy",
    "mleko kokosowe",
    "mleko roślinne",
    "śmietana 18%",
    "ser żółty",
    "ser biały",
    "ser feta",
    "serek wiejski",
    "jogurt naturalny",
    "pierś z kurczaka",
    "mięso mielone",
    "koncentrat pomidorowy",
    "pomidory z puszki",
    "czerwona fasola",
    "zielony groszek",
    "papryka czerwona",
    "czosnek niedźwiedzi",
    "płatki owsiane",
    "kasza gryczana",
    "kasza jaglana",
    "makaron pełnoziarnisty",
    "chleb żytni",
    "masło orzechowe",
    "kurczak",
    "wołowina",
    "wieprzowina",
    "łosoś",
    "tuńczyk",
    "jajka",
    "ryż",
    "makaron",
    "ziemniaki",
    "marchew",
    "cebula",
    "czosnek",
    "pomidor",
    "ogórek",
    "brokuł",
    "szpinak",
    "pieczarki",
    "mleko",
    "masło",
    "mąka",
];

/// Strip combining diacritics (U+0300..=U+036F after NFD) and lowercase.
///
/// Letters that NFD does not decompose, such as `ł`, are kept as-is.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Parse `input` against [`KNOWN_PRODUCTS`].
#[must_use]
pub fn parse_products(input: &str) -> Vec<String> {
    parse_products_with(input, KNOWN_PRODUCTS)
}

/// Parse `input` into product names.
///
/// Known items are returned with their original spelling; leftover tokens
/// are returned normalized.
#[must_use]
pub fn parse_products_with(input: &str, known: &[&str]) -> Vec<String> {
    let mut remaining = normalize_text(input);
    let mut products = Vec::new();

    for item in known {
        let normalized = normalize_text(item);
        if normalized.is_empty() {
            continue;
        }
        if remaining.contains(&normalized) {
            products.push((*item).to_string());
            remaining = remaining.replace(&normalized, "");
        }
    }

    products.extend(remaining.split_whitespace().map(str::to_string));
    products
}
