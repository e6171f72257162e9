//! Prompt text built from catalog records, and tidying of model output.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::catalog::normalizer::{detail_text, CURRENT_PRICE_KEY, OVERALL_RATING_KEY};
use crate::catalog::LaptopRecord;
use crate::recommend::{matcher, ConstraintSet};

pub const MAX_RELEVANT: usize = 10;
pub const FALLBACK_COUNT: usize = 5;
const CONTEXT_PREVIEW_CHARS: usize = 200;
const NOT_LISTED: &str = "N/A";

pub const CHAT_SYSTEM_PROMPT: &str = "You are a laptop expert assistant specializing in business laptops from Lenovo and HP.

Available laptop data:
{laptops}

FORMATTING RULES:
1. Use bullet points (•) for lists, not paragraphs
2. Use numbered lists (1., 2., 3.) for step-by-step information
3. Keep each bullet point short (1-2 lines)
4. Only use **bold** for section titles and laptop names
5. Maximum 200 words total
6. Format prices as $XXX
7. Use line breaks between sections

Answer user questions about laptops, specifications, comparisons, and recommendations.";

pub const RECOMMEND_SYSTEM_PROMPT: &str = "You are a laptop recommendation expert specializing in business laptops. Based on the user's constraints and available laptops, provide recommendations.

User constraints:
{constraints}

Available laptops:
{laptops}

Format your response as follows:
**Top Recommendations:**

**1. [Brand] [Model] - $[Price]**
• **Why it fits:** [Brief rationale]
• **Key specs:** [Processor, RAM, Storage, Display]
• **Pros:** [Main advantages]
• **Cons:** [Any drawbacks]

[Continue for 3-5 recommendations]

**Summary:** [Brief overall recommendation based on their needs]

Keep each recommendation concise but informative.";

/// Records that pass the price and rating bounds and, when a brand is set,
/// carry it in their brand name. Load order is kept.
pub fn recommendation_candidates<'a>(
    constraints: &ConstraintSet,
    records: &'a [LaptopRecord],
) -> Vec<&'a LaptopRecord> {
    let brand = constraints.brand.as_deref().map(str::to_lowercase);
    records
        .iter()
        .filter(|record| matcher::is_hard_eligible(record, constraints))
        .filter(|record| {
            brand
                .as_deref()
                .map_or(true, |brand| record.brand.to_lowercase().contains(brand))
        })
        .collect()
}

fn number_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// One `Label: value` line per set constraint.
pub fn constraints_summary(constraints: &ConstraintSet) -> String {
    [
        ("Brand", constraints.brand.clone()),
        ("Max Price", constraints.max_price.map(number_text)),
        ("Min Rating", constraints.min_rating.map(number_text)),
        ("Processor Type", constraints.processor_type.clone()),
        ("Min Memory", constraints.min_memory.clone()),
        ("Storage Type", constraints.storage_type.clone()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|value| format!("{label}: {value}")))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn recommendation_prompt(constraints_summary: &str, laptop_context: &str) -> String {
    RECOMMEND_SYSTEM_PROMPT
        .replace("{constraints}", constraints_summary)
        .replace("{laptops}", laptop_context)
}

pub fn recommendation_query(constraints_summary: &str) -> String {
    format!("Please recommend laptops based on these constraints: {constraints_summary}")
}

/// Records whose brand and at least one model word appear in the query,
/// de-duplicated by brand and model, capped at [`MAX_RELEVANT`]. Falls back
/// to the first [`FALLBACK_COUNT`] records when nothing matches.
pub fn relevant_laptops<'a>(query: &str, records: &'a [LaptopRecord]) -> Vec<&'a LaptopRecord> {
    let query = query.to_lowercase();
    let mut seen = HashSet::new();

    let relevant: Vec<&LaptopRecord> = records
        .iter()
        .filter(|record| {
            let brand = record.brand.to_lowercase();
            let model = record.model.to_lowercase();
            !brand.is_empty()
                && query.contains(&brand)
                && model.split_whitespace().any(|word| query.contains(word))
        })
        .filter(|record| seen.insert((record.brand.clone(), record.model.clone())))
        .take(MAX_RELEVANT)
        .collect();

    if relevant.is_empty() {
        records.iter().take(FALLBACK_COUNT).collect()
    } else {
        relevant
    }
}

fn field<'a>(value: &'a Option<String>) -> &'a str {
    value.as_deref().unwrap_or(NOT_LISTED)
}

pub fn laptop_context(records: &[&LaptopRecord]) -> String {
    let mut context = String::new();
    for (position, record) in records.iter().enumerate() {
        if position > 0 {
            context.push('\n');
        }
        let price = detail_text(&record.price_details, CURRENT_PRICE_KEY);
        let rating = detail_text(&record.review_details, OVERALL_RATING_KEY);
        let _ = write!(
            context,
            "Laptop {}:\nBrand: {}\nModel: {}\nProcessor: {}\nMemory: {}\nStorage: {}\nDisplay: {}\nPrice: {}\nReviews: {}\n---\n",
            position + 1,
            record.brand,
            record.model,
            field(&record.processor),
            field(&record.memory),
            field(&record.storage),
            field(&record.display),
            price.as_deref().unwrap_or(NOT_LISTED),
            rating.as_deref().unwrap_or(NOT_LISTED),
        );
    }
    context
}

pub fn comparison_context(records: &[&LaptopRecord]) -> String {
    let mut context = String::from("Compare these laptops:\n");
    for (position, record) in records.iter().enumerate() {
        let price = detail_text(&record.price_details, CURRENT_PRICE_KEY);
        let _ = write!(
            context,
            "Laptop {}: {}\nProcessor: {}\nMemory: {}\nStorage: {}\nDisplay: {}\nPrice: {}\n---\n",
            position + 1,
            record.display_name(),
            field(&record.processor),
            field(&record.memory),
            field(&record.storage),
            field(&record.display),
            price.as_deref().unwrap_or(NOT_LISTED),
        );
    }
    context
}

pub fn comparison_query(records: &[&LaptopRecord]) -> String {
    format!(
        "Please provide a detailed comparison of these laptops, highlighting key differences, \
         pros and cons, and which would be best for different use cases: {}",
        comparison_context(records)
    )
}

pub fn system_prompt(laptop_context: &str) -> String {
    CHAT_SYSTEM_PROMPT.replace("{laptops}", laptop_context)
}

/// First 200 characters of the context, with an ellipsis when cut.
pub fn context_preview(context: &str) -> String {
    if context.chars().count() > CONTEXT_PREVIEW_CHARS {
        let head: String = context.chars().take(CONTEXT_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        context.to_string()
    }
}

/// Normalizes model output: drops blank lines and double spaces, unifies
/// leading bullet markers to `•`, drops stray bold from list items.
pub fn clean_response(response: &str) -> String {
    let text = response.trim().replace("  ", " ");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = ["- ", "* ", "+ "]
                .iter()
                .find_map(|marker| line.strip_prefix(marker))
                .map(|rest| format!("• {rest}"))
                .unwrap_or_else(|| line.to_string());
            let line = line.as_str();
            let is_list_item = line.starts_with('•')
                || ["1.", "2.", "3.", "4.", "5."]
                    .iter()
                    .any(|prefix| line.starts_with(prefix));
            let is_heading = line.starts_with("**") && line.ends_with("**") && line.len() < 50;
            let is_labelled = line.contains(':') && !line.starts_with("**");

            if is_list_item || !(is_heading || is_labelled) {
                line.replace("**", "")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
