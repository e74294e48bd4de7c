//! Views derived from a report or plan for display: biomarker triage, the
//! grouped shopping list, localized slot labels and share messages.

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::models::{Biomarker, BiomarkerStatus, DailyPlan, DietPlan, Language, Meal, MealSlot, ReportDocument, ShoppingItem};
use crate::preferences::translate_term;

pub const SHARE_BASE_URL: &str = "https://nutrilab.ai/share";
const SHARE_ID_LEN: usize = 8;
// Scores below this are flagged in the dashboard header.
const ATTENTION_THRESHOLD: f64 = 70.0;
const UNCATEGORISED: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

pub fn health_band(risk_score: f64) -> HealthBand {
    if risk_score < ATTENTION_THRESHOLD {
        HealthBand::NeedsAttention
    } else {
        HealthBand::Good
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOverview<'a> {
    pub health_band: HealthBand,
    pub attention: Vec<&'a Biomarker>,
    pub within_range: Vec<&'a Biomarker>,
    pub critical_count: usize,
}

pub fn triage(report: &ReportDocument) -> ReportOverview<'_> {
    let (attention, within_range): (Vec<&Biomarker>, Vec<&Biomarker>) = report
        .biomarkers
        .iter()
        .partition(|b| b.status.needs_attention());
    let critical_count = attention.iter().filter(|b| b.status.is_critical()).count();

    ReportOverview {
        health_band: health_band(report.risk_score),
        attention,
        within_range,
        critical_count,
    }
}

/// Count of biomarkers per status, in declaration order of the statuses.
pub fn status_counts(report: &ReportDocument) -> Vec<(BiomarkerStatus, usize)> {
    let mut counts: BTreeMap<usize, (BiomarkerStatus, usize)> = BTreeMap::new();
    for biomarker in &report.biomarkers {
        counts.entry(biomarker.status as usize).or_insert((biomarker.status, 0)).1 += 1;
    }
    counts.into_values().collect()
}

/// Groups items by category, keeping the first-seen order of categories and items.
pub fn group_shopping_list(items: &[ShoppingItem]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for entry in items {
        let category = match entry.category.trim() {
            "" => UNCATEGORISED,
            category => category,
        };
        match groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, group)) => group.push(entry.item.clone()),
            None => groups.push((category.to_string(), vec![entry.item.clone()])),
        }
    }
    groups
}

/// Label for a meal slot, e.g. "Kaalai Unavu" for Tamil breakfast, falling back to English.
pub fn slot_label(language: Language, slot: MealSlot) -> &'static str {
    translate_term(language, slot.as_str()).unwrap_or(slot.as_str())
}

pub fn snacks_label(language: Language) -> &'static str {
    translate_term(language, "Snacks").unwrap_or("Snacks")
}

pub fn share_id(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SHARE_ID_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

pub fn share_message(day: &str, id: &str) -> String {
    format!(
        "Check out my personalized {day} meal plan on NutriLab AI! 🥗\n{SHARE_BASE_URL}/{id}?day={}",
        day.replace(' ', "%20")
    )
}

fn render_meal(out: &mut String, label: &str, meal: &Meal) {
    out.push_str(&format!("  {label}: {}\n", meal.name));
    if !meal.description.is_empty() {
        out.push_str(&format!("    {}\n", meal.description));
    }
    if let Some(info) = &meal.nutritional_info {
        out.push_str(&format!(
            "    Protein {} | Fiber {} | Iron {} | Vit D {}\n",
            info.protein, info.fiber, info.iron, info.vitamin_d
        ));
    }
}

fn render_day(out: &mut String, day: &DailyPlan, language: Language) {
    out.push_str(&format!("{} - {}\n", day.day, day.focus));
    for slot in MealSlot::ALL {
        render_meal(out, slot_label(language, slot), day.meal(slot));
    }
    for snack in &day.snacks {
        render_meal(out, snacks_label(language), snack);
    }
}

/// Plain-text rendering of a full plan.
pub fn render_plan(plan: &DietPlan, language: Language) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", plan.overview));
    for day in &plan.weekly_plan {
        render_day(&mut out, day, language);
        out.push('\n');
    }
    out.push_str("Grocery List\n");
    for (category, items) in group_shopping_list(&plan.shopping_list) {
        out.push_str(&format!("  {category}: {}\n", items.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{fallback_plan, fallback_report};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_triage_fallback_report() {
        let report = fallback_report();
        let overview = triage(&report);
        assert_eq!(overview.health_band, HealthBand::NeedsAttention);
        assert_eq!(overview.attention.len(), 5);
        assert_eq!(overview.within_range.len(), 2);
        assert_eq!(overview.critical_count, 1);
    }

    #[test]
    fn test_health_band_threshold() {
        assert_eq!(health_band(69.9), HealthBand::NeedsAttention);
        assert_eq!(health_band(70.0), HealthBand::Good);
    }

    #[test]
    fn test_status_counts() {
        let counts = status_counts(&fallback_report());
        assert_eq!(
            counts,
            vec![
                (BiomarkerStatus::Normal, 2),
                (BiomarkerStatus::High, 1),
                (BiomarkerStatus::Low, 3),
                (BiomarkerStatus::CriticalHigh, 1),
            ]
        );
    }

    #[test]
    fn test_group_shopping_list_keeps_order() {
        let groups = group_shopping_list(&fallback_plan().shopping_list);
        let categories: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(categories, ["Vegetables", "Dry Fruits", "Grains", "Fruits"]);
        assert_eq!(groups[0].1, vec!["Spinach (Palak)", "Beetroot", "Drumstick / Moringa"]);
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_label(Language::Tamil, MealSlot::Breakfast), "Kaalai Unavu");
        assert_eq!(slot_label(Language::Kannada, MealSlot::Dinner), "Oota");
        assert_eq!(slot_label(Language::English, MealSlot::Lunch), "Lunch");
        assert_eq!(snacks_label(Language::Telugu), "Snacks");
    }

    #[test]
    fn test_share_message() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = share_id(&mut rng);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

        let message = share_message("Monday (Thingal)", "abc12345");
        assert_eq!(
            message,
            "Check out my personalized Monday (Thingal) meal plan on NutriLab AI! 🥗\nhttps://nutrilab.ai/share/abc12345?day=Monday%20(Thingal)"
        );
    }

    #[test]
    fn test_render_plan_lists_every_day() {
        let text = render_plan(&fallback_plan(), Language::Hindi);
        assert!(text.contains("Monday - Liver Detox & Iron Boost"));
        assert!(text.contains("  Naashta: Spinach & Moong Dal Cheela"));
        assert!(text.contains("  Dry Fruits: Dates, Walnuts"));
        assert_eq!(text.matches(" - ").count(), 7);
        assert!(text.starts_with(&format!("{}\n\n", fallback_plan().overview)));
    }

    #[test]
    fn test_uncategorised_items_group_together() {
        let items = vec![
            ShoppingItem { item: "Ragi".to_string(), category: String::new() },
            ShoppingItem { item: "Amla".to_string(), category: "Fruits".to_string() },
            ShoppingItem { item: "Jaggery".to_string(), category: " ".to_string() },
        ];
        let groups = group_shopping_list(&items);
        assert_eq!(groups[0], ("Other".to_string(), vec!["Ragi".to_string(), "Jaggery".to_string()]));
        assert_eq!(groups[1].0, "Fruits");
    }
}
