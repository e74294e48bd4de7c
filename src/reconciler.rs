use crate::fallback::fallback_plan;
use crate::models::{DailyPlan, DietPlan, Meal, PartialDailyPlan, PartialDietPlan};

/// A meal is usable when it carries a non-blank name.
pub fn is_valid_meal(meal: &Meal) -> bool {
    !meal.name.trim().is_empty()
}

fn valid(meal: Option<&Meal>) -> Option<&Meal> {
    meal.filter(|m| is_valid_meal(m))
}

/// Overlays a possibly incomplete AI plan onto a copy of the fallback plan.
///
/// The result always has the fallback's seven days, each with valid
/// breakfast, lunch and dinner and a non-empty snack list. Fields are taken
/// from `candidate` only where they are present and usable; snacks are replaced
/// as a whole list or not at all.
pub fn reconcile(candidate: &PartialDietPlan) -> DietPlan {
    let mut merged = fallback_plan();

    if let Some(overview) = candidate.overview.as_deref().filter(|o| !o.is_empty()) {
        merged.overview = overview.to_string();
    }

    if let Some(shopping_list) = &candidate.shopping_list {
        let items: Vec<_> = shopping_list
            .iter()
            .filter(|entry| !entry.item.trim().is_empty())
            .cloned()
            .collect();
        if !items.is_empty() {
            merged.shopping_list = items;
        }
    }

    if let Some(generated_days) = &candidate.weekly_plan {
        for (index, fallback_day) in merged.weekly_plan.iter_mut().enumerate() {
            if let Some(Some(generated)) = generated_days.get(index) {
                *fallback_day = merge_day(generated, fallback_day);
            }
        }
    }

    merged
}

fn merge_day(generated: &PartialDailyPlan, fallback: &DailyPlan) -> DailyPlan {
    let non_empty = |field: &Option<String>, default: &str| {
        field
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let snacks = match generated.snacks.as_deref() {
        Some([Some(first), ..]) if is_valid_meal(first) => generated
            .snacks
            .iter()
            .flatten()
            .flatten()
            .cloned()
            .collect(),
        _ => fallback.snacks.clone(),
    };

    DailyPlan {
        day: non_empty(&generated.day, &fallback.day),
        focus: non_empty(&generated.focus, &fallback.focus),
        breakfast: valid(generated.breakfast.as_ref()).unwrap_or(&fallback.breakfast).clone(),
        lunch: valid(generated.lunch.as_ref()).unwrap_or(&fallback.lunch).clone(),
        dinner: valid(generated.dinner.as_ref()).unwrap_or(&fallback.dinner).clone(),
        snacks,
    }
}
