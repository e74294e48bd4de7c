use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api_connection::connection::{AiProvider, ApiConnectionError, StructuredRequest};
use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition};
use crate::fallback::{fallback_plan, fallback_report};
use crate::models::{DietPlan, PartialDietPlan, ReportDocument, UserPreferences};
use crate::preferences::apply_preferences;
use crate::reconciler::reconcile;

pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";
pub const GENERATION_ERROR_SUMMARY: &str = "Error generating plan. Showing tailored sample data.";

const SYSTEM_PROMPT: &str = "You are a top-tier Indian Nutritionist. \
You respond with a single JSON object that follows the provided schema.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    /// No credential configured; the reference plan adjusted to the preferences.
    Demo,
    /// Generated by the AI provider and reconciled against the reference plan.
    Ai,
    /// The AI call failed; the unmodified reference plan.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlan {
    pub plan: DietPlan,
    pub summary: String,
    pub source: PlanSource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationReply {
    diet_plan: PartialDietPlan,
    #[serde(default)]
    detailed_summary: Option<Value>,
}

fn meal_schema() -> JsonSchema {
    let nutrition = JsonSchema::object(
        vec![
            ("protein", JsonSchema::string()),
            ("fiber", JsonSchema::string()),
            ("iron", JsonSchema::string()),
            ("vitaminD", JsonSchema::string()),
        ],
        &["protein", "fiber", "iron", "vitaminD"],
    )
    .describe("Estimated nutrients for a standard Indian portion, as strings like \"12g\" or \"4mg\".");

    JsonSchema::object(
        vec![
            ("name", JsonSchema::string()),
            ("description", JsonSchema::string()),
            ("tags", JsonSchema::array(JsonSchema::string())),
            ("nutritionalInfo", nutrition),
        ],
        &["name", "description", "tags", "nutritionalInfo"],
    )
}

pub fn plan_json_schema() -> JsonSchemaDefinition {
    let day = JsonSchema::object(
        vec![
            ("day", JsonSchema::string()),
            ("focus", JsonSchema::string()),
            ("breakfast", meal_schema()),
            ("lunch", meal_schema()),
            ("dinner", meal_schema()),
            ("snacks", JsonSchema::array(meal_schema())),
        ],
        &["day", "focus", "breakfast", "lunch", "dinner", "snacks"],
    );

    let shopping_item = JsonSchema::object(
        vec![("item", JsonSchema::string()), ("category", JsonSchema::string())],
        &["item", "category"],
    );

    let diet_plan = JsonSchema::object(
        vec![
            ("overview", JsonSchema::string()),
            ("weeklyPlan", JsonSchema::array(day).describe("Exactly 7 days, Monday to Sunday.")),
            ("shoppingList", JsonSchema::array(shopping_item)),
        ],
        &["overview", "weeklyPlan", "shoppingList"],
    );

    JsonSchemaDefinition {
        name: "diet_plan".to_string(),
        strict: Some(false),
        schema: JsonSchema::object(
            vec![
                ("detailedSummary", JsonSchema::string()),
                ("dietPlan", diet_plan),
            ],
            &["detailedSummary", "dietPlan"],
        ),
    }
}

pub fn build_plan_prompt(report: &ReportDocument, prefs: &UserPreferences) -> String {
    let report_json = serde_json::to_string_pretty(report).unwrap_or_default();
    let language = prefs.language;
    format!(
        "Analyze the following patient report and generate a 7-day Indian Diet Plan.

Report Data:
{report_json}

User Preferences:
- Diet: {diet}
- Cuisine: {cuisine}
- Language: {language}

CRITICAL INSTRUCTIONS:
1. You MUST return a JSON object with 7 items in 'weeklyPlan' (Monday to Sunday).
2. Each day MUST have 'breakfast', 'lunch', 'dinner', and 'snacks' objects.
3. Each meal object MUST have a 'name' and 'description'.
4. MANDATORY: Estimate the nutrient content for each meal (Protein, Fiber, Iron, Vitamin D) based on standard Indian portions. Use 'nutritionalInfo' object. Values should be strings like \"12g\", \"4mg\".
5. Translate the 'name' and 'description' of meals into {language} if it is not English. Keep the keys in English.
6. Honor the '{diet}' diet strictly in every meal.",
        diet = prefs.diet_type,
        cuisine = prefs.cuisine,
    )
}

/// Formats a biomarker as "12.5 g/dL", looked up by case-insensitive name
/// fragment in `report`, then in the reference report.
fn reading(report: &ReportDocument, fragment: &str, with_unit: bool) -> String {
    let reference = fallback_report();
    let needle = fragment.to_lowercase();
    let found = report
        .biomarkers
        .iter()
        .chain(reference.biomarkers.iter())
        .find(|b| b.name.to_lowercase().contains(&needle));
    match found {
        Some(b) if with_unit && !b.unit.is_empty() => format!("{} {}", b.value, b.unit),
        Some(b) => b.value.to_string(),
        None => "n/a".to_string(),
    }
}

pub fn demo_summary(report: &ReportDocument, prefs: &UserPreferences) -> String {
    format!(
        "Analysis for {}: Your report highlights Anemia (Hemoglobin {}) and Vitamin D deficiency ({}). \
Additionally, Liver Enzymes (GGT {}) are elevated. \
The plan is customized for '{}' diet with '{}' cuisine influences.",
        report.patient_name,
        reading(report, "Hemoglobin", true),
        reading(report, "Vitamin D", true),
        reading(report, "GGT", false),
        prefs.diet_type,
        prefs.cuisine,
    )
}

pub fn demo_overview(prefs: &UserPreferences) -> String {
    format!(
        "This 7-day personalized plan focuses on correcting Anemia (Iron/Hb) and supporting Liver function. Preferences: {}, {}.",
        prefs.diet_type, prefs.cuisine
    )
}

/// The offline plan: a copy of the reference plan with a templated overview,
/// then the diet-type, cuisine and language adjustments.
pub fn demo_plan(report: &ReportDocument, prefs: &UserPreferences) -> GeneratedPlan {
    let mut plan = fallback_plan();
    plan.overview = demo_overview(prefs);
    apply_preferences(&mut plan, prefs);
    GeneratedPlan {
        plan,
        summary: demo_summary(report, prefs),
        source: PlanSource::Demo,
    }
}

/// Reads an AI reply and reconciles its plan. A reply without a `dietPlan`
/// object is a schema mismatch.
pub fn plan_from_value(value: Value) -> Result<GeneratedPlan, ApiConnectionError> {
    if !value.get("dietPlan").is_some_and(Value::is_object) {
        return Err(ApiConnectionError::UnexpectedShape("dietPlan is not an object"));
    }
    let reply: GenerationReply = serde_json::from_value(value)?;
    let summary = reply
        .detailed_summary
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(SUMMARY_UNAVAILABLE)
        .to_string();

    Ok(GeneratedPlan {
        plan: reconcile(&reply.diet_plan),
        summary,
        source: PlanSource::Ai,
    })
}

/// Builds a plan for `report`. Never fails: every error path resolves to a
/// structurally complete plan. `prefs` defaults to Veg, Mixed, English.
pub async fn generate_plan(
    ai: Option<&dyn AiProvider>,
    report: &ReportDocument,
    prefs: Option<UserPreferences>,
    demo_delay: Duration,
) -> GeneratedPlan {
    let prefs = prefs.unwrap_or_default();

    let Some(ai) = ai else {
        warn!("No API key configured. Using tailored demo plan.");
        tokio::time::sleep(demo_delay).await;
        return demo_plan(report, &prefs);
    };

    let request = StructuredRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: build_plan_prompt(report, &prefs),
        attachment: None,
        schema: plan_json_schema(),
        temperature: Some(0.4),
        max_tokens: Some(16384),
    };

    match ai.request_json(request).await.and_then(plan_from_value) {
        Ok(generated) => {
            info!(
                diet = %prefs.diet_type,
                cuisine = %prefs.cuisine,
                language = %prefs.language,
                "Generated plan with AI"
            );
            generated
        }
        Err(e) => {
            warn!(error = %e, "Plan generation failed, using reference plan");
            GeneratedPlan {
                plan: fallback_plan(),
                summary: GENERATION_ERROR_SUMMARY.to_string(),
                source: PlanSource::Fallback,
            }
        }
    }
}
