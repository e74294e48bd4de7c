use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nutrilab::analysis::NutriLab;
use nutrilab::api_connection::connection::{AiProvider, ApiConnectionError, StructuredRequest};
use nutrilab::config::AppConfig;
use nutrilab::fallback::{fallback_plan, fallback_report};
use nutrilab::models::{Cuisine, DietPlan, DietType, Language, UserPreferences};
use nutrilab::plan_generator::{PlanSource, GENERATION_ERROR_SUMMARY, SUMMARY_UNAVAILABLE};
use nutrilab::reconciler::is_valid_meal;
use nutrilab::report_parser::{ReportSource, ReportUpload, PARSE_FAILURE_WARNING};
use serde_json::{json, Value};

/// Replays canned replies and records the requests it receives.
struct ScriptedProvider {
    reply: fn() -> Result<Value, ApiConnectionError>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedProvider {
    fn new(reply: fn() -> Result<Value, ApiConnectionError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    async fn request_json(&self, request: StructuredRequest) -> Result<Value, ApiConnectionError> {
        self.requests.lock().unwrap().push(request);
        (self.reply)()
    }
}

fn lab_with(provider: Arc<ScriptedProvider>) -> NutriLab {
    NutriLab::with_provider(AppConfig::offline(), provider)
}

fn upload() -> ReportUpload {
    ReportUpload::new("report.pdf", b"%PDF-1.4 fake".to_vec())
}

fn assert_complete(plan: &DietPlan) {
    assert_eq!(plan.weekly_plan.len(), 7);
    for day in &plan.weekly_plan {
        assert!(is_valid_meal(&day.breakfast));
        assert!(is_valid_meal(&day.lunch));
        assert!(is_valid_meal(&day.dinner));
        assert!(!day.snacks.is_empty());
    }
}

fn transport_failure() -> Result<Value, ApiConnectionError> {
    Err(ApiConnectionError::ApiError {
        status: reqwest::StatusCode::BAD_GATEWAY,
        error_body: "upstream timeout".to_string(),
    })
}

#[tokio::test]
async fn test_offline_parse_returns_reference_report() {
    let lab = NutriLab::new(AppConfig::offline());
    assert!(!lab.ai_enabled());

    let parsed = lab
        .parse_report(&ReportUpload::new("anything.png", vec![0xde, 0xad]))
        .await;
    assert_eq!(parsed.source, ReportSource::Demo);
    assert_eq!(parsed.warning, None);
    assert_eq!(parsed.report.patient_name, "Mr K Ramesh (39Y/M)");
    assert_eq!(parsed.report.risk_score, 58.0);
}

#[tokio::test]
async fn test_parse_failure_falls_back_with_warning() {
    let provider = ScriptedProvider::new(transport_failure);
    let parsed = lab_with(provider.clone()).parse_report(&upload()).await;

    assert_eq!(parsed.source, ReportSource::Fallback);
    assert_eq!(parsed.warning.as_deref(), Some(PARSE_FAILURE_WARNING));
    assert_eq!(parsed.report, fallback_report());
    assert_eq!(provider.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_parse_rejects_malformed_document_as_a_whole() {
    let provider = ScriptedProvider::new(|| {
        Ok(json!({
            "patientName": "Asha",
            "biomarkers": [{"name": "TSH", "value": 4.1, "status": "Borderline", "category": "Thyroid"}]
        }))
    });
    let parsed = lab_with(provider).parse_report(&upload()).await;
    assert_eq!(parsed.source, ReportSource::Fallback);
    assert_eq!(parsed.report.patient_name, "Mr K Ramesh (39Y/M)");
}

#[tokio::test]
async fn test_parse_sends_file_and_schema() {
    let provider = ScriptedProvider::new(|| {
        Ok(json!({
            "patientName": "Asha",
            "date": "01 Oct, 2025",
            "labName": "City Labs",
            "riskScore": 81,
            "summary": "Mostly normal.",
            "biomarkers": [
                {"name": "TSH", "value": 6.2, "unit": "mIU/L", "range": "0.4 - 4.0", "status": "High", "category": "Thyroid", "explanation": "Underactive thyroid."}
            ]
        }))
    });
    let parsed = lab_with(provider.clone()).parse_report(&upload()).await;

    assert_eq!(parsed.source, ReportSource::Ai);
    assert_eq!(parsed.report.patient_name, "Asha");
    assert_eq!(parsed.report.biomarkers[0].value, 6.2);

    let requests = provider.requests.lock().unwrap();
    let attachment = requests[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.mime_type, "application/pdf");
    assert_eq!(attachment.bytes, b"%PDF-1.4 fake".to_vec());
    assert_eq!(requests[0].schema.name, "blood_report");
}

#[tokio::test]
async fn test_offline_plan_applies_preferences() {
    let lab = NutriLab::new(AppConfig::offline());
    let prefs = UserPreferences {
        diet_type: DietType::NonVeg,
        cuisine: Cuisine::SouthIndian,
        language: Language::Tamil,
    };
    let generated = lab.generate_plan(&fallback_report(), Some(prefs)).await;

    assert_eq!(generated.source, PlanSource::Demo);
    assert_complete(&generated.plan);
    assert_eq!(generated.plan.weekly_plan[0].day, "Monday (Thingal)");
    assert_eq!(generated.plan.weekly_plan[0].dinner.name, "Grilled Fish");
    assert!(generated.plan.overview.starts_with("This 7-day personalized plan"));
    assert!(generated.plan.overview.contains("Preferences: Non-Veg, South Indian."));
    assert!(generated.plan.overview.ends_with(" (Translated to Tamil for demo purposes)"));
    assert!(generated.summary.contains("'Non-Veg' diet with 'South Indian' cuisine"));

    // The shared reference plan is untouched.
    assert_eq!(fallback_plan().weekly_plan[0].day, "Monday");
}

#[tokio::test]
async fn test_plan_transport_error_returns_reference_plan() {
    let provider = ScriptedProvider::new(transport_failure);
    let generated = lab_with(provider).generate_plan(&fallback_report(), None).await;

    assert_eq!(generated.source, PlanSource::Fallback);
    assert_eq!(generated.summary, GENERATION_ERROR_SUMMARY);
    assert_eq!(generated.plan, fallback_plan());
    assert_complete(&generated.plan);
}

#[tokio::test]
async fn test_plan_never_fails_on_bad_replies() {
    let replies: [fn() -> Result<Value, ApiConnectionError>; 5] = [
        || Err(ApiConnectionError::EmptyResponse),
        || Ok(json!("just text")),
        || Ok(json!({"dietPlan": null})),
        || Ok(json!({"dietPlan": {"weeklyPlan": "none"}})),
        || Ok(json!({"dietPlan": {"weeklyPlan": [{"breakfast": {"name": ""}}, 3, null]}})),
    ];
    for reply in replies {
        let generated = lab_with(ScriptedProvider::new(reply))
            .generate_plan(&fallback_report(), None)
            .await;
        assert_complete(&generated.plan);
    }
}

#[tokio::test]
async fn test_partial_ai_plan_is_reconciled() {
    let provider = ScriptedProvider::new(|| {
        Ok(json!({
            "detailedSummary": "Focus on iron.",
            "dietPlan": {
                "overview": "AI overview",
                "weeklyPlan": [
                    {"day": "Monday", "focus": "Iron", "breakfast": {"name": "Ragi Dosa", "description": "Millet crepe", "tags": ["Iron"],
                        "nutritionalInfo": {"protein": "7g", "fiber": "4g", "iron": "3mg", "vitaminD": "0 IU"}},
                     "lunch": {"name": "  "}, "snacks": []}
                ],
                "shoppingList": []
            }
        }))
    });
    let prefs = UserPreferences {
        language: Language::Hindi,
        ..UserPreferences::default()
    };
    let generated = lab_with(provider.clone())
        .generate_plan(&fallback_report(), Some(prefs))
        .await;
    let fallback = fallback_plan();

    assert_eq!(generated.source, PlanSource::Ai);
    assert_eq!(generated.summary, "Focus on iron.");
    assert_eq!(generated.plan.overview, "AI overview");
    assert_eq!(generated.plan.shopping_list, fallback.shopping_list);
    let monday = &generated.plan.weekly_plan[0];
    assert_eq!(monday.focus, "Iron");
    assert_eq!(monday.breakfast.name, "Ragi Dosa");
    assert_eq!(monday.lunch, fallback.weekly_plan[0].lunch);
    assert_eq!(monday.snacks, fallback.weekly_plan[0].snacks);
    // No local translation on the AI path.
    assert_eq!(monday.day, "Monday");
    assert_eq!(&generated.plan.weekly_plan[1..], &fallback.weekly_plan[1..]);

    let requests = provider.requests.lock().unwrap();
    assert!(requests[0].attachment.is_none());
    assert!(requests[0].user_prompt.contains("- Language: Hindi"));
    assert_eq!(requests[0].schema.name, "diet_plan");
}

#[tokio::test]
async fn test_ai_summary_defaults_when_missing() {
    let provider = ScriptedProvider::new(|| Ok(json!({"dietPlan": {}})));
    let generated = lab_with(provider).generate_plan(&fallback_report(), None).await;
    assert_eq!(generated.summary, SUMMARY_UNAVAILABLE);
    assert_eq!(generated.plan, fallback_plan());
}

#[tokio::test]
async fn test_upload_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cbc.JPG");
    std::fs::write(&path, b"jpeg bytes").unwrap();

    let upload = ReportUpload::from_path(&path).await.unwrap();
    assert_eq!(upload.file_name, "cbc.JPG");
    assert_eq!(upload.mime_type, "image/jpeg");
    assert_eq!(upload.bytes, b"jpeg bytes".to_vec());

    let missing = ReportUpload::from_path(&dir.path().join("nope.pdf")).await;
    assert!(matches!(missing, Err(ApiConnectionError::FileRead(_))));
}
