use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::api_connection::connection::{AiProvider, ApiConnectionError, Attachment, StructuredRequest};
use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition};
use crate::fallback::fallback_report;
use crate::models::ReportDocument;

pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

pub const PARSE_FAILURE_WARNING: &str =
    "AI Parsing failed or API Key invalid. Falling back to demo data.";

const SYSTEM_PROMPT: &str = "You are an expert medical report analyzer. \
Extract data from the attached blood test report and respond with a single JSON object only.";

const USER_PROMPT: &str = "Extract data from the attached blood test report.

Return a JSON object with:
- \"patientName\", \"date\", \"labName\": strings
- \"riskScore\": number from 0 to 100, where 100 is healthiest
- \"summary\": brief plain english summary of findings
- \"biomarkers\": array of objects with \"name\" (e.g. HbA1c), \"value\" (number), \"unit\", \"range\",
  \"status\" (one of 'Normal', 'High', 'Low', 'Critical High', 'Critical Low'),
  \"category\" (one of 'Glycemic', 'Lipid', 'Thyroid', 'Vitamin', 'Liver', 'Other'),
  \"explanation\" (simple explanation of what this result means)

Important:
1. Extract ALL visible biomarkers.
2. If status is not explicitly stated, infer it from the value and range.
3. Ensure values are numbers.";

/// An uploaded report file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ReportUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ApiConnectionError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        Ok(Self::new(file_name, bytes))
    }

    fn to_attachment(&self) -> Attachment {
        Attachment {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

pub fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    /// No credential configured; the reference report was returned.
    Demo,
    /// Extracted by the AI provider.
    Ai,
    /// The AI call failed; the reference report was returned.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub report: ReportDocument,
    pub source: ReportSource,
    /// Set when the caller should tell the user that demo data is shown.
    pub warning: Option<String>,
}

pub fn report_json_schema() -> JsonSchemaDefinition {
    let biomarker = JsonSchema::object(
        vec![
            ("name", JsonSchema::string()),
            ("value", JsonSchema::number()),
            ("unit", JsonSchema::string()),
            ("range", JsonSchema::string()),
            (
                "status",
                JsonSchema::string_enum(&["Normal", "High", "Low", "Critical High", "Critical Low"]),
            ),
            (
                "category",
                JsonSchema::string_enum(&["Glycemic", "Lipid", "Thyroid", "Vitamin", "Liver", "Other"]),
            ),
            ("explanation", JsonSchema::string()),
        ],
        &["name", "value", "status", "category"],
    );

    JsonSchemaDefinition {
        name: "blood_report".to_string(),
        strict: Some(false),
        schema: JsonSchema::object(
            vec![
                ("patientName", JsonSchema::string()),
                ("date", JsonSchema::string()),
                ("labName", JsonSchema::string()),
                ("riskScore", JsonSchema::number().describe("0-100, where 100 is healthiest")),
                ("summary", JsonSchema::string()),
                ("biomarkers", JsonSchema::array(biomarker)),
            ],
            &["riskScore", "biomarkers"],
        ),
    }
}

/// Reads an AI reply as a report. Any structural problem rejects the whole document.
pub fn report_from_value(value: Value) -> Result<ReportDocument, ApiConnectionError> {
    if !value.is_object() {
        return Err(ApiConnectionError::UnexpectedShape("report is not an object"));
    }
    let mut report: ReportDocument = serde_json::from_value(value)?;
    report.risk_score = if report.risk_score.is_finite() {
        report.risk_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    Ok(report)
}

/// Extracts a report from `upload`. Never fails: without a provider the
/// reference report is returned after `demo_delay`, and any AI failure yields
/// the reference report plus a warning. Single attempt, no retry.
pub async fn parse_report(
    ai: Option<&dyn AiProvider>,
    upload: &ReportUpload,
    demo_delay: Duration,
) -> ParsedReport {
    let Some(ai) = ai else {
        warn!("No API key configured. Returning demo report data.");
        tokio::time::sleep(demo_delay).await;
        return ParsedReport {
            report: fallback_report(),
            source: ReportSource::Demo,
            warning: None,
        };
    };

    let request = StructuredRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: USER_PROMPT.to_string(),
        attachment: Some(upload.to_attachment()),
        schema: report_json_schema(),
        temperature: Some(0.1),
        max_tokens: Some(4096),
    };

    match ai.request_json(request).await.and_then(report_from_value) {
        Ok(report) => {
            info!(
                file = %upload.file_name,
                biomarkers = report.biomarkers.len(),
                "Parsed report with AI"
            );
            ParsedReport {
                report,
                source: ReportSource::Ai,
                warning: None,
            }
        }
        Err(e) => {
            warn!(file = %upload.file_name, error = %e, "Failed to parse report with AI, using demo data");
            ParsedReport {
                report: fallback_report(),
                source: ReportSource::Fallback,
                warning: Some(PARSE_FAILURE_WARNING.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("scan.PNG"), "image/png");
        assert_eq!(guess_mime_type("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_mime_type("report.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("noextension"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_report_schema_requires_core_biomarker_fields() {
        let schema = report_json_schema().schema;
        let items = schema.property("biomarkers").and_then(|b| b.items.as_deref()).unwrap();
        assert_eq!(items.required, vec!["name", "value", "status", "category"]);
        assert_eq!(
            items.property("status").unwrap().r#enum.as_ref().unwrap().len(),
            5
        );
    }

    #[test]
    fn test_report_from_value_fills_defaults_and_clamps() {
        let value = json!({
            "patientName": "Asha",
            "riskScore": 140,
            "biomarkers": [{"name": "TSH", "value": 6.2, "status": "High", "category": "Thyroid"}]
        });
        let report = report_from_value(value).unwrap();
        assert_eq!(report.patient_name, "Asha");
        assert_eq!(report.lab_name, "");
        assert_eq!(report.risk_score, 100.0);
        assert_eq!(report.biomarkers[0].unit, "");
    }

    #[test]
    fn test_report_from_value_rejects_non_numeric_value() {
        let value = json!({
            "biomarkers": [{"name": "TSH", "value": "6.2 mIU/L", "status": "High", "category": "Thyroid"}]
        });
        assert!(report_from_value(value).is_err());
    }

    #[test]
    fn test_report_from_value_rejects_arrays() {
        assert!(matches!(
            report_from_value(json!([])),
            Err(ApiConnectionError::UnexpectedShape(_))
        ));
        assert!(report_from_value(json!(["not", "an", "object"])).is_err());
        assert!(report_from_value(json!([{"riskScore": 80}])).is_err());
    }

    #[test]
    fn test_report_from_value_requires_risk_score() {
        let value = json!({
            "patientName": "Asha",
            "biomarkers": [{"name": "TSH", "value": 6.2, "status": "High", "category": "Thyroid"}]
        });
        assert!(report_from_value(value).is_err());
        assert_eq!(report_json_schema().schema.required, vec!["riskScore", "biomarkers"]);
    }
}
