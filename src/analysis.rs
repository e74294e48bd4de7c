use std::sync::Arc;

use tracing::info;

use crate::api_connection::connection::AiProvider;
use crate::api_connection::endpoints::Provider;
use crate::config::AppConfig;
use crate::models::{ReportDocument, UserPreferences};
use crate::plan_generator::{generate_plan, GeneratedPlan};
use crate::report_parser::{parse_report, ParsedReport, ReportUpload};

/// Entry point for the presentation layer. Holds no state between calls
/// beyond configuration; the provider is absent when no credential is set.
#[derive(Clone)]
pub struct NutriLab {
    config: AppConfig,
    ai: Option<Arc<dyn AiProvider>>,
}

impl NutriLab {
    pub fn new(config: AppConfig) -> Self {
        let ai = Provider::from_config(&config).map(|p| Arc::new(p) as Arc<dyn AiProvider>);
        info!(
            ai_enabled = ai.is_some(),
            model = %config.model,
            "NutriLab initialised"
        );
        Self { config, ai }
    }

    pub fn from_env() -> Self {
        Self::new(AppConfig::from_env())
    }

    /// Uses `ai` regardless of whether the configuration carries a credential.
    pub fn with_provider(config: AppConfig, ai: Arc<dyn AiProvider>) -> Self {
        Self { config, ai: Some(ai) }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    pub async fn parse_report(&self, upload: &ReportUpload) -> ParsedReport {
        parse_report(self.ai.as_deref(), upload, self.config.parse_delay).await
    }

    pub async fn generate_plan(
        &self,
        report: &ReportDocument,
        prefs: Option<UserPreferences>,
    ) -> GeneratedPlan {
        generate_plan(self.ai.as_deref(), report, prefs, self.config.plan_delay).await
    }
}
