use nutrilab::api_connection::{
    connection::{AiProvider, ApiConnectionError, StructuredRequest},
    endpoints::{
        ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, ResponseFormat,
        OPENROUTER_MODELS, Provider,
    },
};
use nutrilab::config::{AppConfig, API_KEY_ENV_VAR};
use nutrilab::plan_generator::plan_json_schema;
use nutrilab::report_parser::report_json_schema;
use std::env;

fn get_multimodal_test_model() -> String {
    OPENROUTER_MODELS
        .iter()
        .find(|m| m.multimodal)
        .map(|m| m.model_name.to_string())
        .expect("No multimodal model found in OPENROUTER_MODELS for testing")
}

fn live_config() -> Option<AppConfig> {
    let config = AppConfig::from_env();
    if config.api_key.is_none() {
        println!("Skipping live test: {} not set.", API_KEY_ENV_VAR);
        return None;
    }
    Some(config)
}

#[tokio::test]
async fn test_missing_api_key_error() {
    let provider = Provider::openrouter("", &AppConfig::offline());
    let request = ChatCompletionRequest {
        model: get_multimodal_test_model(),
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, API_KEY_ENV_VAR);
    }
}

#[test]
fn test_provider_absent_without_credentials() {
    assert!(Provider::from_config(&AppConfig::offline()).is_none());

    let config = AppConfig {
        api_key: Some("sk-test".to_string()),
        ..AppConfig::offline()
    };
    let provider = Provider::from_config(&config).unwrap();
    assert_eq!(provider.model(), config.model);
}

#[test]
fn test_request_serializes_json_schema_response_format() {
    let request = ChatCompletionRequest {
        model: get_multimodal_test_model(),
        messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
        response_format: Some(ResponseFormat::json_schema(report_json_schema())),
        temperature: Some(0.1),
        max_tokens: None,
    };
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["response_format"]["type"], "json_schema");
    assert_eq!(value["response_format"]["json_schema"]["name"], "blood_report");
    let biomarker = &value["response_format"]["json_schema"]["schema"]["properties"]["biomarkers"]["items"];
    assert_eq!(biomarker["type"], "object");
    assert_eq!(biomarker["properties"]["status"]["enum"][3], "Critical High");
    assert_eq!(value["messages"][1]["content"], "hi");
    assert!(value.get("max_tokens").is_none());
}

#[tokio::test]
async fn test_api_error_with_unreachable_endpoint() {
    let config = AppConfig {
        api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        ..AppConfig::offline()
    };
    let provider = Provider::openrouter("sk-test", &config);
    let request = StructuredRequest {
        system_prompt: "sys".to_string(),
        user_prompt: "hi".to_string(),
        attachment: None,
        schema: plan_json_schema(),
        temperature: None,
        max_tokens: None,
    };
    let result = provider.request_json(request).await;
    assert!(matches!(result, Err(ApiConnectionError::NetworkError(_))), "got {:?}", result);
}

#[tokio::test]
#[ignore]
async fn test_successful_structured_call() {
    let Some(config) = live_config() else {
        return;
    };
    let provider = Provider::from_config(&config).unwrap();

    let schema = JsonSchemaDefinition {
        name: "movie_details".to_string(),
        strict: Some(false),
        schema: JsonSchema::object(
            vec![
                ("title", JsonSchema::string().describe("The title of the movie.")),
                ("year", JsonSchema::number().describe("The year the movie was released.")),
            ],
            &["title", "year"],
        ),
    };

    let request = StructuredRequest {
        system_prompt: "You are an assistant that provides movie information in JSON format based on the provided schema.".to_string(),
        user_prompt: "Give me details for the movie 'Inception'.".to_string(),
        attachment: None,
        schema,
        temperature: Some(0.5),
        max_tokens: Some(300),
    };

    let result = provider.request_json(request).await;
    assert!(result.is_ok(), "API call failed: {:?}", result.err());
    let parsed_json = result.unwrap();
    assert!(parsed_json.get("title").unwrap().is_string());
    assert!(parsed_json.get("year").unwrap().is_number());
}

#[tokio::test]
#[ignore]
async fn test_api_error_with_invalid_key() {
    if env::var(API_KEY_ENV_VAR).is_err() {
        println!("Skipping test_api_error_with_invalid_key: {} not set.", API_KEY_ENV_VAR);
        return;
    }

    let provider = Provider::openrouter(
        "this_is_a_deliberately_bad_api_key_string_for_testing",
        &AppConfig::from_env(),
    );
    let request = ChatCompletionRequest {
        model: get_multimodal_test_model(),
        messages: vec![ChatMessage::user("This call should fail due to invalid key.")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };

    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::ApiError { .. })), "Expected ApiError, got {:?}", result);
    if let Err(ApiConnectionError::ApiError { status, .. }) = result {
        assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    }
}
