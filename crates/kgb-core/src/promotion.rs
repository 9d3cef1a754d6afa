//! AI-assisted promotion-candidate suggestions.
//!
//! One request, one response: the prompt lists the employees, the model
//! answers with `{"candidates": [{"name", "reason"}]}`. There is no retry;
//! any failure becomes a [`SuggestionError`].

use serde::{Deserialize, Serialize};

use crate::error::SuggestionError;
use crate::traits::{extract_json_from_markdown, GenerateRequest, LlmProvider};

/// How many candidates to ask for when the request does not say.
pub const DEFAULT_SUGGESTION_COUNT: u32 = 3;

/// One employee as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionCandidateInput {
    pub name: String,
    /// Years of service at the agency.
    pub years_of_service: f64,
    /// Salary increases in the last 3 years (higher is better).
    pub salary_increase_frequency: u32,
    /// Free-text qualifications or notes.
    #[serde(default)]
    pub other_relevant_criteria: Option<String>,
}

/// Input of the suggestion flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub employee_data: Vec<PromotionCandidateInput>,
    #[serde(default = "default_suggestion_count")]
    pub number_of_suggestions: u32,
}

fn default_suggestion_count() -> u32 {
    DEFAULT_SUGGESTION_COUNT
}

/// One suggested candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSuggestion {
    pub name: String,
    pub reason: String,
}

/// Output of the suggestion flow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub candidates: Vec<CandidateSuggestion>,
}

/// Generation settings for the suggestion call.
#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".into(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// Render the HR prompt for a request.
pub fn render_prompt(request: &SuggestionRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an HR expert tasked with identifying potential promotion candidates.\n\n",
    );
    prompt.push_str(&format!(
        "Given the following employee data, suggest the top {} candidates for promotion, \
         along with a brief reason for each suggestion.\n\n",
        request.number_of_suggestions
    ));
    prompt.push_str("Employee Data:\n");
    for employee in &request.employee_data {
        prompt.push_str(&format!("- Name: {}\n", employee.name));
        prompt.push_str(&format!("  - Years of Service: {}\n", employee.years_of_service));
        prompt.push_str(&format!(
            "  - Salary Increase Frequency: {}\n",
            employee.salary_increase_frequency
        ));
        prompt.push_str(&format!(
            "  - Other Relevant Criteria: {}\n",
            employee.other_relevant_criteria.as_deref().unwrap_or("-")
        ));
    }
    prompt.push_str(
        "\nRespond with JSON only, in the form \
         {\"candidates\": [{\"name\": \"...\", \"reason\": \"...\"}]}.\n",
    );
    prompt
}

/// Parse a model reply into a response. Accepts the object form or a bare
/// array of candidates.
pub fn parse_suggestions(reply: &str) -> Result<SuggestionResponse, serde_json::Error> {
    let body = extract_json_from_markdown(reply);
    match serde_json::from_str::<SuggestionResponse>(&body) {
        Ok(response) => Ok(response),
        Err(object_err) => serde_json::from_str::<Vec<CandidateSuggestion>>(&body)
            .map(|candidates| SuggestionResponse { candidates })
            .map_err(|_| object_err),
    }
}

/// Ask `provider` for promotion candidates.
pub async fn suggest_promotion_candidates(
    provider: &dyn LlmProvider,
    settings: &SuggestionSettings,
    request: &SuggestionRequest,
) -> Result<SuggestionResponse, SuggestionError> {
    if request.employee_data.is_empty() {
        return Err(SuggestionError::from_cause("no employee data provided"));
    }
    if request.number_of_suggestions == 0 {
        return Err(SuggestionError::from_cause(
            "number of suggestions must be at least 1",
        ));
    }

    let generate = GenerateRequest {
        model: settings.model.clone(),
        prompt: render_prompt(request),
        system_prompt: None,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };

    let response = provider.generate(&generate).await.map_err(|e| {
        tracing::error!(provider = provider.name(), "AI suggestion failed: {e:#}");
        SuggestionError::from_cause(format!("{e:#}"))
    })?;

    let mut parsed = parse_suggestions(&response.content).map_err(|e| {
        tracing::error!(provider = provider.name(), "unreadable AI reply: {e}");
        SuggestionError::from_cause(format!("could not read the model's answer: {e}"))
    })?;

    let limit = usize::try_from(request.number_of_suggestions).unwrap_or(usize::MAX);
    parsed.candidates.truncate(limit);
    tracing::info!(
        provider = provider.name(),
        model = %response.model,
        candidates = parsed.candidates.len(),
        "promotion suggestions received"
    );
    Ok(parsed)
}
