//! The `kgb suggest` command: AI promotion-candidate suggestions.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use kgb_core::promotion::{
    suggest_promotion_candidates, PromotionCandidateInput, SuggestionRequest, SuggestionSettings,
    DEFAULT_SUGGESTION_COUNT,
};
use kgb_providers::create_provider;

use super::{new_table, Context, GlobalArgs};

/// Tokens allowed for the model's answer.
const MAX_ANSWER_TOKENS: u32 = 1024;

/// Options for `kgb suggest`.
#[derive(Debug, Clone, Default)]
pub struct SuggestArgs {
    pub input: PathBuf,
    pub count: Option<u32>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub json: bool,
}

/// Read the input file: a full request object, or a bare array of
/// employees.
fn read_request(args: &SuggestArgs) -> Result<SuggestionRequest> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let mut request = match serde_json::from_str::<SuggestionRequest>(&content) {
        Ok(request) => request,
        Err(_) => {
            let employee_data: Vec<PromotionCandidateInput> = serde_json::from_str(&content)
                .with_context(|| {
                    format!(
                        "{} must hold {{\"employeeData\": [...]}} or an array of employees",
                        args.input.display()
                    )
                })?;
            SuggestionRequest {
                employee_data,
                number_of_suggestions: DEFAULT_SUGGESTION_COUNT,
            }
        }
    };
    if let Some(count) = args.count {
        request.number_of_suggestions = count;
    }
    Ok(request)
}

pub async fn execute(global: &GlobalArgs, args: SuggestArgs) -> Result<()> {
    let ctx = Context::load(global)?;
    let request = read_request(&args)?;
    anyhow::ensure!(
        request.number_of_suggestions >= 1,
        "--count must be at least 1"
    );

    let (name, provider_config) = ctx.config.provider(args.provider.as_deref())?;
    let provider = create_provider(name, provider_config)?;
    let settings = SuggestionSettings {
        model: args
            .model
            .clone()
            .unwrap_or_else(|| ctx.config.default_model.clone()),
        temperature: ctx.config.default_temperature,
        max_tokens: MAX_ANSWER_TOKENS,
    };

    tracing::info!(
        provider = name,
        model = %settings.model,
        employees = request.employee_data.len(),
        "requesting promotion suggestions"
    );
    let response = suggest_promotion_candidates(provider.as_ref(), &settings, &request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.candidates.is_empty() {
        println!("The model suggested no candidates.");
        return Ok(());
    }

    let mut table = new_table(&["#", "Name", "Reason"]);
    for (i, candidate) in response.candidates.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            candidate.name.clone(),
            candidate.reason.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}
