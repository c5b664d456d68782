//! Boundary to the external text-generation oracle. The oracle is an opaque
//! text-to-JSON function: the engine builds the prompt, trusts the structured
//! output mode for the response shape, and persists what comes back.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::json;

use super::domain::{Checklist, Evaluation};
use crate::config::OracleConfig;
use crate::workflows::diagnosis::Axis;

/// Nominal pass bar communicated to the oracle when a checklist omits one.
pub const DEFAULT_MIN_CHECKS: u32 = 3;

/// Inputs for checklist generation.
#[derive(Debug, Clone)]
pub struct ChecklistRequest {
    pub client_name: String,
    pub axis: Axis,
    pub current_score: i32,
}

/// Inputs for evaluating a submitted checklist.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub client_name: String,
    pub axis: Axis,
    pub items: Vec<String>,
    pub checked_indices: Vec<usize>,
    pub min_checks: u32,
}

impl EvaluationRequest {
    /// Checked indices deduplicated and restricted to the checklist range.
    /// Out-of-range indices are ignored rather than rejected.
    pub fn normalized_indices(&self) -> BTreeSet<usize> {
        self.checked_indices
            .iter()
            .copied()
            .filter(|index| *index < self.items.len())
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.normalized_indices().len()
    }

    pub fn checked_items(&self) -> Vec<&str> {
        let checked = self.normalized_indices();
        self.items
            .iter()
            .enumerate()
            .filter(|(index, _)| checked.contains(index))
            .map(|(_, item)| item.as_str())
            .collect()
    }

    pub fn unchecked_items(&self) -> Vec<&str> {
        let checked = self.normalized_indices();
        self.items
            .iter()
            .enumerate()
            .filter(|(index, _)| !checked.contains(index))
            .map(|(_, item)| item.as_str())
            .collect()
    }
}

/// The external oracle as the engine sees it: two structured calls, both
/// bounded by the configured timeout in real implementations.
pub trait CoachingOracle: Send + Sync {
    fn generate_checklist(&self, request: &ChecklistRequest) -> Result<Checklist, OracleError>;
    fn evaluate_checklist(&self, request: &EvaluationRequest) -> Result<Evaluation, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request timed out")]
    Timeout,
    #[error("oracle backend error: {0}")]
    Backend(String),
    #[error("oracle returned a malformed response: {0}")]
    MalformedResponse(String),
}

pub(crate) fn generation_system_prompt() -> &'static str {
    "You are a business mentor with ten years of coaching experience."
}

pub(crate) fn generation_user_prompt(request: &ChecklistRequest) -> String {
    let name = &request.client_name;
    let label = request.axis.label();
    format!(
        "{name} is working on {label} (current score: {score}) and here is where they stand: {context}\n\n\
         Build a warm, concrete self-check list that lets {name} reflect and come away feeling either \
         \"I am doing better than I thought\" or \"these are the gaps I can close\".\n\n\
         Requirements:\n\
         - 5 to 7 items\n\
         - phrased as questions like \"Have you ...?\" or \"Are you ... -ing?\"\n\
         - encouraging tone, never accusatory\n\
         - specific and actionable\n\
         - written from a business owner's point of view\n\n\
         Respond with JSON in exactly this shape:\n\
         {{\n\
           \"intro\": \"short, punchy title\",\n\
           \"subtitle\": \"a warm word of encouragement for the owner\",\n\
           \"checklist\": [\"question 1\", \"question 2\", \"question 3\", \"question 4\", \"question 5\"],\n\
           \"minChecks\": 3\n\
         }}",
        score = request.current_score,
        context = request.axis.empathy_context(),
    )
}

pub(crate) fn evaluation_system_prompt() -> &'static str {
    "You are a professional mentor helping business owners grow."
}

pub(crate) fn evaluation_user_prompt(request: &EvaluationRequest) -> String {
    let name = &request.client_name;
    let label = request.axis.label();
    let checked = request.checked_count();
    let total = request.items.len();

    let mut prompt = format!("{name} has finished the \"{label}\" checklist.\n\n");

    writeln!(prompt, "Checked items ({checked}/{total}):").expect("write prompt");
    for item in request.checked_items() {
        writeln!(prompt, "[x] {item}").expect("write prompt");
    }

    writeln!(prompt, "\nUnchecked items:").expect("write prompt");
    for item in request.unchecked_items() {
        writeln!(prompt, "[ ] {item}").expect("write prompt");
    }

    write!(
        prompt,
        "\nAssess how ready {name} is to improve \"{label}\" and decide whether they can move on \
         to the next step.\n\n\
         Guidelines:\n\
         - {min_checks} or more checked items normally passes (passed: true).\n\
         - You may still recommend another look when a critical item is missing or the effort looks thin.\n\
         - Keep the tone warm and encouraging, with professional insight.\n\n\
         Respond with JSON in exactly this shape:\n\
         {{\n\
           \"passed\": true or false,\n\
           \"score\": {checked},\n\
           \"total\": {total},\n\
           \"message\": \"3-4 sentences of evaluation and encouragement\",\n\
           \"nextStep\": \"guidance for the next step when passed, empty string otherwise\"\n\
         }}",
        min_checks = request.min_checks,
    )
    .expect("write prompt");

    prompt
}

fn default_min_checks() -> u32 {
    DEFAULT_MIN_CHECKS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistPayload {
    intro: String,
    subtitle: String,
    checklist: Vec<String>,
    #[serde(default = "default_min_checks")]
    min_checks: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationPayload {
    passed: bool,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    total: u32,
    message: String,
    #[serde(default)]
    next_step: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat-completions client for the oracle, used from blocking contexts (the
/// HTTP layer hops onto a blocking thread before calling in here).
pub struct HttpCoachingOracle {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpCoachingOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| OracleError::Backend(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn chat<T: serde::de::DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<T, OracleError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Backend(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(OracleError::Backend(format!("{status}: {detail}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .map_err(|err| OracleError::MalformedResponse(err.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("no choices returned".to_string()))?;

        serde_json::from_str(&content).map_err(|err| OracleError::MalformedResponse(err.to_string()))
    }
}

impl CoachingOracle for HttpCoachingOracle {
    fn generate_checklist(&self, request: &ChecklistRequest) -> Result<Checklist, OracleError> {
        let payload: ChecklistPayload =
            self.chat(generation_system_prompt(), &generation_user_prompt(request))?;
        Ok(Checklist {
            intro: payload.intro,
            subtitle: payload.subtitle,
            items: payload.checklist,
            min_checks: payload.min_checks,
        })
    }

    fn evaluate_checklist(&self, request: &EvaluationRequest) -> Result<Evaluation, OracleError> {
        let payload: EvaluationPayload =
            self.chat(evaluation_system_prompt(), &evaluation_user_prompt(request))?;
        Ok(Evaluation {
            passed: payload.passed,
            score: payload.score,
            total: payload.total,
            message: payload.message,
            next_step: payload.next_step,
        })
    }
}
