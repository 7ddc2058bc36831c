//! Remote AI workload analysis.
//!
//! Sends the current task list to a generative model and gets back a
//! structured workload report. The response schema pins the reply to the
//! `AIAnalysisResult` shape so the body parses directly as JSON. An empty
//! task list short-circuits to a canned zero-workload result without any
//! network traffic.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::task::Task;

/// Default model for the analysis call.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Errors from the analysis subsystem.
///
/// Callers render every variant as the same generic failure message; the
/// variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API credential in ${API_KEY_VAR}")]
    MissingCredential,

    #[error("analysis request failed: {message}")]
    Request { message: String },

    #[error("failed to parse analysis response: {message}")]
    Parse { message: String },

    #[error("analysis response contained no text")]
    EmptyResponse,
}

/// Configuration for the analysis call.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl AnalyzeConfig {
    /// Build a config from the process environment, with an optional model
    /// override.
    pub fn from_env(model: Option<String>) -> Self {
        AnalyzeConfig {
            api_key: std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// One entry of the suggested work order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub task_title: String,
    pub reason: String,
}

/// Structured analysis of the current workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AIAnalysisResult {
    pub summary: String,
    pub priority_tasks: Vec<String>,
    pub suggested_schedule: Vec<ScheduleItem>,
    /// Overall burden, 0-10.
    pub workload_score: f64,
}

/// Analyse the workload, or fail with a single error; no retry, no partial
/// result.
pub fn analyze(tasks: &[Task], config: &AnalyzeConfig) -> Result<AIAnalysisResult, AiError> {
    if tasks.is_empty() {
        return Ok(AIAnalysisResult {
            summary: "You have no outstanding tasks. Add one to get an AI analysis right away."
                .into(),
            priority_tasks: Vec::new(),
            suggested_schedule: Vec::new(),
            workload_score: 0.0,
        });
    }

    let api_key = config.api_key.as_deref().ok_or(AiError::MissingCredential)?;

    let prompt = format!(
        "Analyse the following workload and advise on priorities:\n{}\n\n\
         Summarise the urgency, suggest the most suitable order of work to \
         finish everything on time, and score the overall workload from 1-10.",
        serde_json::to_string(&task_projection(tasks)).expect("projection serialises")
    );

    let body = serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
    });

    let url = format!("{}/models/{}:generateContent", config.base_url, config.model);
    debug!(model = %config.model, tasks = tasks.len(), "requesting analysis");

    let agent = ureq::AgentBuilder::new()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build();

    let resp = agent
        .post(&url)
        .set("Content-Type", "application/json")
        .set("x-goog-api-key", api_key)
        .send_string(&body.to_string())
        .map_err(|e: ureq::Error| AiError::Request { message: e.to_string() })?;

    let raw = resp
        .into_string()
        .map_err(|e| AiError::Parse { message: e.to_string() })?;

    parse_analysis(&extract_text(&raw)?)
}

/// Project each task to the fields the model sees.
fn task_projection(tasks: &[Task]) -> serde_json::Value {
    serde_json::Value::Array(
        tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "title": t.title,
                    "dueDate": t.due_date,
                    "priority": t.priority,
                    "status": t.status,
                    "description": t.description,
                })
            })
            .collect(),
    )
}

/// Response schema constraining the model output to `AIAnalysisResult`.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING", "description": "Overview of the outstanding workload" },
            "priorityTasks": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Titles of the tasks to start immediately"
            },
            "suggestedSchedule": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "taskTitle": { "type": "STRING" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["taskTitle", "reason"]
                }
            },
            "workloadScore": { "type": "NUMBER", "description": "Workload score, 1-10" }
        },
        "required": ["summary", "priorityTasks", "suggestedSchedule", "workloadScore"]
    })
}

/// Pull the generated text out of a `generateContent` response envelope.
fn extract_text(raw: &str) -> Result<String, AiError> {
    let envelope: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| AiError::Parse { message: e.to_string() })?;
    let text = envelope["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    if text.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Parse the model's JSON text as a structured analysis result.
fn parse_analysis(text: &str) -> Result<AIAnalysisResult, AiError> {
    serde_json::from_str(text).map_err(|e| AiError::Parse { message: e.to_string() })
}
