//! Optional AI advisor for subtask planning and motivation.
//!
//! # Responsibility
//! - Turn a task title into 3-5 short actionable subtasks.
//! - Produce a short motivational message from the pending-task count.
//!
//! # Invariants
//! - Callers never receive an error: every failure collapses into a fixed
//!   fallback value inside this module.
//! - "Not configured" is distinct from "configured but failed": without a
//!   backend no network call is attempted and `suggest_subtasks` returns an
//!   empty list.

pub mod gemini;

use async_trait::async_trait;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Fallback subtasks when a configured backend fails.
const FALLBACK_SUBTASKS: [&str; 3] = [
    "Identify the first step",
    "Gather necessary resources",
    "Execute the core action",
];
/// Motivation when no backend is configured.
const FALLBACK_MOTIVATION_UNCONFIGURED: &str = "Keep pushing forward! You've got this.";
/// Motivation when a configured backend fails.
const FALLBACK_MOTIVATION_FAILED: &str = "Focus on being productive instead of busy.";
/// Motivation when the backend replies with empty text.
const FALLBACK_MOTIVATION_EMPTY: &str = "Action is the foundational key to all success.";

/// Failures inside the advisory boundary; absorbed before reaching callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    Transport(String),
    MalformedResponse(String),
}

impl Display for AdvisorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "advisor transport failure: {message}"),
            Self::MalformedResponse(message) => {
                write!(f, "advisor malformed response: {message}")
            }
        }
    }
}

impl Error for AdvisorError {}

/// Response shaping requested from the text backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Constrain the reply to a JSON array of strings.
    JsonStringArray,
    /// Free text, expected to stay short.
    FreeText,
}

/// Text-generation boundary behind the advisor.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str, shape: ResponseShape) -> Result<String, AdvisorError>;
}

/// Advisor facade; `backend = None` means AI is not configured.
pub struct TaskAdvisor {
    backend: Option<Arc<dyn TextModel>>,
}

impl TaskAdvisor {
    pub fn new(backend: Option<Arc<dyn TextModel>>) -> Self {
        Self { backend }
    }

    /// Advisor with no backend: no network calls, unconfigured fallbacks.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Suggests 3-5 short subtasks for a task title.
    ///
    /// # Contract
    /// - Not configured: returns an empty list without any call.
    /// - Configured but failed (transport, malformed or empty reply):
    ///   returns the fixed fallback triple.
    pub async fn suggest_subtasks(&self, title: &str) -> Vec<String> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        let prompt = format!(
            "Break down the following task into 3 to 5 smaller, actionable subtasks. \
             Keep them concise. Task: \"{title}\""
        );

        match backend.generate(&prompt, ResponseShape::JsonStringArray).await {
            Ok(raw) => match parse_subtasks(&raw) {
                Ok(subtasks) => subtasks,
                Err(err) => {
                    warn!("event=suggest_subtasks module=advisor status=fallback error={err}");
                    fallback_subtasks()
                }
            },
            Err(err) => {
                warn!("event=suggest_subtasks module=advisor status=fallback error={err}");
                fallback_subtasks()
            }
        }
    }

    /// Produces a short motivational message for `pending_count` open tasks.
    ///
    /// # Contract
    /// - Not configured: fixed general-encouragement string, no call.
    /// - Configured but failed: fixed failure string.
    /// - Empty model reply: fixed empty-reply string.
    pub async fn motivational_message(&self, pending_count: usize) -> String {
        let Some(backend) = &self.backend else {
            return FALLBACK_MOTIVATION_UNCONFIGURED.to_string();
        };

        let prompt = format!(
            "I have {pending_count} tasks left to do today. Give me a very short, punchy, \
             and unique motivational tip or quote to get me moving. Maximum 20 words."
        );

        match backend.generate(&prompt, ResponseShape::FreeText).await {
            Ok(raw) => {
                let message = raw.trim();
                if message.is_empty() {
                    FALLBACK_MOTIVATION_EMPTY.to_string()
                } else {
                    message.to_string()
                }
            }
            Err(err) => {
                warn!("event=motivational_message module=advisor status=fallback error={err}");
                FALLBACK_MOTIVATION_FAILED.to_string()
            }
        }
    }
}

fn fallback_subtasks() -> Vec<String> {
    FALLBACK_SUBTASKS.iter().map(|s| s.to_string()).collect()
}

fn parse_subtasks(raw: &str) -> Result<Vec<String>, AdvisorError> {
    let subtasks: Vec<String> = serde_json::from_str(raw.trim())
        .map_err(|err| AdvisorError::MalformedResponse(err.to_string()))?;
    if subtasks.is_empty() {
        return Err(AdvisorError::MalformedResponse(
            "empty subtask array".to_string(),
        ));
    }
    Ok(subtasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtask_array_parses() {
        let parsed = parse_subtasks(r#"["step one", "step two"]"#).unwrap();
        assert_eq!(parsed, vec!["step one", "step two"]);
    }

    #[test]
    fn empty_subtask_array_is_malformed() {
        assert!(matches!(
            parse_subtasks("[]"),
            Err(AdvisorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_array_reply_is_malformed() {
        assert!(matches!(
            parse_subtasks("plan your day"),
            Err(AdvisorError::MalformedResponse(_))
        ));
    }
}
