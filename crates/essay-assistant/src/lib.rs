//! Essay review interface.
//!
//! The matching and alerting core never calls a real writing service; this
//! crate only fixes the shape of the collaboration. Production wiring can
//! plug in any backend that fulfills [`EssayAssistant`], and the bundled
//! mock stays deterministic for tests and demos.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("review service unavailable: {0}")]
    Unavailable(String),

    #[error("text rejected: {0}")]
    Rejected(String),
}

/// What the caller wants done with the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Grammar and mechanics only.
    Proofread,
    /// Clarity, structure, and tone feedback.
    Improve,
    /// Overlap scan against known sources.
    OriginalityCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Grammar,
    Clarity,
    Structure,
    Tone,
    Originality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub message: String,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
}

/// Revised text plus the suggestions that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayReview {
    pub revised: String,
    pub suggestions: Vec<Suggestion>,
}

#[async_trait]
pub trait EssayAssistant: Send + Sync {
    async fn review(&self, text: &str, mode: ReviewMode) -> Result<EssayReview, AssistError>;
}

/// Canned reviewer: echoes trimmed text back with fixed suggestions per
/// mode. No latency, no randomness.
pub struct MockEssayAssistant;

#[async_trait]
impl EssayAssistant for MockEssayAssistant {
    async fn review(&self, text: &str, mode: ReviewMode) -> Result<EssayReview, AssistError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(EssayReview {
                revised: String::new(),
                suggestions: Vec::new(),
            });
        }

        let suggestions = match mode {
            ReviewMode::Proofread => vec![Suggestion {
                kind: SuggestionKind::Grammar,
                message: "Check comma usage in long sentences".to_string(),
                confidence: 0.8,
            }],
            ReviewMode::Improve => vec![
                Suggestion {
                    kind: SuggestionKind::Clarity,
                    message: "Lead with your strongest example".to_string(),
                    confidence: 0.7,
                },
                Suggestion {
                    kind: SuggestionKind::Structure,
                    message: "Close by returning to the opening theme".to_string(),
                    confidence: 0.6,
                },
            ],
            ReviewMode::OriginalityCheck => vec![Suggestion {
                kind: SuggestionKind::Originality,
                message: "No overlapping passages found".to_string(),
                confidence: 0.9,
            }],
        };

        Ok(EssayReview {
            revised: trimmed.to_string(),
            suggestions,
        })
    }
}
