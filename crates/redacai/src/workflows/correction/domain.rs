use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound of the ENEM-style total score.
pub const MAX_SCORE: u16 = 1000;

/// Message shown when the boundary returns no structured feedback at all.
pub const FALLBACK_FEEDBACK: &str = "Correção concluída com sucesso.";

/// Persisted usage counter for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub count: u32,
}

impl UsageRecord {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

/// Essay payload accepted for evaluation. Construction trims nothing; it only rejects
/// text that is blank once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    essay_text: String,
}

impl EvaluationRequest {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let essay_text = raw.into();
        if essay_text.trim().is_empty() {
            return Err(ValidationError::EmptyEssay);
        }
        Ok(Self { essay_text })
    }

    pub fn essay_text(&self) -> &str {
        &self.essay_text
    }
}

/// Rejections raised before any quota or network work happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("empty essay")]
    EmptyEssay,
}

/// Feedback section headings, in composition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSection {
    Strengths,
    Improvements,
    FinalComments,
}

impl FeedbackSection {
    pub const fn ordered() -> [Self; 3] {
        [Self::Strengths, Self::Improvements, Self::FinalComments]
    }

    pub const fn heading(self) -> &'static str {
        match self {
            Self::Strengths => "Pontos fortes:",
            Self::Improvements => "Pontos a melhorar:",
            Self::FinalComments => "Comentários finais:",
        }
    }
}

/// Normalized outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub score: Option<u16>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub final_comments: Option<String>,
    pub composed_feedback: String,
}

impl EvaluationResult {
    /// Builds the result and derives `composed_feedback` from the present sections.
    pub fn compose(
        score: Option<u16>,
        strengths: Option<String>,
        improvements: Option<String>,
        final_comments: Option<String>,
    ) -> Self {
        let strengths = non_blank(strengths);
        let improvements = non_blank(improvements);
        let final_comments = non_blank(final_comments);

        let blocks: Vec<String> = FeedbackSection::ordered()
            .into_iter()
            .filter_map(|section| {
                let body = match section {
                    FeedbackSection::Strengths => strengths.as_deref(),
                    FeedbackSection::Improvements => improvements.as_deref(),
                    FeedbackSection::FinalComments => final_comments.as_deref(),
                }?;
                Some(format!("{}\n{}", section.heading(), body))
            })
            .collect();

        let composed_feedback = if blocks.is_empty() {
            FALLBACK_FEEDBACK.to_string()
        } else {
            blocks.join("\n\n")
        };

        Self {
            score,
            strengths,
            improvements,
            final_comments,
            composed_feedback,
        }
    }

    /// Score as a 0–100 progress value; zero when no score was reported.
    pub fn score_progress(&self) -> f32 {
        match self.score {
            Some(score) if score > 0 => {
                ((score as f32 / MAX_SCORE as f32) * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

fn non_blank(block: Option<String>) -> Option<String> {
    block
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Why the last evaluation did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    Network(String),
    Protocol(String),
}

/// Lifecycle of the controller's current evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum EvaluationState {
    #[default]
    Idle,
    Pending,
    Succeeded(EvaluationResult),
    Failed(FailureReason),
}

impl EvaluationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_sections_in_fixed_order_skipping_absent_ones() {
        let result = EvaluationResult::compose(
            Some(700),
            Some("A".to_string()),
            Some("B".to_string()),
            None,
        );
        assert_eq!(
            result.composed_feedback,
            "Pontos fortes:\nA\n\nPontos a melhorar:\nB"
        );
    }

    #[test]
    fn final_comments_follow_improvements() {
        let result = EvaluationResult::compose(
            None,
            None,
            Some("Revise a conclusão.".to_string()),
            Some("Bom trabalho.".to_string()),
        );
        assert_eq!(
            result.composed_feedback,
            "Pontos a melhorar:\nRevise a conclusão.\n\nComentários finais:\nBom trabalho."
        );
    }

    #[test]
    fn falls_back_when_every_section_is_blank() {
        let result = EvaluationResult::compose(Some(500), Some("   ".to_string()), None, None);
        assert_eq!(result.composed_feedback, FALLBACK_FEEDBACK);
        assert!(result.strengths.is_none());
    }

    #[test]
    fn score_progress_is_a_clamped_percentage() {
        let result = EvaluationResult::compose(Some(860), None, None, None);
        assert!((result.score_progress() - 86.0).abs() < f32::EPSILON);

        let missing = EvaluationResult::compose(None, None, None, None);
        assert_eq!(missing.score_progress(), 0.0);
    }

    #[test]
    fn blank_essay_is_rejected() {
        assert_eq!(
            EvaluationRequest::new(" \n\t "),
            Err(ValidationError::EmptyEssay)
        );
        let request = EvaluationRequest::new("  Texto  ").expect("non-blank essay");
        assert_eq!(request.essay_text(), "  Texto  ");
    }

    #[test]
    fn usage_record_serializes_as_calendar_date() {
        let record = UsageRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid date"),
            2,
        );
        let json = serde_json::to_value(record).expect("serializes");
        assert_eq!(json, serde_json::json!({ "date": "2025-03-09", "count": 2 }));
    }
}
