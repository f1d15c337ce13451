use serde::{Deserialize, Serialize};

/// Upper bound of every score in the system. Lower bound is 0.
pub const MAX_SCORE: f64 = 10.0;

/// Returns true when `score` is a usable score in `[0, MAX_SCORE]`.
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (0.0..=MAX_SCORE).contains(&score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Hr,
    Behavioral,
}

impl QuestionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionCategory::Technical => "Technical",
            QuestionCategory::Hr => "HR",
            QuestionCategory::Behavioral => "Behavioral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within a session.
    pub id: String,
    pub text: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub text: String,
    /// 0.0 – 10.0
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Accepted,
    Deferred,
    Rejected,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Accepted => "Application accepted",
            Recommendation::Deferred => "Application to be reviewed",
            Recommendation::Rejected => "Application not accepted",
        }
    }
}

/// Final verdict for a session. Written exactly once, after the last answer is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub technical_score: f64,
    pub hr_score: f64,
    pub overall_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: Recommendation,
    pub feedback: String,
}

impl Evaluation {
    /// Every score lies in `[0, MAX_SCORE]`.
    pub fn has_valid_scores(&self) -> bool {
        [self.technical_score, self.hr_score, self.overall_score]
            .into_iter()
            .all(is_valid_score)
    }
}
