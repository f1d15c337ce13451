//! External collaborators: the four opaque operations the session core depends on.
//!
//! Every "AI" step goes through one of these traits. The service wires the simulated
//! implementations at startup; tests inject deterministic doubles. Callers never
//! invoke a collaborator directly: they go through `call_with_timeout`, which bounds
//! the call and turns expiry into a recoverable `CollaboratorError::Timeout`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Answer, Evaluation, JobProfile, Question};

pub mod analysis;
pub mod evaluation;
pub mod questions;
pub mod scoring;

pub use analysis::SimulatedAnalyzer;
pub use evaluation::{EvaluationPolicy, ScoreWeights, WeightedEvaluator};
pub use questions::TemplateQuestionGenerator;
pub use scoring::RandomScorer;

/// The external operations a session can have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AnalyzeJob,
    GenerateQuestions,
    ScoreAnswer,
    Evaluate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::AnalyzeJob => "job analysis",
            Operation::GenerateQuestions => "question generation",
            Operation::ScoreAnswer => "answer scoring",
            Operation::Evaluate => "evaluation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Failed(String),

    #[error("{operation} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        operation: Operation,
        after: Duration,
    },

    #[error("invalid output: {0}")]
    InvalidOutput(String),
}

/// Score and feedback for a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub score: f64,
    pub feedback: String,
}

#[async_trait]
pub trait JobAnalyzer: Send + Sync {
    async fn analyze(&self, raw_text: &str) -> Result<JobProfile, CollaboratorError>;
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, profile: &JobProfile) -> Result<Vec<Question>, CollaboratorError>;
}

#[async_trait]
pub trait AnswerScorer: Send + Sync {
    async fn score(
        &self,
        question: &Question,
        answer_text: &str,
    ) -> Result<AnswerScore, CollaboratorError>;
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        profile: &JobProfile,
        questions: &[Question],
        answers: &[Answer],
    ) -> Result<Evaluation, CollaboratorError>;
}

/// Runs a collaborator future under `limit`. Expiry becomes `CollaboratorError::Timeout`.
pub async fn call_with_timeout<T, F>(
    operation: Operation,
    limit: Duration,
    call: F,
) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout {
            operation,
            after: limit,
        }),
    }
}
