use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{
    AnswerScorer, EvaluationPolicy, Evaluator, JobAnalyzer, QuestionGenerator, RandomScorer,
    ScoreWeights, SimulatedAnalyzer, TemplateQuestionGenerator, WeightedEvaluator,
};
use crate::config::Config;
use crate::intake::JobIntake;
use crate::interview::InterviewEngine;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub intake: Arc<JobIntake>,
    pub engine: Arc<InterviewEngine>,
}

impl AppState {
    /// Wires the simulated collaborators configured by `config`.
    pub fn new(config: &Config) -> Self {
        let policy = EvaluationPolicy {
            weights: ScoreWeights::technical_share(config.technical_score_weight),
            ..EvaluationPolicy::default()
        };
        Self::with_collaborators(
            config.collaborator_timeout,
            Arc::new(SimulatedAnalyzer::new(config.analysis_delay)),
            Arc::new(TemplateQuestionGenerator::new(config.question_delay)),
            Arc::new(RandomScorer::new(
                config.demo_score_min..=config.demo_score_max,
                config.scoring_delay,
            )),
            Arc::new(WeightedEvaluator::new(policy, config.evaluation_delay)),
        )
    }

    pub fn with_collaborators(
        timeout: Duration,
        analyzer: Arc<dyn JobAnalyzer>,
        generator: Arc<dyn QuestionGenerator>,
        scorer: Arc<dyn AnswerScorer>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            intake: Arc::new(JobIntake::new(analyzer, timeout)),
            engine: Arc::new(InterviewEngine::new(generator, scorer, evaluator, timeout)),
            sessions: SessionStore::new(),
        }
    }
}
