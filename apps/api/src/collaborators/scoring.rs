//! Demo answer scorer: random whole-number scores for the demo service.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{AnswerScore, AnswerScorer, CollaboratorError};
use crate::models::Question;

const EXCELLENT_FEEDBACK: &str = "Excellent answer! You fully understood the question and gave a clear, detailed explanation.";
const GOOD_FEEDBACK: &str = "Good answer. You covered the main points, but some aspects could have been explored further.";
const ACCEPTABLE_FEEDBACK: &str = "Acceptable answer, but it lacks precision. Try to be more specific in your explanations.";

pub struct RandomScorer {
    range: RangeInclusive<u8>,
    delay: Duration,
}

impl RandomScorer {
    /// `range` must lie within 0..=10; the bounds are validated by `Config`.
    pub fn new(range: RangeInclusive<u8>, delay: Duration) -> Self {
        Self { range, delay }
    }
}

#[async_trait]
impl AnswerScorer for RandomScorer {
    async fn score(
        &self,
        _question: &Question,
        _answer_text: &str,
    ) -> Result<AnswerScore, CollaboratorError> {
        tokio::time::sleep(self.delay).await;
        let score = rand::thread_rng().gen_range(self.range.clone()) as f64;
        Ok(AnswerScore {
            score,
            feedback: feedback_for(score).to_string(),
        })
    }
}

pub fn feedback_for(score: f64) -> &'static str {
    if score >= 9.0 {
        EXCELLENT_FEEDBACK
    } else if score >= 7.0 {
        GOOD_FEEDBACK
    } else {
        ACCEPTABLE_FEEDBACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionCategory;
    use crate::session::fixtures::question;

    #[test]
    fn test_feedback_tiers() {
        assert_eq!(feedback_for(10.0), EXCELLENT_FEEDBACK);
        assert_eq!(feedback_for(9.0), EXCELLENT_FEEDBACK);
        assert_eq!(feedback_for(7.0), GOOD_FEEDBACK);
        assert_eq!(feedback_for(6.9), ACCEPTABLE_FEEDBACK);
    }

    #[tokio::test]
    async fn test_scores_stay_in_range() {
        let scorer = RandomScorer::new(7..=10, Duration::ZERO);
        let q = question("q1", QuestionCategory::Technical);
        for _ in 0..50 {
            let scored = scorer.score(&q, "answer").await.unwrap();
            assert!((7.0..=10.0).contains(&scored.score));
            assert_eq!(scored.score.fract(), 0.0);
            assert_eq!(scored.feedback, feedback_for(scored.score));
        }
    }

    #[tokio::test]
    async fn test_degenerate_range_is_fixed_score() {
        let scorer = RandomScorer::new(4..=4, Duration::ZERO);
        let q = question("q1", QuestionCategory::Hr);
        let scored = scorer.score(&q, "answer").await.unwrap();
        assert_eq!(scored.score, 4.0);
        assert_eq!(scored.feedback, ACCEPTABLE_FEEDBACK);
    }
}
