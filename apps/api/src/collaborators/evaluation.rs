//! Weighted evaluator: turns per-answer scores into the final interview verdict.
//!
//! technical_score = mean(technical answers)
//! hr_score        = mean(hr + behavioral answers)
//! overall_score   = technical × w + hr × (1 − w)
//!
//! A bucket with no answers borrows the other bucket's mean so the combination stays
//! a convex one over the answers that exist.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CollaboratorError, Evaluator};
use crate::models::{Answer, Evaluation, JobProfile, Question, QuestionCategory, Recommendation};

/// Below this average word count the answers are flagged as too brief.
const BRIEF_ANSWER_WORDS: usize = 20;
const MAX_SKILL_STRENGTHS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: f64,
    pub hr: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::technical_share(0.6)
    }
}

impl ScoreWeights {
    /// Weights `technical` against `1 - technical`, clamped to [0, 1].
    pub fn technical_share(technical: f64) -> Self {
        let technical = technical.clamp(0.0, 1.0);
        Self {
            technical,
            hr: 1.0 - technical,
        }
    }

    pub fn combine(&self, technical_score: f64, hr_score: f64) -> f64 {
        (self.technical * technical_score + self.hr * hr_score).clamp(0.0, 10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    pub weights: ScoreWeights,
    /// overall ≥ this → accepted
    pub accept_threshold: f64,
    /// overall ≥ this → deferred, otherwise rejected
    pub defer_threshold: f64,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            accept_threshold: 7.5,
            defer_threshold: 5.0,
        }
    }
}

impl EvaluationPolicy {
    pub fn recommend(&self, overall: f64) -> Recommendation {
        if overall >= self.accept_threshold {
            Recommendation::Accepted
        } else if overall >= self.defer_threshold {
            Recommendation::Deferred
        } else {
            Recommendation::Rejected
        }
    }
}

pub struct WeightedEvaluator {
    policy: EvaluationPolicy,
    delay: Duration,
}

impl WeightedEvaluator {
    pub fn new(policy: EvaluationPolicy, delay: Duration) -> Self {
        Self { policy, delay }
    }
}

#[async_trait]
impl Evaluator for WeightedEvaluator {
    async fn evaluate(
        &self,
        profile: &JobProfile,
        questions: &[Question],
        answers: &[Answer],
    ) -> Result<Evaluation, CollaboratorError> {
        tokio::time::sleep(self.delay).await;
        compute_evaluation(&self.policy, profile, questions, answers)
    }
}

#[derive(Default)]
struct Bucket {
    total: f64,
    count: usize,
}

impl Bucket {
    fn add(&mut self, score: f64) {
        self.total += score;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

fn compute_evaluation(
    policy: &EvaluationPolicy,
    profile: &JobProfile,
    questions: &[Question],
    answers: &[Answer],
) -> Result<Evaluation, CollaboratorError> {
    if answers.is_empty() {
        return Err(CollaboratorError::Failed("no answers to evaluate".into()));
    }

    let mut technical = Bucket::default();
    let mut hr = Bucket::default();
    let mut behavioral = Bucket::default();

    for (question, answer) in questions.iter().zip(answers) {
        match question.category {
            QuestionCategory::Technical => technical.add(answer.score),
            QuestionCategory::Hr => hr.add(answer.score),
            QuestionCategory::Behavioral => behavioral.add(answer.score),
        }
    }

    let mut people = Bucket {
        total: hr.total + behavioral.total,
        count: hr.count + behavioral.count,
    };
    if people.count == 0 && technical.count == 0 {
        // Questions and answers did not line up at all.
        return Err(CollaboratorError::InvalidOutput(
            "answers do not match any question".into(),
        ));
    }
    let technical_score = round1(technical.mean().or(people.mean()).unwrap_or_default());
    if people.count == 0 {
        people.add(technical_score);
    }
    let hr_score = round1(people.mean().unwrap_or_default());
    let overall_score = round1(policy.weights.combine(technical_score, hr_score));
    let recommendation = policy.recommend(overall_score);

    let strengths = collect_strengths(profile, &technical, &hr, &behavioral, answers);
    let weaknesses = collect_weaknesses(&technical, &hr, &behavioral, answers);

    Ok(Evaluation {
        technical_score,
        hr_score,
        overall_score,
        strengths,
        weaknesses,
        recommendation,
        feedback: overall_feedback(recommendation).to_string(),
    })
}

fn collect_strengths(
    profile: &JobProfile,
    technical: &Bucket,
    hr: &Bucket,
    behavioral: &Bucket,
    answers: &[Answer],
) -> Vec<String> {
    let mut strengths = Vec::new();
    if technical.mean().is_some_and(|m| m >= 8.0) {
        strengths.push("Solid technical knowledge".to_string());
    }
    if hr.mean().is_some_and(|m| m >= 8.0) {
        strengths.push("Clear communication".to_string());
    }
    if behavioral.mean().is_some_and(|m| m >= 8.0) {
        strengths.push("Relevant experience handling difficult situations".to_string());
    }

    let answer_text = answers
        .iter()
        .map(|a| a.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    strengths.extend(
        profile
            .skills
            .iter()
            .filter(|skill| answer_text.contains(&skill.to_lowercase()))
            .take(MAX_SKILL_STRENGTHS)
            .map(|skill| format!("Demonstrated experience with {skill}")),
    );

    if strengths.is_empty() {
        strengths.push("Completed the full interview".to_string());
    }
    strengths
}

fn collect_weaknesses(
    technical: &Bucket,
    hr: &Bucket,
    behavioral: &Bucket,
    answers: &[Answer],
) -> Vec<String> {
    let mut weaknesses = Vec::new();
    if technical.mean().is_some_and(|m| m < 7.0) {
        weaknesses.push("Technical answers could go deeper".to_string());
    }
    if hr.mean().is_some_and(|m| m < 7.0) {
        weaknesses.push("Motivation answers felt generic".to_string());
    }
    if behavioral.mean().is_some_and(|m| m < 7.0) {
        weaknesses
            .push("Give more concrete examples (situation, action, result)".to_string());
    }

    let words: usize = answers.iter().map(|a| a.text.split_whitespace().count()).sum();
    if words / answers.len() < BRIEF_ANSWER_WORDS {
        weaknesses.push("Answers were sometimes too brief".to_string());
    }
    weaknesses
}

fn overall_feedback(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Accepted => "Promising candidate with good technical skills and clear communication. \
            A few points to improve, but overall a good fit for the position.",
        Recommendation::Deferred => "Mixed performance. The fundamentals are there, but several answers need \
            more depth before moving forward.",
        Recommendation::Rejected => "The answers did not yet demonstrate the level expected for this position. \
            Review the weaknesses below and practice again.",
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures::{answer, five_questions, profile, question};

    fn answers_with(scores: [f64; 5]) -> Vec<Answer> {
        ["q1", "q2", "q3", "q4", "q5"]
            .iter()
            .zip(scores)
            .map(|(id, s)| answer(id, s))
            .collect()
    }

    #[test]
    fn test_default_weights_reproduce_reference_example() {
        let w = ScoreWeights::default();
        // 0.6 * 8.5 + 0.4 * 7.8 = 8.22
        assert!((w.combine(8.5, 7.8) - 8.22).abs() < 1e-9);
    }

    #[test]
    fn test_weights_are_convex() {
        let w = ScoreWeights::technical_share(1.7);
        assert_eq!(w.technical, 1.0);
        assert_eq!(w.hr, 0.0);
    }

    #[test]
    fn test_uniform_scores_give_same_overall() {
        let evaluation = compute_evaluation(
            &EvaluationPolicy::default(),
            &profile(),
            &five_questions(),
            &answers_with([8.0; 5]),
        )
        .unwrap();
        assert_eq!(evaluation.technical_score, 8.0);
        assert_eq!(evaluation.hr_score, 8.0);
        assert_eq!(evaluation.overall_score, 8.0);
        assert_eq!(evaluation.recommendation, Recommendation::Accepted);
        assert!(evaluation.has_valid_scores());
    }

    #[test]
    fn test_category_means_and_weighting() {
        // technical: 9, 10 → 9.5; hr bucket: 6, 7, 8 → 7.0; overall 0.6*9.5 + 0.4*7 = 8.5
        let evaluation = compute_evaluation(
            &EvaluationPolicy::default(),
            &profile(),
            &five_questions(),
            &answers_with([9.0, 10.0, 6.0, 7.0, 8.0]),
        )
        .unwrap();
        assert_eq!(evaluation.technical_score, 9.5);
        assert_eq!(evaluation.hr_score, 7.0);
        assert_eq!(evaluation.overall_score, 8.5);
        assert!(evaluation
            .weaknesses
            .iter()
            .any(|w| w.contains("concrete examples")));
    }

    #[test]
    fn test_recommendation_thresholds() {
        let policy = EvaluationPolicy::default();
        assert_eq!(policy.recommend(7.5), Recommendation::Accepted);
        assert_eq!(policy.recommend(7.4), Recommendation::Deferred);
        assert_eq!(policy.recommend(5.0), Recommendation::Deferred);
        assert_eq!(policy.recommend(4.9), Recommendation::Rejected);
    }

    #[test]
    fn test_low_scores_rejected_with_weaknesses() {
        let evaluation = compute_evaluation(
            &EvaluationPolicy::default(),
            &profile(),
            &five_questions(),
            &answers_with([3.0; 5]),
        )
        .unwrap();
        assert_eq!(evaluation.recommendation, Recommendation::Rejected);
        assert!(evaluation.weaknesses.len() >= 3);
        assert_eq!(evaluation.strengths, vec!["Completed the full interview"]);
    }

    #[test]
    fn test_missing_hr_bucket_borrows_technical() {
        let questions = vec![question("q1", QuestionCategory::Technical)];
        let answers = vec![answer("q1", 6.0)];
        let evaluation =
            compute_evaluation(&EvaluationPolicy::default(), &profile(), &questions, &answers)
                .unwrap();
        assert_eq!(evaluation.technical_score, 6.0);
        assert_eq!(evaluation.hr_score, 6.0);
        assert_eq!(evaluation.overall_score, 6.0);
        assert_eq!(evaluation.recommendation, Recommendation::Deferred);
    }

    #[test]
    fn test_skill_mentions_become_strengths() {
        let mut answers = answers_with([8.0; 5]);
        answers[0].text = "I have built several React applications".to_string();
        let evaluation = compute_evaluation(
            &EvaluationPolicy::default(),
            &profile(),
            &five_questions(),
            &answers,
        )
        .unwrap();
        assert!(evaluation
            .strengths
            .contains(&"Demonstrated experience with React".to_string()));
    }

    #[test]
    fn test_no_answers_is_an_error() {
        let result =
            compute_evaluation(&EvaluationPolicy::default(), &profile(), &five_questions(), &[]);
        assert!(result.is_err());
    }
}
