//! Session aggregate: the canonical state of one interview-prep run.
//!
//! Invariants held after every successful mutation:
//! - `current_index == answers.len()` and `current_index <= questions.len()`
//! - `answers[i].question_id == questions[i].id`
//! - `is_complete` iff every question is answered and an evaluation is stored
//!
//! Mutations that would break an invariant are rejected with a `SessionError`
//! and leave the aggregate untouched.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::{is_valid_score, Answer, Evaluation, JobProfile, Question};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("questions cannot change once answers have been recorded")]
    QuestionsLocked,

    #[error("question list must not be empty")]
    EmptyQuestionList,

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(String),

    #[error("job profile cannot change once questions have been generated")]
    ProfileLocked,

    #[error("session is already complete")]
    AlreadyComplete,

    #[error("no question is awaiting an answer")]
    NoPendingQuestion,

    #[error("answer targets question '{got}' but question '{expected}' is pending")]
    OutOfOrder { expected: String, got: String },

    #[error("score {0} is outside [0, 10]")]
    ScoreOutOfRange(f64),

    #[error("{remaining} question(s) still unanswered")]
    Unanswered { remaining: usize },

    #[error("session has already been evaluated")]
    AlreadyEvaluated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    job_profile: Option<JobProfile>,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Answer>,
    is_complete: bool,
    evaluation: Option<Evaluation>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_profile(&self) -> Option<&JobProfile> {
        self.job_profile.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.answers.len() == self.questions.len()
    }

    pub fn set_profile(&mut self, profile: JobProfile) -> Result<(), SessionError> {
        if !self.questions.is_empty() {
            return Err(SessionError::ProfileLocked);
        }
        self.job_profile = Some(profile);
        Ok(())
    }

    pub fn set_questions(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if !self.answers.is_empty() || self.is_complete {
            return Err(SessionError::QuestionsLocked);
        }
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionList);
        }
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(SessionError::DuplicateQuestionId(q.id.clone()));
            }
        }
        self.questions = questions;
        self.current_index = 0;
        Ok(())
    }

    /// Records the answer to the pending question and advances by one.
    pub fn append_answer(&mut self, answer: Answer) -> Result<(), SessionError> {
        if self.is_complete {
            return Err(SessionError::AlreadyComplete);
        }
        let pending = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::NoPendingQuestion)?;
        if pending.id != answer.question_id {
            return Err(SessionError::OutOfOrder {
                expected: pending.id.clone(),
                got: answer.question_id,
            });
        }
        if !is_valid_score(answer.score) {
            return Err(SessionError::ScoreOutOfRange(answer.score));
        }
        self.answers.push(answer);
        self.current_index = self.answers.len();
        Ok(())
    }

    /// Stores the final evaluation and marks the session complete.
    pub fn complete(&mut self, evaluation: Evaluation) -> Result<(), SessionError> {
        if self.evaluation.is_some() {
            return Err(SessionError::AlreadyEvaluated);
        }
        if self.questions.is_empty() {
            return Err(SessionError::EmptyQuestionList);
        }
        if !self.all_answered() {
            return Err(SessionError::Unanswered {
                remaining: self.questions.len() - self.answers.len(),
            });
        }
        self.evaluation = Some(evaluation);
        self.is_complete = true;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{
        Answer, Difficulty, Evaluation, JobProfile, Question, QuestionCategory, Recommendation,
    };

    pub fn profile() -> JobProfile {
        JobProfile {
            title: "Frontend Developer".to_string(),
            company: "Tech Solutions Inc.".to_string(),
            skills: vec!["React".to_string()],
            experience: "2-3 years".to_string(),
            description: "Frontend role focused on React.".to_string(),
            raw_content: "Frontend Developer\nReact".to_string(),
        }
    }

    pub fn question(id: &str, category: QuestionCategory) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}?"),
            category,
            difficulty: Difficulty::Intermediate,
        }
    }

    /// Five questions: two technical, one behavioral, two HR.
    pub fn five_questions() -> Vec<Question> {
        vec![
            question("q1", QuestionCategory::Technical),
            question("q2", QuestionCategory::Technical),
            question("q3", QuestionCategory::Behavioral),
            question("q4", QuestionCategory::Hr),
            question("q5", QuestionCategory::Hr),
        ]
    }

    pub fn answer(question_id: &str, score: f64) -> Answer {
        Answer {
            question_id: question_id.to_string(),
            text: "An answer".to_string(),
            score,
            feedback: "ok".to_string(),
        }
    }

    pub fn evaluation() -> Evaluation {
        Evaluation {
            technical_score: 8.0,
            hr_score: 8.0,
            overall_score: 8.0,
            strengths: vec!["Clear communication".to_string()],
            weaknesses: vec![],
            recommendation: Recommendation::Accepted,
            feedback: "Good".to_string(),
        }
    }
}
