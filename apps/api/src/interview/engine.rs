//! Interview engine: the session state machine.
//!
//! not_started → generating_questions → awaiting_answer → scoring
//!     → awaiting_answer (more questions) | evaluating (last answer) → complete
//!
//! Every step locks the session, checks the phase, marks its collaborator call as in
//! flight and releases the lock for the duration of the call. The result is committed
//! under a fresh lock. A failed call puts back the phase the step started from and
//! records nothing, so the caller can simply retry.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborators::{
    call_with_timeout, AnswerScorer, CollaboratorError, Evaluator, Operation, QuestionGenerator,
};
use crate::errors::AppError;
use crate::interview::prompts;
use crate::models::{is_valid_score, Answer, Evaluation, JobProfile, Question};
use crate::session::{Session, SessionEntry, SessionHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    NotStarted,
    GeneratingQuestions,
    AwaitingAnswer,
    Scoring,
    /// Every question is answered. The evaluation is running, or failed and awaits a retry.
    Evaluating,
    Complete,
}

impl fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterviewPhase::NotStarted => "not started",
            InterviewPhase::GeneratingQuestions => "generating questions",
            InterviewPhase::AwaitingAnswer => "awaiting an answer",
            InterviewPhase::Scoring => "scoring an answer",
            InterviewPhase::Evaluating => "evaluating",
            InterviewPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// A question as presented to the candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub question: Question,
    /// 1-based
    pub position: usize,
    pub total: usize,
}

impl Prompt {
    fn current(session: &Session) -> Option<Self> {
        session.current_question().map(|q| Prompt {
            question: q.clone(),
            position: session.current_index() + 1,
            total: session.questions().len(),
        })
    }
}

/// What happened after an answer was scored and recorded.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: Answer,
    pub next: NextStep,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextStep {
    Question { prompt: Prompt },
    Complete { evaluation: Evaluation },
    /// The last answer is recorded but the evaluation call failed; retry with `evaluate`.
    EvaluationFailed { message: String },
}

struct EvaluationInputs {
    session_id: Uuid,
    profile: JobProfile,
    questions: Vec<Question>,
    answers: Vec<Answer>,
}

pub struct InterviewEngine {
    generator: Arc<dyn QuestionGenerator>,
    scorer: Arc<dyn AnswerScorer>,
    evaluator: Arc<dyn Evaluator>,
    timeout: Duration,
}

impl InterviewEngine {
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        scorer: Arc<dyn AnswerScorer>,
        evaluator: Arc<dyn Evaluator>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            scorer,
            evaluator,
            timeout,
        }
    }

    /// Generates the questions for the session's job profile and emits the first one.
    ///
    /// Without a profile nothing is called and `NotReady` sends the caller back to intake.
    pub async fn start(&self, handle: &SessionHandle) -> Result<Prompt, AppError> {
        let (session_id, profile) = {
            let mut entry = handle.lock().await;
            entry.ensure_idle()?;
            let profile = entry.session.job_profile().cloned().ok_or_else(|| {
                AppError::NotReady(
                    "no job profile yet; submit a job description first".to_string(),
                )
            })?;
            if entry.phase != InterviewPhase::NotStarted {
                return Err(AppError::ContractViolation(format!(
                    "interview cannot start: it is already {}",
                    entry.phase
                )));
            }
            entry.begin_call(Operation::GenerateQuestions)?;
            entry.phase = InterviewPhase::GeneratingQuestions;
            (entry.id, profile)
        };

        info!("Session {session_id}: generating questions for '{}'", profile.title);
        let result = call_with_timeout(
            Operation::GenerateQuestions,
            self.timeout,
            self.generator.generate(&profile),
        )
        .await
        .and_then(check_questions);

        let mut entry = handle.lock().await;
        entry.end_call(Operation::GenerateQuestions);

        let questions = match result {
            Ok(questions) => questions,
            Err(e) => {
                entry.phase = InterviewPhase::NotStarted;
                warn!("Session {session_id}: question generation failed: {e}");
                return Err(AppError::external(Operation::GenerateQuestions, e));
            }
        };
        if let Err(e) = entry.session.set_questions(questions) {
            entry.phase = InterviewPhase::NotStarted;
            return Err(e.into());
        }

        entry.phase = InterviewPhase::AwaitingAnswer;
        entry.conversation.interviewer(prompts::greeting(&profile.title));
        let prompt = Prompt::current(&entry.session).ok_or_else(|| {
            AppError::ContractViolation("question list is empty after generation".to_string())
        })?;
        entry.conversation.interviewer(prompt.question.text.clone());
        info!(
            "Session {session_id}: interview started with {} questions",
            prompt.total
        );
        Ok(prompt)
    }

    /// Scores `text` as the answer to the pending question and moves the interview on.
    ///
    /// The visible question only advances once scoring has succeeded. After the last
    /// answer the evaluation runs immediately; its failure is reported in the outcome
    /// rather than as an error because the answer itself has been recorded.
    pub async fn submit_answer(
        &self,
        handle: &SessionHandle,
        text: &str,
    ) -> Result<TurnOutcome, AppError> {
        let (session_id, question) = {
            let mut entry = handle.lock().await;
            entry.ensure_idle()?;
            match entry.phase {
                InterviewPhase::AwaitingAnswer => {}
                InterviewPhase::NotStarted | InterviewPhase::GeneratingQuestions => {
                    return Err(AppError::NotReady(
                        "the interview has not started yet".to_string(),
                    ))
                }
                InterviewPhase::Scoring => return Err(AppError::Busy(Operation::ScoreAnswer)),
                InterviewPhase::Evaluating => {
                    return Err(AppError::ContractViolation(
                        "every question has been answered; retry the evaluation instead"
                            .to_string(),
                    ))
                }
                InterviewPhase::Complete => {
                    return Err(AppError::ContractViolation(
                        "the interview is complete; no more answers are accepted".to_string(),
                    ))
                }
            }
            if text.trim().is_empty() {
                return Err(AppError::Validation("answer must not be blank".to_string()));
            }
            let question = entry.session.current_question().cloned().ok_or_else(|| {
                AppError::ContractViolation("no question is awaiting an answer".to_string())
            })?;
            entry.begin_call(Operation::ScoreAnswer)?;
            entry.phase = InterviewPhase::Scoring;
            (entry.id, question)
        };

        let result = call_with_timeout(
            Operation::ScoreAnswer,
            self.timeout,
            self.scorer.score(&question, text),
        )
        .await
        .and_then(|scored| {
            if is_valid_score(scored.score) {
                Ok(scored)
            } else {
                Err(CollaboratorError::InvalidOutput(format!(
                    "score {} is outside [0, 10]",
                    scored.score
                )))
            }
        });

        let mut entry = handle.lock().await;
        entry.end_call(Operation::ScoreAnswer);

        let scored = match result {
            Ok(scored) => scored,
            Err(e) => {
                entry.phase = InterviewPhase::AwaitingAnswer;
                warn!("Session {session_id}: scoring {} failed: {e}", question.id);
                return Err(AppError::external(Operation::ScoreAnswer, e));
            }
        };

        let answer = Answer {
            question_id: question.id.clone(),
            text: text.to_string(),
            score: scored.score,
            feedback: scored.feedback,
        };
        if let Err(e) = entry.session.append_answer(answer.clone()) {
            entry.phase = InterviewPhase::AwaitingAnswer;
            return Err(e.into());
        }
        entry.conversation.candidate(text);
        entry.conversation.interviewer(answer.feedback.clone());
        info!(
            "Session {session_id}: {} scored {}/10 ({}/{} answered)",
            question.id,
            answer.score,
            entry.session.answers().len(),
            entry.session.questions().len()
        );

        if let Some(prompt) = Prompt::current(&entry.session) {
            entry.phase = InterviewPhase::AwaitingAnswer;
            entry.conversation.interviewer(prompt.question.text.clone());
            return Ok(TurnOutcome {
                answer,
                next: NextStep::Question { prompt },
            });
        }

        entry.phase = InterviewPhase::Evaluating;
        entry.conversation.interviewer(prompts::CLOSING_MESSAGE);
        let inputs = match prepare_evaluation(&mut entry) {
            Ok(inputs) => inputs,
            Err(e) => {
                return Ok(TurnOutcome {
                    answer,
                    next: NextStep::EvaluationFailed {
                        message: e.to_string(),
                    },
                })
            }
        };
        drop(entry);

        let next = match self.run_evaluation(handle, inputs).await {
            Ok(evaluation) => NextStep::Complete { evaluation },
            Err(e) => NextStep::EvaluationFailed {
                message: e.to_string(),
            },
        };
        Ok(TurnOutcome { answer, next })
    }

    /// Runs (or re-runs after a failure) the final evaluation.
    pub async fn evaluate(&self, handle: &SessionHandle) -> Result<Evaluation, AppError> {
        let inputs = {
            let mut entry = handle.lock().await;
            entry.ensure_idle()?;
            match entry.phase {
                InterviewPhase::Evaluating => {}
                InterviewPhase::Complete => {
                    return Err(AppError::ContractViolation(
                        "the session has already been evaluated".to_string(),
                    ))
                }
                phase => {
                    return Err(AppError::NotReady(format!(
                        "evaluation needs every question answered; the interview is {phase}"
                    )))
                }
            }
            prepare_evaluation(&mut entry)?
        };
        self.run_evaluation(handle, inputs).await
    }

    async fn run_evaluation(
        &self,
        handle: &SessionHandle,
        inputs: EvaluationInputs,
    ) -> Result<Evaluation, AppError> {
        let session_id = inputs.session_id;
        info!(
            "Session {session_id}: evaluating {} answers",
            inputs.answers.len()
        );
        let result = call_with_timeout(
            Operation::Evaluate,
            self.timeout,
            self.evaluator
                .evaluate(&inputs.profile, &inputs.questions, &inputs.answers),
        )
        .await
        .and_then(|evaluation| {
            if evaluation.has_valid_scores() {
                Ok(evaluation)
            } else {
                Err(CollaboratorError::InvalidOutput(
                    "evaluation scores are outside [0, 10]".to_string(),
                ))
            }
        });

        let mut entry = handle.lock().await;
        entry.end_call(Operation::Evaluate);

        let evaluation = match result {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("Session {session_id}: evaluation failed: {e}");
                return Err(AppError::external(Operation::Evaluate, e));
            }
        };
        entry.session.complete(evaluation.clone())?;
        entry.phase = InterviewPhase::Complete;
        entry.conversation.interviewer(prompts::EVALUATION_READY_MESSAGE);
        info!(
            "Session {session_id}: complete, overall {}/10 ({:?})",
            evaluation.overall_score, evaluation.recommendation
        );
        Ok(evaluation)
    }
}

/// Snapshots what the evaluator needs and marks the call in flight.
fn prepare_evaluation(entry: &mut SessionEntry) -> Result<EvaluationInputs, AppError> {
    let profile = entry
        .session
        .job_profile()
        .cloned()
        .ok_or_else(|| AppError::NotReady("no job profile to evaluate against".to_string()))?;
    let inputs = EvaluationInputs {
        session_id: entry.id,
        profile,
        questions: entry.session.questions().to_vec(),
        answers: entry.session.answers().to_vec(),
    };
    entry.begin_call(Operation::Evaluate)?;
    Ok(inputs)
}

fn check_questions(questions: Vec<Question>) -> Result<Vec<Question>, CollaboratorError> {
    if questions.is_empty() {
        return Err(CollaboratorError::InvalidOutput(
            "no questions were generated".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for question in &questions {
        if !seen.insert(question.id.clone()) {
            return Err(CollaboratorError::InvalidOutput(format!(
                "duplicate question id '{}'",
                question.id
            )));
        }
    }
    Ok(questions)
}
