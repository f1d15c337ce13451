//! Results projection. Reads a finished `Session` and never mutates it.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Difficulty, QuestionCategory, Recommendation};
use crate::session::Session;

/// Why a session cannot be rendered yet. The first missing piece wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotReady {
    #[error("no job profile has been analyzed for this session")]
    MissingProfile,
    #[error("the interview is not complete")]
    InterviewIncomplete,
    #[error("the session has no evaluation")]
    MissingEvaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Strong
        } else if score >= 6.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandedScore {
    pub score: f64,
    pub band: ScoreBand,
}

impl From<f64> for BandedScore {
    fn from(score: f64) -> Self {
        Self {
            score,
            band: ScoreBand::of(score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptRow {
    /// 1-based
    pub position: usize,
    pub question_id: String,
    pub question: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    pub answer: String,
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsReport {
    pub job_title: String,
    pub company: String,
    pub technical: BandedScore,
    pub hr: BandedScore,
    pub overall: BandedScore,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: Recommendation,
    pub recommendation_label: &'static str,
    pub feedback: String,
    pub transcript: Vec<TranscriptRow>,
}

/// Builds the report for a completed session.
pub fn project(session: &Session) -> Result<ResultsReport, NotReady> {
    let profile = session.job_profile().ok_or(NotReady::MissingProfile)?;
    if !session.is_complete() {
        return Err(NotReady::InterviewIncomplete);
    }
    let evaluation = session.evaluation().ok_or(NotReady::MissingEvaluation)?;

    let transcript = session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
        .map(|(i, (question, answer))| TranscriptRow {
            position: i + 1,
            question_id: question.id.clone(),
            question: question.text.clone(),
            category: question.category,
            difficulty: question.difficulty,
            answer: answer.text.clone(),
            score: answer.score,
            feedback: answer.feedback.clone(),
        })
        .collect();

    Ok(ResultsReport {
        job_title: profile.title.clone(),
        company: profile.company.clone(),
        technical: evaluation.technical_score.into(),
        hr: evaluation.hr_score.into(),
        overall: evaluation.overall_score.into(),
        strengths: evaluation.strengths.clone(),
        weaknesses: evaluation.weaknesses.clone(),
        recommendation: evaluation.recommendation,
        recommendation_label: evaluation.recommendation.label(),
        feedback: evaluation.feedback.clone(),
        transcript,
    })
}

impl ResultsReport {
    /// Plain-text rendering for download.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResultsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Interview results")?;
        writeln!(f, "Position: {} ({})", self.job_title, self.company)?;
        writeln!(f)?;
        writeln!(f, "Technical score: {:.1}/10", self.technical.score)?;
        writeln!(f, "HR score:        {:.1}/10", self.hr.score)?;
        writeln!(f, "Overall score:   {:.1}/10", self.overall.score)?;
        writeln!(f)?;
        writeln!(f, "Recommendation: {}", self.recommendation_label)?;
        writeln!(f, "{}", self.feedback)?;

        write_list(f, "Strengths", &self.strengths)?;
        write_list(f, "Areas for improvement", &self.weaknesses)?;

        writeln!(f)?;
        writeln!(f, "Transcript")?;
        for row in &self.transcript {
            writeln!(f)?;
            writeln!(
                f,
                "Question {} [{}]: {}",
                row.position,
                row.category.label(),
                row.question
            )?;
            writeln!(f, "Your answer: {}", row.answer)?;
            writeln!(f, "Score: {}/10 ({})", row.score, row.feedback)?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{heading}:")?;
    if items.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for item in items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}
