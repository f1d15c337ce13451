use serde::{Deserialize, Serialize};

/// Structured view of a job description, produced once by analysis and owned by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub company: String,
    /// Ordered as they appear in the description.
    pub skills: Vec<String>,
    pub experience: String,
    pub description: String,
    /// The exact text that was submitted for analysis.
    pub raw_content: String,
}

impl JobProfile {
    /// The skill interview questions should open with, if any was detected.
    pub fn primary_skill(&self) -> Option<&str> {
        self.skills.first().map(String::as_str)
    }
}
