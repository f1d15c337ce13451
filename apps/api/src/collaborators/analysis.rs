//! Simulated job analysis: heuristic extraction standing in for an LLM call.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{CollaboratorError, JobAnalyzer};
use crate::models::JobProfile;

/// Technology keywords recognised in job descriptions, in display casing.
const KNOWN_SKILLS: &[&str] = &[
    "React",
    "JavaScript",
    "TypeScript",
    "HTML/CSS",
    "Tailwind CSS",
    "Node.js",
    "Vue",
    "Angular",
    "Rust",
    "Go",
    "Python",
    "Java",
    "Kotlin",
    "Swift",
    "SQL",
    "PostgreSQL",
    "Docker",
    "Kubernetes",
    "AWS",
    "GraphQL",
    "Git",
];

/// Used when nothing in the text matches `KNOWN_SKILLS`.
const FALLBACK_SKILLS: &[&str] = &[
    "React",
    "JavaScript",
    "TypeScript",
    "HTML/CSS",
    "Git",
    "Tailwind CSS",
];

const MAX_TITLE_CHARS: usize = 80;
const MAX_DESCRIPTION_CHARS: usize = 280;

/// Sleeps for `delay`, then derives a profile from the raw text.
pub struct SimulatedAnalyzer {
    delay: Duration,
}

impl SimulatedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl JobAnalyzer for SimulatedAnalyzer {
    async fn analyze(&self, raw_text: &str) -> Result<JobProfile, CollaboratorError> {
        tokio::time::sleep(self.delay).await;
        let profile = extract_profile(raw_text)?;
        debug!(
            "Analyzed job '{}' ({} skills detected)",
            profile.title,
            profile.skills.len()
        );
        Ok(profile)
    }
}

fn extract_profile(raw_text: &str) -> Result<JobProfile, CollaboratorError> {
    let title_line = raw_text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| CollaboratorError::InvalidOutput("job description is empty".into()))?;

    Ok(JobProfile {
        title: truncate(title_line, MAX_TITLE_CHARS),
        company: extract_company(raw_text).unwrap_or_else(|| "Unknown company".to_string()),
        skills: extract_skills(raw_text),
        experience: extract_experience(raw_text).unwrap_or_else(|| "Not specified".to_string()),
        description: extract_description(raw_text),
        raw_content: raw_text.to_string(),
    })
}

fn extract_company(text: &str) -> Option<String> {
    text.lines().find_map(company_value).map(str::to_string)
}

/// The value of a `Company: …` line.
fn company_value(line: &str) -> Option<&str> {
    let (key, value) = line.trim().split_once(':')?;
    let value = value.trim();
    (key.trim().eq_ignore_ascii_case("company") && !value.is_empty()).then_some(value)
}

/// First paragraph after the title, without the company line.
fn extract_description(text: &str) -> String {
    let paragraph: Vec<&str> = text
        .lines()
        .map(str::trim)
        .skip_while(|l| l.is_empty())
        .skip(1)
        .filter(|l| company_value(l).is_none())
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty())
        .collect();
    truncate(&paragraph.join(" "), MAX_DESCRIPTION_CHARS)
}

fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<(usize, &str)> = KNOWN_SKILLS
        .iter()
        .filter_map(|&skill| find_word(&lower, &skill.to_lowercase()).map(|pos| (pos, skill)))
        .collect();

    if found.is_empty() {
        return FALLBACK_SKILLS.iter().map(|s| s.to_string()).collect();
    }
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, s)| s.to_string()).collect()
}

/// Byte offset of the first occurrence of `needle` not embedded in a longer word,
/// so that "go" does not fire on "good".
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Finds phrases like "3 years", "5+ years" or "2-3 years".
fn extract_experience(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.windows(2).find_map(|pair| {
        let amount = pair[0].trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '+' && c != '-');
        let unit = pair[1].to_lowercase();
        let is_amount = amount.chars().next().is_some_and(|c| c.is_ascii_digit())
            && amount.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-');
        (is_amount && unit.starts_with("year")).then(|| format!("{amount} years"))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
