//! Template question generator: a fixed five-question interview tailored by the profile.

use std::time::Duration;

use async_trait::async_trait;

use super::{CollaboratorError, QuestionGenerator};
use crate::models::{Difficulty, JobProfile, Question, QuestionCategory};

pub struct TemplateQuestionGenerator {
    delay: Duration,
}

impl TemplateQuestionGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl QuestionGenerator for TemplateQuestionGenerator {
    async fn generate(&self, profile: &JobProfile) -> Result<Vec<Question>, CollaboratorError> {
        tokio::time::sleep(self.delay).await;
        Ok(build_questions(profile))
    }
}

fn build_questions(profile: &JobProfile) -> Vec<Question> {
    let first_skill = profile.primary_skill().unwrap_or("your main technical stack");
    let second = match profile.skills.get(1) {
        Some(skill) => format!(
            "How would you use {skill} to build a component that displays data coming from an external API?"
        ),
        None => "How would you build a component that displays data coming from an external API?"
            .to_string(),
    };

    let templates = [
        (
            format!("Can you tell me about your experience with {first_skill}?"),
            QuestionCategory::Technical,
            Difficulty::Intermediate,
        ),
        (second, QuestionCategory::Technical, Difficulty::Intermediate),
        (
            "Tell me about a difficult situation you faced on a project and how you resolved it."
                .to_string(),
            QuestionCategory::Behavioral,
            Difficulty::Intermediate,
        ),
        (
            format!("Why are you interested in this {} position in particular?", profile.title),
            QuestionCategory::Hr,
            Difficulty::Beginner,
        ),
        (
            "Where do you see yourself in 5 years?".to_string(),
            QuestionCategory::Hr,
            Difficulty::Beginner,
        ),
    ];

    templates
        .into_iter()
        .enumerate()
        .map(|(i, (text, category, difficulty))| Question {
            id: format!("q{}", i + 1),
            text,
            category,
            difficulty,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures::profile;

    #[test]
    fn test_five_questions_with_unique_ids() {
        let questions = build_questions(&profile());
        assert_eq!(questions.len(), 5);
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3", "q4", "q5"]);
    }

    #[test]
    fn test_first_question_mentions_primary_skill() {
        let questions = build_questions(&profile());
        assert!(questions[0].text.contains("React"));
        assert_eq!(questions[0].category, QuestionCategory::Technical);
    }

    #[test]
    fn test_category_mix() {
        let questions = build_questions(&profile());
        let count = |c: QuestionCategory| questions.iter().filter(|q| q.category == c).count();
        assert_eq!(count(QuestionCategory::Technical), 2);
        assert_eq!(count(QuestionCategory::Behavioral), 1);
        assert_eq!(count(QuestionCategory::Hr), 2);
    }

    #[test]
    fn test_profile_without_skills_still_generates() {
        let mut p = profile();
        p.skills.clear();
        let questions = build_questions(&p);
        assert!(questions[0].text.contains("your main technical stack"));
        assert!(!questions[1].text.contains(" use "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_honours_delay() {
        let generator = TemplateQuestionGenerator::new(Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        let questions = generator.generate(&profile()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(questions[3].text.contains("Frontend Developer"));
    }
}
