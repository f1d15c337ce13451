pub mod interview;
pub mod job;

pub use interview::{
    is_valid_score, Answer, Difficulty, Evaluation, Question, QuestionCategory, Recommendation,
};
pub use job::JobProfile;
