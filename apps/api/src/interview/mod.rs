//! Interview flow: question generation, turn-by-turn scoring and the final evaluation.

pub mod engine;
pub mod handlers;
pub mod prompts;

pub use engine::{InterviewEngine, InterviewPhase, Prompt, TurnOutcome};
