use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Chat-style transcript of a session, in the order messages were produced.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation(Vec<ChatMessage>);

impl Conversation {
    pub fn interviewer(&mut self, content: impl Into<String>) {
        self.push(Speaker::Interviewer, content.into());
    }

    pub fn candidate(&mut self, content: impl Into<String>) {
        self.push(Speaker::Candidate, content.into());
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn push(&mut self, speaker: Speaker, content: String) {
        self.0.push(ChatMessage {
            speaker,
            content,
            at: Utc::now(),
        });
    }
}
