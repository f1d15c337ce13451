//! In-memory session store.
//!
//! The map lock is only held to look a session up. Each session sits behind its own
//! `tokio::sync::Mutex`, and callers release that lock while a collaborator call is
//! running; `in_flight` is what keeps a second call from starting in the meantime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::collaborators::Operation;
use crate::errors::AppError;
use crate::intake::IntakeState;
use crate::interview::InterviewPhase;
use crate::session::conversation::{ChatMessage, Conversation};
use crate::session::Session;

pub type SessionHandle = Arc<Mutex<SessionEntry>>;

/// One live session: the aggregate plus the state of the steps driving it.
#[derive(Debug)]
pub struct SessionEntry {
    pub id: Uuid,
    pub session: Session,
    pub intake: IntakeState,
    pub phase: InterviewPhase,
    pub conversation: Conversation,
    in_flight: Option<Operation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            session: Session::new(),
            intake: IntakeState::default(),
            phase: InterviewPhase::NotStarted,
            conversation: Conversation::default(),
            in_flight: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// Fails with `Busy` while an external call is outstanding.
    pub fn ensure_idle(&self) -> Result<(), AppError> {
        match self.in_flight {
            Some(op) => Err(AppError::Busy(op)),
            None => Ok(()),
        }
    }

    /// Marks `operation` as the session's single outstanding call.
    pub fn begin_call(&mut self, operation: Operation) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.in_flight = Some(operation);
        self.touch();
        Ok(())
    }

    pub fn end_call(&mut self, operation: Operation) {
        debug_assert_eq!(self.in_flight, Some(operation));
        self.in_flight = None;
        self.touch();
    }

    /// Discards everything and returns to the freshly created state.
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.session.reset();
        self.intake = IntakeState::default();
        self.phase = InterviewPhase::NotStarted;
        self.conversation.clear();
        self.touch();
        info!("Session {} reset", self.id);
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            phase: self.phase,
            in_flight: self.in_flight,
            intake: self.intake.clone(),
            session: self.session.clone(),
            conversation: self.conversation.messages().to_vec(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            phase: self.phase,
            job_title: self.session.job_profile().map(|p| p.title.clone()),
            answered: self.session.answers().len(),
            total: self.session.questions().len(),
            created_at: self.created_at,
        }
    }
}

/// Full read-only view of a session, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub phase: InterviewPhase,
    pub in_flight: Option<Operation>,
    pub intake: IntakeState,
    pub session: Session,
    pub conversation: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub phase: InterviewPhase,
    pub job_title: Option<String>,
    pub answered: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(SessionEntry::new(id)));
        self.sessions.write().await.insert(id, handle.clone());
        info!("Session {id} created");
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Drops a session. Refused while one of its calls is outstanding.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let handle = self.get(id).await?;
        let entry = handle.lock().await;
        entry.ensure_idle()?;
        self.sessions.write().await.remove(&id);
        info!("Session {id} removed");
        Ok(())
    }

    pub async fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(handle.lock().await.summary());
        }
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions untouched for longer than `max_idle`. Sessions that are locked or
    /// have a call in flight are kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            // `remove` holds the entry lock while waiting for the map, so never block here.
            let Ok(entry) = handle.try_lock() else {
                return true;
            };
            let idle = now
                .signed_duration_since(entry.updated_at)
                .to_std()
                .unwrap_or_default();
            let expired = entry.in_flight().is_none() && idle > max_idle;
            if expired {
                info!("Session {id} evicted after {}s idle", idle.as_secs());
            }
            !expired
        });
        before - sessions.len()
    }

    /// Runs `evict_idle` every `every` until the returned task is aborted.
    pub fn spawn_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle session(s)");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures::profile;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::new();
        let (id, _) = store.create().await;
        assert_eq!(store.len().await, 1);

        let handle = store.get(id).await.unwrap();
        assert_eq!(handle.lock().await.id, id);

        store.remove(id).await.unwrap();
        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_single_outstanding_call() {
        let mut entry = SessionEntry::new(Uuid::new_v4());
        entry.begin_call(Operation::ScoreAnswer).unwrap();
        assert!(matches!(
            entry.begin_call(Operation::Evaluate),
            Err(AppError::Busy(Operation::ScoreAnswer))
        ));
        entry.end_call(Operation::ScoreAnswer);
        assert!(entry.begin_call(Operation::Evaluate).is_ok());
    }

    #[tokio::test]
    async fn test_reset_refused_while_busy() {
        let mut entry = SessionEntry::new(Uuid::new_v4());
        entry.session.set_profile(profile()).unwrap();
        entry.begin_call(Operation::GenerateQuestions).unwrap();
        assert!(matches!(entry.reset(), Err(AppError::Busy(_))));
        assert!(entry.session.job_profile().is_some());

        entry.end_call(Operation::GenerateQuestions);
        entry.conversation.interviewer("hello");
        entry.reset().unwrap();
        assert_eq!(entry.session, Session::new());
        assert!(entry.conversation.messages().is_empty());
        assert_eq!(entry.phase, InterviewPhase::NotStarted);
    }

    #[tokio::test]
    async fn test_remove_refused_while_busy() {
        let store = SessionStore::new();
        let (id, handle) = store.create().await;
        handle.lock().await.begin_call(Operation::AnalyzeJob).unwrap();
        assert!(matches!(store.remove(id).await, Err(AppError::Busy(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_fresh_and_busy_sessions() {
        let store = SessionStore::new();
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);

        let (stale_id, stale) = store.create().await;
        stale.lock().await.updated_at = two_hours_ago;
        let (fresh_id, _) = store.create().await;
        let (busy_id, busy) = store.create().await;
        {
            let mut entry = busy.lock().await;
            entry.begin_call(Operation::ScoreAnswer).unwrap();
            entry.updated_at = two_hours_ago;
        }

        let evicted = store.evict_idle(Duration::from_secs(3600)).await;
        assert_eq!(evicted, 1);
        assert!(matches!(store.get(stale_id).await, Err(AppError::NotFound(_))));
        assert!(store.get(fresh_id).await.is_ok());
        assert!(store.get(busy_id).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let store = SessionStore::new();
        let (_, handle) = store.create().await;
        handle.lock().await.updated_at = Utc::now() - chrono::Duration::hours(2);

        let sweeper = store.spawn_sweeper(Duration::from_secs(3600), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_list_reports_progress() {
        let store = SessionStore::new();
        let (_, handle) = store.create().await;
        handle.lock().await.session.set_profile(profile()).unwrap();
        store.create().await;

        let summaries = store.list().await;
        assert_eq!(summaries.len(), 2);
        assert!(summaries
            .iter()
            .any(|s| s.job_title.as_deref() == Some("Frontend Developer")));
    }
}
