// Session state: the aggregate, its chat transcript, and the in-memory store.

pub mod aggregate;
pub mod conversation;
pub mod handlers;
pub mod store;

pub use aggregate::{Session, SessionError};
pub use store::{SessionEntry, SessionHandle, SessionSnapshot, SessionStore, SessionSummary};

#[cfg(test)]
pub(crate) use aggregate::fixtures;
