//! Results view: read-only report over a completed session.

pub mod handlers;
pub mod report;

pub use report::{project, NotReady, ResultsReport};
