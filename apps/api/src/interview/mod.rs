//! Interview session orchestration — the core of the service.
//!
//! Flow per turn: question generation → answer submission → scoring →
//! (optional) model answer → next question. `session` owns the lifecycle,
//! `timeout` expires stale sessions, `report` compiles the final summary.

pub mod context_store;
pub mod handlers;
pub mod phase;
pub mod prompts;
pub mod questions;
pub mod report;
pub mod scoring;
pub mod session;
pub mod store;
pub mod timeout;
