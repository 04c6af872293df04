//! Type-ahead movie search.

mod config;
mod orchestrator;
mod session;

pub use config::SearchConfig;
pub use orchestrator::{SearchOrchestrator, SearchSnapshot, SearchView, SEARCH_ERROR_MESSAGE};
pub use session::{EditOutcome, Resolution, SearchSession, SearchStatus, SearchTicket};
