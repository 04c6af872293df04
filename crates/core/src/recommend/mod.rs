//! Personalized recommendation sections.
//!
//! [`RecommendationAggregator`] turns a user's signals into titled rows of
//! movies. [`GenreBrowser`] pages through every genre for the browse view.

mod aggregator;
mod browse;
mod config;
mod types;

pub use aggregator::RecommendationAggregator;
pub use browse::{GenreBrowser, GenrePage};
pub use config::{BrowseConfig, RecommendationConfig};
pub use types::*;
