use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Type-ahead search tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Results shown from a successful search.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    /// Items per genre row in the default (empty query) view.
    #[serde(default = "default_section_limit")]
    pub default_section_limit: usize,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            display_limit: default_display_limit(),
            default_section_limit: default_section_limit(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_display_limit() -> usize {
    10
}

fn default_section_limit() -> usize {
    10
}
