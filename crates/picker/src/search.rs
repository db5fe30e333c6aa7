//! Search text held by an open picker.

use std::time::Duration;

/// How a picker reacts to edits of its search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPolicy {
    /// Clear the product list and never query the backend again.
    ClearOnly,
    /// Clear the product list, then refetch with the new text once it has
    /// been stable for `debounce`.
    Refetch {
        /// Quiet period before the refetch fires.
        debounce: Duration,
    },
}

/// What the caller must do after the search text changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEffect {
    /// Nothing beyond the local clear.
    None,
    /// Schedule a fetch for `query` after `debounce`, replacing any fetch
    /// scheduled by an earlier edit.
    Refetch {
        /// Search text to fetch with.
        query: String,
        /// Quiet period before the fetch.
        debounce: Duration,
    },
}

/// Owns the search text. Clearing the displayed product list is left to the
/// owner, which holds the fetch state.
#[derive(Debug, Clone)]
pub struct SearchController {
    query: String,
    policy: SearchPolicy,
}

impl SearchController {
    #[must_use]
    pub const fn new(policy: SearchPolicy) -> Self {
        Self {
            query: String::new(),
            policy,
        }
    }

    /// Current search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the search text. Any string is accepted, including the empty
    /// one.
    pub fn set_query(&mut self, query: impl Into<String>) -> SearchEffect {
        self.query = query.into();
        match self.policy {
            SearchPolicy::ClearOnly => SearchEffect::None,
            SearchPolicy::Refetch { debounce } => SearchEffect::Refetch {
                query: self.query.clone(),
                debounce,
            },
        }
    }
}
