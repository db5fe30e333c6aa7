//! Status enums.

use serde::{Deserialize, Serialize};

/// Lifecycle status of the catalog query backing a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// No fetch has been started yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last applied fetch succeeded.
    Ready,
    /// The last applied fetch failed.
    Failed,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
