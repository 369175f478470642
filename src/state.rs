use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the main result view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SearchState {
    /// Nothing searched yet
    #[default]
    Idle,

    /// A search request is in flight
    Searching,

    /// At least one result is rendered
    ResultsShown,

    /// The last search returned an empty result set
    NoResults,

    /// The last search failed
    SearchError,
}

/// Lifecycle of the analysis modal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ModalState {
    #[default]
    Closed,

    /// Modal visible, analysis request in flight
    Analyzing,

    /// Analysis rendered, report download available
    AnalysisReady,

    /// Analysis failed, retry available
    AnalysisError,
}

impl SearchState {
    /// Whether a submit would be accepted in this state
    pub fn accepts_submit(&self) -> bool {
        !matches!(self, SearchState::Searching)
    }
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

/// Identity of one in-flight request, used to discard stale responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mints strictly increasing request tokens
#[derive(Debug, Default)]
pub struct TokenMint {
    last: u64,
}

impl TokenMint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }
}
