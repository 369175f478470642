//! Search state machine and client-side result filtering

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{InsightError, Result};
use crate::gateway::Query;
use crate::model::{Confidence, ResultSet, SearchResult};
use crate::state::{RequestToken, SearchState, TokenMint};

/// Client-side view over the fetched result set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ResultFilter {
    #[default]
    All,
    HighConfidence,
    /// Results starting before the configured threshold
    Recent,
}

impl ResultFilter {
    /// Map a filter button label; unknown labels select the default filter
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high confidence" => ResultFilter::HighConfidence,
            "recent" => ResultFilter::Recent,
            _ => ResultFilter::All,
        }
    }

    pub fn matches(&self, result: &SearchResult, recent_threshold: f64) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::HighConfidence => result.confidence == Confidence::High,
            ResultFilter::Recent => result.start < recent_threshold,
        }
    }
}

/// The subset of `results` passing `filter`, in relevance order
pub fn apply_filter<'a>(
    results: &'a ResultSet,
    filter: ResultFilter,
    recent_threshold: f64,
) -> Vec<&'a SearchResult> {
    results
        .iter()
        .filter(|r| filter.matches(r, recent_threshold))
        .collect()
}

/// A search the caller must send to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub token: RequestToken,
    pub query: Query,
}

/// Owns the result-list lifecycle and the result set of the active query
#[derive(Debug)]
pub struct SearchMachine {
    state: SearchState,
    results: ResultSet,
    error: Option<InsightError>,
    filter: ResultFilter,
    query: Option<Query>,
    active: Option<RequestToken>,
    mint: TokenMint,
    recent_threshold: f64,
}

impl SearchMachine {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            state: SearchState::Idle,
            results: ResultSet::default(),
            error: None,
            filter: ResultFilter::All,
            query: None,
            active: None,
            mint: TokenMint::new(),
            recent_threshold: config.recent_threshold_seconds,
        }
    }

    /// Start a search for `raw_query`.
    ///
    /// Returns `None` without any state change when the query is blank or a
    /// search is already in flight.
    pub fn submit(&mut self, raw_query: &str) -> Option<SearchTicket> {
        if !self.state.accepts_submit() {
            debug!("Search already in flight, ignoring submit");
            return None;
        }

        let query = match Query::new(raw_query) {
            Ok(query) => query,
            Err(_) => {
                debug!("Blank query, ignoring submit");
                return None;
            }
        };

        let token = self.mint.next();
        self.state = SearchState::Searching;
        self.results = ResultSet::default();
        self.error = None;
        self.filter = ResultFilter::All;
        self.query = Some(query.clone());
        self.active = Some(token);

        info!("🔎 Searching for '{}' ({})", query, token);
        Some(SearchTicket { token, query })
    }

    /// Apply the gateway outcome for `token`.
    ///
    /// Returns `false` when the response is stale and was discarded.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<ResultSet>) -> bool {
        if self.active != Some(token) || self.state != SearchState::Searching {
            warn!("Discarding stale search response {}", token);
            return false;
        }
        self.active = None;

        match outcome {
            Ok(results) if results.is_empty() => {
                info!("📭 No results");
                self.state = SearchState::NoResults;
            }
            Ok(results) => {
                info!("✅ {} results shown", results.len());
                self.results = results;
                self.state = SearchState::ResultsShown;
            }
            Err(e) => {
                warn!("❌ Search failed: {}", e);
                self.error = Some(e);
                self.state = SearchState::SearchError;
            }
        }
        true
    }

    /// Drop the current results and any in-flight search, back to `Idle`
    pub fn reset(&mut self) {
        self.state = SearchState::Idle;
        self.results = ResultSet::default();
        self.error = None;
        self.filter = ResultFilter::All;
        self.query = None;
        self.active = None;
    }

    /// Switch the active filter; never changes the state or issues a request
    pub fn select_filter(&mut self, filter: ResultFilter) {
        debug!("Filter switched to {:?}", filter);
        self.filter = filter;
    }

    /// Results to render under the active filter
    pub fn visible_results(&self) -> Vec<&SearchResult> {
        if self.state != SearchState::ResultsShown {
            return Vec::new();
        }
        apply_filter(&self.results, self.filter, self.recent_threshold)
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn error(&self) -> Option<&InsightError> {
        self.error.as_ref()
    }

    pub fn filter(&self) -> ResultFilter {
        self.filter
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state.accepts_submit()
    }

    pub fn is_loading(&self) -> bool {
        self.state == SearchState::Searching
    }
}
