//! Request gateway for the three outbound operations
//!
//! Each call is a single round trip with no retry; failures surface to the
//! caller as [`InsightError`] values.

use async_trait::async_trait;
use std::fmt;
use url::Url;

use crate::error::{InsightError, Result};
use crate::model::{AnalysisResult, ResultSet};

pub mod http;
pub mod models;

pub use http::HttpGateway;

/// A search query that is known to contain non-whitespace text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim the raw input and reject blank queries
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InsightError::InvalidQuery("query is empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a generated report can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation(Url);

impl ReportLocation {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    /// Resolve a possibly relative report URL against the server origin
    pub fn resolve(base: &Url, raw: &str) -> Result<Self> {
        base.join(raw.trim())
            .map(Self)
            .map_err(|e| InsightError::MalformedResponse(format!("bad report_url '{}': {}", raw, e)))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Outbound operations consumed by the controllers
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `POST /search`
    async fn search(&self, query: &Query) -> Result<ResultSet>;

    /// `GET /analyze/{video_id}`
    async fn analyze(&self, video_id: &str) -> Result<AnalysisResult>;

    /// `POST /generate-report`
    async fn generate_report(&self, analysis: &str) -> Result<ReportLocation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_trims_and_rejects_blank() {
        assert_eq!(Query::new("  forklift safety ").unwrap().as_str(), "forklift safety");
        assert!(matches!(Query::new(""), Err(InsightError::InvalidQuery(_))));
        assert!(matches!(Query::new(" \t\n "), Err(InsightError::InvalidQuery(_))));
    }

    #[test]
    fn test_report_location_resolution() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();

        let relative = ReportLocation::resolve(&base, "/reports/v1.pdf").unwrap();
        assert_eq!(relative.as_str(), "http://127.0.0.1:5000/reports/v1.pdf");

        let absolute = ReportLocation::resolve(&base, "https://files.example.com/r.pdf").unwrap();
        assert_eq!(absolute.as_str(), "https://files.example.com/r.pdf");
    }
}
