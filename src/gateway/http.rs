use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{ErrorBody, ReportRequest, ReportResponse, SearchRequest};
use super::{Gateway, Query, ReportLocation};
use crate::config::GatewayConfig;
use crate::error::{InsightError, Result};
use crate::model::{self, AnalysisResult, ResultSet};

/// Gateway talking to the analysis server over HTTP
pub struct HttpGateway {
    config: GatewayConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| InsightError::Config(format!("invalid base_url '{}': {}", config.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InsightError::Config(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| InsightError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn analyze_endpoint(&self, video_id: &str) -> Result<Url> {
        let path = format!(
            "{}/{}",
            self.config.analyze_path.trim_end_matches('/'),
            urlencoding::encode(video_id)
        );
        self.endpoint(&path)
    }

    /// Check the status and decode the body as JSON
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = ErrorBody::message_from(&body);
            warn!("Server responded {} ({})", status, message.as_deref().unwrap_or("no details"));
            return Err(InsightError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn search(&self, query: &Query) -> Result<ResultSet> {
        let url = self.endpoint(&self.config.search_path)?;
        debug!("Sending search to {}", url);

        let response = self
            .client
            .post(url)
            .json(&SearchRequest { query: query.as_str() })
            .send()
            .await?;

        let raw = Self::read_json(response).await?;
        let results = model::parse_search_response(&raw)?;
        info!("🔎 Search '{}' returned {} results", query, results.len());
        Ok(results)
    }

    async fn analyze(&self, video_id: &str) -> Result<AnalysisResult> {
        let url = self.analyze_endpoint(video_id)?;
        debug!("Requesting analysis from {}", url);

        let response = self.client.get(url).send().await?;
        let raw = Self::read_json(response).await?;
        let analysis = model::parse_analysis_response(video_id, &raw)?;
        info!("🔬 Analysis received for {}", video_id);
        Ok(analysis)
    }

    async fn generate_report(&self, analysis: &str) -> Result<ReportLocation> {
        let url = self.endpoint(&self.config.report_path)?;
        debug!("Requesting report from {}", url);

        let response = self
            .client
            .post(url)
            .json(&ReportRequest { analysis })
            .send()
            .await?;

        let raw = Self::read_json(response).await?;
        let report: ReportResponse = serde_json::from_value(raw)?;

        if report.success == Some(false) {
            return Err(InsightError::Server {
                status: 200,
                message: report.error,
            });
        }

        let report_url = report
            .report_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| InsightError::MalformedResponse("report response has no report_url".to_string()))?;

        let location = ReportLocation::resolve(&self.base_url, &report_url)?;
        info!("📄 Report ready at {}", location);
        Ok(location)
    }
}
