//! Single-flight report export

use tracing::{debug, info, warn};

use crate::error::{InsightError, Result};
use crate::gateway::ReportLocation;
use crate::model::AnalysisResult;
use crate::state::RequestToken;

/// A report request the caller must send to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTicket {
    /// Analyze request whose result the report is built from
    pub source: RequestToken,
    pub video_id: String,
    pub analysis: String,
}

/// Render state of the download control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportAffordance {
    pub enabled: bool,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct ReportExporter {
    in_flight: bool,
}

impl ReportExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an export from the analysis handed over by the modal.
    ///
    /// `Ok(None)` means an export is already outstanding and this click is a
    /// no-op. A missing analysis fails locally with `PreconditionFailed`.
    pub fn begin(
        &mut self,
        current: Option<(RequestToken, &AnalysisResult)>,
    ) -> Result<Option<ReportTicket>> {
        if self.in_flight {
            debug!("Report generation already in flight, ignoring click");
            return Ok(None);
        }

        let (source, analysis) = current.ok_or_else(|| {
            InsightError::PreconditionFailed("Analysis is not ready yet.".to_string())
        })?;

        self.in_flight = true;
        info!("📄 Generating report for {}", analysis.video_id);
        Ok(Some(ReportTicket {
            source,
            video_id: analysis.video_id.clone(),
            analysis: analysis.analysis.clone(),
        }))
    }

    /// Settle the outstanding export; the control is re-enabled either way
    pub fn complete(&mut self, outcome: Result<ReportLocation>) -> Result<ReportLocation> {
        self.in_flight = false;
        if let Err(e) = &outcome {
            warn!("❌ Report generation failed: {}", e);
        }
        outcome
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Download control state given whether the modal allows downloads
    pub fn affordance(&self, download_enabled: bool) -> ExportAffordance {
        ExportAffordance {
            enabled: download_enabled && !self.in_flight,
            loading: self.in_flight,
        }
    }
}
