//! Render projections: what the document shows for a given controller state.
//! Nothing here mutates state.

use crate::analysis::AnalysisModal;
use crate::model::{Confidence, SearchResult};
use crate::playback::PlayerRegion;
use crate::report::{ExportAffordance, ReportExporter};
use crate::search::SearchMachine;
use crate::state::{ModalState, SearchState};

/// `m:ss`, seconds floored
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn format_time_range(start: f64, end: f64) -> String {
    format!("{} - {}", format_time(start), format_time(end))
}

/// Percent score without trailing zeros, e.g. `92` or `71.5`
pub fn format_score(score: f64) -> String {
    let text = format!("{:.2}", score);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn confidence_class(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "confidence-high",
        Confidence::Medium => "confidence-medium",
        Confidence::Low => "confidence-low",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCardView {
    pub video_id: String,
    pub badge: String,
    pub badge_class: &'static str,
    pub score_text: String,
    pub time_range: String,
    pub has_video: bool,
}

impl ResultCardView {
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            video_id: result.video_id.clone(),
            badge: result.confidence.label().to_string(),
            badge_class: confidence_class(result.confidence),
            score_text: format!("Match Score: {}%", format_score(result.score)),
            time_range: format_time_range(result.start, result.end),
            has_video: result.video_url.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Empty,
    Loading,
    Cards(Vec<ResultCardView>),
    NoResults { title: String, hint: String },
    Error { title: String, message: String },
}

/// Search field controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchControlsView {
    pub submit_enabled: bool,
    pub loading_indicator: bool,
}

pub fn render_results(search: &SearchMachine) -> ResultsView {
    match search.state() {
        SearchState::Idle => ResultsView::Empty,
        SearchState::Searching => ResultsView::Loading,
        SearchState::ResultsShown => ResultsView::Cards(
            search
                .visible_results()
                .into_iter()
                .map(ResultCardView::from_result)
                .collect(),
        ),
        SearchState::NoResults => ResultsView::NoResults {
            title: "No Results Found".to_string(),
            hint: "Try different search terms or filters".to_string(),
        },
        SearchState::SearchError => ResultsView::Error {
            title: "Error".to_string(),
            message: search
                .error()
                .map(|e| e.user_message())
                .unwrap_or_else(|| "An error occurred while searching. Please try again.".to_string()),
        },
    }
}

pub fn render_controls(search: &SearchMachine) -> SearchControlsView {
    SearchControlsView {
        submit_enabled: search.submit_enabled(),
        loading_indicator: search.is_loading(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalBody {
    Hidden,
    Busy,
    Analysis { heading: String, paragraphs: Vec<String> },
    Error { message: String, retryable: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub visible: bool,
    pub body: ModalBody,
    pub download: ExportAffordance,
    pub player: Option<PlayerRegion>,
}

pub fn render_modal(modal: &AnalysisModal, exporter: &ReportExporter) -> ModalView {
    let body = match modal.state() {
        ModalState::Closed => ModalBody::Hidden,
        ModalState::Analyzing => ModalBody::Busy,
        ModalState::AnalysisReady => ModalBody::Analysis {
            heading: "Key Findings".to_string(),
            paragraphs: modal
                .current()
                .map(|a| a.paragraphs().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
        },
        ModalState::AnalysisError => ModalBody::Error {
            message: modal
                .error()
                .map(|e| format!("Failed to analyze video. {}", e.user_message()))
                .unwrap_or_else(|| "Failed to analyze video. Please try again.".to_string()),
            retryable: true,
        },
    };

    ModalView {
        visible: modal.state().is_open(),
        body,
        download: exporter.affordance(modal.download_enabled()),
        player: modal.player().map(|p| p.region()),
    }
}
