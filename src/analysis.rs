//! Analysis modal controller
//!
//! Every open mints a fresh [`RequestToken`]; a response is applied only if its
//! token is still the active one, so a slow answer for an earlier selection
//! can never overwrite the content of a later one. The current analysis and
//! the modal's player instance are owned here and change only on this
//! controller's transitions.

use tracing::{debug, info, warn};

use crate::error::{InsightError, Result};
use crate::model::AnalysisResult;
use crate::playback::{PlaybackAdapter, PlaybackInstance};
use crate::state::{ModalState, RequestToken, TokenMint};

/// An analyze request the caller must send to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeTicket {
    pub token: RequestToken,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Target {
    video_id: String,
    start_offset: Option<f64>,
}

pub struct AnalysisModal {
    state: ModalState,
    target: Option<Target>,
    current: Option<AnalysisResult>,
    error: Option<InsightError>,
    active: Option<RequestToken>,
    shown: Option<RequestToken>,
    mint: TokenMint,
    player: Option<PlaybackInstance>,
}

impl AnalysisModal {
    pub fn new() -> Self {
        Self {
            state: ModalState::Closed,
            target: None,
            current: None,
            error: None,
            active: None,
            shown: None,
            mint: TokenMint::new(),
            player: None,
        }
    }

    /// Show the modal for `video_id` and supersede any earlier request.
    ///
    /// `start_offset` is where the modal player seeks once media is ready.
    pub fn open(&mut self, video_id: &str, start_offset: Option<f64>) -> AnalyzeTicket {
        self.teardown_player();

        let token = self.mint.next();
        if let Some(previous) = self.active.replace(token) {
            debug!("Superseding analyze request {} with {}", previous, token);
        }

        self.state = ModalState::Analyzing;
        self.target = Some(Target {
            video_id: video_id.to_string(),
            start_offset,
        });
        self.current = None;
        self.shown = None;
        self.error = None;

        info!("🔬 Analyzing {} ({})", video_id, token);
        AnalyzeTicket {
            token,
            video_id: video_id.to_string(),
        }
    }

    /// Re-issue the failed request for the same video
    pub fn retry(&mut self) -> Option<AnalyzeTicket> {
        if self.state != ModalState::AnalysisError {
            return None;
        }
        let target = self.target.clone()?;
        Some(self.open(&target.video_id, target.start_offset))
    }

    /// Apply the gateway outcome for `token`.
    ///
    /// Returns `false` when the response is stale and was discarded untouched.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<AnalysisResult>,
        playback: &PlaybackAdapter,
    ) -> bool {
        if self.active != Some(token) || self.state != ModalState::Analyzing {
            warn!("Discarding stale analysis response {}", token);
            return false;
        }
        self.active = None;

        let target = match &self.target {
            Some(target) => target.clone(),
            None => return false,
        };

        match outcome {
            Ok(result) if result.video_id != target.video_id => {
                warn!(
                    "Analysis for {} arrived while {} is open",
                    result.video_id, target.video_id
                );
                self.state = ModalState::AnalysisError;
                self.error = Some(InsightError::MalformedResponse(format!(
                    "analysis is for {}, expected {}",
                    result.video_id, target.video_id
                )));
            }
            Ok(result) => {
                if let Some(locator) = &result.video_url {
                    self.player = Some(playback.mount(locator, target.start_offset));
                }
                info!("✅ Analysis ready for {}", result.video_id);
                self.current = Some(result);
                self.shown = Some(token);
                self.state = ModalState::AnalysisReady;
            }
            Err(e) => {
                warn!("❌ Analysis failed for {}: {}", target.video_id, e);
                self.error = Some(e);
                self.state = ModalState::AnalysisError;
            }
        }
        true
    }

    /// Hide the modal, drop the current analysis and silence the player
    pub fn close(&mut self) {
        if self.state == ModalState::Closed {
            return;
        }
        self.teardown_player();
        self.state = ModalState::Closed;
        self.target = None;
        self.current = None;
        self.shown = None;
        self.error = None;
        self.active = None;
        debug!("Analysis modal closed");
    }

    fn teardown_player(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.teardown();
        }
    }

    /// True only while the shown analysis is the current, settled one
    pub fn download_enabled(&self) -> bool {
        match (&self.state, &self.current, &self.target) {
            (ModalState::AnalysisReady, Some(current), Some(target)) => {
                current.video_id == target.video_id
            }
            _ => false,
        }
    }

    /// The analysis a report may be generated from, if download is enabled,
    /// with the token of the request that produced it
    pub fn exportable(&self) -> Option<(RequestToken, &AnalysisResult)> {
        if !self.download_enabled() {
            return None;
        }
        Some((self.shown?, self.current.as_ref()?))
    }

    /// Whether the analysis produced by `token` is still the one on screen
    pub fn is_showing(&self, token: RequestToken) -> bool {
        self.download_enabled() && self.shown == Some(token)
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&InsightError> {
        self.error.as_ref()
    }

    pub fn target_video(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.video_id.as_str())
    }

    pub fn player(&self) -> Option<&PlaybackInstance> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlaybackInstance> {
        self.player.as_mut()
    }
}

impl Default for AnalysisModal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::playback::{AbrSession, MediaElement, PlaybackRuntime, PlayerRegion, RuntimeCapabilities};
    use std::rc::Rc;

    struct SilentElement;

    impl MediaElement for SilentElement {
        fn set_source(&mut self, _locator: &str) {}
        fn seek(&mut self, _seconds: f64) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn clear_source(&mut self) {}
    }

    struct NativeRuntime;

    impl PlaybackRuntime for NativeRuntime {
        fn capabilities(&self) -> RuntimeCapabilities {
            RuntimeCapabilities { native_adaptive: true, abr_module: false }
        }
        fn create_element(&self) -> Box<dyn MediaElement> {
            Box::new(SilentElement)
        }
        fn create_abr_session(&self) -> Box<dyn AbrSession> {
            unreachable!("native runtime never attaches a session")
        }
    }

    fn adapter() -> PlaybackAdapter {
        PlaybackAdapter::new(Rc::new(NativeRuntime), Config::default().playback)
    }

    fn analysis(id: &str, text: &str) -> AnalysisResult {
        AnalysisResult {
            video_id: id.to_string(),
            analysis: text.to_string(),
            video_url: None,
        }
    }

    #[test]
    fn test_open_is_immediately_analyzing() {
        let mut modal = AnalysisModal::new();
        let ticket = modal.open("v1", None);
        assert_eq!(ticket.video_id, "v1");
        assert_eq!(modal.state(), ModalState::Analyzing);
        assert!(!modal.download_enabled());
    }

    #[test]
    fn test_success_enables_download() {
        let mut modal = AnalysisModal::new();
        let ticket = modal.open("v1", None);
        assert!(modal.complete(ticket.token, Ok(analysis("v1", "Finding one.")), &adapter()));
        assert_eq!(modal.state(), ModalState::AnalysisReady);
        assert!(modal.download_enabled());
        let (source, current) = modal.exportable().unwrap();
        assert_eq!(source, ticket.token);
        assert_eq!(current.analysis, "Finding one.");
        assert!(modal.is_showing(ticket.token));
    }

    #[test]
    fn test_reopen_retires_shown_analysis() {
        let mut modal = AnalysisModal::new();
        let first = modal.open("v1", None);
        modal.complete(first.token, Ok(analysis("v1", "about v1")), &adapter());
        assert!(modal.is_showing(first.token));

        let second = modal.open("v2", None);
        assert!(!modal.is_showing(first.token));
        modal.complete(second.token, Ok(analysis("v2", "about v2")), &adapter());
        assert!(!modal.is_showing(first.token));
        assert!(modal.is_showing(second.token));
    }

    #[test]
    fn test_late_response_for_earlier_open_is_discarded() {
        let mut modal = AnalysisModal::new();
        let first = modal.open("A", None);
        let second = modal.open("B", None);
        assert!(second.token > first.token);

        assert!(modal.complete(second.token, Ok(analysis("B", "about B")), &adapter()));
        assert!(!modal.complete(first.token, Ok(analysis("A", "about A")), &adapter()));

        assert_eq!(modal.current().unwrap().video_id, "B");
        assert_eq!(modal.state(), ModalState::AnalysisReady);
    }

    #[test]
    fn test_stale_failure_does_not_clobber_ready_state() {
        let mut modal = AnalysisModal::new();
        let first = modal.open("A", None);
        let second = modal.open("B", None);
        modal.complete(second.token, Ok(analysis("B", "about B")), &adapter());
        modal.complete(first.token, Err(InsightError::Network("reset".to_string())), &adapter());

        assert_eq!(modal.state(), ModalState::AnalysisReady);
        assert!(modal.error().is_none());
    }

    #[test]
    fn test_failure_and_retry() {
        let mut modal = AnalysisModal::new();
        let ticket = modal.open("v1", Some(12.0));
        modal.complete(ticket.token, Err(InsightError::Server { status: 500, message: None }), &adapter());
        assert_eq!(modal.state(), ModalState::AnalysisError);
        assert!(!modal.download_enabled());

        let retry = modal.retry().unwrap();
        assert_eq!(retry.video_id, "v1");
        assert!(retry.token > ticket.token);
        assert_eq!(modal.state(), ModalState::Analyzing);
        assert!(modal.retry().is_none());
    }

    #[test]
    fn test_close_clears_everything() {
        let mut modal = AnalysisModal::new();
        let ticket = modal.open("v1", None);
        let mut result = analysis("v1", "text");
        result.video_url = Some("https://cdn/v1.m3u8".to_string());
        modal.complete(ticket.token, Ok(result), &adapter());
        assert_eq!(modal.player().unwrap().region(), PlayerRegion::Video);

        modal.close();
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(modal.current().is_none());
        assert!(modal.player().is_none());
        assert!(!modal.download_enabled());
        assert!(modal.exportable().is_none());
        assert!(!modal.is_showing(ticket.token));
    }

    #[test]
    fn test_response_after_close_is_discarded() {
        let mut modal = AnalysisModal::new();
        let ticket = modal.open("v1", None);
        modal.close();
        assert!(!modal.complete(ticket.token, Ok(analysis("v1", "late")), &adapter()));
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(modal.current().is_none());
    }
}
