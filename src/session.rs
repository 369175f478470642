//! Event-loop orchestration
//!
//! [`Session::dispatch`] applies the synchronous part of a user event right
//! away (loading indicators, modal visibility, disabled controls) and hands
//! back the network continuation as a [`Pending`] future for the host to spawn
//! on its single-threaded loop. State is never borrowed across an await, so
//! overlapping continuations interleave only at whole-transition granularity.

use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisModal, AnalyzeTicket};
use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::gateway::Gateway;
use crate::host::Host;
use crate::playback::{PlaybackAdapter, PlaybackEvent, PlaybackInstance, PlayerRegion};
use crate::report::ReportExporter;
use crate::search::{ResultFilter, SearchMachine};
use crate::state::{ModalState, SearchState};
use crate::view::{self, ModalView, ResultsView, SearchControlsView};

/// Network continuation of a dispatched event
pub type Pending = LocalBoxFuture<'static, ()>;

/// Which player an event or retry targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerSlot {
    Modal,
    /// Player on the n-th visible result card
    Card(usize),
}

/// User and runtime events the document forwards to the session
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    QueryChanged(String),
    SubmitClicked,
    KeyPress(String),
    FilterClicked(String),
    AnalyzeClicked(String),
    RetryAnalysisClicked,
    CloseClicked,
    BackdropClicked,
    DownloadClicked,
    PlayerRetryClicked(PlayerSlot),
    Playback(PlayerSlot, PlaybackEvent),
    /// The page was cleared or restored; everything goes back to idle
    PageReset,
}

struct SessionState {
    query_text: String,
    search: SearchMachine,
    modal: AnalysisModal,
    exporter: ReportExporter,
    card_players: Vec<Option<PlaybackInstance>>,
}

impl SessionState {
    /// Rebuild the card players for the currently visible cards
    fn remount_card_players(&mut self, playback: &PlaybackAdapter) {
        self.teardown_card_players();
        self.card_players = self
            .search
            .visible_results()
            .into_iter()
            .map(|r| r.video_url.as_deref().map(|url| playback.mount(url, Some(r.start))))
            .collect();
        debug!("Mounted {} card slots", self.card_players.len());
    }

    fn teardown_card_players(&mut self) {
        for player in self.card_players.iter_mut().flatten() {
            player.teardown();
        }
        self.card_players.clear();
    }

    fn player_mut(&mut self, slot: &PlayerSlot) -> Option<&mut PlaybackInstance> {
        match slot {
            PlayerSlot::Modal => self.modal.player_mut(),
            PlayerSlot::Card(index) => self.card_players.get_mut(*index).and_then(Option::as_mut),
        }
    }
}

/// One page's worth of controller state plus its collaborators
#[derive(Clone)]
pub struct Session {
    state: Rc<RefCell<SessionState>>,
    gateway: Arc<dyn Gateway>,
    playback: PlaybackAdapter,
    host: Rc<dyn Host>,
}

impl Session {
    pub fn new(
        config: &Config,
        gateway: Arc<dyn Gateway>,
        playback: PlaybackAdapter,
        host: Rc<dyn Host>,
    ) -> Self {
        let state = SessionState {
            query_text: String::new(),
            search: SearchMachine::new(&config.search),
            modal: AnalysisModal::new(),
            exporter: ReportExporter::new(),
            card_players: Vec::new(),
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            gateway,
            playback,
            host,
        }
    }

    /// Apply `event` and return the network continuation, if one was started.
    ///
    /// Local rejections (e.g. downloading with no analysis) are alerted to the
    /// user and returned as errors; no request is sent for them.
    pub fn dispatch(&self, event: UiEvent) -> Result<Option<Pending>> {
        match event {
            UiEvent::QueryChanged(text) => {
                self.state.borrow_mut().query_text = text;
                Ok(None)
            }
            UiEvent::SubmitClicked => Ok(self.submit_search()),
            UiEvent::KeyPress(key) if key == "Enter" => Ok(self.submit_search()),
            UiEvent::KeyPress(_) => Ok(None),
            UiEvent::FilterClicked(label) => {
                self.select_filter(ResultFilter::from_label(&label));
                Ok(None)
            }
            UiEvent::AnalyzeClicked(video_id) => self.open_analysis(&video_id).map(Some),
            UiEvent::RetryAnalysisClicked => Ok(self.retry_analysis()),
            UiEvent::CloseClicked | UiEvent::BackdropClicked => {
                self.state.borrow_mut().modal.close();
                Ok(None)
            }
            UiEvent::DownloadClicked => self.download_report(),
            UiEvent::PlayerRetryClicked(slot) => {
                let mut state = self.state.borrow_mut();
                if let Some(player) = state.player_mut(&slot) {
                    player.retry()?;
                }
                Ok(None)
            }
            UiEvent::Playback(slot, event) => {
                if let Some(player) = self.state.borrow_mut().player_mut(&slot) {
                    player.handle_event(event);
                }
                Ok(None)
            }
            UiEvent::PageReset => {
                self.reset();
                Ok(None)
            }
        }
    }

    /// Close the modal, drop every player and result, and forget the query.
    ///
    /// A search still in flight is discarded when its response arrives.
    fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.modal.close();
        state.teardown_card_players();
        state.search.reset();
        state.query_text.clear();
        info!("Page reset");
    }

    fn submit_search(&self) -> Option<Pending> {
        let ticket = {
            let mut state = self.state.borrow_mut();
            let query_text = state.query_text.clone();
            let ticket = state.search.submit(&query_text)?;
            state.modal.close();
            state.teardown_card_players();
            ticket
        };

        let state = Rc::clone(&self.state);
        let gateway = Arc::clone(&self.gateway);
        let playback = self.playback.clone();

        Some(Box::pin(async move {
            let outcome = gateway.search(&ticket.query).await;
            let mut state = state.borrow_mut();
            if state.search.complete(ticket.token, outcome)
                && state.search.state() == SearchState::ResultsShown
            {
                state.remount_card_players(&playback);
            }
        }))
    }

    fn select_filter(&self, filter: ResultFilter) {
        let mut state = self.state.borrow_mut();
        if state.search.state() != SearchState::ResultsShown {
            debug!("No results to filter");
            return;
        }
        state.search.select_filter(filter);
        state.remount_card_players(&self.playback);
    }

    fn open_analysis(&self, video_id: &str) -> Result<Pending> {
        let ticket = {
            let mut state = self.state.borrow_mut();
            if state.search.state() != SearchState::ResultsShown {
                return Err(InsightError::PreconditionFailed(
                    "Analysis is only available for shown results.".to_string(),
                ));
            }
            let start_offset = state.search.results().find(video_id).map(|r| r.start);
            state.modal.open(video_id, start_offset)
        };
        Ok(self.analysis_continuation(ticket))
    }

    fn retry_analysis(&self) -> Option<Pending> {
        let ticket = self.state.borrow_mut().modal.retry()?;
        Some(self.analysis_continuation(ticket))
    }

    fn analysis_continuation(&self, ticket: AnalyzeTicket) -> Pending {
        let state = Rc::clone(&self.state);
        let gateway = Arc::clone(&self.gateway);
        let playback = self.playback.clone();

        Box::pin(async move {
            let outcome = gateway.analyze(&ticket.video_id).await;
            state.borrow_mut().modal.complete(ticket.token, outcome, &playback);
        })
    }

    fn download_report(&self) -> Result<Option<Pending>> {
        let begun = {
            let mut state = self.state.borrow_mut();
            let SessionState { modal, exporter, .. } = &mut *state;
            exporter.begin(modal.exportable())
        };

        let ticket = match begun {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Report requested without an analysis");
                self.host.alert(&e.user_message());
                return Err(e);
            }
        };

        let state = Rc::clone(&self.state);
        let gateway = Arc::clone(&self.gateway);
        let host = Rc::clone(&self.host);

        Ok(Some(Box::pin(async move {
            let outcome = gateway.generate_report(&ticket.analysis).await;
            let (settled, still_shown) = {
                let mut state = state.borrow_mut();
                (state.exporter.complete(outcome), state.modal.is_showing(ticket.source))
            };
            match settled {
                Ok(location) if !still_shown => {
                    warn!("Report for {} arrived after its analysis was closed", ticket.video_id);
                    host.alert(&format!(
                        "The report for {} is ready, but that analysis is no longer open.",
                        ticket.video_id
                    ));
                    debug!("Not opening {}", location);
                }
                Ok(location) => {
                    info!("📥 Opening report for {}", ticket.video_id);
                    host.navigate(&location);
                }
                Err(e) => host.alert(&format!("Failed to generate report. {}", e.user_message())),
            }
        })))
    }

    pub fn search_state(&self) -> SearchState {
        self.state.borrow().search.state()
    }

    pub fn modal_state(&self) -> ModalState {
        self.state.borrow().modal.state()
    }

    pub fn results_view(&self) -> ResultsView {
        view::render_results(&self.state.borrow().search)
    }

    pub fn controls_view(&self) -> SearchControlsView {
        view::render_controls(&self.state.borrow().search)
    }

    pub fn modal_view(&self) -> ModalView {
        let state = self.state.borrow();
        view::render_modal(&state.modal, &state.exporter)
    }

    /// Player regions of the visible cards; `None` for cards without media
    pub fn card_regions(&self) -> Vec<Option<PlayerRegion>> {
        self.state
            .borrow()
            .card_players
            .iter()
            .map(|p| p.as_ref().map(|p| p.region()))
            .collect()
    }
}
