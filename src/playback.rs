//! Video playback adapter
//!
//! Chooses between native adaptive streaming, an attached adaptive-bitrate
//! runtime module, or direct playback, and keeps each player instance in a
//! consistent state through load, seek, failure, retry and teardown. The
//! hosting runtime is reached only through the capability traits below, so the
//! adapter runs the same against a browser binding or a test fake.

use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::error::{InsightError, Result};

/// What the hosting runtime can do for adaptive-bitrate manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeCapabilities {
    /// The media element plays manifests itself
    pub native_adaptive: bool,
    /// An adaptive-bitrate runtime module can be attached to elements
    pub abr_module: bool,
}

/// Hosting runtime: creates elements and adaptive-bitrate sessions
pub trait PlaybackRuntime {
    fn capabilities(&self) -> RuntimeCapabilities;

    /// A fresh element; instances never share elements
    fn create_element(&self) -> Box<dyn MediaElement>;

    /// A fresh adaptive-bitrate session; only called when `abr_module` is set
    fn create_abr_session(&self) -> Box<dyn AbrSession>;
}

/// A playback element in the player region
pub trait MediaElement {
    fn set_source(&mut self, locator: &str);
    fn seek(&mut self, seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    /// Detach the source so the element stops producing output and events
    fn clear_source(&mut self);
}

/// One adaptive-bitrate runtime session bound to one element
pub trait AbrSession {
    /// Attach to the element and load the manifest through the session
    fn attach(&mut self, locator: &str, element: &mut dyn MediaElement) -> Result<()>;
    fn destroy(&mut self);
}

/// Events the runtime delivers to a player instance
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Media metadata is available, seeking is now honoured
    MetadataLoaded,
    /// Error reported by the adaptive-bitrate session
    AbrError { fatal: bool, detail: String },
    /// Error raised by the media element itself
    MediaError { detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStrategy {
    /// Manifest assigned to an element with native adaptive support
    Native,
    /// Manifest loaded through an attached adaptive-bitrate session
    Adaptive,
    /// Non-manifest media assigned directly
    Direct,
}

impl fmt::Display for PlaybackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStrategy::Native => "native",
            PlaybackStrategy::Adaptive => "adaptive",
            PlaybackStrategy::Direct => "direct",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerState {
    Loading,
    Ready,
    Failed { message: String },
    Unsupported,
    TornDown,
}

/// What the player region should display
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerRegion {
    Video,
    /// Static failure indicator replacing the player
    FailureIndicator { message: String, retryable: bool },
    Unsupported { message: String },
    Empty,
}

/// Whether the locator points at an adaptive-bitrate manifest
pub fn is_manifest(locator: &str, manifest_extensions: &[String]) -> bool {
    let path = match url::Url::parse(locator) {
        Ok(url) => url.path().to_string(),
        Err(_) => locator
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    match path.rsplit_once('.') {
        Some((_, ext)) => manifest_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Pick a strategy in order: native support, adaptive module, unsupported.
/// Non-manifest media always plays directly.
pub fn select_strategy(
    locator: &str,
    capabilities: RuntimeCapabilities,
    manifest_extensions: &[String],
) -> Result<PlaybackStrategy> {
    if !is_manifest(locator, manifest_extensions) {
        return Ok(PlaybackStrategy::Direct);
    }

    if capabilities.native_adaptive {
        Ok(PlaybackStrategy::Native)
    } else if capabilities.abr_module {
        Ok(PlaybackStrategy::Adaptive)
    } else {
        Err(InsightError::PlaybackUnsupported(locator.to_string()))
    }
}

/// Mounts independent player instances on a runtime
#[derive(Clone)]
pub struct PlaybackAdapter {
    runtime: Rc<dyn PlaybackRuntime>,
    config: PlaybackConfig,
}

impl PlaybackAdapter {
    pub fn new(runtime: Rc<dyn PlaybackRuntime>, config: PlaybackConfig) -> Self {
        Self { runtime, config }
    }

    /// Create and start a player for `locator`, seeking to `start_offset` once
    /// metadata is available
    pub fn mount(&self, locator: &str, start_offset: Option<f64>) -> PlaybackInstance {
        let mut instance = PlaybackInstance {
            runtime: Rc::clone(&self.runtime),
            config: self.config.clone(),
            locator: locator.to_string(),
            start_offset: start_offset.filter(|s| s.is_finite() && *s >= 0.0),
            element: self.runtime.create_element(),
            session: None,
            strategy: None,
            pending_seek: None,
            state: PlayerState::Loading,
            last_error: None,
        };
        instance.start();
        instance
    }
}

/// One player with its own element and (optionally) its own session
pub struct PlaybackInstance {
    runtime: Rc<dyn PlaybackRuntime>,
    config: PlaybackConfig,
    locator: String,
    start_offset: Option<f64>,
    element: Box<dyn MediaElement>,
    session: Option<Box<dyn AbrSession>>,
    strategy: Option<PlaybackStrategy>,
    pending_seek: Option<f64>,
    state: PlayerState,
    last_error: Option<InsightError>,
}

impl PlaybackInstance {
    fn start(&mut self) {
        let strategy = match select_strategy(
            &self.locator,
            self.runtime.capabilities(),
            &self.config.manifest_extensions,
        ) {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!("🎞️ No playback strategy for {}", self.locator);
                self.state = PlayerState::Unsupported;
                self.last_error = Some(e);
                return;
            }
        };

        self.strategy = Some(strategy);
        self.pending_seek = self.start_offset;
        self.state = PlayerState::Loading;
        self.last_error = None;

        match strategy {
            PlaybackStrategy::Native | PlaybackStrategy::Direct => {
                self.element.set_source(&self.locator);
            }
            PlaybackStrategy::Adaptive => {
                let mut session = self.runtime.create_abr_session();
                if let Err(e) = session.attach(&self.locator, self.element.as_mut()) {
                    session.destroy();
                    self.fail(e.to_string());
                    return;
                }
                self.session = Some(session);
            }
        }

        debug!("Mounted {} player for {}", strategy, self.locator);
    }

    /// Route a runtime event into this instance
    pub fn handle_event(&mut self, event: PlaybackEvent) {
        if matches!(self.state, PlayerState::TornDown | PlayerState::Unsupported) {
            debug!("Ignoring {:?} on inactive player", event);
            return;
        }

        match event {
            PlaybackEvent::MetadataLoaded => {
                if self.state != PlayerState::Loading {
                    return;
                }
                if let Some(offset) = self.pending_seek.take() {
                    self.element.seek(offset);
                }
                self.state = PlayerState::Ready;
                if self.config.autoplay {
                    self.element.play();
                }
            }
            PlaybackEvent::AbrError { fatal: false, detail } => {
                debug!("Recoverable stream error on {}: {}", self.locator, detail);
            }
            PlaybackEvent::AbrError { fatal: true, detail } | PlaybackEvent::MediaError { detail } => {
                self.fail(detail);
            }
        }
    }

    fn fail(&mut self, detail: String) {
        warn!("🎞️ Playback failed for {}: {}", self.locator, detail);
        self.release();
        self.state = PlayerState::Failed {
            message: "Video failed to load.".to_string(),
        };
        self.last_error = Some(InsightError::PlaybackFatal(detail));
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.destroy();
        }
        self.element.pause();
        self.element.clear_source();
        self.pending_seek = None;
    }

    /// Re-attach the same locator after a failure
    pub fn retry(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Failed { .. } => {
                info!("🔁 Retrying playback for {}", self.locator);
                self.start();
                Ok(())
            }
            _ => Err(InsightError::PreconditionFailed(
                "player has not failed".to_string(),
            )),
        }
    }

    /// Stop output and detach everything; later events are ignored
    pub fn teardown(&mut self) {
        if self.state == PlayerState::TornDown {
            return;
        }
        self.release();
        self.state = PlayerState::TornDown;
        debug!("Tore down player for {}", self.locator);
    }

    pub fn region(&self) -> PlayerRegion {
        match &self.state {
            PlayerState::Loading | PlayerState::Ready => PlayerRegion::Video,
            PlayerState::Failed { message } => PlayerRegion::FailureIndicator {
                message: message.clone(),
                retryable: true,
            },
            PlayerState::Unsupported => PlayerRegion::Unsupported {
                message: "Video playback is not supported in this browser.".to_string(),
            },
            PlayerState::TornDown => PlayerRegion::Empty,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn strategy(&self) -> Option<PlaybackStrategy> {
        self.strategy
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn last_error(&self) -> Option<&InsightError> {
        self.last_error.as_ref()
    }
}

impl Drop for PlaybackInstance {
    fn drop(&mut self) {
        self.teardown();
    }
}
