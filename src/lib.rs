//! Video Insight Client
//!
//! Interaction controller for a video search-and-analysis page: search with
//! client-side filtering, per-video analysis in a modal with adaptive-bitrate
//! playback, and report export. Rendering is a pure projection of the
//! controller state, so everything here runs without a document.

pub mod error;
pub mod config;
pub mod logging;
pub mod model;
pub mod gateway;
pub mod playback;
pub mod state;
pub mod search;
pub mod analysis;
pub mod report;
pub mod host;
pub mod view;
pub mod session;

// Re-export main types for easy access
pub use crate::error::{InsightError, Result};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::model::{AnalysisResult, Confidence, ResultSet, SearchResult};
pub use crate::gateway::{Gateway, HttpGateway, Query, ReportLocation};
pub use crate::playback::{PlaybackAdapter, PlaybackEvent, PlaybackRuntime, PlayerRegion};
pub use crate::state::{ModalState, RequestToken, SearchState};
pub use crate::search::{ResultFilter, SearchMachine};
pub use crate::analysis::AnalysisModal;
pub use crate::report::{ExportAffordance, ReportExporter};
pub use crate::host::{ConsoleHost, Host};
pub use crate::session::{Pending, PlayerSlot, Session, UiEvent};
