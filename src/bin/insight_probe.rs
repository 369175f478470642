use anyhow::{anyhow, Result};
use clap::Parser;
use std::rc::Rc;
use std::sync::Arc;
use tracing::info;

use video_insight_client::playback::{AbrSession, MediaElement, RuntimeCapabilities};
use video_insight_client::view::{ModalBody, ResultsView};
use video_insight_client::{
    logging, Config, ConsoleHost, HttpGateway, InsightError, PlaybackAdapter, PlaybackRuntime,
    Session, UiEvent,
};

/// Run one query against a live analysis server and print what the page would show
#[derive(Parser, Debug)]
#[command(name = "insight-probe", version, about)]
struct Args {
    /// Search query
    query: String,

    /// Server origin (overrides config)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Filter label to apply after results arrive ("high confidence", "recent")
    #[arg(short, long)]
    filter: Option<String>,

    /// Analyze the n-th visible card (0-based)
    #[arg(short, long)]
    analyze: Option<usize>,

    /// Request a report for the analysis
    #[arg(short, long)]
    report: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Runtime without any playback support
struct HeadlessRuntime;

struct DetachedElement;

impl MediaElement for DetachedElement {
    fn set_source(&mut self, _locator: &str) {}
    fn seek(&mut self, _seconds: f64) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn clear_source(&mut self) {}
}

struct NoAbrSession;

impl AbrSession for NoAbrSession {
    fn attach(&mut self, locator: &str, _element: &mut dyn MediaElement) -> video_insight_client::Result<()> {
        Err(InsightError::PlaybackUnsupported(locator.to_string()))
    }
    fn destroy(&mut self) {}
}

impl PlaybackRuntime for HeadlessRuntime {
    fn capabilities(&self) -> RuntimeCapabilities {
        RuntimeCapabilities::default()
    }
    fn create_element(&self) -> Box<dyn MediaElement> {
        Box::new(DetachedElement)
    }
    fn create_abr_session(&self) -> Box<dyn AbrSession> {
        Box::new(NoAbrSession)
    }
}

async fn run(session: &Session, event: UiEvent) -> Result<()> {
    if let Some(pending) = session.dispatch(event)? {
        pending.await;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(base_url) = args.base_url {
        config.gateway.base_url = base_url;
    }
    config.validate()?;

    let level = if args.verbose { "debug" } else { config.logging.level.as_str() };
    logging::init_tracing(level);
    info!("{}", config.summary());

    let gateway = HttpGateway::new(config.gateway.clone())?;
    let playback = PlaybackAdapter::new(Rc::new(HeadlessRuntime), config.playback.clone());
    let session = Session::new(&config, Arc::new(gateway), playback, Rc::new(ConsoleHost));

    run(&session, UiEvent::QueryChanged(args.query.clone())).await?;
    run(&session, UiEvent::SubmitClicked).await?;

    if let Some(label) = args.filter {
        run(&session, UiEvent::FilterClicked(label)).await?;
    }

    let cards = match session.results_view() {
        ResultsView::Cards(cards) => cards,
        ResultsView::NoResults { title, hint } => {
            println!("{}: {}", title, hint);
            return Ok(());
        }
        ResultsView::Error { title, message } => {
            return Err(anyhow!("{}: {}", title, message));
        }
        other => return Err(anyhow!("Unexpected view after search: {:?}", other)),
    };

    for (index, card) in cards.iter().enumerate() {
        println!(
            "[{}] {} | {} Confidence | {} | {}",
            index, card.video_id, card.badge, card.score_text, card.time_range
        );
    }

    let Some(index) = args.analyze else {
        return Ok(());
    };
    let card = cards
        .get(index)
        .ok_or_else(|| anyhow!("No card at index {} ({} shown)", index, cards.len()))?;

    run(&session, UiEvent::AnalyzeClicked(card.video_id.clone())).await?;
    match session.modal_view().body {
        ModalBody::Analysis { heading, paragraphs } => {
            println!("\n{}", heading);
            for paragraph in paragraphs {
                println!("  {}", paragraph);
            }
        }
        ModalBody::Error { message, .. } => return Err(anyhow!(message)),
        other => return Err(anyhow!("Unexpected modal state: {:?}", other)),
    }

    if args.report {
        run(&session, UiEvent::DownloadClicked).await?;
    }

    Ok(())
}
