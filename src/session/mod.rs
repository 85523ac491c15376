//! Transcript session controller
//!
//! Owns the single [`Session`] and drives the activate / fetch / re-select
//! cycle. Every fetch takes a generation number when it is issued; its result
//! is applied only if no later fetch (or activation) has been issued since.
//! In-flight requests are never aborted, their results are just dropped.
//!
//! The presentation layer subscribes to [`SessionEvent`]s and reads a
//! [`SessionSnapshot`] to render.

mod state;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use state::{LanguageChoice, Phase, Session, SessionSnapshot, View};

use crate::clipboard::ClipboardSink;
use crate::error::{FetchError, SessionError};
use crate::export::{self, ExportError};
use crate::host::BrowserHost;
use crate::locator;
use crate::transcript_service::TranscriptService;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

/// State change notification for subscribers
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    /// A fetch was issued
    Loading,
    /// The current fetch succeeded
    Loaded {
        title: String,
        language_code: String,
    },
    /// Activation found no video, or the current fetch failed
    Failed { message: String },
    /// Transcript was written to the clipboard
    CopyAcknowledged,
    /// Copy acknowledgment expired
    CopyAckReverted,
}

/// How a fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    Applied,
    Failed,
    /// A later fetch was issued before this one resolved
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActivationOutcome {
    NoVideo,
    Fetched(FetchOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CopyOutcome {
    /// No transcript to copy
    Disabled,
    Copied,
    ClipboardFailed,
}

/// Timing knobs for the controller
#[derive(Debug, Clone, Copy)]
pub(crate) struct ControllerSettings {
    pub(crate) fetch_timeout: Duration,
    pub(crate) probe_timeout: Duration,
    pub(crate) copy_ack_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
            copy_ack_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    session: Session,
    phase: Phase,
    /// Generation of the most recently issued fetch
    generation: u64,
    copy_acknowledged: bool,
}

/// Drives one transcript session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub(crate) struct TranscriptController {
    service: Arc<dyn TranscriptService>,
    clipboard: Arc<dyn ClipboardSink>,
    inner: Arc<Mutex<Inner>>,
    event_tx: broadcast::Sender<SessionEvent>,
    settings: ControllerSettings,
}

impl TranscriptController {
    pub(crate) fn new(
        service: Arc<dyn TranscriptService>,
        clipboard: Arc<dyn ClipboardSink>,
        settings: ControllerSettings,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            service,
            clipboard,
            inner: Arc::new(Mutex::new(Inner::default())),
            event_tx,
            settings,
        }
    }

    /// Subscribe to session events
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            session: inner.session.clone(),
            phase: inner.phase.clone(),
            copy_acknowledged: inner.copy_acknowledged,
        }
    }

    /// Resolve the host's active tab and fetch its transcript in the default language.
    ///
    /// Starts a fresh session; results of fetches from an earlier activation are discarded.
    #[instrument(skip(self, host))]
    pub(crate) async fn activate<H: BrowserHost + ?Sized>(&self, host: &H) -> ActivationOutcome {
        let tab = match host.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                warn!("Failed to query active tab: {:#}", e);
                None
            }
        };

        let video_url = match tab {
            Some(tab) => locator::resolve(&tab, host, self.settings.probe_timeout).await,
            None => None,
        };

        let Some(video_url) = video_url else {
            let message = SessionError::NoVideoFound.to_string();
            info!("{}", message);
            {
                let mut inner = self.lock();
                inner.generation += 1;
                inner.session = Session::default();
                inner.phase = Phase::Failed {
                    message: message.clone(),
                };
            }
            self.emit(SessionEvent::Failed { message });
            return ActivationOutcome::NoVideo;
        };

        info!(url = %video_url, "Activated transcript session");
        self.lock().session = Session::for_video(video_url.clone());
        ActivationOutcome::Fetched(self.fetch(&video_url, "").await)
    }

    /// Re-fetch the current video in `code`. The empty placeholder code does nothing.
    pub(crate) async fn on_language_selected(&self, code: &str) -> Option<FetchOutcome> {
        if code.is_empty() {
            debug!("Placeholder language selected, ignoring");
            return None;
        }

        let Some(url) = self.lock().session.canonical_video_url.clone() else {
            warn!(code, "Language selected without a resolved video");
            return None;
        };

        info!(code, "Language selected");
        Some(self.fetch(&url, code).await)
    }

    /// Issue one transcript request and apply its result if it is still current.
    #[instrument(skip(self))]
    pub(crate) async fn fetch(&self, url: &str, lang: &str) -> FetchOutcome {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.phase = Phase::Loading;
            inner.generation
        };
        self.emit(SessionEvent::Loading);

        let fetch_timeout = self.settings.fetch_timeout;
        let result = match timeout(fetch_timeout, self.service.fetch_transcript(url, lang)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(fetch_timeout)),
        };

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                generation,
                current = inner.generation,
                "Discarding stale transcript result"
            );
            return FetchOutcome::Superseded;
        }

        let (event, outcome) = match result {
            Ok(response) => {
                inner.session.apply_response(response);
                inner.phase = Phase::Loaded;
                let event = SessionEvent::Loaded {
                    title: inner.session.video_title.clone(),
                    language_code: inner.session.selected_language_code.clone(),
                };
                (event, FetchOutcome::Applied)
            }
            Err(e) => {
                let message = SessionError::from(e).to_string();
                error!(generation, "{}", message);
                inner.session.clear_transcript();
                inner.phase = Phase::Failed {
                    message: message.clone(),
                };
                (SessionEvent::Failed { message }, FetchOutcome::Failed)
            }
        };
        drop(inner);

        self.emit(event);
        outcome
    }

    /// Copy title and transcript to the clipboard.
    ///
    /// The acknowledgment reverts after the configured delay regardless of
    /// what happens to the session meanwhile.
    pub(crate) async fn copy_transcript(&self) -> CopyOutcome {
        let text = {
            let inner = self.lock();
            if !inner.session.has_transcript() {
                return CopyOutcome::Disabled;
            }
            inner.session.clipboard_text()
        };

        if let Err(e) = self.clipboard.write_text(text).await {
            warn!("{}", SessionError::ClipboardWriteFailed(format!("{:#}", e)));
            return CopyOutcome::ClipboardFailed;
        }

        self.lock().copy_acknowledged = true;
        self.emit(SessionEvent::CopyAcknowledged);

        let controller = self.clone();
        let delay = self.settings.copy_ack_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            controller.lock().copy_acknowledged = false;
            controller.emit(SessionEvent::CopyAckReverted);
        });

        CopyOutcome::Copied
    }

    /// Save title and transcript to a markdown file.
    pub(crate) fn export_transcript(&self, dir: Option<&Path>) -> Result<PathBuf, ExportError> {
        let (title, text) = {
            let inner = self.lock();
            if !inner.session.has_transcript() {
                return Err(ExportError::NoTranscript);
            }
            (
                inner.session.video_title.clone(),
                inner.session.transcript_text.clone(),
            )
        };
        export::write_markdown(dir, &title, &text)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => {
                warn!("Session mutex was poisoned, recovering data");
                poisoned.into_inner()
            }
        }
    }
}
