//! Test doubles for the controller's collaborators

use super::{ActivationOutcome, ControllerSettings, FetchOutcome, TranscriptController};
use crate::clipboard::ClipboardSink;
use crate::error::FetchError;
use crate::host::{BrowserHost, PageProbe, TabHandle, TabId};
use crate::transcript_service::{LanguageOption, TranscriptResponse, TranscriptService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub(crate) const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc123";

/// Scripted transcript service.
///
/// `""`/`en`, `es` and `fr` succeed, `hang` never resolves, anything else is a 500.
#[derive(Default)]
pub(crate) struct FakeService {
    calls: Mutex<Vec<(String, String)>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl FakeService {
    /// Hold requests for `lang` until the returned sender fires
    pub(crate) fn gate(&self, lang: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(lang.to_string(), rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

fn languages() -> Vec<LanguageOption> {
    vec![
        LanguageOption::new("en", "English"),
        LanguageOption::new("es", "Spanish"),
        LanguageOption::new("fr", "French"),
    ]
}

#[async_trait]
impl TranscriptService for FakeService {
    async fn fetch_transcript(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<TranscriptResponse, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), lang.to_string()));
        let gate = self.gates.lock().unwrap().remove(lang);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let (transcript, code) = match lang {
            "" | "en" => ("Hello world", "en"),
            "es" => ("Hola mundo", "es"),
            "fr" => ("Bonjour le monde", "fr"),
            "hang" => std::future::pending().await,
            _ => return Err(FetchError::ServerError { status: 500 }),
        };
        Ok(TranscriptResponse {
            transcript: transcript.to_string(),
            title: "Demo".to_string(),
            languages: languages(),
            transcript_language_code: code.to_string(),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeClipboard {
    pub(crate) writes: Mutex<Vec<String>>,
    pub(crate) fail: bool,
}

#[async_trait]
impl ClipboardSink for FakeClipboard {
    async fn write_text(&self, text: String) -> anyhow::Result<()> {
        anyhow::ensure!(!self.fail, "clipboard unavailable");
        self.writes.lock().unwrap().push(text);
        Ok(())
    }
}

enum ActiveTab {
    Tab(String),
    NoTab,
    QueryFails,
}

pub(crate) struct FakeHost {
    tab: ActiveTab,
    frames: Vec<String>,
}

impl FakeHost {
    pub(crate) fn new(url: &str, frames: &[&str]) -> Self {
        Self {
            tab: ActiveTab::Tab(url.to_string()),
            frames: frames.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Host reporting no active tab
    pub(crate) fn without_tab() -> Self {
        Self {
            tab: ActiveTab::NoTab,
            frames: Vec::new(),
        }
    }

    /// Host whose tab query errors
    pub(crate) fn failing_query() -> Self {
        Self {
            tab: ActiveTab::QueryFails,
            frames: Vec::new(),
        }
    }
}

#[async_trait]
impl PageProbe for FakeHost {
    async fn iframe_sources(&self, _tab: &TabId) -> anyhow::Result<Vec<String>> {
        Ok(self.frames.clone())
    }
}

#[async_trait]
impl BrowserHost for FakeHost {
    async fn active_tab(&self) -> anyhow::Result<Option<TabHandle>> {
        match &self.tab {
            ActiveTab::Tab(url) => Ok(Some(TabHandle {
                id: TabId("1".to_string()),
                url: url.clone(),
            })),
            ActiveTab::NoTab => Ok(None),
            ActiveTab::QueryFails => anyhow::bail!("no window focused"),
        }
    }
}

pub(crate) fn controller_with(
    clipboard: FakeClipboard,
) -> (TranscriptController, Arc<FakeService>, Arc<FakeClipboard>) {
    let service = Arc::new(FakeService::default());
    let clipboard = Arc::new(clipboard);
    let controller = TranscriptController::new(
        service.clone(),
        clipboard.clone(),
        ControllerSettings::default(),
    );
    (controller, service, clipboard)
}

pub(crate) fn controller() -> (TranscriptController, Arc<FakeService>, Arc<FakeClipboard>) {
    controller_with(FakeClipboard::default())
}

pub(crate) async fn loaded_controller(
) -> (TranscriptController, Arc<FakeService>, Arc<FakeClipboard>) {
    let (controller, service, clipboard) = controller();
    let outcome = controller.activate(&FakeHost::new(VIDEO_URL, &[])).await;
    assert_eq!(outcome, ActivationOutcome::Fetched(FetchOutcome::Applied));
    (controller, service, clipboard)
}

/// Cloneable in-memory writer for rendered output
#[derive(Clone, Default)]
pub(crate) struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
