//! Terminal presentation
//!
//! Listens to session events and prints whatever the session should show.

use crate::session::{LanguageChoice, SessionEvent, SessionSnapshot, TranscriptController, View};
use std::fmt::Write;
use std::io;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Running event handler task
pub(crate) struct EventHandler {
    handle: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

impl EventHandler {
    /// Render every event emitted so far, then stop the task.
    pub(crate) async fn finish(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            warn!("Event handler task failed: {}", e);
        }
    }
}

/// Spawn the event handler task that renders session events to `out`
pub(crate) fn spawn_event_handler<W: io::Write + Send + 'static>(
    event_rx: broadcast::Receiver<SessionEvent>,
    controller: TranscriptController,
    interactive: bool,
    out: W,
) -> EventHandler {
    let (shutdown, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(run_event_handler(
        event_rx,
        controller,
        interactive,
        out,
        shutdown_rx,
    ));
    EventHandler { handle, shutdown }
}

async fn run_event_handler<W: io::Write>(
    mut event_rx: broadcast::Receiver<SessionEvent>,
    controller: TranscriptController,
    interactive: bool,
    mut out: W,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            event = event_rx.recv() => match event {
                Ok(event) => {
                    handle_session_event(&event, &controller.snapshot(), interactive, &mut out)
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Presenter lagged behind session events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown_rx => {
                loop {
                    match event_rx.try_recv() {
                        Ok(event) => handle_session_event(
                            &event,
                            &controller.snapshot(),
                            interactive,
                            &mut out,
                        ),
                        Err(TryRecvError::Lagged(skipped)) => {
                            warn!(skipped, "Presenter lagged behind session events");
                        }
                        Err(_) => break,
                    }
                }
                break;
            }
        }
    }
    debug!("Event handler stopped");
}

fn handle_session_event<W: io::Write>(
    event: &SessionEvent,
    snapshot: &SessionSnapshot,
    interactive: bool,
    out: &mut W,
) {
    let written = match event {
        SessionEvent::Loading | SessionEvent::Loaded { .. } | SessionEvent::Failed { .. } => {
            writeln!(out, "{}", render(snapshot, interactive))
        }
        SessionEvent::CopyAcknowledged => writeln!(out, "[{}]", snapshot.copy_label()),
        SessionEvent::CopyAckReverted => {
            debug!("Copy acknowledgment reverted");
            Ok(())
        }
    };
    if let Err(e) = written.and_then(|_| out.flush()) {
        warn!("Failed to write session output: {}", e);
    }
}

/// Render the current view, followed by the language selector and commands.
pub(crate) fn render(snapshot: &SessionSnapshot, interactive: bool) -> String {
    let mut out = String::new();
    match snapshot.view() {
        View::Empty => {}
        View::Loading { message } => out.push_str(message),
        View::Transcript { title, text } => {
            let _ = write!(out, "{}\n\n{}", title, text);
        }
        View::Error { message } => out.push_str(&message),
    }

    let choices = snapshot.language_choices();
    if !choices.is_empty() {
        out.push_str("\n\n");
        out.push_str(&render_choices(&choices));
    }

    if interactive && !choices.is_empty() {
        out.push_str("\nEnter a language code or number");
        if snapshot.has_transcript() {
            let _ = write!(out, ", 'c' to {}, 's' to save", snapshot.copy_label());
        }
        out.push_str(", 'q' to quit.");
    }
    out
}

fn render_choices(choices: &[LanguageChoice]) -> String {
    choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let marker = if choice.selected { '*' } else { ' ' };
            if choice.code.is_empty() {
                format!("{} {}. {}", marker, i, choice.label)
            } else {
                format!("{} {}. {} ({})", marker, i, choice.label, choice.code)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
