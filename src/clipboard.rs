//! Clipboard access
//!
//! Handles copying transcripts to the system clipboard.
//!
//! On Linux the clipboard has no central store: contents live only as long as
//! the process that owns them. Each copy therefore runs on an owner thread that
//! serves the text until another application (or a later copy) takes over.

use arboard::Clipboard;
use async_trait::async_trait;
use tracing::info;

#[cfg(target_os = "linux")]
use {
    arboard::SetExtLinux,
    std::sync::Mutex,
    std::thread::JoinHandle,
    tokio::sync::oneshot,
    tracing::{debug, warn},
};

/// Destination for copied transcript text
#[async_trait]
pub(crate) trait ClipboardSink: Send + Sync {
    async fn write_text(&self, text: String) -> anyhow::Result<()>;
}

/// System clipboard via arboard
#[derive(Default)]
pub(crate) struct SystemClipboard {
    #[cfg(target_os = "linux")]
    owners: Mutex<Vec<JoinHandle<()>>>,
}

impl SystemClipboard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait until text copied by this process has been replaced on the clipboard.
    ///
    /// Returns at once if nothing was copied, or on platforms where the
    /// clipboard outlives its owner.
    pub(crate) async fn hold_until_replaced(&self) {
        #[cfg(target_os = "linux")]
        {
            let owners: Vec<JoinHandle<()>> = match self.owners.lock() {
                Ok(mut owners) => owners.drain(..).collect(),
                Err(poisoned) => poisoned.into_inner().drain(..).collect(),
            };
            if owners.iter().all(|owner| owner.is_finished()) {
                return;
            }

            eprintln!("Keeping the transcript on the clipboard until something else is copied.");
            let joined = tokio::task::spawn_blocking(move || {
                for owner in owners {
                    let _ = owner.join();
                }
            })
            .await;
            if let Err(e) = joined {
                warn!("Clipboard owner thread failed: {}", e);
            }
        }
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_text(&self, text: String) -> anyhow::Result<()> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let owner = std::thread::Builder::new()
            .name("clipboard-owner".into())
            .spawn(move || {
                let mut clipboard = match Clipboard::new() {
                    Ok(clipboard) => clipboard,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(text.len()));
                // Blocks while this process owns the selection
                if let Err(e) = clipboard.set().wait().text(text) {
                    warn!("Failed to serve clipboard contents: {}", e);
                }
                debug!("Clipboard ownership released");
            })?;

        let chars = ready_rx.await??;
        info!("Transcript copied to clipboard ({} chars)", chars);

        let mut owners = match self.owners.lock() {
            Ok(owners) => owners,
            Err(poisoned) => poisoned.into_inner(),
        };
        owners.retain(|owner| !owner.is_finished());
        owners.push(owner);
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn write_text(&self, text: String) -> anyhow::Result<()> {
        // arboard is blocking and may talk to the display server
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut clipboard = Clipboard::new()?;
            clipboard.set_text(text.as_str())?;
            info!("Transcript copied to clipboard ({} chars)", text.len());
            Ok(())
        })
        .await?
    }
}
