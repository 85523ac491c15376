//! Browser host seam
//!
//! The controller never touches a browser directly. It asks a [`BrowserHost`]
//! for the active tab and, when the tab URL is not a video page, probes the
//! tab's embedded frames through [`PageProbe`].

mod web_page;

pub(crate) use web_page::WebPageHost;

use async_trait::async_trait;

/// Opaque identifier used to address a tab for page probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TabId(pub(crate) String);

/// The active tab as reported by the host
#[derive(Debug, Clone)]
pub(crate) struct TabHandle {
    pub(crate) id: TabId,
    /// Navigable URL of the tab (may be empty or malformed)
    pub(crate) url: String,
}

/// Capability to inspect a tab's page content
#[async_trait]
pub(crate) trait PageProbe: Send + Sync {
    /// Sources of the embedded frames in the tab's page, in document order.
    async fn iframe_sources(&self, tab: &TabId) -> anyhow::Result<Vec<String>>;
}

/// Host environment exposing the active tab and page probes
#[async_trait]
pub(crate) trait BrowserHost: PageProbe {
    async fn active_tab(&self) -> anyhow::Result<Option<TabHandle>>;
}
