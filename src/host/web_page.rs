//! Command line host
//!
//! Treats a URL given on the command line as the active tab and probes it by
//! downloading the page and scanning its `<iframe>` tags.

use super::{BrowserHost, PageProbe, TabHandle, TabId};
use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};

static IFRAME_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<iframe\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("iframe pattern is valid")
});

/// Host backed by a plain HTTP client
pub(crate) struct WebPageHost {
    tab: TabHandle,
    client: reqwest::Client,
}

impl WebPageHost {
    pub(crate) fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for WebPageHost")?;

        Ok(Self {
            tab: TabHandle {
                id: TabId("cli".to_string()),
                url,
            },
            client,
        })
    }
}

#[async_trait]
impl PageProbe for WebPageHost {
    #[instrument(skip(self, tab), fields(url = %self.tab.url, tab = %tab.0))]
    async fn iframe_sources(&self, tab: &TabId) -> anyhow::Result<Vec<String>> {
        anyhow::ensure!(*tab == self.tab.id, "Unknown tab: {:?}", tab);

        let body = self
            .client
            .get(&self.tab.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let sources = extract_iframe_sources(&body);
        debug!(count = sources.len(), "Scanned page for iframes");
        Ok(sources)
    }
}

#[async_trait]
impl BrowserHost for WebPageHost {
    async fn active_tab(&self) -> anyhow::Result<Option<TabHandle>> {
        Ok(Some(self.tab.clone()))
    }
}

/// Collect iframe `src` attributes in document order
fn extract_iframe_sources(html: &str) -> Vec<String> {
    IFRAME_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .collect()
}
