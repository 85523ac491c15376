//! Video locator
//!
//! Maps the active tab to a canonical video URL. Tabs already on a YouTube
//! watch, shorts or youtu.be page pass through unchanged; any other page is
//! probed once for an embedded YouTube player.

use crate::host::{PageProbe, TabHandle};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// URL fragments that already identify a playable video, checked in order
const DIRECT_VIDEO_PATTERNS: [&str; 3] =
    ["youtube.com/watch?v=", "youtube.com/shorts", "youtu.be/"];

/// Fragment identifying an embedded YouTube player frame
const EMBED_FRAME_PATTERN: &str = "youtube.com/embed/";

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Resolve a tab to a canonical video URL.
///
/// Probe errors and timeouts count as "no embedded frame".
#[instrument(skip(tab, probe), fields(tab_url = %tab.url))]
pub(crate) async fn resolve<P: PageProbe + ?Sized>(
    tab: &TabHandle,
    probe: &P,
    probe_timeout: Duration,
) -> Option<String> {
    if let Some(pattern) = direct_video_pattern(&tab.url) {
        debug!(pattern, "Tab is a direct video page");
        return Some(tab.url.clone());
    }

    let sources = match timeout(probe_timeout, probe.iframe_sources(&tab.id)).await {
        Ok(Ok(sources)) => sources,
        Ok(Err(e)) => {
            warn!("Page probe failed: {:#}", e);
            return None;
        }
        Err(_) => {
            warn!("Page probe timed out after {:?}", probe_timeout);
            return None;
        }
    };

    let src = find_embedded_video_src(&sources)?;
    let video_id = embed_video_id(src)?;
    let url = watch_url(video_id);
    info!(%url, "Resolved embedded video");
    Some(url)
}

/// First direct-video pattern contained in `url`
fn direct_video_pattern(url: &str) -> Option<&'static str> {
    DIRECT_VIDEO_PATTERNS
        .iter()
        .copied()
        .find(|pattern| url.contains(*pattern))
}

/// Page-inspection function: first frame source hosting a YouTube embed.
///
/// Frames are taken in the order the host reports them.
fn find_embedded_video_src(sources: &[String]) -> Option<&str> {
    sources
        .iter()
        .map(String::as_str)
        .find(|src| src.contains(EMBED_FRAME_PATTERN))
}

/// Segment between the first and second `embed/`, cut at the next `?`
fn embed_video_id(src: &str) -> Option<&str> {
    let segment = src.split("embed/").nth(1)?;
    let id = segment.split('?').next().unwrap_or_default();
    (!id.is_empty()).then_some(id)
}

fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}
