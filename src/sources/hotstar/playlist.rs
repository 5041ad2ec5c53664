use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::api::ApiClient;
use super::locator::str_or_none;
use crate::common::{CountryCode, ExtractorError, ExtractorResult};
use crate::protocol::{EntryReference, PlaylistEntry, PlaylistResult};

pub const TRAY_LOOKUP_PATH: &str = "o/v1/tray/find";

pub static PLAYLIST_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?hotstar\.com/(?:(?P<country_code>\w{1,2})/)?tv/[^/]+/s-\w+/list/[^/]+/t-(?P<id>\w+)",
    )
    .expect("playlist URL regex")
});

/// Splits a tray URL into its country code (default `in`) and tray id.
pub fn parse_url(url: &str) -> ExtractorResult<(CountryCode, String)> {
    let caps = PLAYLIST_URL_REGEX
        .captures(url)
        .ok_or_else(|| ExtractorError::UrlFormat(url.to_string()))?;

    let country_code = caps
        .name("country_code")
        .map(|m| CountryCode(m.as_str().to_string()))
        .unwrap_or_else(CountryCode::fallback);
    Ok((country_code, caps["id"].to_string()))
}

pub struct PlaylistResolver<'a> {
    api: &'a ApiClient,
}

impl<'a> PlaylistResolver<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Resolves a tray into lazy references, one per item with a content id,
    /// in tray order. Nothing is fetched per item.
    pub async fn resolve(&self, url: &str) -> ExtractorResult<PlaylistResult> {
        let (country_code, tray_id) = parse_url(url)?;
        let collection = self
            .api
            .call_legacy(TRAY_LOOKUP_PATH, &tray_id, "uqId")
            .await?;

        let items = collection
            .pointer("/assets/items")
            .and_then(|v| v.as_array())
            .ok_or(ExtractorError::MissingField("assets.items"))?;

        let entries: Vec<PlaylistEntry> = items
            .iter()
            .filter_map(|item| str_or_none(item.get("contentId")))
            .filter(|id| !id.is_empty())
            .map(|id| {
                PlaylistEntry::Reference(EntryReference {
                    url: format!("https://www.hotstar.com/{}/{}", country_code, id),
                    id,
                    source: "hotstar".to_string(),
                })
            })
            .collect();

        debug!("hotstar: tray {} has {} items", tray_id, entries.len());
        Ok(PlaylistResult::new(tray_id, entries))
    }
}
