use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::common::{ContentId, CountryCode, ExtractorError, ExtractorResult};

pub static CONTENT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?hotstar\.com/(?:(?P<country_code>\w{1,2})/)?(?:.+?[/-])?(?P<id>\d{10})",
    )
    .expect("content URL regex")
});

static APP_STATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script>window\.APP_STATE\s*=\s*(\{.+?\})</script>").expect("app state regex")
});

/// Where a page keeps its content record inside one page-state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSlot {
    /// `initialState.contentData.content`
    ContentData,
    /// `initialState.contentDetail.content`
    ContentDetail,
}

impl ContentSlot {
    pub const PROBE_ORDER: [ContentSlot; 2] = [ContentSlot::ContentData, ContentSlot::ContentDetail];

    fn pointer(self) -> &'static str {
        match self {
            Self::ContentData => "/initialState/contentData/content",
            Self::ContentDetail => "/initialState/contentDetail/content",
        }
    }

    pub fn probe(self, value: &Value) -> Option<&Value> {
        value.pointer(self.pointer()).filter(|v| v.is_object())
    }
}

/// The content record embedded in a page. Every field is optional; the
/// title is checked when an entry is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMetadata {
    pub content_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub broadcast_date: Option<i64>,
    pub start_date: Option<i64>,
    pub channel_name: Option<String>,
    pub channel_id: Option<String>,
    pub show_name: Option<String>,
    pub season_name: Option<String>,
    pub season_no: Option<i64>,
    pub season_id: Option<String>,
    pub episode_no: Option<i64>,
}

impl ContentMetadata {
    pub fn from_value(v: &Value) -> Self {
        Self {
            content_id: str_or_none(v.get("contentId")),
            title: str_or_none(v.get("title")),
            description: str_or_none(v.get("description")),
            duration: int_or_none(v.get("duration")),
            broadcast_date: int_or_none(v.get("broadcastDate")),
            start_date: int_or_none(v.get("startDate")),
            channel_name: str_or_none(v.get("channelName")),
            channel_id: str_or_none(v.get("channelId")),
            show_name: str_or_none(v.get("showName")),
            season_name: str_or_none(v.get("seasonName")),
            season_no: int_or_none(v.get("seasonNo")),
            season_id: str_or_none(v.get("seasonId")),
            episode_no: int_or_none(v.get("episodeNo")),
        }
    }

    /// Air date, falling back to the start date.
    pub fn timestamp(&self) -> Option<i64> {
        self.broadcast_date.filter(|&t| t != 0).or(self.start_date)
    }

    pub fn require_title(&self) -> ExtractorResult<&str> {
        self.title
            .as_deref()
            .ok_or(ExtractorError::MissingField("title"))
    }
}

/// Splits a content page URL into its country code (default `in`) and
/// ten-digit content id.
pub fn resolve(url: &str) -> ExtractorResult<(CountryCode, ContentId)> {
    let caps = CONTENT_URL_REGEX
        .captures(url)
        .ok_or_else(|| ExtractorError::UrlFormat(url.to_string()))?;

    let country_code = caps
        .name("country_code")
        .map(|m| CountryCode(m.as_str().to_string()))
        .unwrap_or_else(CountryCode::fallback);
    let content_id = ContentId(caps["id"].to_string());
    Ok((country_code, content_id))
}

/// Pulls the bootstrapped `window.APP_STATE` object out of a page.
pub fn extract_page_state(html: &str) -> ExtractorResult<Value> {
    let raw = APP_STATE_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or(ExtractorError::MissingField("app state"))?;

    serde_json::from_str(raw.as_str()).map_err(|e| ExtractorError::Parse {
        what: "app state",
        reason: e.to_string(),
    })
}

/// First content record in the page state whose `contentId` matches.
/// Top-level values are visited in document order, each probed through
/// [`ContentSlot::PROBE_ORDER`].
pub fn find_content_metadata(page_state: &Value, content_id: &str) -> ContentMetadata {
    let Some(map) = page_state.as_object() else {
        return ContentMetadata::default();
    };

    map.values()
        .find_map(|value| {
            ContentSlot::PROBE_ORDER
                .iter()
                .filter_map(|slot| slot.probe(value))
                .find(|content| id_matches(content.get("contentId"), content_id))
        })
        .map(ContentMetadata::from_value)
        .unwrap_or_default()
}

fn id_matches(value: Option<&Value>, content_id: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == content_id,
        Some(Value::Number(n)) => n.to_string() == content_id,
        _ => false,
    }
}

pub(crate) fn str_or_none(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn int_or_none(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn country_code_is_optional() {
        let (cc, id) = resolve("https://www.hotstar.com/x/1234567890").unwrap();
        assert_eq!((cc.0.as_str(), id.0.as_str()), ("x", "1234567890"));

        let (cc, id) = resolve("https://www.hotstar.com/1234567890").unwrap();
        assert_eq!((cc.0.as_str(), id.0.as_str()), ("in", "1234567890"));

        let (cc, id) = resolve("https://www.hotstar.com/us/movies/radha-gopalam/1000057157").unwrap();
        assert_eq!((cc.0.as_str(), id.0.as_str()), ("us", "1000057157"));

        let (cc, id) = resolve("https://www.hotstar.com/can-you-not-spread-rumours/1000076273").unwrap();
        assert_eq!((cc.0.as_str(), id.0.as_str()), ("in", "1000076273"));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for url in [
            "https://www.hotstar.com/movies/radha-gopalam",
            "https://www.example.com/1234567890",
            "https://www.hotstar.com/123456789",
        ] {
            assert!(matches!(resolve(url), Err(ExtractorError::UrlFormat(_))), "{url}");
        }
    }

    #[test]
    fn page_state_is_extracted() {
        let html = r#"<html><script>window.APP_STATE = {"/x": {"initialState": {}}}</script></html>"#;
        let state = extract_page_state(html).unwrap();
        assert!(state.get("/x").is_some());

        assert!(matches!(
            extract_page_state("<html></html>"),
            Err(ExtractorError::MissingField("app state"))
        ));
    }

    #[test]
    fn metadata_probes_both_slots_in_order() {
        let state = json!({
            "/other": { "initialState": { "contentData": { "content": { "contentId": "1111111111", "title": "Other" } } } },
            "/noise": "not an object",
            "/detail": { "initialState": { "contentDetail": { "content": {
                "contentId": 1000057157u64,
                "title": "Radha Gopalam",
                "duration": "8520",
                "broadcastDate": 0,
                "startDate": 1447248600,
                "seasonNo": 2
            } } } }
        });

        let meta = find_content_metadata(&state, "1000057157");
        assert_eq!(meta.title.as_deref(), Some("Radha Gopalam"));
        assert_eq!(meta.duration, Some(8520));
        assert_eq!(meta.timestamp(), Some(1447248600));
        assert_eq!(meta.season_no, Some(2));

        let other = find_content_metadata(&state, "1111111111");
        assert_eq!(other.title.as_deref(), Some("Other"));
    }

    #[test]
    fn numeric_content_id_matches() {
        assert!(id_matches(Some(&json!(1000076273u64)), "1000076273"));
        assert!(id_matches(Some(&json!("1000076273")), "1000076273"));
        assert!(!id_matches(Some(&json!(1000076274u64)), "1000076273"));
        assert!(!id_matches(Some(&json!(true)), "1000076273"));
        assert!(!id_matches(None, "1000076273"));
    }

    #[test]
    fn missing_metadata_is_empty_not_fatal() {
        let state = json!({ "/a": { "initialState": {} } });
        let meta = find_content_metadata(&state, "1000076273");
        assert_eq!(meta, ContentMetadata::default());
        assert!(matches!(meta.require_title(), Err(ExtractorError::MissingField("title"))));
    }
}
