use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a downloader is expected to fetch a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Segmented HLS, fetched playlist by playlist.
    #[serde(rename = "m3u8_native")]
    Hls,
    /// Segmented DASH described by an MPD.
    #[serde(rename = "http_dash_segments")]
    Dash,
    /// A single progressive file, named after its URL scheme.
    #[serde(untagged)]
    Direct(String),
}

impl Protocol {
    /// Direct protocol for `url`: its lowercased scheme, `https` when the
    /// scheme cannot be read.
    pub fn direct(url: &str) -> Self {
        let scheme = url::Url::parse(url)
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        Protocol::Direct(scheme)
    }
}

/// A single downloadable rendition of a content entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    pub protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Total bitrate in kbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub http_headers: BTreeMap<String, String>,
}

impl StreamFormat {
    pub fn new(format_id: impl Into<String>, url: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            format_id: format_id.into(),
            url: url.into(),
            manifest_url: None,
            protocol,
            ext: None,
            width: None,
            height: None,
            tbr: None,
            fps: None,
            vcodec: None,
            acodec: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// "none" is how manifests spell a missing stream.
    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }
}

/// One playable variant of a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    pub episode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i64>,
    pub formats: Vec<StreamFormat>,
}

/// Pointer to content that still has to be resolved through the
/// single-content path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReference {
    pub id: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "snake_case")]
pub enum PlaylistEntry {
    Content(ContentEntry),
    #[serde(rename = "url")]
    Reference(EntryReference),
}

/// Result of a load operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub id: String,
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistResult {
    pub fn new(id: impl Into<String>, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            id: id.into(),
            entries,
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &EntryReference> {
        self.entries.iter().filter_map(|e| match e {
            PlaylistEntry::Reference(r) => Some(r),
            PlaylistEntry::Content(_) => None,
        })
    }

    pub fn contents(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.iter().filter_map(|e| match e {
            PlaylistEntry::Content(c) => Some(c),
            PlaylistEntry::Reference(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_tagged_by_kind() {
        let result = PlaylistResult::new(
            "3_2_26",
            vec![PlaylistEntry::Reference(EntryReference {
                id: "1000076273".into(),
                url: "https://www.hotstar.com/in/1000076273".into(),
                source: "hotstar".into(),
            })],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["entries"][0]["_type"], "url");
        assert_eq!(json["entries"][0]["id"], "1000076273");
    }

    #[test]
    fn protocol_uses_downloader_names() {
        let format = StreamFormat::new("hls-1200", "https://example.com/a.m3u8", Protocol::Hls);
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["protocol"], "m3u8_native");
        assert!(json.get("http_headers").is_none());
    }

    #[test]
    fn direct_protocol_follows_url_scheme() {
        let format = StreamFormat::new(
            "http",
            "http://staragvod2-vh.akamaihd.net/a.mp4",
            Protocol::direct("http://staragvod2-vh.akamaihd.net/a.mp4"),
        );
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["protocol"], "http");
        assert_eq!(Protocol::direct("rtmp://live.example.com/app"), Protocol::Direct("rtmp".into()));
        assert_eq!(Protocol::direct("not a url"), Protocol::Direct("https".into()));

        let back: Protocol = serde_json::from_value(serde_json::json!("m3u8_native")).unwrap();
        assert_eq!(back, Protocol::Hls);
        let back: Protocol = serde_json::from_value(serde_json::json!("rtmp")).unwrap();
        assert_eq!(back, Protocol::Direct("rtmp".into()));
    }
}
