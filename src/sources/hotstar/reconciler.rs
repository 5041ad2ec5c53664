use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::locator::{ContentMetadata, int_or_none, str_or_none};
use super::transport::ManifestExpander;
use crate::common::{ExtractorError, ExtractorResult};
use crate::manifest::{determine_ext, sort_formats, url_or_none};
use crate::protocol::{ContentEntry, Protocol, StreamFormat};

/// Countries the provider serves when every candidate is blocked.
pub const GEO_COUNTRIES: &[&str] = &["IN"];

static STARAGVOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//staragvod(\d)").expect("staragvod regex"));

/// One element of `playBackSets` that survived the shape checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCandidate {
    pub playback_url: String,
    pub tags: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PlaybackCandidate {
    /// `None` when the element is not an object or has no usable URL.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let url = obj
            .get("playbackUrl")
            .and_then(|v| v.as_str())
            .and_then(url_or_none)?;

        Some(Self {
            playback_url: rewrite_pool_host(url.as_str()),
            tags: str_or_none(obj.get("tagsCombination")).unwrap_or_default(),
            width: dimension(obj.get("width")),
            height: dimension(obj.get("height")),
        })
    }

    /// Untagged candidates are assumed clear.
    pub fn is_clear(&self) -> bool {
        self.tags.is_empty() || self.tags.contains("encryption:plain")
    }

    pub fn kind(&self) -> PlaybackKind {
        classify(&self.tags, determine_ext(&self.playback_url).as_deref())
    }
}

/// How a candidate's URL is turned into formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackKind {
    Hls,
    Dash,
    /// Known to produce broken files; never expanded.
    F4m,
    Direct,
}

pub fn classify(tags: &str, ext: Option<&str>) -> PlaybackKind {
    if tags.contains("package:hls") || ext == Some("m3u8") {
        PlaybackKind::Hls
    } else if tags.contains("package:dash") || ext == Some("mpd") {
        PlaybackKind::Dash
    } else if ext == Some("f4m") {
        PlaybackKind::F4m
    } else {
        PlaybackKind::Direct
    }
}

/// `//staragvod2...` hosts only answer web clients as `//staragvodweb2...`.
pub fn rewrite_pool_host(url: &str) -> String {
    STARAGVOD_REGEX
        .replace_all(url, "//staragvodweb${1}")
        .into_owned()
}

fn dimension(value: Option<&Value>) -> Option<u32> {
    int_or_none(value).and_then(|v| u32::try_from(v).ok())
}

enum CandidateOutcome {
    Formats(Vec<StreamFormat>),
    GeoBlocked,
    Skipped(&'static str),
}

pub struct FormatReconciler<'a> {
    expander: &'a dyn ManifestExpander,
}

impl<'a> FormatReconciler<'a> {
    pub fn new(expander: &'a dyn ManifestExpander) -> Self {
        Self { expander }
    }

    /// Walks the playback candidates in order and emits one entry per
    /// candidate that yields formats. Entry ids carry the candidate's
    /// position in the candidate list, skipped elements included.
    pub async fn reconcile(
        &self,
        candidates: &[Value],
        content_id: &str,
        title: &str,
        metadata: &ContentMetadata,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<Vec<ContentEntry>> {
        let mut entries = Vec::new();
        let mut geo_restricted = false;

        for (index, raw) in candidates.iter().enumerate() {
            let outcome = match PlaybackCandidate::from_value(raw) {
                Some(candidate) => self.expand(&candidate, headers).await?,
                None => CandidateOutcome::Skipped("malformed or missing playback URL"),
            };

            let mut formats = match outcome {
                CandidateOutcome::Formats(formats) if !formats.is_empty() => formats,
                CandidateOutcome::Formats(_) => {
                    debug!("hotstar: candidate {} of {} yielded no formats", index, content_id);
                    continue;
                }
                CandidateOutcome::GeoBlocked => {
                    geo_restricted = true;
                    continue;
                }
                CandidateOutcome::Skipped(reason) => {
                    debug!("hotstar: skipping candidate {} of {}: {}", index, content_id, reason);
                    continue;
                }
            };

            sort_formats(&mut formats);
            for format in &mut formats {
                format
                    .http_headers
                    .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            entries.push(build_entry(content_id, index, title, metadata, formats));
        }

        if entries.is_empty() && geo_restricted {
            return Err(ExtractorError::GeoRestricted {
                countries: GEO_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(entries)
    }

    async fn expand(
        &self,
        candidate: &PlaybackCandidate,
        headers: &BTreeMap<String, String>,
    ) -> ExtractorResult<CandidateOutcome> {
        if !candidate.is_clear() {
            return Ok(CandidateOutcome::Skipped("encrypted"));
        }

        let url = candidate.playback_url.as_str();
        let expanded = match candidate.kind() {
            PlaybackKind::Hls => self.expander.expand_hls(url, headers).await,
            PlaybackKind::Dash => self.expander.expand_dash(url, headers).await,
            PlaybackKind::F4m => return Ok(CandidateOutcome::Skipped("f4m")),
            PlaybackKind::Direct => Ok(vec![direct_format(candidate)]),
        };

        match expanded {
            Ok(formats) => Ok(CandidateOutcome::Formats(formats)),
            Err(ExtractorError::Transport(e)) if e.is_forbidden() => {
                warn!("hotstar: manifest rejected with 403: {}", url);
                Ok(CandidateOutcome::GeoBlocked)
            }
            Err(e) => Err(e),
        }
    }
}

fn direct_format(candidate: &PlaybackCandidate) -> StreamFormat {
    let mut format = StreamFormat::new(
        "http",
        candidate.playback_url.clone(),
        Protocol::direct(&candidate.playback_url),
    );
    format.ext = determine_ext(&candidate.playback_url);
    format.width = candidate.width;
    format.height = candidate.height;
    format
}

fn build_entry(
    content_id: &str,
    index: usize,
    title: &str,
    metadata: &ContentMetadata,
    formats: Vec<StreamFormat>,
) -> ContentEntry {
    ContentEntry {
        id: format!("{}-{}", content_id, index),
        title: title.to_string(),
        description: metadata.description.clone(),
        duration: metadata.duration,
        timestamp: metadata.timestamp(),
        channel: metadata.channel_name.clone(),
        channel_id: metadata.channel_id.clone(),
        series: metadata.show_name.clone(),
        season: metadata.season_name.clone(),
        season_number: metadata.season_no,
        season_id: metadata.season_id.clone(),
        episode: title.to_string(),
        episode_number: metadata.episode_no,
        formats,
    }
}
