use std::collections::HashSet;

use tracing::debug;

use super::utils::{
    extract_attr_f64, extract_attr_str, extract_attr_u64, parse_resolution, resolve_url,
    split_codecs,
};
use crate::common::{ExtractorError, ExtractorResult};
use crate::protocol::{Protocol, StreamFormat};

/// Expands an M3U8 document into formats.
///
/// A master playlist yields one format per `EXT-X-STREAM-INF` variant plus one
/// audio-only format per `EXT-X-MEDIA` audio rendition that has its own URI.
/// A media playlist is already a single rendition and yields one format
/// pointing at the manifest itself.
pub fn parse_m3u8(text: &str, manifest_url: &str) -> ExtractorResult<Vec<StreamFormat>> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    if lines.first().map(|l| l.trim_start_matches('\u{feff}')) != Some("#EXTM3U") {
        return Err(ExtractorError::Parse {
            what: "HLS manifest",
            reason: format!("{} does not start with #EXTM3U", manifest_url),
        });
    }

    let is_master = lines.iter().any(|l| l.starts_with("#EXT-X-STREAM-INF"));
    if !is_master {
        let mut format = StreamFormat::new("hls", manifest_url, Protocol::Hls);
        format.manifest_url = Some(manifest_url.to_string());
        format.ext = Some("mp4".to_string());
        return Ok(vec![format]);
    }

    let mut formats = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("#EXT-X-MEDIA:") {
            let media_type = extract_attr_str(line, "TYPE").unwrap_or_default();
            let uri = extract_attr_str(line, "URI").filter(|_| media_type == "AUDIO");
            if let Some(uri) = uri {
                let group_id = extract_attr_str(line, "GROUP-ID").unwrap_or_default();
                let name = extract_attr_str(line, "NAME").unwrap_or_default();
                let id = format_id(&["hls", "audio", &group_id, &name], &mut seen_ids);

                let mut format = StreamFormat::new(id, resolve_url(manifest_url, &uri), Protocol::Hls);
                format.manifest_url = Some(manifest_url.to_string());
                format.ext = Some("mp4".to_string());
                format.vcodec = Some("none".to_string());
                formats.push(format);
            }
            i += 1;
        } else if line.starts_with("#EXT-X-STREAM-INF") {
            let mut j = i + 1;
            while j < lines.len() && (lines[j].starts_with('#') || lines[j].is_empty()) {
                j += 1;
            }
            if j < lines.len() {
                formats.push(variant_format(line, lines[j], manifest_url, &mut seen_ids));
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    debug!("HLS: {} formats from {}", formats.len(), manifest_url);
    Ok(formats)
}

fn variant_format(
    inf_line: &str,
    uri: &str,
    manifest_url: &str,
    seen_ids: &mut HashSet<String>,
) -> StreamFormat {
    let bandwidth = extract_attr_u64(inf_line, "AVERAGE-BANDWIDTH")
        .or_else(|| extract_attr_u64(inf_line, "BANDWIDTH"));
    let tbr = bandwidth.map(|b| b as f64 / 1000.0);

    let id = match tbr {
        Some(t) => format_id(&["hls", &format!("{}", t.round() as u64)], seen_ids),
        None => format_id(&["hls", &seen_ids.len().to_string()], seen_ids),
    };

    let mut format = StreamFormat::new(id, resolve_url(manifest_url, uri), Protocol::Hls);
    format.manifest_url = Some(manifest_url.to_string());
    format.ext = Some("mp4".to_string());
    format.tbr = tbr;
    format.fps = extract_attr_f64(inf_line, "FRAME-RATE");

    if let Some((w, h)) = extract_attr_str(inf_line, "RESOLUTION").and_then(|r| parse_resolution(&r)) {
        format.width = Some(w);
        format.height = Some(h);
    }

    if let Some(codecs) = extract_attr_str(inf_line, "CODECS") {
        let (video, audio) = split_codecs(&codecs);
        match (video, audio) {
            (None, Some(a)) => {
                format.vcodec = Some("none".to_string());
                format.acodec = Some(a);
            }
            (v, a) => {
                format.vcodec = v;
                format.acodec = a;
            }
        }
    }

    format
}

/// Joins the non-empty parts with `-` and disambiguates repeats.
fn format_id(parts: &[&str], seen: &mut HashSet<String>) -> String {
    let base = parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.replace(char::is_whitespace, "_"))
        .collect::<Vec<_>>()
        .join("-");

    let mut candidate = base.clone();
    let mut n = 1;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    candidate
}
