use url::Url;

pub fn extract_attr_u64(line: &str, key: &str) -> Option<u64> {
    extract_attr_str(line, key)?.parse().ok()
}

pub fn extract_attr_f64(line: &str, key: &str) -> Option<f64> {
    extract_attr_str(line, key)?.parse().ok()
}

pub fn extract_attr_str(line: &str, key: &str) -> Option<String> {
    let key_eq = format!("{}=", key);
    // Attributes follow #TAG: or a comma
    let pos = line
        .find(&format!(":{}", key_eq))
        .map(|p| p + 1)
        .or_else(|| line.find(&format!(",{}", key_eq)).map(|p| p + 1))?;

    let rest = &line[pos + key_eq.len()..];

    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    } else {
        let end = rest.find(',').unwrap_or(rest.len());
        Some(rest[..end].trim().to_string())
    }
}

/// Resolves a manifest reference against the manifest's own URL.
pub fn resolve_url(base: &str, maybe_relative: &str) -> String {
    if maybe_relative.starts_with("http://") || maybe_relative.starts_with("https://") {
        return maybe_relative.to_string();
    }

    match Url::parse(base).and_then(|b| b.join(maybe_relative)) {
        Ok(url) => url.to_string(),
        Err(_) => {
            let base_clean = base.split('?').next().unwrap_or(base);
            let base_dir = base_clean
                .rfind('/')
                .map(|i| &base_clean[..=i])
                .unwrap_or(base_clean);
            format!("{}{}", base_dir, maybe_relative)
        }
    }
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// Parses `30`, `29.97` or `30000/1001`.
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => value.trim().parse().ok(),
    }
}

const VIDEO_CODECS: &[&str] = &[
    "avc1", "avc3", "hvc1", "hev1", "dvh1", "dvhe", "vp09", "vp9", "vp8", "av01", "av1", "h264",
    "h265", "mp4v",
];

const AUDIO_CODECS: &[&str] = &["mp4a", "opus", "aac", "ac-3", "ec-3", "mp3", "flac", "vorbis"];

/// Splits an RFC 6381 `CODECS` list into (video, audio); a side that is
/// absent from the list comes back as `None`.
pub fn split_codecs(codecs: &str) -> (Option<String>, Option<String>) {
    let mut video = None;
    let mut audio = None;
    for codec in codecs.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let family = codec.split('.').next().unwrap_or(codec).to_ascii_lowercase();
        if video.is_none() && VIDEO_CODECS.contains(&family.as_str()) {
            video = Some(codec.to_string());
        } else if audio.is_none() && AUDIO_CODECS.contains(&family.as_str()) {
            audio = Some(codec.to_string());
        }
    }
    (video, audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_bare_attributes() {
        let line = r#"#EXT-X-STREAM-INF:BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2",RESOLUTION=1280x720"#;
        assert_eq!(extract_attr_u64(line, "BANDWIDTH"), Some(1_280_000));
        assert_eq!(
            extract_attr_str(line, "CODECS").as_deref(),
            Some("avc1.4d401f,mp4a.40.2")
        );
        assert_eq!(extract_attr_str(line, "RESOLUTION").as_deref(), Some("1280x720"));
        assert_eq!(extract_attr_str(line, "AUDIO"), None);
    }

    #[test]
    fn relative_references_resolve_against_manifest() {
        let base = "https://hses.akamaized.net/videos/show/master.m3u8?hdnea=tok";
        assert_eq!(
            resolve_url(base, "index_4.m3u8"),
            "https://hses.akamaized.net/videos/show/index_4.m3u8"
        );
        assert_eq!(
            resolve_url(base, "/other/index.m3u8"),
            "https://hses.akamaized.net/other/index.m3u8"
        );
    }

    #[test]
    fn codecs_split_by_family() {
        assert_eq!(
            split_codecs("avc1.64001f,mp4a.40.2"),
            (Some("avc1.64001f".into()), Some("mp4a.40.2".into()))
        );
        assert_eq!(split_codecs("mp4a.40.5"), (None, Some("mp4a.40.5".into())));
        assert_eq!(parse_frame_rate("30000/1001").map(|f| (f * 100.0).round()), Some(2997.0));
        assert_eq!(parse_resolution("1920x1080"), Some((1920, 1080)));
    }
}
