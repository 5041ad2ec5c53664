use url::Url;

const PLAYABLE_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "rtmp", "rtmps", "rtmpe", "rtmpt", "rtmpte", "rtmfp", "rtsp",
    "rtsps", "rtspu", "mms",
];

/// Returns the URL when it is absolute and uses a scheme a downloader can fetch.
/// Protocol-relative URLs (`//host/path`) are taken as `https:`.
pub fn url_or_none(value: &str) -> Option<Url> {
    let value = value.trim();
    let url = match value.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{}", rest)).ok()?,
        None => Url::parse(value).ok()?,
    };
    PLAYABLE_SCHEMES
        .contains(&url.scheme())
        .then_some(url)
}

/// File extension of the URL path, lowercased, when it is purely alphanumeric.
pub fn determine_ext(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    let last_segment = path.rsplit('/').next().unwrap_or(&path);
    let (_, ext) = last_segment.rsplit_once('.')?;
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query() {
        assert_eq!(
            determine_ext("https://hses.akamaized.net/v/master.m3u8?hdnea=st=1~exp=2").as_deref(),
            Some("m3u8")
        );
        assert_eq!(determine_ext("https://x.net/a/b.MPD").as_deref(), Some("mpd"));
        assert_eq!(determine_ext("https://x.net/a/b/"), None);
        assert_eq!(determine_ext("https://x.net/a.b/file"), None);
    }

    #[test]
    fn only_absolute_playable_urls_pass() {
        assert!(url_or_none("https://staragvod1-vh.akamaihd.net/i/v.mp4").is_some());
        assert!(url_or_none("rtmp://live.example.com/app").is_some());
        assert!(url_or_none("/relative/path.mp4").is_none());
        assert!(url_or_none("javascript:alert(1)").is_none());
        assert!(url_or_none("").is_none());
    }

    #[test]
    fn protocol_relative_urls_become_https() {
        let url = url_or_none("//hses.akamaized.net/v/master.m3u8").unwrap();
        assert_eq!(url.as_str(), "https://hses.akamaized.net/v/master.m3u8");
        assert!(url_or_none("//").is_none());
    }
}
