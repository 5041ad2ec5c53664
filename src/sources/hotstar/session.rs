use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;
use url::Url;

use crate::common::{ExtractorError, ExtractorResult};

/// Name of the cookie carrying the logged in user's token.
pub const USER_TOKEN_COOKIE: &str = "userUP";

/// Read-only lookup of session cookies supplied from outside.
pub trait SessionStore: Send + Sync {
    fn get_cookie(&self, url: &str, name: &str) -> Option<String>;
}

pub struct NoSession;

impl SessionStore for NoSession {
    fn get_cookie(&self, _url: &str, _name: &str) -> Option<String> {
        None
    }
}

/// Cookies given directly in the config, valid for every URL.
#[derive(Default)]
pub struct StaticSession {
    cookies: HashMap<String, String>,
}

impl StaticSession {
    pub fn with_user_token(token: impl Into<String>) -> Self {
        let mut cookies = HashMap::new();
        cookies.insert(USER_TOKEN_COOKIE.to_string(), token.into());
        Self { cookies }
    }
}

impl SessionStore for StaticSession {
    fn get_cookie(&self, _url: &str, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }
}

#[derive(Debug, Clone)]
struct CookieRecord {
    domain: String,
    include_subdomains: bool,
    path: String,
    expires: u64,
    name: String,
    value: String,
}

impl CookieRecord {
    fn matches(&self, host: &str, path: &str, now: u64) -> bool {
        let domain = self.domain.trim_start_matches('.');
        let host_ok = host == domain
            || (self.include_subdomains && host.ends_with(&format!(".{}", domain)));
        let expired = self.expires != 0 && self.expires < now;
        host_ok && path.starts_with(&self.path) && !expired
    }
}

/// Netscape `cookies.txt` as exported by browser extensions.
#[derive(Debug, Default)]
pub struct CookieFile {
    records: Vec<CookieRecord>,
}

impl CookieFile {
    pub fn load(path: &Path) -> ExtractorResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("cannot read cookies file {}: {}", path.display(), e))
        })?;
        let file = Self::parse(&text);
        debug!("Loaded {} cookies from {}", file.records.len(), path.display());
        Ok(file)
    }

    pub fn parse(text: &str) -> Self {
        let records = text
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches(['\r', '\n']);
                let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let fields: Vec<&str> = line.split('\t').collect();
                if fields.len() < 7 {
                    return None;
                }
                Some(CookieRecord {
                    domain: fields[0].to_ascii_lowercase(),
                    include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
                    path: fields[2].to_string(),
                    expires: fields[4].parse().unwrap_or(0),
                    name: fields[5].to_string(),
                    value: fields[6].to_string(),
                })
            })
            .collect();
        Self { records }
    }
}

impl SessionStore for CookieFile {
    fn get_cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        self.records
            .iter()
            .filter(|r| r.name == name && r.matches(&host, url.path(), now))
            // most specific path wins
            .max_by_key(|r| r.path.len())
            .map(|r| r.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIES: &str = "# Netscape HTTP Cookie File
.hotstar.com\tTRUE\t/\tTRUE\t0\tuserUP\tsession-token
#HttpOnly_.hotstar.com\tTRUE\t/\tTRUE\t0\ths_uid\tabc
www.hotstar.com\tFALSE\t/in\tFALSE\t0\tuserUP\tin-token
.hotstar.com\tTRUE\t/\tFALSE\t1\texpired\tgone
.example.com\tTRUE\t/\tFALSE\t0\tuserUP\tother
";

    #[test]
    fn cookie_file_matches_domain_and_path() {
        let jar = CookieFile::parse(COOKIES);
        assert_eq!(
            jar.get_cookie("https://www.hotstar.com/us", USER_TOKEN_COOKIE).as_deref(),
            Some("session-token")
        );
        assert_eq!(
            jar.get_cookie("https://www.hotstar.com/in", USER_TOKEN_COOKIE).as_deref(),
            Some("in-token")
        );
        assert_eq!(
            jar.get_cookie("https://www.hotstar.com/in", "hs_uid").as_deref(),
            Some("abc")
        );
        assert_eq!(jar.get_cookie("https://www.hotstar.com/in", "expired"), None);
        assert_eq!(jar.get_cookie("https://www.example.org/", USER_TOKEN_COOKIE), None);
    }

    #[test]
    fn static_session_answers_any_url() {
        let session = StaticSession::with_user_token("tok");
        assert_eq!(
            session.get_cookie("https://www.hotstar.com/in", USER_TOKEN_COOKIE).as_deref(),
            Some("tok")
        );
        assert_eq!(NoSession.get_cookie("https://www.hotstar.com/in", USER_TOKEN_COOKIE), None);
    }
}
