use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{debug, info};

use super::api::ApiClient;
use super::locator;
use super::playlist::{PLAYLIST_URL_REGEX, PlaylistResolver};
use super::reconciler::FormatReconciler;
use super::session::{CookieFile, NoSession, SessionStore, StaticSession};
use super::transport::{HttpFetcher, HttpManifestExpander, ManifestExpander, ReqwestFetcher};
use crate::common::{ExtractorError, ExtractorResult, HttpClient};
use crate::configs::HotstarConfig;
use crate::protocol::{PlaylistEntry, PlaylistResult};
use crate::sources::SourcePlugin;

pub const PLAYBACK_PATH: &str = "play/v2/playback/content";

pub struct HotstarSource {
    fetcher: Arc<dyn HttpFetcher>,
    expander: Arc<dyn ManifestExpander>,
    api: ApiClient,
}

impl HotstarSource {
    pub fn new(config: &HotstarConfig) -> ExtractorResult<Self> {
        let client = HttpClient::new(config.timeout_secs, config.proxy.as_ref())
            .map_err(|e| ExtractorError::Config(format!("failed to build HTTP client: {}", e)))?;
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(client));
        let expander = Arc::new(HttpManifestExpander::new(fetcher.clone()));

        Ok(Self::with_collaborators(
            fetcher,
            expander,
            session_from_config(config)?,
            config,
        ))
    }

    pub fn with_collaborators(
        fetcher: Arc<dyn HttpFetcher>,
        expander: Arc<dyn ManifestExpander>,
        session: Arc<dyn SessionStore>,
        config: &HotstarConfig,
    ) -> Self {
        let api = ApiClient::new(
            fetcher.clone(),
            session,
            config.api_base.clone(),
            config.app_version.clone(),
        );
        Self {
            fetcher,
            expander,
            api,
        }
    }

    /// Single-content page: one entry per playable candidate.
    pub async fn load_content(&self, url: &str) -> ExtractorResult<PlaylistResult> {
        let (country_code, content_id) = locator::resolve(url)?;

        let webpage = self.fetcher.get_text(url, HeaderMap::new()).await?;
        let page_state = locator::extract_page_state(&webpage)?;
        let metadata = locator::find_content_metadata(&page_state, &content_id);
        let title = metadata.require_title()?.to_string();

        let data = self
            .api
            .call_v2(PLAYBACK_PATH, &content_id, &country_code)
            .await?;
        let playback_sets = data
            .get("playBackSets")
            .and_then(|v| v.as_array())
            .ok_or(ExtractorError::MissingField("playBackSets"))?;
        debug!(
            "hotstar: {} has {} playback candidates",
            content_id,
            playback_sets.len()
        );

        let mut headers = BTreeMap::new();
        headers.insert("Referer".to_string(), url.to_string());

        let entries = FormatReconciler::new(self.expander.as_ref())
            .reconcile(playback_sets, &content_id, &title, &metadata, &headers)
            .await?;

        Ok(PlaylistResult::new(
            content_id.0,
            entries.into_iter().map(PlaylistEntry::Content).collect(),
        ))
    }

    /// Tray page: lazy references only.
    pub async fn load_playlist(&self, url: &str) -> ExtractorResult<PlaylistResult> {
        PlaylistResolver::new(&self.api).resolve(url).await
    }
}

#[async_trait]
impl SourcePlugin for HotstarSource {
    fn name(&self) -> &str {
        "hotstar"
    }

    fn can_handle(&self, identifier: &str) -> bool {
        PLAYLIST_URL_REGEX.is_match(identifier) || locator::CONTENT_URL_REGEX.is_match(identifier)
    }

    async fn load(&self, identifier: &str) -> ExtractorResult<PlaylistResult> {
        if PLAYLIST_URL_REGEX.is_match(identifier) {
            self.load_playlist(identifier).await
        } else {
            self.load_content(identifier).await
        }
    }
}

/// The config token wins over a cookies file.
fn session_from_config(config: &HotstarConfig) -> ExtractorResult<Arc<dyn SessionStore>> {
    if let Some(token) = config.user_token.as_deref().filter(|t| !t.is_empty()) {
        info!("hotstar: using session token from config");
        return Ok(Arc::new(StaticSession::with_user_token(token)));
    }
    if let Some(path) = config.cookies_file.as_deref().filter(|p| !p.is_empty()) {
        info!("hotstar: using cookies from {}", path);
        return Ok(Arc::new(CookieFile::load(Path::new(path))?));
    }
    Ok(Arc::new(NoSession))
}
