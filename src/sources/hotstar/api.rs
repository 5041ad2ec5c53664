use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::session::{SessionStore, USER_TOKEN_COOKIE};
use super::token::TokenSigner;
use super::transport::HttpFetcher;
use crate::common::{ContentId, CountryCode, ExtractorError, ExtractorResult};

pub const DESIRED_CONFIG: &str = "encryption:plain|ladder:phone|package:hls";

/// Which API family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    Legacy,
    V2,
}

/// Everything one API call is built from. Request and device ids are drawn
/// fresh for every v2 call.
#[derive(Debug, Clone)]
pub struct ApiRequestContext {
    pub generation: ApiGeneration,
    pub country_code: String,
    pub content_id: String,
    pub session_token: Option<String>,
    pub request_id: Option<String>,
    pub device_id: Option<String>,
}

pub struct ApiClient {
    fetcher: Arc<dyn HttpFetcher>,
    session: Arc<dyn SessionStore>,
    signer: TokenSigner,
    api_base: String,
    app_version: String,
}

impl ApiClient {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        session: Arc<dyn SessionStore>,
        api_base: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            session,
            signer: TokenSigner::default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            app_version: app_version.into(),
        }
    }

    /// Legacy `o/v1` family. The envelope carries `statusCode` and `body`.
    pub async fn call_legacy(
        &self,
        path: &str,
        content_id: &str,
        query_name: &str,
    ) -> ExtractorResult<Value> {
        let ctx = ApiRequestContext {
            generation: ApiGeneration::Legacy,
            country_code: "IN".to_string(),
            content_id: content_id.to_string(),
            session_token: None,
            request_id: None,
            device_id: None,
        };

        let mut headers = HeaderMap::new();
        insert(&mut headers, "hotstarauth", &self.signer.sign_now().to_string())?;
        insert(&mut headers, "x-country-code", &ctx.country_code)?;
        insert(&mut headers, "x-platform-code", "JIO")?;

        let query = [
            (query_name, ctx.content_id.clone()),
            ("tas", "10000".to_string()),
        ];

        let url = format!("{}/{}", self.api_base, path);
        debug!("hotstar legacy API: {} ({}={})", url, query_name, content_id);
        let mut response = self.fetcher.get_json(&url, headers, &query).await?;

        let status = response
            .get("statusCode")
            .and_then(|v| v.as_str())
            .ok_or(ExtractorError::MissingField("statusCode"))?;
        if status != "OK" {
            let message = response
                .pointer("/body/message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}", status));
            return Err(ExtractorError::ExternalApi(message));
        }

        response
            .pointer_mut("/body/results")
            .map(Value::take)
            .ok_or(ExtractorError::MissingField("body.results"))
    }

    /// v2 family. Requires the `userUP` cookie of a logged in session.
    pub async fn call_v2(
        &self,
        path: &str,
        content_id: &ContentId,
        country_code: &CountryCode,
    ) -> ExtractorResult<Value> {
        let session_token = self
            .session
            .get_cookie(
                &format!("https://www.hotstar.com/{}", country_code),
                USER_TOKEN_COOKIE,
            )
            .filter(|t| !t.is_empty())
            .ok_or(ExtractorError::AuthenticationRequired)?;

        let ctx = ApiRequestContext {
            generation: ApiGeneration::V2,
            country_code: country_code.to_string(),
            content_id: content_id.to_string(),
            session_token: Some(session_token),
            request_id: Some(Uuid::new_v4().to_string()),
            device_id: Some(Uuid::new_v4().to_string()),
        };

        let headers = self.v2_headers(&ctx)?;
        let query = [
            ("desired-config", DESIRED_CONFIG.to_string()),
            ("device-id", ctx.device_id.clone().unwrap_or_default()),
            ("os-name", "Windows".to_string()),
            ("os-version", "10".to_string()),
        ];

        let url = format!("{}/{}/{}", self.api_base, path, ctx.content_id);
        debug!("hotstar v2 API: {}", url);
        let mut response = self.fetcher.get_json(&url, headers, &query).await?;

        if response.get("errorCode").is_some() {
            return Err(ExtractorError::ExternalApi(response.to_string()));
        }

        response
            .get_mut("data")
            .map(Value::take)
            .ok_or(ExtractorError::MissingField("data"))
    }

    fn v2_headers(&self, ctx: &ApiRequestContext) -> ExtractorResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        insert(&mut headers, "hotstarauth", &self.signer.sign_now().to_string())?;
        insert(&mut headers, "x-country-code", &ctx.country_code)?;
        insert(&mut headers, "x-hs-appversion", &self.app_version)?;
        insert(&mut headers, "x-hs-platform", "web")?;
        insert(
            &mut headers,
            "x-hs-usertoken",
            ctx.session_token.as_deref().unwrap_or_default(),
        )?;
        insert(
            &mut headers,
            "x-request-id",
            ctx.request_id.as_deref().unwrap_or_default(),
        )?;
        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> ExtractorResult<()> {
    let value = HeaderValue::from_str(value).map_err(|e| ExtractorError::Parse {
        what: "request header",
        reason: format!("{}: {}", name, e),
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
