use std::time::Duration;

use reqwest::{Client, Error};
use tracing::debug;

use crate::configs::HttpProxyConfig;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
  pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
  }

  pub fn new(timeout_secs: u64, proxy: Option<&HttpProxyConfig>) -> Result<Client, Error> {
    let mut builder = Client::builder()
      .user_agent(Self::default_user_agent())
      .timeout(Duration::from_secs(timeout_secs));

    if let Some(url) = proxy.and_then(|p| p.url.as_deref()) {
      debug!("Configuring proxy for HttpClient: {}", url);
      let mut proxy_obj = reqwest::Proxy::all(url)?;
      if let Some(p) = proxy {
        if let (Some(username), Some(password)) = (&p.username, &p.password) {
          proxy_obj = proxy_obj.basic_auth(username, password);
        }
      }
      builder = builder.proxy(proxy_obj);
    }

    builder.build()
  }
}
