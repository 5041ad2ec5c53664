use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HotstarConfig {
    /// Value of the `userUP` cookie of a logged in session.
    pub user_token: Option<String>,
    /// Netscape cookies.txt exported from a logged in browser.
    pub cookies_file: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub proxy: Option<HttpProxyConfig>,
}

fn default_api_base() -> String {
    "https://api.hotstar.com".to_string()
}

fn default_app_version() -> String {
    "6.88.2".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HotstarConfig {
    fn default() -> Self {
        Self {
            user_token: None,
            cookies_file: None,
            api_base: default_api_base(),
            app_version: default_app_version(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HttpProxyConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}
