use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub hotstar: HotstarConfig,
}

impl Config {
  /// Loads `path` when given, otherwise `config.toml`, then
  /// `config.default.toml`, then built-in defaults.
  pub fn load(path: Option<&Path>) -> AnyResult<Self> {
    let config_path = match path {
      Some(p) if p.exists() => p,
      Some(p) => return Err(format!("{} not found", p.display()).into()),
      None if Path::new("config.toml").exists() => Path::new("config.toml"),
      None if Path::new("config.default.toml").exists() => Path::new("config.default.toml"),
      None => return Ok(Self::default()),
    };

    let config_str = std::fs::read_to_string(config_path)?;
    if config_str.trim().is_empty() {
      return Err(format!("{} is empty", config_path.display()).into());
    }

    Self::parse(&config_str)
  }

  pub fn parse(config_str: &str) -> AnyResult<Self> {
    let config: Config = toml::from_str(config_str)?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_sections_fall_back_to_defaults() {
    let config = Config::parse("[logging]\nlevel = \"debug\"\n").unwrap();
    assert_eq!(config.hotstar.api_base, "https://api.hotstar.com");
    assert_eq!(config.hotstar.app_version, "6.88.2");
    assert_eq!(config.hotstar.timeout_secs, 10);
    assert_eq!(
      config.logging.and_then(|l| l.level).as_deref(),
      Some("debug")
    );
  }

  #[test]
  fn hotstar_section_is_read() {
    let config = Config::parse(
      r#"
[hotstar]
user_token = "abc"
timeout_secs = 30

[hotstar.proxy]
url = "http://127.0.0.1:8080"
"#,
    )
    .unwrap();
    assert_eq!(config.hotstar.user_token.as_deref(), Some("abc"));
    assert_eq!(config.hotstar.timeout_secs, 30);
    assert_eq!(
      config.hotstar.proxy.and_then(|p| p.url).as_deref(),
      Some("http://127.0.0.1:8080")
    );
  }
}
