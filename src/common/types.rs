/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// Strongly typed identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl From<String> for ContentId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl From<&str> for ContentId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl std::ops::Deref for ContentId {
  type Target = str;
  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl std::fmt::Display for ContentId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Two-letter (or shorter) region segment taken from a hotstar.com URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CountryCode(pub String);

impl CountryCode {
  /// Region used when the URL carries no country segment.
  pub fn fallback() -> Self {
    Self("in".to_string())
  }
}

impl std::ops::Deref for CountryCode {
  type Target = str;
  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl std::fmt::Display for CountryCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
