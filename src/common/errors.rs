use thiserror::Error;

/// Failure of the underlying HTTP collaborator.
///
/// The HTTP status stays inspectable so callers can tell an access-control
/// rejection (403) apart from every other transport problem.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("HTTP {status} from {url}")]
  Status { status: u16, url: String },
  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("invalid JSON from {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: serde_json::Error,
  },
}

impl TransportError {
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
      Self::Decode { .. } => None,
    }
  }

  pub fn is_forbidden(&self) -> bool {
    self.status() == Some(403)
  }
}

#[derive(Debug, Error)]
pub enum ExtractorError {
  #[error("unsupported URL: {0}")]
  UrlFormat(String),

  #[error(
    "You must pass the cookies for a logged in hotstar.com session \
     (hotstar.user_token or hotstar.cookies_file) to download replays."
  )]
  AuthenticationRequired,

  #[error("hotstar said: {0}")]
  ExternalApi(String),

  #[error(
    "The uploader has not made this content available in your country; \
     it is only available in: {}",
    .countries.join(", ")
  )]
  GeoRestricted { countries: Vec<String> },

  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("missing field in response: {0}")]
  MissingField(&'static str),

  #[error("failed to parse {what}: {reason}")]
  Parse { what: &'static str, reason: String },

  #[error("configuration error: {0}")]
  Config(String),
}

impl ExtractorError {
  /// True for failures that describe the content or the session, not a bug.
  pub fn is_expected(&self) -> bool {
    matches!(
      self,
      Self::AuthenticationRequired | Self::ExternalApi(_) | Self::GeoRestricted { .. }
    )
  }
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn forbidden_status_is_detected() {
    let err = TransportError::Status {
      status: 403,
      url: "https://example.com/master.m3u8".into(),
    };
    assert!(err.is_forbidden());

    let err = TransportError::Status {
      status: 404,
      url: "https://example.com/master.m3u8".into(),
    };
    assert!(!err.is_forbidden());
    assert_eq!(err.status(), Some(404));
  }

  #[test]
  fn geo_restriction_lists_countries() {
    let err = ExtractorError::GeoRestricted {
      countries: vec!["IN".into()],
    };
    assert!(err.to_string().ends_with("available in: IN"));
    assert!(err.is_expected());
    assert!(!ExtractorError::MissingField("title").is_expected());
  }
}
