use tracing::warn;

use super::{hotstar::HotstarSource, plugin::BoxedSource};
use crate::common::{ExtractorError, ExtractorResult};
use crate::configs::Config;
use crate::protocol::{EntryReference, PlaylistEntry, PlaylistResult};

/// Source Manager
pub struct SourceManager {
  pub sources: Vec<BoxedSource>,
}

impl SourceManager {
  /// Create a new SourceManager with all available sources. Fails with the
  /// first source that cannot be built.
  pub fn new(config: &Config) -> ExtractorResult<Self> {
    let mut sources: Vec<BoxedSource> = Vec::new();

    let hotstar = HotstarSource::new(&config.hotstar).inspect_err(|e| {
      tracing::error!("hotstar source failed to initialize: {}", e);
    })?;
    tracing::info!("Loaded source: hotstar");
    sources.push(Box::new(hotstar));

    Ok(Self { sources })
  }

  pub fn with_sources(sources: Vec<BoxedSource>) -> Self {
    Self { sources }
  }

  /// Load using the first matching source
  pub async fn load(&self, identifier: &str) -> ExtractorResult<PlaylistResult> {
    for source in &self.sources {
      if source.can_handle(identifier) {
        tracing::trace!("Loading '{}' with source: {}", identifier, source.name());
        return source.load(identifier).await;
      }
    }

    tracing::debug!("No source could handle identifier: {}", identifier);
    Err(ExtractorError::UrlFormat(identifier.to_string()))
  }

  /// Follow a lazy reference through the single-content path.
  pub async fn resolve_reference(&self, reference: &EntryReference) -> ExtractorResult<PlaylistResult> {
    self.load(&reference.url).await
  }

  /// Replace every reference in `result` with the entries it resolves to,
  /// one reference at a time and in order. References that fail for an
  /// expected reason (login, geo-blocking, provider error) are dropped with
  /// a warning; anything else aborts.
  pub async fn expand(&self, result: PlaylistResult) -> ExtractorResult<PlaylistResult> {
    let mut entries = Vec::with_capacity(result.entries.len());

    for entry in result.entries {
      match entry {
        PlaylistEntry::Content(content) => entries.push(PlaylistEntry::Content(content)),
        PlaylistEntry::Reference(reference) => match self.resolve_reference(&reference).await {
          Ok(resolved) => entries.extend(resolved.entries),
          Err(e) if e.is_expected() => {
            warn!("Skipping {}: {}", reference.url, e);
          }
          Err(e) => return Err(e),
        },
      }
    }

    Ok(PlaylistResult::new(result.id, entries))
  }

  /// Get names of all registered sources
  pub fn source_names(&self) -> Vec<String> {
    self.sources.iter().map(|s| s.name().to_string()).collect()
  }
}
