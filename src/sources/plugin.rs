use async_trait::async_trait;

use crate::common::ExtractorResult;
use crate::protocol::PlaylistResult;

/// Trait that every site extractor implements.
#[async_trait]
pub trait SourcePlugin: Send + Sync {
    /// Unique identifier for this source (e.g. "hotstar")
    fn name(&self) -> &str;

    /// Check if this source can handle the given URL.
    fn can_handle(&self, identifier: &str) -> bool;

    /// Resolve the URL into a playlist of content entries and/or lazy
    /// references.
    async fn load(&self, identifier: &str) -> ExtractorResult<PlaylistResult>;
}

pub type BoxedSource = Box<dyn SourcePlugin>;
