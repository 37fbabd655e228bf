//! Container runtime client interface.

use async_trait::async_trait;
use bock_common::BockResult;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// A request to make `target_ref` name the same image as `source_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    /// Existing image reference.
    pub source_ref: String,
    /// New name for it.
    pub target_ref: String,
}

impl ImageTag {
    /// Create a tag request.
    pub fn new(source_ref: impl Into<String>, target_ref: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            target_ref: target_ref.into(),
        }
    }
}

/// Image operations of the active container runtime (docker, podman, ...).
///
/// Implementations are shared across concurrent tasks and must tolerate
/// concurrent calls. Every call receives the cancellation token of the
/// operation it belongs to and should return promptly once it fires.
#[async_trait]
pub trait ContainerFrontend: Send + Sync {
    /// Load an image archive. The stream belongs to the caller and is not closed.
    async fn image_load(
        &self,
        cancel: &CancellationToken,
        archive: &mut (dyn AsyncRead + Send + Unpin),
    ) -> BockResult<()>;

    /// Pull an image by reference.
    async fn image_pull(&self, cancel: &CancellationToken, reference: &str) -> BockResult<()>;

    /// Add a name to an existing image.
    async fn image_tag(&self, cancel: &CancellationToken, tag: &ImageTag) -> BockResult<()>;

    /// Remove an image reference.
    async fn image_remove(
        &self,
        cancel: &CancellationToken,
        force: bool,
        reference: &str,
    ) -> BockResult<()>;
}
