//! Loading image archives.

use bock_common::{BockResult, OperationContext};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::frontend::ContainerFrontend;

/// Load an image tar into the runtime.
///
/// The archive is only read; opening and closing it is up to the caller.
///
/// # Errors
///
/// Returns the runtime failure wrapped as `load tar`.
pub async fn load_docker_tar<R>(
    cancel: &CancellationToken,
    frontend: &dyn ContainerFrontend,
    archive: &mut R,
) -> BockResult<()>
where
    R: AsyncRead + Send + Unpin,
{
    frontend.image_load(cancel, archive).await.context("load tar")
}
