//! Moving images out of the embedded registry into the local runtime.

use std::collections::BTreeMap;
use std::sync::Arc;

use bock_common::{BockError, BockResult, OperationContext};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::frontend::{ContainerFrontend, ImageTag};

/// Image name in the embedded registry mapped to its final local name.
pub type PullMap = BTreeMap<String, String>;

/// Pull every entry of `pull_map` from the registry at `registry_addr`,
/// retag it under its final name and drop the intermediate reference.
///
/// Entries run concurrently. The first failure cancels the shared token and
/// is returned once every task has finished; later failures are discarded.
/// Nothing is rolled back, so on error some final names may already exist.
///
/// # Errors
///
/// Returns the first entry's failure, wrapped with the step that failed.
pub async fn docker_pull_local_images(
    cancel: &CancellationToken,
    frontend: Arc<dyn ContainerFrontend>,
    registry_addr: &str,
    pull_map: &PullMap,
) -> BockResult<()> {
    let group = cancel.child_token();
    let mut tasks = JoinSet::new();

    for (pull_name, final_name) in pull_map {
        let frontend = Arc::clone(&frontend);
        let token = group.clone();
        let registry_addr = registry_addr.to_string();
        let pull_name = pull_name.clone();
        let final_name = final_name.clone();

        tasks.spawn(async move {
            docker_pull_local_image(
                &token,
                frontend.as_ref(),
                &registry_addr,
                &pull_name,
                &final_name,
            )
            .await
        });
    }

    let mut first_err = None;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap_or_else(|err| {
            Err(BockError::Internal {
                message: format!("image pull task failed: {err}"),
            })
        });

        if let Err(err) = result {
            if first_err.is_none() {
                group.cancel();
                first_err = Some(err);
            } else {
                tracing::debug!(error = %err, "Discarding error from sibling pull");
            }
        }
    }

    first_err.map_or(Ok(()), Err)
}

async fn docker_pull_local_image(
    cancel: &CancellationToken,
    frontend: &dyn ContainerFrontend,
    registry_addr: &str,
    pull_name: &str,
    final_name: &str,
) -> BockResult<()> {
    let full_pull_name = format!("{registry_addr}/{pull_name}");
    tracing::debug!(image = %full_pull_name, final_name, "Pulling image from local registry");

    frontend
        .image_pull(cancel, &full_pull_name)
        .await
        .context("image pull")?;

    frontend
        .image_tag(cancel, &ImageTag::new(&full_pull_name, final_name))
        .await
        .context("image tag after pull")?;

    // Force: the runtime may already have garbage collected the reference.
    frontend
        .image_remove(cancel, true, &full_pull_name)
        .await
        .context("image rmi after pull and retag")
}
