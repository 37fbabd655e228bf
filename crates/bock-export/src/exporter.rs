//! Build-scoped entry point for exporting outputs into the local runtime.

use std::sync::Arc;

use bock_common::BockResult;
use bock_features::FeatureSet;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::console::ConsoleLogger;
use crate::frontend::ContainerFrontend;
use crate::load::load_docker_tar;
use crate::manifest::{Manifest, load_docker_manifest};
use crate::pull::{PullMap, docker_pull_local_images};

/// Exports one build's outputs, honoring the build's feature set.
#[derive(Clone)]
pub struct Exporter {
    /// Runtime client.
    frontend: Arc<dyn ContainerFrontend>,
    /// Progress output.
    console: Arc<dyn ConsoleLogger>,
    /// Features of the build being exported.
    features: Arc<FeatureSet>,
}

impl Exporter {
    /// Create an exporter for a build.
    pub fn new(
        frontend: Arc<dyn ContainerFrontend>,
        console: Arc<dyn ConsoleLogger>,
        features: FeatureSet,
    ) -> Self {
        Self {
            frontend,
            console,
            features: Arc::new(features),
        }
    }

    /// The build's feature set.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Present a multi-platform image under its parent name.
    ///
    /// Returns `false` without touching the runtime when the build opted out
    /// of manifest-list presentation with `use-no-manifest-list`.
    ///
    /// # Errors
    ///
    /// See [`load_docker_manifest`].
    pub async fn publish_multi_platform(
        &self,
        cancel: &CancellationToken,
        parent_image_name: &str,
        children: &[Manifest],
    ) -> BockResult<bool> {
        if self.features.use_no_manifest_list {
            tracing::debug!(
                parent = parent_image_name,
                children = children.len(),
                "Skipping multi-platform presentation (use-no-manifest-list)"
            );
            return Ok(false);
        }

        load_docker_manifest(
            cancel,
            self.console.as_ref(),
            self.frontend.as_ref(),
            parent_image_name,
            children,
        )
        .await?;
        Ok(true)
    }

    /// Move images from the embedded registry into the runtime.
    ///
    /// # Errors
    ///
    /// See [`docker_pull_local_images`].
    pub async fn pull_local_images(
        &self,
        cancel: &CancellationToken,
        registry_addr: &str,
        pull_map: &PullMap,
    ) -> BockResult<()> {
        tracing::info!(
            registry = registry_addr,
            images = pull_map.len(),
            "Pulling images from local registry"
        );
        docker_pull_local_images(cancel, Arc::clone(&self.frontend), registry_addr, pull_map).await
    }

    /// Load an image archive.
    ///
    /// # Errors
    ///
    /// See [`load_docker_tar`].
    pub async fn load_tar<R>(&self, cancel: &CancellationToken, archive: &mut R) -> BockResult<()>
    where
        R: AsyncRead + Send + Unpin,
    {
        load_docker_tar(cancel, self.frontend.as_ref(), archive).await
    }
}
