//! Multi-platform images in the local runtime.
//!
//! A runtime image store holds one image per name, so a multi-platform build
//! cannot be loaded as-is. Each platform's output is loaded under its own
//! name and one of them, the default child, is additionally tagged with the
//! parent name. Selection precedence:
//!
//! 1. the first child built for [`Platform::Default`]
//! 2. the first child built for [`Platform::User`]
//! 3. the first child, with a warning

use bock_common::{BockError, BockResult, OperationContext};
use tokio_util::sync::CancellationToken;

use crate::console::ConsoleLogger;
use crate::frontend::{ContainerFrontend, ImageTag};
use crate::platform::Platform;

const NOTE_DETAIL: &str = "Note that when pushing a multi-platform image, \
    it is pushed as a single multi-manifest image. \
    Separate per-platform image tags are only available locally.";

/// One per-platform output of a multi-platform image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Name the output was loaded under.
    pub image_name: String,
    /// Platform it was built for.
    pub platform: Platform,
}

impl Manifest {
    /// Create a manifest entry.
    pub fn new(image_name: impl Into<String>, platform: Platform) -> Self {
        Self {
            image_name: image_name.into(),
            platform,
        }
    }
}

/// The outcome of default-child selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformResolution {
    /// Index of the child that represents the parent image.
    pub default_index: usize,
    /// Set when neither sentinel matched; holds the platform that was looked
    /// for last.
    pub fallback: Option<Platform>,
}

impl PlatformResolution {
    /// Warning to show when selection fell back to the first child.
    #[must_use]
    pub fn warning(&self, parent_image_name: &str, children: &[Manifest]) -> Option<String> {
        let unmatched = self.fallback.as_ref()?;
        let chosen = &children.get(self.default_index)?.platform;
        Some(format!(
            "Failed to find default, or user-specific platform ({unmatched}) of multi-platform \
             image {parent_image_name}; defaulting to the first platform type: {chosen}\n"
        ))
    }

    /// The listing of every child, marking the default one.
    #[must_use]
    pub fn summary(&self, parent_image_name: &str, children: &[Manifest]) -> String {
        let child_imgs: Vec<String> = children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                if i == self.default_index {
                    format!("{} (={parent_image_name})", child.image_name)
                } else {
                    child.image_name.clone()
                }
            })
            .collect();

        format!(
            "Image {parent_image_name} is a multi-platform image. \
             The following per-platform images have been produced:\n\t{}\n{NOTE_DETAIL}\n",
            child_imgs.join("\n\t")
        )
    }
}

/// Choose the child that represents `parent_image_name`.
///
/// # Errors
///
/// Returns [`BockError::NoPlatforms`] when `children` is empty.
pub fn resolve_default_platform(
    parent_image_name: &str,
    children: &[Manifest],
) -> BockResult<PlatformResolution> {
    if children.is_empty() {
        return Err(BockError::NoPlatforms {
            image: parent_image_name.to_string(),
        });
    }

    let position = |wanted: &Platform| children.iter().position(|c| &c.platform == wanted);

    let resolution = match position(&Platform::Default).or_else(|| position(&Platform::User)) {
        Some(default_index) => PlatformResolution {
            default_index,
            fallback: None,
        },
        None => PlatformResolution {
            default_index: 0,
            fallback: Some(Platform::User),
        },
    };
    Ok(resolution)
}

/// Present a multi-platform image in the local runtime.
///
/// Prints the per-platform listing and tags the default child with
/// `parent_image_name`.
///
/// # Errors
///
/// Returns [`BockError::NoPlatforms`] for an empty `children`, or the tag
/// failure wrapped as `docker tag default platform image`.
pub async fn load_docker_manifest(
    cancel: &CancellationToken,
    console: &dyn ConsoleLogger,
    frontend: &dyn ContainerFrontend,
    parent_image_name: &str,
    children: &[Manifest],
) -> BockResult<()> {
    let resolution = resolve_default_platform(parent_image_name, children)?;

    if let Some(warning) = resolution.warning(parent_image_name, children) {
        console.warn(format_args!("{warning}"));
    }
    console.print(format_args!(
        "{}",
        resolution.summary(parent_image_name, children)
    ));

    let default_child = &children[resolution.default_index];
    tracing::debug!(
        parent = parent_image_name,
        child = %default_child.image_name,
        platform = %default_child.platform,
        "Tagging default platform image"
    );

    frontend
        .image_tag(
            cancel,
            &ImageTag::new(&default_child.image_name, parent_image_name),
        )
        .await
        .context("docker tag default platform image")
}
