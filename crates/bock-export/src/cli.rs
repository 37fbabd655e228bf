//! Bock export CLI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bock_features::{Feature, FeatureSet};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio_util::sync::CancellationToken;

use crate::config::ExportConfig;
use crate::console::TerminalConsole;
use crate::exporter::Exporter;
use crate::manifest::Manifest;
use crate::platform::Platform;
use crate::pull::PullMap;
use crate::shell::ShellFrontend;

/// Bock Export - Multi-platform image export into the local container runtime
#[derive(Parser)]
#[command(name = "bock-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (default: $BOCK_EXPORT_CONFIG or <config dir>/bock/export.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Bock export commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved feature set of a build script
    Features {
        /// Build script whose VERSION directive is used
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extra feature flags (comma-separated)
        #[arg(long)]
        flags: Option<String>,

        /// Format output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the recognized feature flags by release
    Flags,

    /// Load an image archive into the runtime
    Load {
        /// Path to the image tar
        archive: PathBuf,
    },

    /// Move images from the embedded registry into the runtime
    PullLocal {
        /// Embedded registry address (default: from config)
        #[arg(long)]
        registry: Option<String>,

        /// Images to move (PULL_NAME=FINAL_NAME)
        #[arg(required = true)]
        images: Vec<String>,
    },

    /// Tag the default per-platform image of a multi-platform image
    Publish {
        /// Multi-platform image name
        parent: String,

        /// Per-platform images (IMAGE=PLATFORM)
        #[arg(required = true)]
        children: Vec<String>,

        /// Build script whose VERSION directive is used
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extra feature flags (comma-separated)
        #[arg(long)]
        flags: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = ExportConfig::load(self.config.as_deref())?;
        let cancel = CancellationToken::new();
        cancel_on_ctrl_c(cancel.clone());

        match self.command {
            Commands::Features { file, flags, json } => {
                let features = load_features(&config, file.as_deref(), flags.as_deref())?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&features)?);
                } else {
                    println!("{features}");
                }
                Ok(())
            }

            Commands::Flags => {
                let mut groups: BTreeMap<_, Vec<Feature>> = BTreeMap::new();
                for &feature in Feature::ALL {
                    groups.entry(feature.release()).or_default().push(feature);
                }

                // Unreleased (None) sorts first in the map but is listed last.
                for (release, features) in &groups {
                    if let Some(release) = release {
                        print_group(&format!("VERSION {release}"), features);
                    }
                }
                if let Some(features) = groups.get(&None) {
                    print_group("unreleased", features);
                }
                Ok(())
            }

            Commands::Load { archive } => {
                tracing::info!(archive = %archive.display(), "Loading image archive");

                let mut file = tokio::fs::File::open(&archive)
                    .await
                    .wrap_err_with(|| format!("opening {}", archive.display()))?;
                let exporter = build_exporter(&config, FeatureSet::default());
                exporter.load_tar(&cancel, &mut file).await?;

                println!("Loaded {}", archive.display());
                Ok(())
            }

            Commands::PullLocal { registry, images } => {
                let registry = registry
                    .or_else(|| config.local_registry.clone())
                    .ok_or_else(|| eyre!("No registry address given and none configured"))?;

                let pull_map = parse_pull_map(&images)?;

                let exporter = build_exporter(&config, FeatureSet::default());
                exporter.pull_local_images(&cancel, &registry, &pull_map).await?;

                for final_name in pull_map.values() {
                    println!("Loaded {final_name}");
                }
                Ok(())
            }

            Commands::Publish {
                parent,
                children,
                file,
                flags,
            } => {
                let features = load_features(&config, file.as_deref(), flags.as_deref())?;

                let children = children
                    .iter()
                    .map(|pair| -> Result<Manifest> {
                        let (image, platform) = split_pair(pair, "IMAGE=PLATFORM")?;
                        Ok(Manifest::new(image, Platform::parse(platform)?))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let exporter = build_exporter(&config, features);
                let published = exporter
                    .publish_multi_platform(&cancel, &parent, &children)
                    .await?;

                if !published {
                    println!("{parent}: use-no-manifest-list is set, per-platform images left as-is");
                }
                Ok(())
            }
        }
    }
}

fn build_exporter(config: &ExportConfig, features: FeatureSet) -> Exporter {
    Exporter::new(
        Arc::new(ShellFrontend::new(&config.frontend)),
        Arc::new(TerminalConsole::new()),
        features,
    )
}

/// Resolve the feature set from an optional build script plus config and
/// command-line overrides.
fn load_features(
    config: &ExportConfig,
    file: Option<&Path>,
    flags: Option<&str>,
) -> Result<FeatureSet> {
    let script = match file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?,
        None => format!("VERSION {}", FeatureSet::DEFAULT_VERSION),
    };

    let overrides = [config.feature_overrides.as_deref(), flags]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(",");

    Ok(FeatureSet::from_script(&script, &overrides)?)
}

fn split_pair<'a>(pair: &'a str, expected: &str) -> Result<(&'a str, &'a str)> {
    pair.split_once('=')
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .ok_or_else(|| eyre!("Invalid argument '{pair}'. Expected {expected}"))
}

/// Build the pull map, rejecting a pull name given twice.
fn parse_pull_map(images: &[String]) -> Result<PullMap> {
    let mut pull_map = PullMap::new();
    for pair in images {
        let (pull, fin) = split_pair(pair, "PULL_NAME=FINAL_NAME")?;
        if let Some(previous) = pull_map.insert(pull.to_string(), fin.to_string()) {
            return Err(eyre!(
                "Duplicate pull name '{pull}' (targets '{previous}' and '{fin}')"
            ));
        }
    }
    Ok(pull_map)
}

fn print_group(title: &str, features: &[Feature]) {
    println!("{title}:");
    for feature in features {
        println!("  --{feature}");
    }
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling runtime operations");
            cancel.cancel();
        }
    });
}
