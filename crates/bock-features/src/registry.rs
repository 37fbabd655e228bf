//! The feature flag registry.
//!
//! Each feature is declared exactly once in the table below. The declaration
//! produces the [`Feature`] enum, the matching boolean field on
//! [`FeatureSet`], the flag name, and the release that enables it by default,
//! so a renamed or missing toggle is a compile error rather than a failed
//! lookup at run time.

use serde::{Deserialize, Serialize};

use crate::version::Version;

macro_rules! feature_registry {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $field:ident, $name:literal, $release:expr;
        )*
    ) => {
        /// A recognized feature flag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Feature {
            $(
                $(#[$meta])*
                $variant,
            )*
        }

        impl Feature {
            /// Every feature, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// The flag name, as written after `--` in a `VERSION` directive.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// The release that turns this feature on by default.
            ///
            /// `None` for features that are still opt-in only.
            #[must_use]
            pub const fn release(self) -> Option<Version> {
                match self {
                    $(Self::$variant => $release,)*
                }
            }
        }

        /// A declared compatibility version plus one toggle per [`Feature`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct FeatureSet {
            /// Declared major version.
            pub major: u32,
            /// Declared minor version.
            pub minor: u32,
            $(
                $(#[$meta])*
                #[serde(rename = $name, default)]
                pub $field: bool,
            )*
        }

        impl FeatureSet {
            /// Whether `feature` is on.
            #[must_use]
            pub const fn is_enabled(&self, feature: Feature) -> bool {
                match feature {
                    $(Feature::$variant => self.$field,)*
                }
            }

            pub(crate) fn toggle_mut(&mut self, feature: Feature) -> &mut bool {
                match feature {
                    $(Feature::$variant => &mut self.$field,)*
                }
            }
        }
    };
}

const V0_5: Option<Version> = Some(Version::new(0, 5));
const V0_6: Option<Version> = Some(Version::new(0, 6));
const V0_7: Option<Version> = Some(Version::new(0, 7));
const UNRELEASED: Option<Version> = None;

feature_registry! {
    // 0.5
    /// Force execution after parallel conversion.
    ExecAfterParallel => exec_after_parallel, "exec-after-parallel", V0_5;
    /// Load images into WITH DOCKER in parallel.
    ParallelLoad => parallel_load, "parallel-load", V0_5;
    /// Use the embedded registry for WITH DOCKER load operations.
    UseRegistryForWithDocker => use_registry_for_with_docker, "use-registry-for-with-docker", V0_5;

    // 0.6
    /// Enable the FOR ... IN ... command.
    ForIn => for_in, "for-in", V0_6;
    /// Disable the implicit ignore rules for the build context.
    NoImplicitIgnore => no_implicit_ignore, "no-implicit-ignore", V0_6;
    /// Only save images referenced by the target being built.
    ReferencedSaveOnly => referenced_save_only, "referenced-save-only", V0_6;
    /// Require --force for saves outside the build context.
    RequireForceForUnsafeSaves => require_force_for_unsafe_saves, "require-force-for-unsafe-saves", V0_6;
    /// Use include patterns when copying from the context.
    UseCopyIncludePatterns => use_copy_include_patterns, "use-copy-include-patterns", V0_6;

    // 0.7
    /// Fail when two targets save the same image name.
    CheckDuplicateImages => check_duplicate_images, "check-duplicate-images", V0_7;
    /// Expose the CI build arg.
    EarthlyCiArg => earthly_ci_arg, "ci-arg", V0_7;
    /// Expose git author build args.
    EarthlyGitAuthorArgs => earthly_git_author_args, "earthly-git-author-args", V0_7;
    /// Expose the LOCALLY build arg.
    EarthlyLocallyArg => earthly_locally_arg, "earthly-locally-arg", V0_7;
    /// Expose the tool version build args.
    EarthlyVersionArg => earthly_version_arg, "earthly-version-arg", V0_7;
    /// Require global args to be declared explicitly.
    ExplicitGlobal => explicit_global, "explicit-global", V0_7;
    /// Expose the git commit author timestamp.
    GitCommitAuthorTimestamp => git_commit_author_timestamp, "git-commit-author-timestamp", V0_7;
    /// Use the new platform handling.
    NewPlatform => new_platform, "new-platform", V0_7;
    /// Do not emit tar build outputs.
    NoTarBuildOutput => no_tar_build_output, "no-tar-build-output", V0_7;
    /// Keep ownership when saving artifacts.
    SaveArtifactKeepOwn => save_artifact_keep_own, "save-artifact-keep-own", V0_7;
    /// Allow shell-out expressions anywhere.
    ShellOutAnywhere => shell_out_anywhere, "shell-out-anywhere", V0_7;
    /// Enable the CACHE command.
    UseCacheCommand => use_cache_command, "use-cache-command", V0_7;
    /// Enable COPY --chmod.
    UseChmod => use_chmod, "use-chmod", V0_7;
    /// Enable COPY --link.
    UseCopyLink => use_copy_link, "use-copy-link", V0_7;
    /// Enable the HOST command.
    UseHostCommand => use_host_command, "use-host-command", V0_7;
    /// Allow multi-platform images to skip manifest-list presentation.
    UseNoManifestList => use_no_manifest_list, "use-no-manifest-list", V0_7;
    /// Enable PIPELINE and TRIGGER.
    UsePipelines => use_pipelines, "use-pipelines", V0_7;
    /// Enable project-scoped secrets.
    UseProjectSecrets => use_project_secrets, "use-project-secrets", V0_7;
    /// Enable WAIT blocks.
    WaitBlock => wait_block, "wait-block", V0_7;

    // unreleased
    /// Turn off use-registry-for-with-docker even when the version implies it.
    NoUseRegistryForWithDocker => no_use_registry_for_with_docker, "no-use-registry-for-with-docker", UNRELEASED;
    /// Enable TRY/FINALLY blocks.
    TryFinally => try_finally, "try", UNRELEASED;
    /// Scope SET to the current argument scope.
    ArgScopeSet => arg_scope_set, "arg-scope-set", UNRELEASED;
}

impl Feature {
    /// Look up a feature by its flag name (without the leading `--`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
