//! Runtime client that shells out to a docker-compatible CLI.

use std::process::{Output, Stdio};

use async_trait::async_trait;
use bock_common::{BockError, BockResult};
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::frontend::{ContainerFrontend, ImageTag};

/// Drives `docker`, `podman`, or any binary with the same image subcommands.
#[derive(Debug, Clone)]
pub struct ShellFrontend {
    /// Binary name or path.
    binary: String,
}

impl ShellFrontend {
    /// Create a frontend for `binary`.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The `docker` CLI.
    #[must_use]
    pub fn docker() -> Self {
        Self::new("docker")
    }

    /// The `podman` CLI.
    #[must_use]
    pub fn podman() -> Self {
        Self::new("podman")
    }

    /// The binary this frontend runs.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command(&self, args: &[&str], stdin: Stdio) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    async fn run(&self, cancel: &CancellationToken, args: &[&str]) -> BockResult<()> {
        let command_line = self.command_line(args);
        tracing::debug!(command = %command_line, "Running runtime command");

        let child = self.command(args, Stdio::null()).spawn()?;

        // Dropping the child on cancellation kills it.
        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(BockError::Cancelled),
            output = child.wait_with_output() => output?,
        };

        check_output(command_line, &output)
    }
}

fn check_output(command: String, output: &Output) -> BockResult<()> {
    if output.status.success() {
        return Ok(());
    }

    Err(BockError::CommandFailed {
        command,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[async_trait]
impl ContainerFrontend for ShellFrontend {
    async fn image_load(
        &self,
        cancel: &CancellationToken,
        archive: &mut (dyn AsyncRead + Send + Unpin),
    ) -> BockResult<()> {
        let args = ["load"];
        let command_line = self.command_line(&args);
        tracing::debug!(command = %command_line, "Running runtime command");

        let mut child = self.command(&args, Stdio::piped()).spawn()?;
        let mut stdin = child.stdin.take().ok_or_else(|| BockError::Internal {
            message: format!("no stdin handle for `{command_line}`"),
        })?;

        // Output is drained while the archive is fed, so a chatty runtime
        // cannot stall on a full pipe.
        let feed = async move {
            let copied = tokio::io::copy(archive, &mut stdin).await;
            // Close stdin so the runtime sees the end of the archive.
            drop(stdin);
            copied
        };
        let load = async { tokio::join!(feed, child.wait_with_output()) };

        let (copied, output) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(BockError::Cancelled),
            result = load => result,
        };

        // A runtime that rejects the archive exits early and breaks the pipe;
        // its exit status and stderr say more than the write error does.
        check_output(command_line, &output?)?;
        if let Err(err) = copied {
            tracing::debug!(error = %err, "Runtime stopped reading the archive");
            return Err(err.into());
        }
        Ok(())
    }

    async fn image_pull(&self, cancel: &CancellationToken, reference: &str) -> BockResult<()> {
        self.run(cancel, &["pull", reference]).await
    }

    async fn image_tag(&self, cancel: &CancellationToken, tag: &ImageTag) -> BockResult<()> {
        self.run(cancel, &["tag", &tag.source_ref, &tag.target_ref])
            .await
    }

    async fn image_remove(
        &self,
        cancel: &CancellationToken,
        force: bool,
        reference: &str,
    ) -> BockResult<()> {
        if force {
            self.run(cancel, &["rmi", "--force", reference]).await
        } else {
            self.run(cancel, &["rmi", reference]).await
        }
    }
}
