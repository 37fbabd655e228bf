//! Test doubles for the runtime client and console.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bock_common::{BockError, BockResult};
use bock_export::{ConsoleLogger, ContainerFrontend, ImageTag};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Runtime operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Load,
    Pull,
    Tag,
    Remove,
}

/// A recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(Vec<u8>),
    Pull(String),
    Tag(ImageTag),
    Remove { force: bool, reference: String },
}

impl Call {
    /// The reference the call acted on (the source for tags).
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Load(_) => None,
            Self::Pull(r) | Self::Remove { reference: r, .. } => Some(r),
            Self::Tag(tag) => Some(&tag.source_ref),
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    images: BTreeSet<String>,
}

/// In-memory runtime that records calls and keeps a set of image names.
#[derive(Default)]
pub struct FakeFrontend {
    state: Mutex<State>,
    failures: HashMap<(Op, String), &'static str>,
    pull_delays: HashMap<String, Duration>,
    respect_cancel: bool,
}

impl FakeFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `name` present in the runtime.
    pub fn with_image(self, name: &str) -> Self {
        self.state.lock().unwrap().images.insert(name.to_string());
        self
    }

    /// Make `op` on `reference` fail with `stderr`.
    pub fn fail_on(mut self, op: Op, reference: &str, stderr: &'static str) -> Self {
        self.failures.insert((op, reference.to_string()), stderr);
        self
    }

    /// Make pulls of `reference` take `delay`.
    pub fn delay_pull(mut self, reference: &str, delay: Duration) -> Self {
        self.pull_delays.insert(reference.to_string(), delay);
        self
    }

    /// Fail calls made after the token fired.
    pub fn respect_cancel(mut self) -> Self {
        self.respect_cancel = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, reference: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.reference() == Some(reference))
            .collect()
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.state.lock().unwrap().images.contains(name)
    }

    fn check(&self, cancel: &CancellationToken, op: Op, reference: &str) -> BockResult<()> {
        if self.respect_cancel && cancel.is_cancelled() {
            return Err(BockError::Cancelled);
        }
        match self.failures.get(&(op, reference.to_string())) {
            Some(stderr) => Err(BockError::CommandFailed {
                command: format!("fake {op:?} {reference}"),
                status: "exit status: 1".to_string(),
                stderr: (*stderr).to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerFrontend for FakeFrontend {
    async fn image_load(
        &self,
        cancel: &CancellationToken,
        archive: &mut (dyn AsyncRead + Send + Unpin),
    ) -> BockResult<()> {
        let mut data = Vec::new();
        archive.read_to_end(&mut data).await?;

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Load(data));
        self.check(cancel, Op::Load, "")?;
        state.images.insert("loaded".to_string());
        Ok(())
    }

    async fn image_pull(&self, cancel: &CancellationToken, reference: &str) -> BockResult<()> {
        if let Some(delay) = self.pull_delays.get(reference) {
            tokio::time::sleep(*delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Pull(reference.to_string()));
        self.check(cancel, Op::Pull, reference)?;
        state.images.insert(reference.to_string());
        Ok(())
    }

    async fn image_tag(&self, cancel: &CancellationToken, tag: &ImageTag) -> BockResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Tag(tag.clone()));
        self.check(cancel, Op::Tag, &tag.source_ref)?;
        if !state.images.contains(&tag.source_ref) {
            return Err(BockError::CommandFailed {
                command: format!("fake tag {}", tag.source_ref),
                status: "exit status: 1".to_string(),
                stderr: "No such image".to_string(),
            });
        }
        state.images.insert(tag.target_ref.clone());
        Ok(())
    }

    async fn image_remove(
        &self,
        cancel: &CancellationToken,
        force: bool,
        reference: &str,
    ) -> BockResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Remove {
            force,
            reference: reference.to_string(),
        });
        self.check(cancel, Op::Remove, reference)?;
        if !state.images.remove(reference) && !force {
            return Err(BockError::CommandFailed {
                command: format!("fake rmi {reference}"),
                status: "exit status: 1".to_string(),
                stderr: "No such image".to_string(),
            });
        }
        Ok(())
    }
}

/// Console output kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warn,
    Print,
}

/// Console that keeps every message.
#[derive(Default)]
pub struct RecordingConsole {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingConsole {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl ConsoleLogger for RecordingConsole {
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.messages
            .lock()
            .unwrap()
            .push((Level::Warn, args.to_string()));
    }

    fn print(&self, args: fmt::Arguments<'_>) {
        self.messages
            .lock()
            .unwrap()
            .push((Level::Print, args.to_string()));
    }
}
