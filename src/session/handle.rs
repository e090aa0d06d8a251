//! Process handle and session state types
//!
//! This module defines the per-source state stored in the session registry.

use std::collections::BTreeSet;
use std::io;
use std::time::{Duration, Instant};

use tokio::process::Child;

use super::key::ViewerId;

/// State of a transcoding session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transcoder launched, manifest not yet observed
    Starting,
    /// Manifest observed, viewers can play
    Ready,
    /// Transcoder exited on its own, waiting for cleanup
    Exited,
}

/// One running transcoder and the viewers attached to it
pub struct ProcessHandle {
    /// Transcoder subprocess (None once killed)
    child: Option<Child>,

    /// OS process ID captured at launch
    pid: Option<u32>,

    /// Attached viewers
    viewers: BTreeSet<ViewerId>,

    /// Set once the starting join observed the manifest
    ready: bool,

    /// When the transcoder was launched
    pub started_at: Instant,
}

impl ProcessHandle {
    /// Create a handle owning `child` with `viewer` as its first viewer
    pub(super) fn new(child: Child, viewer: ViewerId) -> Self {
        Self {
            pid: child.id(),
            child: Some(child),
            viewers: BTreeSet::from([viewer]),
            ready: false,
            started_at: Instant::now(),
        }
    }

    /// Check whether the transcoder is still running
    ///
    /// Reaps the process if it has exited.
    pub(super) fn is_alive(&mut self) -> bool {
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                tracing::debug!(pid = ?self.pid, %status, "Transcoder exited");
                false
            }
            Some(Err(e)) => {
                tracing::warn!(pid = ?self.pid, error = %e, "Failed to poll transcoder");
                false
            }
            None => false,
        }
    }

    /// Add a viewer; returns false if it was already attached
    pub(super) fn attach(&mut self, viewer: ViewerId) -> bool {
        self.viewers.insert(viewer)
    }

    /// Remove a viewer; returns false if it was not attached
    pub(super) fn detach(&mut self, viewer: &ViewerId) -> bool {
        self.viewers.remove(viewer)
    }

    /// Drop every viewer, returning the ones that were attached
    pub(super) fn take_viewers(&mut self) -> BTreeSet<ViewerId> {
        std::mem::take(&mut self.viewers)
    }

    /// Force-kill the transcoder and reap it
    ///
    /// A process that already exited is not an error.
    pub(super) async fn kill(&mut self) -> io::Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };

        if child.try_wait()?.is_none() {
            child.kill().await?;
        }

        self.child = None;
        Ok(())
    }

    pub(super) fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Attached viewers in sorted order
    pub fn viewers(&self) -> impl Iterator<Item = &ViewerId> {
        self.viewers.iter()
    }

    pub fn has_viewer(&self, viewer: &ViewerId) -> bool {
        self.viewers.contains(viewer)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// OS process ID of the transcoder
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Snapshot this handle's statistics
    pub(super) fn stats(&mut self) -> SessionStats {
        let state = if !self.is_alive() {
            SessionState::Exited
        } else if self.is_ready() {
            SessionState::Ready
        } else {
            SessionState::Starting
        };

        SessionStats {
            viewers: self.viewers().cloned().collect(),
            pid: self.pid,
            state,
            uptime: self.started_at.elapsed(),
        }
    }
}

/// Statistics for a session
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Attached viewers, sorted
    pub viewers: Vec<ViewerId>,
    /// Transcoder process ID
    pub pid: Option<u32>,
    /// Current session state
    pub state: SessionState,
    /// Time since the transcoder was launched
    pub uptime: Duration,
}

impl SessionStats {
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }
}
