//! Session manager implementation
//!
//! The central manager that owns every transcoding session and the viewers
//! attached to them.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::launcher::{wait_for_manifest, FfmpegLauncher, Launcher};

use super::config::{SessionConfig, MIN_INTERVAL};
use super::error::SessionError;
use super::handle::{ProcessHandle, SessionStats};
use super::index::ViewerIndex;
use super::key::{SourceId, StreamSource, ViewerId, MANIFEST_FILE};

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A transcoder was launched and its manifest observed
    Started,
    /// The viewer was attached to an already running transcoder
    Joined,
}

/// State guarded by the registry-level lock
#[derive(Default)]
struct Tables {
    sessions: HashMap<SourceId, Arc<Mutex<ProcessHandle>>>,
    viewers: ViewerIndex,
}

/// Owner of all transcoding sessions
///
/// Lock order: the registry lock (`tables`) is always taken before a
/// session's own lock, and no session lock is held while waiting on the
/// registry lock.
pub struct SessionManager<L = FfmpegLauncher> {
    tables: RwLock<Tables>,
    launcher: L,
    config: SessionConfig,
}

impl SessionManager<FfmpegLauncher> {
    /// Create a manager launching `ffmpeg` with default configuration
    pub fn new() -> Self {
        Self::with_launcher(SessionConfig::default(), FfmpegLauncher::default())
    }
}

impl Default for SessionManager<FfmpegLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> SessionManager<L> {
    /// Create a manager with custom configuration and launcher
    pub fn with_launcher(config: SessionConfig, launcher: L) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            launcher,
            config,
        }
    }

    /// Get the manager configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Manifest path served to players for `source`
    pub fn manifest_path(&self, source: SourceId) -> PathBuf {
        source.manifest_path(&self.config.streams_root)
    }

    /// Attach `viewer` to the session for `source`, starting it if needed
    ///
    /// A viewer watching a different source is detached from it first. When
    /// this call launches the transcoder it returns once the manifest exists;
    /// joining a running session returns immediately.
    ///
    /// The manifest wait is not cancelled by a concurrent `leave`. If the
    /// session is torn down while this call waits, it ends with
    /// [`SessionError::ReadinessTimeout`] and nothing stays registered.
    pub async fn join(
        &self,
        source: &StreamSource,
        viewer: &ViewerId,
    ) -> Result<JoinOutcome, SessionError> {
        let mut tables = loop {
            let tables = self.tables.write().await;
            let previous = tables.viewers.other_source(viewer, source.id);
            match previous {
                None => break tables,
                Some(previous) => {
                    drop(tables);
                    self.leave_previous(previous, viewer).await;
                }
            }
        };

        if let Some(existing) = tables.sessions.get(&source.id).cloned() {
            let mut handle = existing.lock().await;

            if handle.is_alive() {
                let added = handle.attach(viewer.clone());
                tables.viewers.attach(viewer.clone(), source.id);

                if added {
                    tracing::info!(
                        source = %source.id,
                        viewer = %viewer,
                        viewers = handle.viewer_count(),
                        "Viewer joined running session"
                    );
                } else {
                    tracing::debug!(
                        source = %source.id,
                        viewer = %viewer,
                        "Viewer already attached"
                    );
                }
                return Ok(JoinOutcome::Joined);
            }

            let stale = handle.take_viewers();
            drop(handle);
            for stale_viewer in &stale {
                tables.viewers.detach(stale_viewer, source.id);
            }
            tables.sessions.remove(&source.id);

            tracing::warn!(
                source = %source.id,
                dropped_viewers = stale.len(),
                "Transcoder exited, restarting session"
            );
        }

        let dir = source.id.session_dir(&self.config.streams_root);
        let manifest = dir.join(MANIFEST_FILE);

        let launched = match prepare_session_dir(&dir).await {
            Ok(()) => self.launcher.launch(source, &manifest),
            Err(error) => Err(error),
        };
        let child = match launched {
            Ok(child) => child,
            Err(error) => {
                if let Err(e) = remove_session_dir(&dir).await {
                    tracing::warn!(source = %source.id, error = %e, "Failed to clean up after launch failure");
                }
                tracing::error!(source = %source.id, error = %error, "Failed to launch transcoder");
                return Err(SessionError::Launch {
                    source_id: source.id,
                    error,
                });
            }
        };

        let handle = Arc::new(Mutex::new(ProcessHandle::new(child, viewer.clone())));
        tables.sessions.insert(source.id, Arc::clone(&handle));
        tables.viewers.attach(viewer.clone(), source.id);
        drop(tables);

        tracing::info!(
            source = %source.id,
            viewer = %viewer,
            manifest = %manifest.display(),
            "Transcoder started, waiting for manifest"
        );

        let ready = wait_for_manifest(
            &manifest,
            self.config.ready_poll_interval,
            self.config.ready_poll_attempts,
        )
        .await;

        if !ready {
            tracing::warn!(
                source = %source.id,
                manifest = %manifest.display(),
                "Manifest did not appear in time"
            );
            return Err(SessionError::ReadinessTimeout {
                source_id: source.id,
                manifest,
                waited: self.config.ready_timeout(),
            });
        }

        handle.lock().await.mark_ready();
        tracing::info!(source = %source.id, "Session ready");
        Ok(JoinOutcome::Started)
    }

    /// Detach `viewer` from `source`, tearing the session down if it was the last viewer
    pub async fn leave(&self, source: SourceId, viewer: &ViewerId) -> Result<(), SessionError> {
        let mut tables = self.tables.write().await;

        let existing = tables
            .sessions
            .get(&source)
            .cloned()
            .ok_or(SessionError::SessionNotActive(source))?;
        let mut handle = existing.lock().await;

        if !handle.detach(viewer) {
            return Err(SessionError::ViewerNotAttached {
                source_id: source,
                viewer: viewer.clone(),
            });
        }
        tables.viewers.detach(viewer, source);

        if handle.viewer_count() > 0 {
            tracing::info!(
                source = %source,
                viewer = %viewer,
                viewers = handle.viewer_count(),
                "Viewer left session"
            );
            return Ok(());
        }

        tracing::info!(
            source = %source,
            viewer = %viewer,
            pid = ?handle.pid(),
            "Last viewer left, stopping transcoder"
        );

        if let Err(error) = handle.kill().await {
            tracing::error!(source = %source, error = %error, "Failed to kill transcoder");
            return Err(SessionError::Kill {
                source_id: source,
                error,
            });
        }
        drop(handle);
        tables.sessions.remove(&source);

        let dir = source.session_dir(&self.config.streams_root);
        remove_session_dir(&dir)
            .await
            .map_err(|error| SessionError::Teardown {
                source_id: source,
                dir,
                error,
            })
    }

    /// Forced leave while a viewer switches sources
    ///
    /// Never fails: by the time `leave` reports an error the viewer has been
    /// detached, or the previous session is already gone.
    async fn leave_previous(&self, previous: SourceId, viewer: &ViewerId) {
        match self.leave(previous, viewer).await {
            Ok(()) => {
                tracing::info!(source = %previous, viewer = %viewer, "Viewer switched away from session");
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(source = %previous, viewer = %viewer, "Previous session already gone");
                self.tables.write().await.viewers.detach(viewer, previous);
            }
            Err(e) => {
                tracing::warn!(source = %previous, viewer = %viewer, error = %e, "Previous session teardown failed");
            }
        }
    }

    /// Source the viewer currently watches
    pub async fn viewer_source(&self, viewer: &ViewerId) -> Option<SourceId> {
        self.tables.read().await.viewers.source_of(viewer)
    }

    /// Get session statistics
    pub async fn session_stats(&self, source: SourceId) -> Option<SessionStats> {
        let tables = self.tables.read().await;
        let existing = tables.sessions.get(&source)?;
        let mut handle = existing.lock().await;
        Some(handle.stats())
    }

    /// Number of registered sessions
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    /// Number of attached viewers across all sessions
    pub async fn viewer_count(&self) -> usize {
        self.tables.read().await.viewers.len()
    }

    /// Run the reaper once
    ///
    /// Removes sessions whose transcoder exited on its own and sessions left
    /// without viewers after a failed kill. Returns how many were removed.
    pub async fn reap_exited(&self) -> usize {
        let mut tables = self.tables.write().await;

        let mut dead = Vec::new();
        for (source, existing) in &tables.sessions {
            // Skip sessions whose lock is busy; the next run picks them up
            if let Ok(mut handle) = existing.try_lock() {
                if !handle.is_alive() || handle.viewer_count() == 0 {
                    dead.push(*source);
                }
            }
        }

        for source in &dead {
            let Some(existing) = tables.sessions.remove(source) else {
                continue;
            };
            let mut handle = existing.lock().await;
            for viewer in handle.take_viewers() {
                tables.viewers.detach(&viewer, *source);
            }
            if let Err(e) = handle.kill().await {
                tracing::warn!(source = %source, error = %e, "Failed to kill transcoder");
            }
            drop(handle);

            let dir = source.session_dir(&self.config.streams_root);
            if let Err(e) = remove_session_dir(&dir).await {
                tracing::warn!(source = %source, error = %e, "Failed to remove session directory");
            }
            tracing::info!(source = %source, "Session removed by reaper");
        }

        dead.len()
    }

    /// Kill every transcoder and remove all session state
    ///
    /// Returns the number of sessions torn down.
    pub async fn shutdown(&self) -> usize {
        let mut tables = self.tables.write().await;
        let sessions: Vec<_> = tables.sessions.drain().collect();
        tables.viewers.clear();

        for (source, existing) in &sessions {
            let mut handle = existing.lock().await;
            if let Err(e) = handle.kill().await {
                tracing::warn!(source = %source, error = %e, "Failed to kill transcoder");
            }
            let dir = source.session_dir(&self.config.streams_root);
            if let Err(e) = remove_session_dir(&dir).await {
                tracing::warn!(source = %source, error = %e, "Failed to remove session directory");
            }
        }

        tracing::info!(sessions = sessions.len(), "Session manager shut down");
        sessions.len()
    }

    /// Spawn background reaper task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_reaper_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = manager.config.reap_interval.max(MIN_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                manager.reap_exited().await;
            }
        })
    }
}

/// Create an empty working directory, discarding output from a previous run
async fn prepare_session_dir(dir: &Path) -> io::Result<()> {
    remove_session_dir(dir).await?;
    tokio::fs::create_dir_all(dir).await
}

/// Recursively delete a working directory; a missing directory is fine
async fn remove_session_dir(dir: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
