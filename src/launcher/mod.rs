//! Transcoder process launching
//!
//! A [`Launcher`] starts one transcoder subprocess per session. The process
//! reads the upstream feed and writes an HLS playlist (`index.m3u8`) plus
//! rotating segments into the session's working directory. Launching never
//! blocks on the process; readiness is observed separately by polling for the
//! manifest (see [`wait_for_manifest`]).
//!
//! ```text
//!   join() ──► Launcher::launch() ──► ffmpeg -i <url> ... camera_<ID>/index.m3u8
//!      │                                         │
//!      └──► wait_for_manifest() ◄── poll ────────┘
//! ```

pub mod profile;
pub mod readiness;

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::session::StreamSource;

pub use profile::TranscodeProfile;
pub use readiness::wait_for_manifest;

/// Starts transcoder subprocesses
///
/// Implementations must return as soon as the process is spawned. An error
/// means no process was left running.
pub trait Launcher: Send + Sync + 'static {
    /// Spawn a transcoder reading `source` and writing its playlist to `manifest`
    fn launch(&self, source: &StreamSource, manifest: &Path) -> io::Result<Child>;
}

impl<F> Launcher for F
where
    F: Fn(&StreamSource, &Path) -> io::Result<Child> + Send + Sync + 'static,
{
    fn launch(&self, source: &StreamSource, manifest: &Path) -> io::Result<Child> {
        self(source, manifest)
    }
}

/// Launches `ffmpeg` with a fixed [`TranscodeProfile`]
#[derive(Debug, Clone, Default)]
pub struct FfmpegLauncher {
    profile: TranscodeProfile,
}

impl FfmpegLauncher {
    /// Create a launcher with the given profile
    pub fn new(profile: TranscodeProfile) -> Self {
        Self { profile }
    }

    /// Get the transcoding profile
    pub fn profile(&self) -> &TranscodeProfile {
        &self.profile
    }
}

impl Launcher for FfmpegLauncher {
    fn launch(&self, source: &StreamSource, manifest: &Path) -> io::Result<Child> {
        let child = Command::new(&self.profile.program)
            .args(self.profile.args(&source.playback_url, manifest))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        tracing::debug!(
            source = %source.id,
            pid = ?child.id(),
            program = %self.profile.program.display(),
            "Transcoder spawned"
        );

        Ok(child)
    }
}
