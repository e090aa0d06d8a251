//! On-demand camera-to-HLS transcoding
//!
//! `hls-relay` runs one `ffmpeg` process per watched camera, converting its
//! RTSP feed into an HLS playlist that any number of viewers can play. The
//! process starts when the first viewer joins and is killed, with its
//! segments deleted, when the last viewer leaves. Each viewer watches at most
//! one camera at a time.
//!
//! # Example
//!
//! ```no_run
//! use hls_relay::{SessionConfig, SessionManager, StreamSource, ViewerId};
//! use hls_relay::launcher::FfmpegLauncher;
//!
//! # async fn run() -> hls_relay::Result<()> {
//! let manager = SessionManager::with_launcher(
//!     SessionConfig::with_root("./streams"),
//!     FfmpegLauncher::default(),
//! );
//!
//! let camera = StreamSource::new(7u64, "rtsp://10.0.0.7/stream");
//! let alice = ViewerId::from("alice");
//!
//! manager.join(&camera, &alice).await?;
//! println!("playlist at {}", manager.manifest_path(camera.id).display());
//!
//! manager.leave(camera.id, &alice).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod launcher;
pub mod service;
pub mod session;

pub use error::{Error, Result};
pub use launcher::{FfmpegLauncher, Launcher, TranscodeProfile};
pub use service::{ServiceError, StreamService};
pub use session::{
    JoinOutcome, SessionConfig, SessionError, SessionManager, SourceId, StreamSource, ViewerId,
};
