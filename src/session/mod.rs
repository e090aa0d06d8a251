//! Transcoding session management
//!
//! The session manager runs at most one transcoder per camera and tracks
//! which viewers are watching it. A viewer watches at most one camera at a
//! time; joining another camera detaches it from the previous one.
//!
//! # Architecture
//!
//! ```text
//!                         SessionManager
//!              ┌──────────────────────────────────────┐
//!              │ RwLock<Tables> (registry lock)       │
//!              │  ┌────────────────────────────────┐  │
//!              │  │ sessions: HashMap<SourceId,    │  │
//!              │  │   Arc<Mutex<ProcessHandle {    │  │  (session lock)
//!              │  │     child, viewers }>>>        │  │
//!              │  │ viewers: ViewerIndex           │  │
//!              │  │   ViewerId -> SourceId         │  │
//!              │  └────────────────────────────────┘  │
//!              └──────────────┬───────────────────────┘
//!                             │
//!        join() ──────────────┼───────────────── leave()
//!          │                  │                    │
//!          ▼                  ▼                    ▼
//!   Launcher::launch()  streams/camera_<ID>/   kill + remove_dir_all
//!                        index.m3u8, *.ts
//! ```
//!
//! # Locking
//!
//! The registry lock is always acquired before a session lock. The manifest
//! wait after a launch runs with no lock held, so other viewers can join the
//! starting session (they return immediately) or operate on other sessions.

pub mod config;
pub mod error;
pub mod handle;
pub mod index;
pub mod key;
pub mod manager;

pub use config::SessionConfig;
pub use error::{ErrorKind, SessionError};
pub use handle::{ProcessHandle, SessionState, SessionStats};
pub use index::ViewerIndex;
pub use key::{SourceId, StreamSource, ViewerId, MANIFEST_FILE};
pub use manager::{JoinOutcome, SessionManager};
