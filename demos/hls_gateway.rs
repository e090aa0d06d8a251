//! HLS gateway example
//!
//! Run with: cargo run --example hls_gateway <CAMERA_ID>=<RTSP_URL>... [--viewer NAME] [--root DIR]
//!
//! Examples:
//!   cargo run --example hls_gateway 7=rtsp://10.0.0.7/stream
//!   cargo run --example hls_gateway 1=rtsp://cam1/live 2=rtsp://cam2/live --viewer bob
//!
//! The first camera is started for the viewer. Serve the streams directory
//! with any static file server and open the printed playlist in a player:
//!
//!   ffplay ./streams/camera_7/index.m3u8
//!
//! Ctrl-C kills the transcoder and deletes its segments.

use std::sync::Arc;

use hls_relay::service::{Plaintext, SourceRecord, StaticAccess, StaticSources};
use hls_relay::{
    Error, FfmpegLauncher, Result, SessionConfig, SessionManager, SourceId, StreamService,
    TranscodeProfile, ViewerId,
};

struct Args {
    cameras: Vec<(SourceId, String)>,
    viewer: ViewerId,
    root: String,
}

fn parse_args() -> Result<Args> {
    let mut cameras = Vec::new();
    let mut viewer = ViewerId::from("demo");
    let mut root = "./streams".to_string();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--viewer" => {
                let name = args
                    .next()
                    .ok_or_else(|| Error::Config("--viewer needs a value".into()))?;
                viewer = ViewerId::from(name);
            }
            "--root" => {
                root = args
                    .next()
                    .ok_or_else(|| Error::Config("--root needs a value".into()))?;
            }
            camera => {
                let (id, url) = camera
                    .split_once('=')
                    .ok_or_else(|| Error::Config(format!("expected ID=URL, got {:?}", camera)))?;
                let id = hls_relay::service::parse_source_id(id)?;
                cameras.push((id, url.to_string()));
            }
        }
    }

    if cameras.is_empty() {
        return Err(Error::Config(
            "usage: hls_gateway <ID>=<RTSP_URL>... [--viewer NAME] [--root DIR]".into(),
        ));
    }

    Ok(Args {
        cameras,
        viewer,
        root,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let directive = "hls_relay=info"
        .parse()
        .map_err(|e| Error::Config(format!("{}", e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let args = parse_args()?;

    let mut sources = StaticSources::new();
    for (id, url) in &args.cameras {
        sources.insert(SourceRecord::new(
            *id,
            format!("Camera {}", id),
            format!("camera {}", id),
            url.clone(),
        ));
    }

    let config = SessionConfig::with_root(&args.root);
    let launcher = FfmpegLauncher::new(TranscodeProfile::default());
    let manager = Arc::new(SessionManager::with_launcher(config, launcher));
    let reaper = manager.spawn_reaper_task();

    let service = StreamService::new(
        Arc::clone(&manager),
        sources,
        StaticAccess::allow_all(),
        Plaintext,
    );

    let first = args.cameras[0].0;
    match service.start(first, &args.viewer).await {
        Ok(response) => {
            println!("{}", response.message);
            println!("Playlist: {}", manager.manifest_path(first).display());
        }
        Err(e) => {
            eprintln!("[{}] {}", e.status_code(), e);
        }
    }

    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");

    reaper.abort();
    let stopped = manager.shutdown().await;
    println!("Stopped {} session(s)", stopped);

    Ok(())
}
