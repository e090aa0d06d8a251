//! Transcoding profile
//!
//! Fixed encoding and HLS segmentation parameters passed to the transcoder.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Encoding and segmentation parameters for the transcoder command line
#[derive(Debug, Clone)]
pub struct TranscodeProfile {
    /// Transcoder executable
    pub program: PathBuf,

    /// Video codec (`-c:v`)
    pub video_codec: String,

    /// Encoder preset (`-preset`)
    pub preset: String,

    /// Target video bitrate (`-b:v`)
    pub video_bitrate: String,

    /// Output resolution (`-s`)
    pub resolution: String,

    /// Target segment duration in seconds (`-hls_time`)
    pub segment_secs: u32,

    /// Number of segments kept in the playlist (`-hls_list_size`)
    pub playlist_size: u32,

    /// Delete segments that rotate out of the playlist
    pub delete_segments: bool,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            video_codec: "libx264".into(),
            preset: "ultrafast".into(),
            video_bitrate: "500k".into(),
            resolution: "640x360".into(),
            segment_secs: 2,
            playlist_size: 10,
            delete_segments: true,
        }
    }
}

impl TranscodeProfile {
    /// Set the transcoder executable
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the target video bitrate
    pub fn video_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.video_bitrate = bitrate.into();
        self
    }

    /// Set the output resolution
    pub fn resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    /// Set the segment duration and playlist length
    pub fn segments(mut self, segment_secs: u32, playlist_size: u32) -> Self {
        self.segment_secs = segment_secs.max(1);
        self.playlist_size = playlist_size;
        self
    }

    /// Keep rotated segments on disk
    pub fn keep_segments(mut self) -> Self {
        self.delete_segments = false;
        self
    }

    /// Build the argument list reading `input` and writing the playlist to `manifest`
    pub fn args(&self, input: &str, manifest: &Path) -> Vec<OsString> {
        let segment_secs = self.segment_secs.to_string();
        let playlist_size = self.playlist_size.to_string();
        let base: [&str; 16] = [
            "-i",
            input,
            "-c:v",
            self.video_codec.as_str(),
            "-preset",
            self.preset.as_str(),
            "-b:v",
            self.video_bitrate.as_str(),
            "-s",
            self.resolution.as_str(),
            "-f",
            "hls",
            "-hls_time",
            segment_secs.as_str(),
            "-hls_list_size",
            playlist_size.as_str(),
        ];
        let mut args: Vec<OsString> = base.into_iter().map(OsString::from).collect();

        if self.delete_segments {
            args.push("-hls_flags".into());
            args.push("delete_segments".into());
        }

        args.push(manifest.as_os_str().to_owned());
        args
    }
}
