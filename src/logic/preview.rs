//! Camera Preview - latest frame encoded as JPEG for the webview
//!
//! Encoded on the capture thread right before inference, so the preview
//! rate follows the inference rate. Frames are downscaled first to keep
//! that cost small.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::latest::LatestValue;

/// Latest encoded preview frame
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub jpeg: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub frame_seq: u64,
}

impl PreviewFrame {
    pub fn notice(&self) -> PreviewNotice {
        PreviewNotice {
            frame_seq: self.frame_seq,
            width: self.width,
            height: self.height,
        }
    }
}

/// Event payload: frame bytes are fetched separately via `get_preview_frame`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewNotice {
    pub frame_seq: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct PreviewError(pub String);

impl std::fmt::Display for PreviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PreviewError: {}", self.0)
    }
}

impl std::error::Error for PreviewError {}

/// Encode an RGB frame as JPEG
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, PreviewError> {
    let mut buf = Vec::with_capacity((frame.width() * frame.height()) as usize / 4);
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode_image(frame)
        .map_err(|e| PreviewError(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

/// Scale (width, height) so the longest edge is at most `max_edge`, keeping aspect
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_edge == 0 || longest <= max_edge {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// Last-write-wins preview slot
#[derive(Debug)]
pub struct PreviewChannel {
    latest: LatestValue<Option<PreviewFrame>>,
    quality: u8,
    max_edge: u32,
}

impl PreviewChannel {
    pub fn new(quality: u8, max_edge: u32) -> Self {
        Self {
            latest: LatestValue::new(None),
            quality,
            max_edge,
        }
    }

    /// Downscale, encode and publish a frame
    pub fn publish_frame(&self, frame: &RgbImage, frame_seq: u64) -> Result<(), PreviewError> {
        let (width, height) = fit_within(frame.width(), frame.height(), self.max_edge);
        let jpeg = if (width, height) == frame.dimensions() {
            encode_jpeg(frame, self.quality)?
        } else {
            encode_jpeg(&imageops::thumbnail(frame, width, height), self.quality)?
        };

        self.latest.publish(Some(PreviewFrame {
            jpeg: Arc::new(jpeg),
            width,
            height,
            frame_seq,
        }));
        Ok(())
    }

    pub fn current(&self) -> Option<PreviewFrame> {
        self.latest.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewFrame>> {
        self.latest.subscribe()
    }
}
