//! Webcam Source - nokhwa native backend (V4L2 / AVFoundation / Media Foundation)

use std::sync::mpsc;

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;

use super::types::{CaptureConfig, CaptureError, CapturePreset, FrameSource};

/// Frame rate requested for the non-photo presets
const PRESET_FRAME_RATE: u32 = 30;

/// Camera opened at a fixed preset, frames decoded to RGB8
pub struct WebcamSource {
    camera: Camera,
    description: String,
}

impl WebcamSource {
    /// Open and start streaming. Must be called on the thread that will read frames.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        #[cfg(target_os = "macos")]
        await_permission(|on_complete| nokhwa::nokhwa_initialize(on_complete))?;

        let requested = RequestedFormat::new::<RgbFormat>(requested_format(config.preset));

        let mut camera = Camera::new(CameraIndex::Index(config.camera_index), requested)
            .map_err(|e| CaptureError::Open(format!("camera {}: {}", config.camera_index, e)))?;

        camera
            .open_stream()
            .map_err(|e| CaptureError::Open(format!("failed to open stream: {}", e)))?;

        let format = camera.camera_format();
        let description = format!(
            "{} ({}x{} @ {}fps, {:?})",
            camera.info().human_name(),
            format.width(),
            format.height(),
            format.frame_rate(),
            config.preset,
        );

        Ok(Self { camera, description })
    }
}

impl FrameSource for WebcamSource {
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Frame(format!("read: {}", e)))?;

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Frame(format!("decode: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CaptureError::Frame(format!("buffer size mismatch for {}x{}", width, height)))
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::debug!("stop_stream: {}", e);
        }
    }
}

/// Ask for camera access and block until the OS answers.
///
/// `request` receives the completion callback; it may invoke it from any thread.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn await_permission<R>(request: R) -> Result<(), CaptureError>
where
    R: FnOnce(Box<dyn Fn(bool) + Send + Sync + 'static>),
{
    let (tx, rx) = mpsc::channel::<bool>();
    request(Box::new(move |granted| {
        let _ = tx.send(granted);
    }));

    match rx.recv() {
        Ok(true) => Ok(()),
        Ok(false) => Err(CaptureError::Open("camera permission denied".to_string())),
        Err(_) => Err(CaptureError::Open("camera permission request was dropped".to_string())),
    }
}

/// Map a preset to the nokhwa format request
fn requested_format(preset: CapturePreset) -> RequestedFormatType {
    match preset.resolution_hint() {
        None => RequestedFormatType::AbsoluteHighestResolution,
        Some((width, height)) => RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::MJPEG,
            PRESET_FRAME_RATE,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_permission_waits_for_late_grant() {
        let result = await_permission(|on_complete| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                on_complete(true);
            });
        });

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_permission_denied_is_open_error() {
        let result = await_permission(|on_complete| on_complete(false));

        assert_eq!(result, Err(CaptureError::Open("camera permission denied".to_string())));
    }

    #[test]
    fn test_permission_callback_never_called() {
        let result = await_permission(|on_complete| drop(on_complete));

        assert!(matches!(result, Err(CaptureError::Open(_))));
    }

    #[test]
    fn test_photo_preset_requests_highest_resolution() {
        assert!(matches!(
            requested_format(CapturePreset::Photo),
            RequestedFormatType::AbsoluteHighestResolution
        ));
        assert!(matches!(
            requested_format(CapturePreset::Medium),
            RequestedFormatType::Closest(_)
        ));
    }
}
