//! Capture Module - Camera frame delivery
//!
//! Mở camera trên một background thread riêng và đẩy từng frame tới đúng một consumer.
//! Không bao giờ chạy trên UI thread.

pub mod types;
pub mod webcam;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use image::RgbImage;

pub use types::{CaptureConfig, CaptureError, CapturePreset, FrameSource};
pub use webcam::WebcamSource;

// ============================================================================
// HANDLE
// ============================================================================

/// Running capture session. Dropping the handle asks the loop to stop.
#[derive(Debug)]
pub struct CaptureHandle {
    device: String,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl CaptureHandle {
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Request the loop to stop after the current frame
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Wait for the capture thread, returns the number of delivered frames
    pub fn join(mut self) -> u64 {
        self.thread
            .take()
            .and_then(|t| t.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// START
// ============================================================================

/// Start capturing on a dedicated thread.
///
/// `open` runs on the capture thread; its outcome is reported back before this
/// function returns, so acquisition failure surfaces here as `Err` and the
/// consumer is never called. An open that takes longer than
/// `config.open_timeout` is treated as a failure too.
pub fn start<S, O, F>(config: CaptureConfig, open: O, mut consumer: F) -> Result<CaptureHandle, CaptureError>
where
    S: FrameSource,
    O: FnOnce(&CaptureConfig) -> Result<S, CaptureError> + Send + 'static,
    F: FnMut(&RgbImage) + Send + 'static,
{
    // Rendezvous: the thread only starts looping once the caller has taken the Ok
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<String, CaptureError>>(0);
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let thread_config = config.clone();

    let thread = thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            let mut source = match open(&thread_config) {
                Ok(source) => {
                    if ready_tx.send(Ok(source.describe())).is_err() {
                        log::warn!("Camera opened after startup gave up, releasing it");
                        flag.store(false, Ordering::Relaxed);
                        return 0;
                    }
                    source
                }
                Err(e) => {
                    flag.store(false, Ordering::Relaxed);
                    let _ = ready_tx.send(Err(e));
                    return 0;
                }
            };

            let delivered = run_loop(&mut source, &flag, &mut consumer, thread_config.max_consecutive_errors);
            flag.store(false, Ordering::Relaxed);
            log::info!("Capture loop ended after {} frames", delivered);
            delivered
        })
        .map_err(|e| CaptureError::Thread(format!("Failed to spawn capture thread: {}", e)))?;

    match ready_rx.recv_timeout(config.open_timeout) {
        Ok(Ok(device)) => {
            log::info!("Camera started: {}", device);
            Ok(CaptureHandle {
                device,
                running,
                thread: Some(thread),
            })
        }
        Ok(Err(e)) => {
            let _ = thread.join();
            log::error!("{}", e);
            Err(e)
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            // Thread stays detached; its pending send fails once the receiver is gone
            running.store(false, Ordering::Relaxed);
            drop(ready_rx);
            let e = CaptureError::Open(format!("device did not open within {:?}", config.open_timeout));
            log::error!("{}", e);
            Err(e)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = thread.join();
            Err(CaptureError::Thread("Capture thread exited before reporting readiness".to_string()))
        }
    }
}

/// Pull frames until stopped, disconnected, or too many consecutive failures
fn run_loop<S, F>(source: &mut S, running: &AtomicBool, consumer: &mut F, max_consecutive_errors: u32) -> u64
where
    S: FrameSource,
    F: FnMut(&RgbImage),
{
    let mut delivered = 0u64;
    let mut consecutive_errors = 0u32;

    while running.load(Ordering::Relaxed) {
        match source.next_frame() {
            Ok(frame) => {
                consecutive_errors = 0;
                consumer(&frame);
                delivered += 1;
            }
            Err(CaptureError::Disconnected(msg)) => {
                log::warn!("Camera disconnected: {}", msg);
                break;
            }
            Err(e) => {
                consecutive_errors += 1;
                log::debug!("Dropped frame: {}", e);
                if consecutive_errors >= max_consecutive_errors {
                    log::error!("Giving up after {} consecutive frame errors (last: {})", consecutive_errors, e);
                    break;
                }
            }
        }
    }

    delivered
}
