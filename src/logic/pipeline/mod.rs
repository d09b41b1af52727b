//! Frame Pipeline - Capture -> Inference -> Readout
//!
//! Consumer duy nhất của capture thread. Mỗi frame: publish preview, classify,
//! publish readout. Tất cả chạy đồng bộ trên capture thread.

pub mod stats;

use std::sync::Arc;

use image::RgbImage;

use super::model::ImageClassifier;
use super::preview::PreviewChannel;
use super::readout::{Prediction, ReadoutChannel};

pub use stats::{PipelineStats, PipelineStatsSnapshot};

pub struct FramePipeline<C> {
    classifier: Option<C>,
    readout: Arc<ReadoutChannel>,
    preview: Option<Arc<PreviewChannel>>,
    stats: Arc<PipelineStats>,
    frame_seq: u64,
}

impl<C: ImageClassifier> FramePipeline<C> {
    /// `classifier` is checked once here; without one the pipeline never
    /// publishes a readout.
    pub fn new(classifier: Option<C>, readout: Arc<ReadoutChannel>, stats: Arc<PipelineStats>) -> Self {
        match classifier.as_ref() {
            Some(c) => log::info!("Pipeline ready ({} labels)", c.labels().len()),
            None => log::warn!("No classifier loaded - predictions disabled"),
        }

        Self {
            classifier,
            readout,
            preview: None,
            stats,
            frame_seq: 0,
        }
    }

    pub fn with_preview(mut self, preview: Arc<PreviewChannel>) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Handle one frame
    pub fn process(&mut self, frame: &RgbImage) {
        self.frame_seq += 1;
        self.stats.record_frame();

        if let Some(preview) = &self.preview {
            if let Err(e) = preview.publish_frame(frame, self.frame_seq) {
                log::debug!("Preview frame {} skipped: {}", self.frame_seq, e);
            }
        }

        let Some(classifier) = self.classifier.as_mut() else {
            return;
        };

        match classifier.classify(frame) {
            Ok(result) => {
                self.stats.record_success(result.inference_time_us);
                log::trace!("Frame {}: {} {:.3}", self.frame_seq, result.label, result.confidence);
                self.readout.publish(Prediction::new(result.label, result.confidence, self.frame_seq));
            }
            Err(e) => {
                self.stats.record_failure();
                log::debug!("Inference failed on frame {}: {}", self.frame_seq, e);
            }
        }
    }
}

impl<C: ImageClassifier + Send + 'static> FramePipeline<C> {
    /// Turn the pipeline into a capture consumer
    pub fn into_consumer(mut self) -> impl FnMut(&RgbImage) + Send + 'static {
        move |frame: &RgbImage| self.process(frame)
    }
}
