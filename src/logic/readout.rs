//! Prediction Readout - giá trị hiển thị hiện tại trên overlay
//!
//! Chỉ có hai trạng thái: placeholder ("Detecting...") hoặc prediction mới nhất.
//! Không lưu lịch sử.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::constants::PLACEHOLDER_TEXT;
use super::latest::LatestValue;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,     // 0.0 - 1.0
    pub frame_seq: u64,      // capture order of the classified frame
    pub updated_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32, frame_seq: u64) -> Self {
        Self {
            label: label.into(),
            confidence,
            frame_seq,
            updated_at: Utc::now(),
        }
    }

    pub fn percent(&self) -> u8 {
        confidence_percent(self.confidence)
    }
}

/// Overlay state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Readout {
    #[default]
    Detecting,
    Prediction(Prediction),
}

impl Readout {
    /// Text rendered on the overlay
    pub fn text(&self) -> String {
        match self {
            Readout::Detecting => PLACEHOLDER_TEXT.to_string(),
            Readout::Prediction(p) => format!("{} {}%", p.label, p.percent()),
        }
    }

    pub fn view(&self) -> ReadoutView {
        match self {
            Readout::Detecting => ReadoutView {
                text: self.text(),
                label: None,
                confidence: None,
                percent: None,
                frame_seq: None,
                updated_at: None,
            },
            Readout::Prediction(p) => ReadoutView {
                text: self.text(),
                label: Some(p.label.clone()),
                confidence: Some(p.confidence),
                percent: Some(p.percent()),
                frame_seq: Some(p.frame_seq),
                updated_at: Some(p.updated_at.to_rfc3339()),
            },
        }
    }
}

/// Readout payload for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadoutView {
    pub text: String,
    pub label: Option<String>,
    pub confidence: Option<f32>,
    pub percent: Option<u8>,
    pub frame_seq: Option<u64>,
    pub updated_at: Option<String>,
}

/// Scale a [0,1] score to an integer percentage, truncating.
/// Out-of-range scores are clamped, NaN maps to 0.
pub fn confidence_percent(confidence: f32) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0) as u8
}

// ============================================================================
// CHANNEL
// ============================================================================

/// Published readout: capture thread writes, UI bridge reads.
#[derive(Debug)]
pub struct ReadoutChannel {
    latest: LatestValue<Readout>,
}

impl Default for ReadoutChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadoutChannel {
    pub fn new() -> Self {
        Self {
            latest: LatestValue::new(Readout::Detecting),
        }
    }

    /// Overwrite the readout with a new prediction
    pub fn publish(&self, prediction: Prediction) {
        self.latest.publish(Readout::Prediction(prediction));
    }

    pub fn current(&self) -> Readout {
        self.latest.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Readout> {
        self.latest.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(0.5), 50);
        assert_eq!(confidence_percent(0.87), 87);
        assert_eq!(confidence_percent(0.999), 99);
        assert_eq!(confidence_percent(0.0099), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }

    #[test]
    fn test_percent_clamped() {
        assert_eq!(confidence_percent(1.7), 100);
        assert_eq!(confidence_percent(-0.2), 0);
        assert_eq!(confidence_percent(f32::NAN), 0);
        assert_eq!(confidence_percent(f32::INFINITY), 100);
    }

    #[test]
    fn test_percent_always_in_range() {
        for i in 0..=1000 {
            let p = confidence_percent(i as f32 / 1000.0);
            assert!(p <= 100);
        }
    }

    #[test]
    fn test_placeholder_text() {
        let readout = Readout::default();
        assert_eq!(readout, Readout::Detecting);
        assert_eq!(readout.text(), "Detecting...");

        let view = readout.view();
        assert_eq!(view.text, "Detecting...");
        assert!(view.label.is_none());
        assert!(view.percent.is_none());
    }

    #[test]
    fn test_prediction_text() {
        let readout = Readout::Prediction(Prediction::new("Fairy Tale", 0.87, 3));
        assert_eq!(readout.text(), "Fairy Tale 87%");

        let view = readout.view();
        assert_eq!(view.label.as_deref(), Some("Fairy Tale"));
        assert_eq!(view.percent, Some(87));
        assert_eq!(view.frame_seq, Some(3));
        assert!(view.updated_at.is_some());
    }

    #[test]
    fn test_channel_starts_with_placeholder() {
        let channel = ReadoutChannel::new();
        assert_eq!(channel.current(), Readout::Detecting);
    }

    #[test]
    fn test_channel_keeps_only_latest() {
        let channel = ReadoutChannel::new();

        channel.publish(Prediction::new("Mystery", 0.61, 1));
        channel.publish(Prediction::new("Adventure", 0.92, 2));

        assert_eq!(channel.current().text(), "Adventure 92%");
    }

    #[test]
    fn test_view_serializes() {
        let view = Readout::Prediction(Prediction::new("Poetry", 0.4, 7)).view();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["text"], "Poetry 40%");
        assert_eq!(json["percent"], 40);
        assert_eq!(json["frame_seq"], 7);
    }
}
