//! Live orientation feed
//!
//! Records arrive on a channel filled by a reader thread, so a quiet feed
//! never blocks the tick loop. Each tick takes at most one record.

use std::io::BufRead;
use std::thread;

use head_tracking::{OrientationSample, OrientationSource, RecordDecoder, TrackingReference};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

const FEED_CHANNEL_CAPACITY: usize = 100;

/// Orientation source fed with JSON-lines records from a channel
pub struct LineFeedSource {
    lines: mpsc::Receiver<String>,
    decoder: RecordDecoder,
    closed: bool,
}

impl LineFeedSource {
    pub fn new(lines: mpsc::Receiver<String>, reference: TrackingReference) -> Self {
        Self {
            lines,
            decoder: RecordDecoder::new(reference),
            closed: false,
        }
    }

    /// Feed from standard input on a dedicated reader thread
    pub fn stdin(reference: TrackingReference) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);

        thread::Builder::new()
            .name("orientation-feed".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Orientation feed read failed: {}", e);
                            break;
                        }
                    };
                    if tx.blocking_send(line).is_err() {
                        debug!("Orientation feed receiver dropped");
                        break;
                    }
                }
            })?;

        info!("Reading head poses from stdin");
        Ok(Self::new(rx, reference))
    }

    pub fn reference(&self) -> &TrackingReference {
        self.decoder.reference()
    }
}

impl OrientationSource for LineFeedSource {
    fn sample(&mut self) -> Option<OrientationSample> {
        loop {
            match self.lines.try_recv() {
                Ok(line) => {
                    let blank = line.trim().is_empty();
                    match self.decoder.decode(&line) {
                        Ok(None) if blank => continue,
                        Ok(sample) => return sample,
                        Err(e) => warn!("Skipping orientation record: {}", e),
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        info!("Orientation feed closed after {} lines", self.decoder.lines());
                        self.closed = true;
                    }
                    return None;
                }
            }
        }
    }

    fn recenter(&mut self) {
        self.decoder.recenter();
    }

    fn is_exhausted(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> (mpsc::Sender<String>, LineFeedSource) {
        let (tx, rx) = mpsc::channel(8);
        (tx, LineFeedSource::new(rx, TrackingReference::default()))
    }

    #[test]
    fn test_quiet_feed_yields_no_sample() {
        let (_tx, mut source) = feed();

        assert_eq!(source.sample(), None);
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_one_record_per_tick() {
        let (tx, mut source) = feed();
        tx.try_send("{\"yaw_deg\": 20.0, \"pitch_deg\": 1.0}".into()).unwrap();
        tx.try_send("{\"yaw_deg\": -20.0, \"pitch_deg\": 0.0}".into()).unwrap();

        assert_eq!(source.sample(), Some(OrientationSample::new(20.0, 1.0)));
        assert_eq!(source.sample(), Some(OrientationSample::new(-20.0, 0.0)));
        assert_eq!(source.sample(), None);
    }

    #[test]
    fn test_malformed_and_blank_lines_skipped() {
        let (tx, mut source) = feed();
        tx.try_send("garbage".into()).unwrap();
        tx.try_send("   ".into()).unwrap();
        tx.try_send("{\"yaw_deg\": 5.0, \"pitch_deg\": 0.0}".into()).unwrap();

        assert_eq!(source.sample(), Some(OrientationSample::new(5.0, 0.0)));
    }

    #[test]
    fn test_tracking_gap_record() {
        let (tx, mut source) = feed();
        tx.try_send("{\"lost\": true}".into()).unwrap();
        tx.try_send("{\"yaw_deg\": 1.0, \"pitch_deg\": 0.0}".into()).unwrap();

        assert_eq!(source.sample(), None);
        assert_eq!(source.sample(), Some(OrientationSample::new(1.0, 0.0)));
    }

    #[test]
    fn test_closed_feed_is_exhausted() {
        let (tx, mut source) = feed();
        tx.try_send("{\"yaw_deg\": 1.0, \"pitch_deg\": 0.0}".into()).unwrap();
        drop(tx);

        assert!(source.sample().is_some());
        assert!(!source.is_exhausted());
        assert_eq!(source.sample(), None);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_recenter_applies_to_later_records() {
        let (tx, mut source) = feed();
        tx.try_send("{\"yaw_deg\": 40.0, \"pitch_deg\": 0.0}".into()).unwrap();
        tx.try_send("{\"yaw_deg\": 45.0, \"pitch_deg\": 0.0}".into()).unwrap();

        source.sample();
        source.recenter();
        let sample = source.sample().unwrap();
        assert!((sample.yaw_deg - 5.0).abs() < 1e-9);
    }
}
