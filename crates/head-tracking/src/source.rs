//! Orientation sources

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::orientation::{OrientationSample, Quaternion, RawOrientation};
use crate::reference::TrackingReference;
use crate::TrackingError;

/// Supplies one centered orientation sample per tick
pub trait OrientationSource: Send {
    /// Latest orientation relative to forward, `None` while tracking is lost
    fn sample(&mut self) -> Option<OrientationSample>;

    /// Make the current pose the forward direction
    fn recenter(&mut self);

    /// True once the source can never produce another sample
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<T: OrientationSource + ?Sized> OrientationSource for Box<T> {
    fn sample(&mut self) -> Option<OrientationSample> {
        (**self).sample()
    }

    fn recenter(&mut self) {
        (**self).recenter()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// One line of a replay log
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayRecord {
    Angles { yaw_deg: f64, pitch_deg: f64 },
    Quat { w: f64, x: f64, y: f64, z: f64 },
    Lost { lost: bool },
}

/// Turns JSON orientation records into centered samples.
///
/// Each record is `{"yaw_deg":..,"pitch_deg":..}`, a quaternion
/// `{"w":..,"x":..,"y":..,"z":..}`, or `{"lost":true}` for a tracking gap.
/// Shared by every line-oriented source so they agree on the format.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    reference: TrackingReference,
    line: usize,
}

impl RecordDecoder {
    pub fn new(reference: TrackingReference) -> Self {
        Self { reference, line: 0 }
    }

    pub fn reference(&self) -> &TrackingReference {
        &self.reference
    }

    /// Lines seen so far, blank ones included
    pub fn lines(&self) -> usize {
        self.line
    }

    pub fn recenter(&mut self) {
        self.reference.recenter();
    }

    /// Decode one line.
    ///
    /// `Ok(None)` is a blank line or a tracking gap; `Err` is a malformed
    /// record, which leaves the reference untouched.
    pub fn decode(&mut self, text: &str) -> Result<Option<OrientationSample>, TrackingError> {
        self.line += 1;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let record: ReplayRecord = serde_json::from_str(text).map_err(|e| TrackingError::Record {
            line: self.line,
            reason: e.to_string(),
        })?;
        let raw = match record {
            ReplayRecord::Angles { yaw_deg, pitch_deg } => RawOrientation { yaw_deg, pitch_deg },
            ReplayRecord::Quat { w, x, y, z } => Quaternion { w, x, y, z }.to_yaw_pitch(),
            ReplayRecord::Lost { lost } => {
                if lost {
                    debug!(line = self.line, "Tracking lost");
                }
                return Ok(None);
            }
        };
        Ok(Some(self.reference.resolve(raw)))
    }
}

/// Replays recorded head poses from JSON lines, one record per tick.
///
/// Blank and malformed lines are skipped; a tracking gap record yields a
/// tick without a sample.
pub struct ReplaySource {
    reader: Box<dyn BufRead + Send>,
    decoder: RecordDecoder,
    exhausted: bool,
}

impl ReplaySource {
    pub fn new(reader: impl BufRead + Send + 'static, reference: TrackingReference) -> Self {
        Self {
            reader: Box::new(reader),
            decoder: RecordDecoder::new(reference),
            exhausted: false,
        }
    }

    /// Open a replay file
    pub fn open(path: impl AsRef<Path>, reference: TrackingReference) -> Result<Self, TrackingError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("Replaying head poses from {}", path.display());
        Ok(Self::new(BufReader::new(file), reference))
    }

    pub fn reference(&self) -> &TrackingReference {
        self.decoder.reference()
    }
}

impl OrientationSource for ReplaySource {
    fn sample(&mut self) -> Option<OrientationSample> {
        if self.exhausted {
            return None;
        }
        let mut buf = String::new();
        loop {
            buf.clear();
            match self.reader.read_line(&mut buf) {
                Ok(0) => {
                    info!("Replay finished after {} lines", self.decoder.lines());
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => {
                    let blank = buf.trim().is_empty();
                    match self.decoder.decode(&buf) {
                        Ok(None) if blank => continue,
                        Ok(sample) => return sample,
                        Err(e) => warn!("Skipping replay record: {}", e),
                    }
                }
                Err(e) => {
                    warn!("Replay read failed: {}", e);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }

    fn recenter(&mut self) {
        self.decoder.recenter();
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// In-memory queue of already-centered samples.
///
/// `None` entries model tracking gaps. Once drained the source is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    samples: VecDeque<Option<OrientationSample>>,
    recenter_count: usize,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = Option<OrientationSample>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            recenter_count: 0,
        }
    }

    /// The same sample repeated `ticks` times
    pub fn hold(sample: OrientationSample, ticks: usize) -> Self {
        Self::new(std::iter::repeat(Some(sample)).take(ticks))
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }

    /// Number of recenter requests received
    pub fn recenter_count(&self) -> usize {
        self.recenter_count
    }
}

impl OrientationSource for ScriptedSource {
    fn sample(&mut self) -> Option<OrientationSample> {
        self.samples.pop_front().flatten()
    }

    fn recenter(&mut self) {
        self.recenter_count += 1;
    }

    fn is_exhausted(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn replay(text: &str) -> ReplaySource {
        ReplaySource::new(Cursor::new(text.to_string()), TrackingReference::default())
    }

    #[test]
    fn test_replay_angles_and_quaternions() {
        let mut source = replay(
            "{\"yaw_deg\": 30.0, \"pitch_deg\": -2.0}\n{\"w\": 1.0, \"x\": 0.0, \"y\": 0.0, \"z\": 0.0}\n",
        );

        assert_eq!(source.sample(), Some(OrientationSample::new(30.0, -2.0)));
        let forward = source.sample().unwrap();
        assert!(forward.yaw_deg.abs() < 1e-9);
        assert_eq!(source.sample(), None);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_replay_skips_malformed_lines() {
        let mut source = replay("not json\n\n{\"yaw_deg\": 5.0, \"pitch_deg\": 1.0}\n");
        assert_eq!(source.sample(), Some(OrientationSample::new(5.0, 1.0)));
    }

    #[test]
    fn test_replay_tracking_gap() {
        let mut source = replay("{\"lost\": true}\n{\"yaw_deg\": 1.0, \"pitch_deg\": 0.0}\n");
        assert_eq!(source.sample(), None);
        assert!(!source.is_exhausted());
        assert_eq!(source.sample(), Some(OrientationSample::new(1.0, 0.0)));
    }

    #[test]
    fn test_replay_recenter() {
        let mut source = replay(
            "{\"yaw_deg\": 40.0, \"pitch_deg\": 0.0}\n{\"yaw_deg\": 45.0, \"pitch_deg\": 0.0}\n",
        );
        source.sample();
        source.recenter();
        let sample = source.sample().unwrap();
        assert!((sample.yaw_deg - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_decoder_reports_malformed_line_number() {
        let mut decoder = RecordDecoder::new(TrackingReference::default());
        assert_eq!(decoder.decode("").unwrap(), None);
        assert_eq!(decoder.decode("{\"lost\": true}").unwrap(), None);
        match decoder.decode("{\"yaw\": 1}") {
            Err(TrackingError::Record { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected record error, got {:?}", other),
        }
        assert_eq!(
            decoder.decode("{\"yaw_deg\": -12.0, \"pitch_deg\": 3.0}").unwrap(),
            Some(OrientationSample::new(-12.0, 3.0))
        );
    }

    #[test]
    fn test_scripted_source() {
        let mut source = ScriptedSource::new(vec![Some(OrientationSample::new(1.0, 2.0)), None]);
        assert_eq!(source.sample(), Some(OrientationSample::new(1.0, 2.0)));
        assert!(!source.is_exhausted());
        assert_eq!(source.sample(), None);
        assert!(source.is_exhausted());

        source.recenter();
        assert_eq!(source.recenter_count(), 1);
    }
}
