//! Single-alarm lookout state machine
//!
//! ```text
//!            budget exceeded, not silenced
//!   Idle ─────────────────────────────────► Warning
//!    ▲                                         │
//!    └──── valid scan / external reset ────────┘
//! ```
//!
//! Each tick the sample is classified against the alarm's thresholds,
//! first-time detections are recorded, and the scan / warning logic runs.

use alarm_audio::{AlarmPlayer, SoundFailure};
use head_tracking::OrientationSample;
use lookout_config::AlarmConfig;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::events::{AlarmEvent, Direction};
use crate::state::{AlarmState, SeenDirections};

/// Clock values for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Tick time after this tick's advance (ms)
    pub now_ms: f64,
    /// Elapsed since the previous tick (ms)
    pub dt_ms: f64,
}

/// Directions the current sample is looking in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Look {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Read-only view of one alarm for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmSnapshot {
    pub index: usize,
    pub enabled: bool,
    pub warning_active: bool,
    pub time_since_scan_ms: f64,
    pub seen: SeenDirections,
    pub silence_remaining_ms: f64,
    pub volume: u8,
    pub sound_playing: bool,
}

/// One configured alarm and its state
#[derive(Debug)]
pub struct AlarmEngine {
    index: usize,
    config: AlarmConfig,
    state: AlarmState,
}

impl AlarmEngine {
    pub fn new(index: usize, config: AlarmConfig) -> Self {
        Self {
            index,
            config,
            state: AlarmState::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Classify a sample against this alarm's thresholds
    pub fn classify(&self, sample: &OrientationSample) -> Look {
        let half = self.config.horizontal_half_angle();
        let up = self.config.min_vertical_angle_up_deg;
        let down = self.config.min_vertical_angle_down_deg;

        Look {
            left: sample.yaw_deg > half,
            right: sample.yaw_deg < -half,
            up: up > 0.0 && sample.pitch_deg > up,
            down: down > 0.0 && sample.pitch_deg < -down,
        }
    }

    /// Every required direction has been seen since the last reset
    pub fn scan_complete(&self) -> bool {
        let required = self.config.required_directions();
        let seen = self.state.seen;

        seen.left && seen.right && (!required.up || seen.up) && (!required.down || seen.down)
    }

    /// Target volume `elapsed_ms` into a warning
    pub fn ramped_volume(&self, elapsed_ms: f64) -> u8 {
        let start = self.config.start_volume;
        let end = self.config.end_volume;
        if !self.config.has_volume_ramp() {
            return end.clamp(0, 100) as u8;
        }

        let progress = (elapsed_ms / self.config.volume_ramp_time_ms as f64).clamp(0.0, 1.0);
        let volume = start as f64 + progress * (end - start) as f64;
        (volume as i32).clamp(0, 100) as u8
    }

    pub fn snapshot(&self, now_ms: f64) -> AlarmSnapshot {
        AlarmSnapshot {
            index: self.index,
            enabled: self.is_enabled(),
            warning_active: self.state.warning_active,
            time_since_scan_ms: self.state.time_since_scan_ms,
            seen: self.state.seen,
            silence_remaining_ms: self.state.silence_remaining_ms(now_ms),
            volume: self.state.volume,
            sound_playing: self.state.sound_playing(),
        }
    }

    /// Full reset, stopping any sound
    pub(crate) fn reset(&mut self) {
        self.state.reset();
    }

    pub(crate) fn clear_directions(&mut self) {
        self.state.clear_directions();
    }

    /// Run one tick. Returns true when a valid scan completed.
    pub(crate) fn step(
        &mut self,
        sample: &OrientationSample,
        tick: Tick,
        player: &AlarmPlayer,
        events: &mut Vec<AlarmEvent>,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }

        self.record_looks(sample, tick.now_ms, events);
        self.state.time_since_scan_ms += tick.dt_ms;

        if self.scan_complete() && self.evaluate_scan(events) {
            return true;
        }

        if self.state.warning_active {
            self.continue_warning(tick, player, events);
        } else if self.state.time_since_scan_ms >= self.config.max_time_ms as f64 {
            if self.state.is_silenced(tick.now_ms) {
                if !self.state.suppression_reported {
                    debug!(
                        alarm = self.index,
                        "Alarm silenced due to recent look, skipping warning"
                    );
                    self.state.suppression_reported = true;
                    events.push(AlarmEvent::WarningSuppressed { alarm: self.index });
                }
            } else {
                self.start_warning(tick.now_ms, player, events);
            }
        }

        false
    }

    fn record_looks(&mut self, sample: &OrientationSample, now_ms: f64, events: &mut Vec<AlarmEvent>) {
        let look = self.classify(sample);
        let mut horizontal_look = false;

        if look.left && !self.state.seen.left {
            self.state.seen.left = true;
            self.state.left_seen_at_ms = Some(now_ms);
            horizontal_look = true;
            self.seen(Direction::Left, now_ms, events);
        }
        if look.right && !self.state.seen.right {
            self.state.seen.right = true;
            self.state.right_seen_at_ms = Some(now_ms);
            horizontal_look = true;
            self.seen(Direction::Right, now_ms, events);
        }
        if look.up && !self.state.seen.up {
            self.state.seen.up = true;
            self.seen(Direction::Up, now_ms, events);
        }
        if look.down && !self.state.seen.down {
            self.state.seen.down = true;
            self.seen(Direction::Down, now_ms, events);
        }

        if horizontal_look {
            self.state.silenced_until_ms = now_ms + self.config.silence_after_look_ms as f64;
            debug!(
                alarm = self.index,
                "Alarm silenced for {} ms after new look", self.config.silence_after_look_ms
            );
            if self.state.warning_active && self.state.is_silenced(now_ms) {
                self.apply_volume(0);
            }
        }
    }

    fn seen(&self, direction: Direction, now_ms: f64, events: &mut Vec<AlarmEvent>) {
        debug!(alarm = self.index, ?direction, "Look detected at {:.0} ms", now_ms);
        events.push(AlarmEvent::DirectionSeen {
            alarm: self.index,
            direction,
            at_ms: now_ms,
        });
    }

    /// Accept or reject a complete scan. Returns true when accepted.
    fn evaluate_scan(&mut self, events: &mut Vec<AlarmEvent>) -> bool {
        let min_gap = self.config.min_lookout_time_ms as f64;
        match self.state.left_right_gap_ms() {
            Some(gap) if gap >= min_gap => {
                info!(
                    alarm = self.index,
                    "Lookout completed, L/R time diff: {:.0} ms", gap
                );
                counter!("lookout_scans_completed_total", "alarm" => self.index.to_string())
                    .increment(1);
                self.state.reset();
                events.push(AlarmEvent::ScanCompleted {
                    alarm: self.index,
                    lr_gap_ms: gap,
                });
                true
            }
            gap => {
                let gap = gap.unwrap_or(0.0);
                debug!(
                    alarm = self.index,
                    "Lookout not counted: L/R time diff {:.0} ms < {:.0} ms", gap, min_gap
                );
                counter!("lookout_scans_rejected_total", "alarm" => self.index.to_string())
                    .increment(1);
                self.state.clear_horizontal();
                events.push(AlarmEvent::ScanRejected {
                    alarm: self.index,
                    lr_gap_ms: gap,
                });
                false
            }
        }
    }

    fn start_warning(&mut self, now_ms: f64, player: &AlarmPlayer, events: &mut Vec<AlarmEvent>) {
        let volume = self.ramped_volume(0.0);

        self.state.warning_active = true;
        self.state.clear_directions();
        self.state.warning_started_at_ms = now_ms;
        self.state.repeat_elapsed_ms = 0.0;
        self.state.suppression_reported = false;

        warn!(
            alarm = self.index,
            volume,
            "Please perform a visual lookout! ({:.1}s without a scan)",
            self.state.time_since_scan_ms / 1000.0
        );
        counter!("lookout_warnings_started_total", "alarm" => self.index.to_string()).increment(1);
        events.push(AlarmEvent::WarningStarted {
            alarm: self.index,
            volume,
        });

        self.play(volume, player, events);
    }

    fn continue_warning(&mut self, tick: Tick, player: &AlarmPlayer, events: &mut Vec<AlarmEvent>) {
        self.state.repeat_elapsed_ms += tick.dt_ms;

        let target = self.ramped_volume(tick.now_ms - self.state.warning_started_at_ms);
        let silenced = self.state.is_silenced(tick.now_ms);

        // A sound that ended on its own is released
        if self.state.sound.as_ref().is_some_and(|s| !s.is_playing()) {
            self.state.sound = None;
        }
        self.apply_volume(if silenced { 0 } else { target });

        if self.state.repeat_elapsed_ms >= self.config.repeat_interval_ms as f64 {
            if silenced {
                debug!(alarm = self.index, "Alarm silenced, skipping repeat warning");
                events.push(AlarmEvent::RepeatSkipped { alarm: self.index });
            } else {
                warn!(
                    alarm = self.index,
                    volume = target,
                    "Please perform a visual lookout! (repeat)"
                );
                events.push(AlarmEvent::WarningRepeated {
                    alarm: self.index,
                    volume: target,
                });
                self.state.sound = None;
                self.play(target, player, events);
            }
            self.state.repeat_elapsed_ms = 0.0;
        }
    }

    fn apply_volume(&mut self, volume: u8) {
        if self.state.volume == volume {
            return;
        }
        if let Some(sound) = &self.state.sound {
            sound.set_volume(volume);
        }
        self.state.volume = volume;
    }

    fn play(&mut self, volume: u8, player: &AlarmPlayer, events: &mut Vec<AlarmEvent>) {
        let playback = player.play(&self.config.audio_ref, volume);
        match playback.failure {
            Some(SoundFailure::FellBack { requested, error }) => {
                events.push(AlarmEvent::SoundFallback {
                    alarm: self.index,
                    requested,
                    error: error.to_string(),
                });
            }
            Some(SoundFailure::Unavailable { error }) => {
                warn!(alarm = self.index, "Warning continues without sound");
                events.push(AlarmEvent::SoundUnavailable {
                    alarm: self.index,
                    error: error.to_string(),
                });
            }
            None => {}
        }
        self.state.sound = playback.handle;
        self.state.volume = volume;
    }
}
