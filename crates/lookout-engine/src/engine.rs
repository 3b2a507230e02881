//! Multi-alarm coordinator
//!
//! Owns every configured alarm, the shared center-reset monitor and the
//! tick clock. The host calls [`LookoutEngine::step`] once per tick.

use std::sync::Arc;

use alarm_audio::{AlarmPlayer, AudioSink};
use head_tracking::OrientationSample;
use lookout_config::Settings;
use tracing::{debug, info, warn};

use crate::alarm::{AlarmEngine, AlarmSnapshot, Tick};
use crate::center::{CenterResetMonitor, CenterResetState};
use crate::diagnostics::Diagnostics;
use crate::events::{AlarmEvent, ResetReason};
use crate::EngineError;

/// Everything the engine needs for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Centered orientation, `None` while tracking is unavailable
    pub sample: Option<OrientationSample>,
    /// Host reports an active session
    pub active: bool,
    /// Wall-clock time since the previous tick (ms)
    pub dt_ms: f64,
}

impl TickInput {
    pub fn active(sample: OrientationSample, dt_ms: f64) -> Self {
        Self {
            sample: Some(sample),
            active: true,
            dt_ms,
        }
    }

    pub fn idle(dt_ms: f64) -> Self {
        Self {
            sample: None,
            active: false,
            dt_ms,
        }
    }
}

/// Lookout engine over a list of alarms
pub struct LookoutEngine {
    alarms: Vec<AlarmEngine>,
    center: CenterResetMonitor,
    diagnostics: Diagnostics,
    player: AlarmPlayer,
    widest: Option<usize>,
    /// Wall tick time, advances on every tick
    now_ms: f64,
    /// Tracked time, advances only on active ticks with a sample
    alarm_clock_ms: f64,
    session_active: bool,
}

impl LookoutEngine {
    /// Build one alarm per configured entry.
    ///
    /// Settings are expected to be normalized already.
    pub fn new(settings: &Settings, sink: Arc<dyn AudioSink>) -> Result<Self, EngineError> {
        if settings.alarms.is_empty() {
            return Err(EngineError::NoAlarms);
        }

        let alarms: Vec<AlarmEngine> = settings
            .alarms
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, config)| AlarmEngine::new(index, config))
            .collect();

        for alarm in &alarms {
            if alarm.is_enabled() {
                debug!(alarm = alarm.index(), "Alarm armed: {}", alarm.config().summary());
            } else {
                info!(alarm = alarm.index(), "Alarm disabled (no horizontal requirement)");
            }
        }

        let widest = widest_alarm(&alarms);
        match widest {
            Some(index) => debug!(alarm = index, "Widest alarm"),
            None => warn!("No enabled alarms, lookout monitoring is idle"),
        }

        Ok(Self {
            alarms,
            center: CenterResetMonitor::new(settings.center_reset.clone()),
            diagnostics: Diagnostics::new(settings.engine.diagnostics_interval_ms),
            player: AlarmPlayer::new(sink, settings.engine.default_sound.clone()),
            widest,
            now_ms: 0.0,
            alarm_clock_ms: 0.0,
            session_active: false,
        })
    }

    /// Advance the engine by one tick and report what happened
    pub fn step(&mut self, input: TickInput) -> Vec<AlarmEvent> {
        let mut events = Vec::new();
        let dt_ms = input.dt_ms.max(0.0);
        self.now_ms += dt_ms;

        if !input.active {
            if self.session_active {
                info!("Session ended, resetting all alarms");
                self.reset_into(ResetReason::SessionEnded, &mut events);
            }
            self.session_active = false;
            self.center.interrupt();
            return events;
        }
        self.session_active = true;

        let Some(sample) = input.sample else {
            // Tracking outage: no classification and no time charged
            self.center.interrupt();
            return events;
        };
        self.alarm_clock_ms += dt_ms;

        if self.center.update(&sample, dt_ms) {
            info!("Center reset: clearing direction progress on all alarms");
            for alarm in self.alarms.iter_mut().filter(|a| a.is_enabled()) {
                alarm.clear_directions();
            }
            events.push(AlarmEvent::CenterReset);
        }

        let tick = Tick {
            now_ms: self.alarm_clock_ms,
            dt_ms,
        };
        let mut widest_completed = false;
        for alarm in self.alarms.iter_mut() {
            let completed = alarm.step(&sample, tick, &self.player, &mut events);
            if completed && Some(alarm.index()) == self.widest {
                widest_completed = true;
            }
        }

        if widest_completed {
            self.reset_narrower(&mut events);
        }

        if self.diagnostics.due(self.now_ms) {
            self.dump_state();
        }

        events
    }

    /// Reset every enabled alarm, stopping their sounds
    pub fn reset_all(&mut self, reason: ResetReason) -> Vec<AlarmEvent> {
        let mut events = Vec::new();
        info!(?reason, "Resetting all alarms");
        self.reset_into(reason, &mut events);
        events
    }

    fn reset_into(&mut self, reason: ResetReason, events: &mut Vec<AlarmEvent>) {
        for alarm in self.alarms.iter_mut().filter(|a| a.is_enabled()) {
            alarm.reset();
            events.push(AlarmEvent::AlarmReset {
                alarm: alarm.index(),
                reason,
            });
        }
    }

    fn reset_narrower(&mut self, events: &mut Vec<AlarmEvent>) {
        let Some(widest) = self.widest else {
            return;
        };
        let angle = self.alarms[widest].config().min_horizontal_angle_deg;

        for alarm in self.alarms.iter_mut() {
            if alarm.index() == widest
                || !alarm.is_enabled()
                || alarm.config().min_horizontal_angle_deg >= angle
            {
                continue;
            }
            info!(
                alarm = alarm.index(),
                by = widest,
                "Alarm reset by wider lookout"
            );
            alarm.reset();
            events.push(AlarmEvent::AlarmReset {
                alarm: alarm.index(),
                reason: ResetReason::WiderScan { by: widest },
            });
        }
    }

    fn dump_state(&self) {
        for alarm in self.alarms.iter().filter(|a| a.is_enabled()) {
            let s = alarm.snapshot(self.alarm_clock_ms);
            debug!(
                alarm = s.index,
                warning = s.warning_active,
                left = s.seen.left,
                right = s.seen.right,
                up = s.seen.up,
                down = s.seen.down,
                volume = s.volume,
                "Time since lookout {:.1}s, silenced for {:.1}s",
                s.time_since_scan_ms / 1000.0,
                s.silence_remaining_ms / 1000.0
            );
        }
    }

    pub fn snapshots(&self) -> Vec<AlarmSnapshot> {
        self.alarms.iter().map(|a| a.snapshot(self.alarm_clock_ms)).collect()
    }

    pub fn alarm(&self, index: usize) -> Option<&AlarmEngine> {
        self.alarms.get(index)
    }

    pub fn alarms(&self) -> &[AlarmEngine] {
        &self.alarms
    }

    /// Tick time (ms since the engine was created)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Time alarms are measured against (ms). Excludes idle and
    /// tracking-lost ticks.
    pub fn alarm_time_ms(&self) -> f64 {
        self.alarm_clock_ms
    }

    /// Index of the enabled alarm with the largest horizontal sweep
    pub fn widest_alarm(&self) -> Option<usize> {
        self.widest
    }

    pub fn center_state(&self) -> &CenterResetState {
        self.center.state()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    pub fn enabled_alarm_count(&self) -> usize {
        self.alarms.iter().filter(|a| a.is_enabled()).count()
    }
}

impl std::fmt::Debug for LookoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookoutEngine")
            .field("alarms", &self.alarms.len())
            .field("widest", &self.widest)
            .field("now_ms", &self.now_ms)
            .field("alarm_clock_ms", &self.alarm_clock_ms)
            .field("session_active", &self.session_active)
            .finish()
    }
}

/// First enabled alarm with the largest horizontal angle
fn widest_alarm(alarms: &[AlarmEngine]) -> Option<usize> {
    let mut widest: Option<&AlarmEngine> = None;
    for alarm in alarms.iter().filter(|a| a.is_enabled()) {
        let wider = widest.map_or(true, |w| {
            alarm.config().min_horizontal_angle_deg > w.config().min_horizontal_angle_deg
        });
        if wider {
            widest = Some(alarm);
        }
    }
    widest.map(|a| a.index())
}
