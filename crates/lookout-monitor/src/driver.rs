//! Tick loop around the lookout engine

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use head_tracking::OrientationSource;
use lookout_config::EngineSettings;
use lookout_engine::{AlarmEvent, LookoutEngine, ResetReason, TickInput};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::control::{ControlFlags, SessionSignal};

/// Totals for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub warnings: u64,
    pub scans: u64,
}

/// Drives the engine at a fixed cadence.
///
/// The engine, the orientation source and the session signal are owned by
/// the driver task; other threads reach it only through [`ControlFlags`].
pub struct EngineDriver<S, A> {
    engine: LookoutEngine,
    source: S,
    session: A,
    control: Arc<ControlFlags>,
    tick_interval: Duration,
    idle_interval: Duration,
    summary: RunSummary,
}

impl<S: OrientationSource, A: SessionSignal> EngineDriver<S, A> {
    pub fn new(
        engine: LookoutEngine,
        source: S,
        session: A,
        control: Arc<ControlFlags>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            engine,
            source,
            session,
            control,
            tick_interval: Duration::from_millis(settings.tick_interval_ms.max(1)),
            idle_interval: Duration::from_millis(settings.idle_poll_interval_ms.max(1)),
            summary: RunSummary::default(),
        }
    }

    pub fn engine(&self) -> &LookoutEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Run one tick with an explicit elapsed time
    pub fn run_once(&mut self, dt_ms: f64) -> Vec<AlarmEvent> {
        let mut events = Vec::new();

        if self.control.take_recenter() {
            info!("Recentering forward reference");
            self.source.recenter();
        }
        if self.control.take_flight_ended() {
            info!("Flight ended, resetting all alarms");
            events.extend(self.engine.reset_all(ResetReason::FlightEnded));
        }

        let active = self.session.is_active();
        let sample = if active { self.source.sample() } else { None };
        events.extend(self.engine.step(TickInput {
            sample,
            active,
            dt_ms,
        }));

        self.summary.ticks += 1;
        for event in &events {
            match event {
                AlarmEvent::WarningStarted { .. } => self.summary.warnings += 1,
                AlarmEvent::ScanCompleted { .. } => self.summary.scans += 1,
                _ => {}
            }
            if event.is_resource_problem() {
                warn!(alarm = ?event.alarm(), event = ?event, "Alarm sound problem");
            }
        }
        events
    }

    /// Tick until `shutdown` resolves or the source runs dry.
    ///
    /// Every alarm is reset on exit so no sound outlives the loop.
    pub async fn run<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            "Engine driver started ({} ms tick, {} ms idle poll)",
            self.tick_interval.as_millis(),
            self.idle_interval.as_millis()
        );

        let mut last = Instant::now();
        loop {
            let period = if self.session.is_active() {
                self.tick_interval
            } else {
                self.idle_interval
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(period) => {}
            }

            let now = Instant::now();
            let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
            last = now;

            self.run_once(dt_ms);

            if self.source.is_exhausted() {
                info!("Orientation source exhausted");
                break;
            }
        }

        self.engine.reset_all(ResetReason::Shutdown);
        debug!(summary = ?self.summary, "Engine driver stopped");
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{AlwaysActive, SharedSessionFlag};
    use crate::feed::LineFeedSource;
    use alarm_audio::MockAudioSink;
    use head_tracking::{OrientationSample, ScriptedSource, TrackingReference};
    use lookout_config::{AlarmConfig, Settings};

    /// Forward forever
    struct Steady;

    impl OrientationSource for Steady {
        fn sample(&mut self) -> Option<OrientationSample> {
            Some(OrientationSample::FORWARD)
        }

        fn recenter(&mut self) {}
    }

    fn settings() -> Settings {
        Settings {
            alarms: vec![AlarmConfig {
                min_vertical_angle_up_deg: 0.0,
                max_time_ms: 2_000,
                ..AlarmConfig::frequent()
            }],
            ..Default::default()
        }
    }

    fn driver<S: OrientationSource, A: SessionSignal>(
        source: S,
        session: A,
    ) -> (EngineDriver<S, A>, Arc<MockAudioSink>, Arc<ControlFlags>) {
        let settings = settings();
        let mock = Arc::new(MockAudioSink::new());
        let engine = LookoutEngine::new(&settings, mock.clone()).unwrap();
        let control = ControlFlags::new();
        let driver = EngineDriver::new(engine, source, session, control.clone(), &settings.engine);
        (driver, mock, control)
    }

    #[test]
    fn test_recenter_forwarded_once() {
        let (mut driver, _mock, control) = driver(ScriptedSource::hold(OrientationSample::FORWARD, 10), AlwaysActive);

        control.request_recenter();
        driver.run_once(50.0);
        driver.run_once(50.0);

        assert_eq!(driver.source().recenter_count(), 1);
    }

    #[test]
    fn test_flight_ended_resets_alarms() {
        let (mut driver, mock, control) = driver(Steady, AlwaysActive);
        for _ in 0..40 {
            driver.run_once(50.0);
        }
        assert!(driver.engine().alarm(0).unwrap().state().warning_active);

        control.signal_flight_ended();
        let events = driver.run_once(50.0);

        assert!(events.iter().any(|e| matches!(
            e,
            AlarmEvent::AlarmReset {
                reason: ResetReason::FlightEnded,
                ..
            }
        )));
        assert!(!driver.engine().alarm(0).unwrap().state().warning_active);
        assert_eq!(mock.playing_count(), 0);
    }

    #[test]
    fn test_inactive_session_does_not_poll_source() {
        let session = SharedSessionFlag::new(false);
        let (mut driver, _mock, _control) = driver(ScriptedSource::hold(OrientationSample::FORWARD, 5), session.clone());

        driver.run_once(1_000.0);
        assert_eq!(driver.source().remaining(), 5);

        session.set(true);
        driver.run_once(50.0);
        assert_eq!(driver.source().remaining(), 4);
    }

    #[test]
    fn test_sound_fallback_returned_to_host() {
        let mut settings = settings();
        settings.alarms[0].audio_ref = "horn.ogg".to_string();
        let mock = Arc::new(MockAudioSink::new());
        mock.set_missing("horn.ogg");
        let engine = LookoutEngine::new(&settings, mock.clone()).unwrap();
        let mut driver = EngineDriver::new(engine, Steady, AlwaysActive, ControlFlags::new(), &settings.engine);

        let events: Vec<AlarmEvent> = (0..40).flat_map(|_| driver.run_once(50.0)).collect();

        let problems: Vec<&AlarmEvent> = events.iter().filter(|e| e.is_resource_problem()).collect();
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            problems[0],
            AlarmEvent::SoundFallback { requested, .. } if requested == "horn.ogg"
        ));
        assert_eq!(problems[0].alarm(), Some(0));

        let id = driver.engine().alarm(0).unwrap().state().sound.as_ref().unwrap().id();
        assert_eq!(mock.sound_of(id).as_deref(), Some(settings.engine.default_sound.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_feed_does_not_block_shutdown() {
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let source = LineFeedSource::new(rx, TrackingReference::default());
        let (mut driver, _mock, _control) = driver(source, AlwaysActive);

        let summary = driver.run(tokio::time::sleep(Duration::from_millis(1_025))).await;

        assert_eq!(summary.ticks, 20);
        assert_eq!(summary.warnings, 0);
        assert!(!driver.source().is_exhausted());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_source_exhausted() {
        let (mut driver, _mock, _control) = driver(ScriptedSource::hold(OrientationSample::FORWARD, 20), AlwaysActive);

        let summary = driver.run(std::future::pending::<()>()).await;

        assert_eq!(summary.ticks, 20);
        let now = driver.engine().now_ms();
        assert!((now - 1_000.0).abs() < 1.0, "now = {now}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_sounds() {
        let (mut driver, mock, _control) = driver(Steady, AlwaysActive);

        let summary = driver.run(tokio::time::sleep(Duration::from_secs(5))).await;

        assert_eq!(summary.warnings, 1);
        assert!(mock.play_count() >= 1);
        assert_eq!(mock.playing_count(), 0);
        assert!(!driver.engine().alarm(0).unwrap().state().warning_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_cadence_while_inactive() {
        let (mut driver, _mock, _control) = driver(Steady, SharedSessionFlag::new(false));

        let summary = driver.run(tokio::time::sleep(Duration::from_millis(5_500))).await;

        assert_eq!(summary.ticks, 5);
        assert!(!driver.engine().is_session_active());
    }
}
