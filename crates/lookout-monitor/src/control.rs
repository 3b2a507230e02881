//! Cross-thread signals consumed by the driver

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot requests from the host.
///
/// Each flag is set by the host and consumed once at the start of the next
/// tick, never mid-tick.
#[derive(Debug, Default)]
pub struct ControlFlags {
    recenter: AtomicBool,
    flight_ended: AtomicBool,
}

impl ControlFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ask the orientation source to take the current pose as forward
    pub fn request_recenter(&self) {
        self.recenter.store(true, Ordering::Release);
    }

    /// Report that the simulated flight ended
    pub fn signal_flight_ended(&self) {
        self.flight_ended.store(true, Ordering::Release);
    }

    pub(crate) fn take_recenter(&self) -> bool {
        self.recenter.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn take_flight_ended(&self) -> bool {
        self.flight_ended.swap(false, Ordering::AcqRel)
    }
}

/// Whether the engine should run this tick
pub trait SessionSignal: Send {
    fn is_active(&self) -> bool;
}

/// Session that is always running
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl SessionSignal for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

/// Session state written by a host detector (simulator process, window,
/// HMD presence) and read by the driver
#[derive(Debug, Clone, Default)]
pub struct SharedSessionFlag {
    active: Arc<AtomicBool>,
}

impl SharedSessionFlag {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(active)),
        }
    }

    pub fn set(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

impl SessionSignal for SharedSessionFlag {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
