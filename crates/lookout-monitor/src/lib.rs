//! Lookout Monitor
//!
//! Runs the lookout engine against an orientation source at a fixed tick
//! rate, with host signals for session activity, recentering and end of
//! flight. Live poses arrive through a channel-fed [`LineFeedSource`].

pub mod control;
pub mod driver;
pub mod feed;

pub use control::{AlwaysActive, ControlFlags, SessionSignal, SharedSessionFlag};
pub use driver::{EngineDriver, RunSummary};
pub use feed::LineFeedSource;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `debug` when verbose, else `info`.
pub fn init_logging(verbose: bool, json: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
