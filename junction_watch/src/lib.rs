// THEORY:
// This file is the main entry point for the `junction_watch` library crate.
// It defines the public API consumed by the visualizer server and the feed
// tester binary.
//
// The high-level interface is the `Dashboard` (synchronous state and the
// operations the view can trigger) and the `Monitor` (the async shell that
// owns the timers). The `core_modules` hold the individual pieces: junction
// records, the refresh strategies, the violation log, the chat transcript and
// the rendered camera feed. Nothing here measures real traffic; every number
// on screen is drawn from a random generator.

pub mod clock;
pub mod config;
pub mod core_modules;
pub mod dashboard;
pub mod error;
pub mod monitor;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Snapshot, Stats};
pub use error::{JunctionWatchError, Result};
pub use monitor::{EncodedFrame, FrameSink, Monitor};
