// Game clock: reconciles a jittery video time source into a smooth frame time

mod clock;
mod time_source;

pub use clock::{ClockConfig, ClockReconciler};
pub use time_source::{MockWallClock, PollingVideoSource, SystemWallClock, VideoTimeSource, WallClock};
