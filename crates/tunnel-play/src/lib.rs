// Play session: frame orchestration, input commits, autoplay

mod autoplay;
mod frame;
mod play_config;
mod session;

pub use autoplay::{Autoplay, AutoplayMode};
pub use frame::{FinishReason, FrameSnapshot, NullPresenter, PlayPhase, Presenter};
pub use play_config::{MAX_FPS_LIMIT, PlayConfig};
pub use session::PlaySession;
