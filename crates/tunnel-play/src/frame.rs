use tunnel_model::SharedNote;
use tunnel_rule::{ScoreState, TimingStats};

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Health reached 0.
    Dead,
    /// Every well-formed note has an outcome.
    Complete,
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPhase {
    Idle,
    Playing,
    Paused,
    Finished(FinishReason),
}

impl PlayPhase {
    pub fn is_playing(self) -> bool {
        self == PlayPhase::Playing
    }

    pub fn is_finished(self) -> bool {
        matches!(self, PlayPhase::Finished(_))
    }
}

/// One consistent published frame.
///
/// `notes` shares its entries with the session: an entry whose pointer is
/// unchanged from the previous frame has not changed.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub notes: Vec<SharedNote>,
    pub score: ScoreState,
    pub timing: TimingStats,
    pub current_time_ms: f64,
    pub phase: PlayPhase,
}

/// Consumer of published frames (rendering, HUD, recorders).
pub trait Presenter {
    fn present(&mut self, frame: &FrameSnapshot);
}

impl<F> Presenter for F
where
    F: FnMut(&FrameSnapshot),
{
    fn present(&mut self, frame: &FrameSnapshot) {
        self(frame)
    }
}

/// Presenter that drops every frame.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &FrameSnapshot) {}
}
