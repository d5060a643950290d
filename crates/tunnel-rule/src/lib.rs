// Judge windows, judgement rules, auto-fail sweep, score ledger

pub mod game_config;
pub mod judge;
mod ledger;
pub mod sweeper;
mod timing_stats;
pub mod validator;

pub use game_config::GameConfig;
pub use judge::{Judgement, ScoreChange, process_hold_end, process_hold_start, process_tap_hit};
pub use ledger::{Life, ScoreLedger, ScoreState};
pub use sweeper::{AutoFail, check_auto_fail, sweep};
pub use timing_stats::{EXACT_THRESHOLD_MS, TimingStats};
