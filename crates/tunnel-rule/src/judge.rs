//! Judgement rules for a single note event.
//!
//! Each rule takes a note by reference and returns the updated copy plus its
//! score effect. Nothing is written back here; the caller commits the
//! result. A rule returns `None` when it does not apply: the note is already
//! completed, malformed, of the wrong kind, or `now` is not finite. That makes
//! re-processing a completed note a no-op.

use tunnel_model::{AccuracyTier, Note, Outcome, round_ms};

use crate::game_config::GameConfig;

/// Effect of a judgement on the score ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreChange {
    /// No score effect (valid hold start, credit deferred to release).
    None,
    /// Successful completion.
    Hit {
        points: u32,
        tier: AccuracyTier,
        /// Signed timing error of the judged event (ms, positive = late).
        delta_ms: f64,
    },
    /// Failure: health penalty, combo reset, miss counted.
    Miss,
}

/// Result of applying a rule to one note.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub note: Note,
    pub score_change: ScoreChange,
    pub success: bool,
}

impl Judgement {
    /// Record a failure outcome on a copy of `note`.
    pub fn failure(note: &Note, outcome: Outcome) -> Self {
        debug_assert!(outcome.is_failure());
        let mut note = note.clone();
        note.outcome = outcome;
        Self {
            note,
            score_change: ScoreChange::Miss,
            success: false,
        }
    }

    fn hit(mut note: Note, now: f64, delta_ms: f64, config: &GameConfig) -> Self {
        let tier = config.tier_for(delta_ms);
        note.outcome = Outcome::Hit {
            at: round_ms(now),
            tier,
        };
        Self {
            note,
            score_change: ScoreChange::Hit {
                points: config.points_for(tier),
                tier,
                delta_ms,
            },
            success: true,
        }
    }
}

fn judgeable(note: &Note, now: f64) -> bool {
    note.is_active() && note.is_well_formed() && now.is_finite()
}

/// Judge a press on a tap note.
///
/// Early presses outside the hit window fail as too early. Anything else is
/// a hit, scored by accuracy tier; a late press past the window (inside the
/// failure buffer) counts at the normal tier.
pub fn process_tap_hit(note: &Note, now: f64, config: &GameConfig) -> Option<Judgement> {
    if !note.is_tap() || !judgeable(note, now) {
        return None;
    }
    let delta = now - note.time;
    if delta < -config.tap_hit_window_ms {
        return Some(Judgement::failure(
            note,
            Outcome::TapTooEarly { at: round_ms(now) },
        ));
    }
    Some(Judgement::hit(note.clone(), now, delta, config))
}

/// Judge the press that starts a hold.
///
/// A valid press only records `press_hold_time`; points are awarded on
/// release.
pub fn process_hold_start(note: &Note, now: f64, config: &GameConfig) -> Option<Judgement> {
    if !note.is_hold() || note.press_hold_time.is_some() || !judgeable(note, now) {
        return None;
    }
    let delta = now - note.time;
    if delta < -config.hold_hit_window_ms {
        return Some(Judgement::failure(
            note,
            Outcome::HoldTooEarly { at: round_ms(now) },
        ));
    }
    let mut note = note.clone();
    note.press_hold_time = Some(round_ms(now));
    Some(Judgement {
        note,
        score_change: ScoreChange::None,
        success: true,
    })
}

/// Judge the release of a held hold note against `press + duration`.
pub fn process_hold_end(note: &Note, now: f64, config: &GameConfig) -> Option<Judgement> {
    if !judgeable(note, now) {
        return None;
    }
    let (Some(pressed), Some(duration)) = (note.press_hold_time, note.duration()) else {
        return None;
    };
    let expected_release = pressed as f64 + duration;
    let delta = now - expected_release;

    let mut note = note.clone();
    note.release_time = Some(round_ms(now));
    if delta.abs() <= config.hold_release_window_ms {
        Some(Judgement::hit(note, now, delta, config))
    } else {
        Some(Judgement::failure(
            &note,
            Outcome::HoldReleaseFail { at: round_ms(now) },
        ))
    }
}
