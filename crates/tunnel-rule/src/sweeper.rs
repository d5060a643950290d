//! Per-frame auto-fail detection.
//!
//! Fails notes whose timing window elapsed without qualifying input. Runs
//! over active notes only, so a note completed by input earlier in the same
//! frame is skipped.

use tunnel_model::{Note, NoteKind, Outcome, SharedNote, round_ms};

use crate::game_config::GameConfig;
use crate::judge::Judgement;

/// A note the sweep failed, with its position in the swept slice.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoFail {
    pub index: usize,
    pub judgement: Judgement,
}

/// Auto-fail check for one note. At most one failure kind applies.
pub fn check_auto_fail(note: &Note, now: f64, config: &GameConfig) -> Option<Judgement> {
    if !note.is_active() || !note.is_well_formed() || !now.is_finite() {
        return None;
    }
    let at = round_ms(now);
    match note.kind {
        NoteKind::Tap => {
            let deadline = note.time + config.tap_hit_window_ms + config.tap_failure_buffer_ms;
            (now > deadline).then(|| Judgement::failure(note, Outcome::TapMiss { at }))
        }
        NoteKind::Hold { duration } => match note.press_hold_time {
            None => {
                let deadline = note.time + config.hold_miss_timeout_ms;
                (now > deadline).then(|| Judgement::failure(note, Outcome::HoldMiss { at }))
            }
            Some(pressed) => {
                let deadline = pressed as f64 + duration + config.hold_release_offset_ms;
                (now > deadline).then(|| Judgement::failure(note, Outcome::HoldReleaseFail { at }))
            }
        },
    }
}

/// Scan all notes at `now`, returning failures in slice order.
pub fn sweep(notes: &[SharedNote], now: f64, config: &GameConfig) -> Vec<AutoFail> {
    notes
        .iter()
        .enumerate()
        .filter_map(|(index, note)| {
            if note.is_active() && !note.is_well_formed() {
                log::trace!("sweep skips malformed note {}", note.id);
                return None;
            }
            check_auto_fail(note, now, config).map(|judgement| AutoFail { index, judgement })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::judge::ScoreChange;
    use tunnel_model::Lane;

    #[test]
    fn tap_fails_after_window_and_buffer() {
        let c = GameConfig::default();
        let note = Note::tap("t", Lane::Pad0, 1000.0);
        assert!(check_auto_fail(&note, 1250.0, &c).is_none());
        let j = check_auto_fail(&note, 1260.0, &c).unwrap();
        assert_eq!(j.note.outcome, Outcome::TapMiss { at: 1260 });
        assert_eq!(j.note.failure_time(), Some(1260));
        assert_eq!(j.score_change, ScoreChange::Miss);
        assert!(!j.success);
    }

    #[test]
    fn unpressed_hold_fails_after_timeout() {
        let c = GameConfig::default();
        let note = Note::hold("h", Lane::Pad1, 2000.0, 1000.0);
        assert!(check_auto_fail(&note, 2250.0, &c).is_none());
        let j = check_auto_fail(&note, 2251.0, &c).unwrap();
        assert_eq!(j.note.outcome, Outcome::HoldMiss { at: 2251 });
    }

    #[test]
    fn pressed_hold_fails_when_never_released() {
        let c = GameConfig::default();
        let mut note = Note::hold("h", Lane::Pad1, 2000.0, 1000.0);
        note.press_hold_time = Some(2050);
        // Pressed holds are not subject to the press timeout
        assert!(check_auto_fail(&note, 2400.0, &c).is_none());
        assert!(check_auto_fail(&note, 3200.0, &c).is_none());
        let j = check_auto_fail(&note, 3201.0, &c).unwrap();
        assert_eq!(j.note.outcome, Outcome::HoldReleaseFail { at: 3201 });
        assert_eq!(j.note.release_time, None);
    }

    #[test]
    fn completed_notes_are_skipped() {
        let c = GameConfig::default();
        let mut note = Note::tap("t", Lane::Pad0, 1000.0);
        note.outcome = Outcome::TapMiss { at: 1260 };
        assert!(check_auto_fail(&note, 5000.0, &c).is_none());
    }

    #[test]
    fn malformed_notes_never_fail() {
        let c = GameConfig::default();
        let note = Note::new("x", NoteKind::Tap, -7, 1000.0);
        assert!(check_auto_fail(&note, 1_000_000.0, &c).is_none());
        let note = Note::tap("y", Lane::Pad0, f64::INFINITY);
        assert!(check_auto_fail(&note, 1_000_000.0, &c).is_none());
    }

    #[test]
    fn sweep_reports_in_slice_order() {
        let c = GameConfig::default();
        let notes: Vec<SharedNote> = vec![
            Arc::new(Note::tap("c", Lane::Pad2, 900.0)),
            Arc::new(Note::tap("future", Lane::Pad0, 5000.0)),
            Arc::new(Note::tap("a", Lane::Pad0, 800.0)),
        ];
        let failed = sweep(&notes, 1300.0, &c);
        let indices: Vec<usize> = failed.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(failed[1].judgement.note.id, "a");
    }
}
