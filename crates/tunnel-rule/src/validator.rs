//! Read-only queries over the note collection.
//!
//! Nothing here writes to a note. Malformed notes (see
//! [`Note::is_well_formed`]) are never pressable.

use tunnel_model::{Lane, Note, NoteKind, SharedNote, round_ms};

use crate::game_config::GameConfig;

/// True iff the note has no outcome recorded.
pub fn is_active(note: &Note) -> bool {
    note.is_active()
}

/// Whether a press on `lane` at `now` would be judged against this note.
///
/// Inside `[time - window, time + window]` (inclusive) the press is in the
/// hit window. Before that, an approaching note still takes the press while
/// it is within `window + early_press_tolerance` and already visible
/// (`effective_lead_time`); such presses are judged too early.
pub fn is_pressable(
    note: &Note,
    lane: Lane,
    now: f64,
    effective_lead_time: f64,
    config: &GameConfig,
) -> bool {
    if !note.is_active() || !note.is_well_formed() || !now.is_finite() {
        return false;
    }
    if note.lane != lane.raw() {
        return false;
    }
    let window = match note.kind {
        NoteKind::Tap => config.tap_hit_window_ms,
        NoteKind::Hold { .. } => {
            if note.press_hold_time.is_some() {
                // Already held; only its release is pending
                return false;
            }
            config.hold_hit_window_ms
        }
    };

    let delta = now - note.time;
    if delta.abs() <= window {
        return true;
    }
    let ahead = -delta;
    ahead > 0.0 && ahead <= window + config.early_press_tolerance_ms && ahead <= effective_lead_time
}

/// The pressable note on `lane` closest to `now`.
///
/// Ties go to the earlier scheduled note, then to array order.
pub fn find_pressable_note<'a>(
    notes: &'a [SharedNote],
    lane: Lane,
    now: f64,
    effective_lead_time: f64,
    config: &GameConfig,
) -> Option<&'a SharedNote> {
    let mut best: Option<(&SharedNote, f64)> = None;
    for note in notes {
        if !is_pressable(note, lane, now, effective_lead_time, config) {
            continue;
        }
        let dist = (note.time - now).abs();
        let better = match best {
            None => true,
            Some((current, best_dist)) => {
                dist < best_dist || (dist == best_dist && note.time < current.time)
            }
        };
        if better {
            best = Some((note, dist));
        }
    }
    best.map(|(note, _)| note)
}

/// The pressed, not yet completed hold on `lane`.
///
/// Only holds pressed at or before `now` qualify; with several (a malformed
/// chart with overlapping holds) the earliest press wins.
pub fn find_active_hold_note(notes: &[SharedNote], lane: Lane, now: f64) -> Option<&SharedNote> {
    let now_ms = round_ms(now);
    notes
        .iter()
        .filter(|n| n.lane == lane.raw() && n.is_well_formed() && n.is_holding())
        .filter(|n| n.press_hold_time.is_some_and(|p| p <= now_ms))
        .min_by_key(|n| n.press_hold_time)
}

pub fn active_notes(notes: &[SharedNote]) -> impl Iterator<Item = &SharedNote> {
    notes.iter().filter(|n| n.is_active())
}

pub fn completed_notes(notes: &[SharedNote]) -> impl Iterator<Item = &SharedNote> {
    notes.iter().filter(|n| n.is_completed())
}

pub fn active_notes_on_lane(notes: &[SharedNote], lane: Lane) -> impl Iterator<Item = &SharedNote> {
    notes
        .iter()
        .filter(move |n| n.is_active() && n.lane == lane.raw())
}
