use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lane::Lane;
use crate::outcome::Outcome;

/// Notes are shared between the session and published frames. A judgement
/// replaces the affected `Arc`; untouched notes stay pointer-identical.
pub type SharedNote = Arc<Note>;

/// Round a game time to the integer millisecond recorded on a note.
pub fn round_ms(time_ms: f64) -> i64 {
    time_ms.round() as i64
}

/// Tap vs hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoteKind {
    #[serde(rename = "TAP")]
    Tap,
    #[serde(rename = "HOLD")]
    Hold {
        /// Sustain length in milliseconds.
        duration: f64,
    },
}

/// One timed gameplay event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Stable identifier, unique within a chart.
    pub id: String,
    #[serde(flatten)]
    pub kind: NoteKind,
    /// Raw lane number. Kept raw so a bad beatmap entry survives loading
    /// and is simply never judged.
    pub lane: i32,
    /// Scheduled arrival at the judgement line (ms).
    pub time: f64,
    #[serde(default)]
    pub outcome: Outcome,
    /// Hold press time (ms), set by a valid hold start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub press_hold_time: Option<i64>,
    /// Hold release time (ms), set when the release is judged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<i64>,
}

impl Note {
    pub fn tap(id: impl Into<String>, lane: Lane, time: f64) -> Self {
        Self::new(id, NoteKind::Tap, lane.raw(), time)
    }

    pub fn hold(id: impl Into<String>, lane: Lane, time: f64, duration: f64) -> Self {
        Self::new(id, NoteKind::Hold { duration }, lane.raw(), time)
    }

    /// Build a note from a raw lane number, which may be out of range.
    pub fn new(id: impl Into<String>, kind: NoteKind, lane: i32, time: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            lane,
            time,
            outcome: Outcome::Pending,
            press_hold_time: None,
            release_time: None,
        }
    }

    pub fn is_tap(&self) -> bool {
        matches!(self.kind, NoteKind::Tap)
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    /// Hold duration in ms, `None` for taps.
    pub fn duration(&self) -> Option<f64> {
        match self.kind {
            NoteKind::Tap => None,
            NoteKind::Hold { duration } => Some(duration),
        }
    }

    pub fn lane(&self) -> Option<Lane> {
        Lane::from_raw(self.lane)
    }

    /// No outcome recorded yet.
    pub fn is_active(&self) -> bool {
        self.outcome.is_pending()
    }

    pub fn is_completed(&self) -> bool {
        !self.is_active()
    }

    /// Lane in range, finite time, and (for holds) a finite non-negative
    /// duration. Malformed notes are never pressable and never auto-failed.
    pub fn is_well_formed(&self) -> bool {
        if self.lane().is_none() || !self.time.is_finite() {
            return false;
        }
        match self.kind {
            NoteKind::Tap => true,
            NoteKind::Hold { duration } => duration.is_finite() && duration >= 0.0,
        }
    }

    /// Hold has been pressed and is waiting for its release.
    pub fn is_holding(&self) -> bool {
        self.is_hold() && self.is_active() && self.press_hold_time.is_some()
    }

    pub fn hit_time(&self) -> Option<i64> {
        match self.outcome {
            Outcome::Hit { at, .. } => Some(at),
            _ => None,
        }
    }

    pub fn failure_time(&self) -> Option<i64> {
        if self.outcome.is_failure() {
            self.outcome.at()
        } else {
            None
        }
    }

    /// Clear all judgement state (restart).
    pub fn reset(&mut self) {
        self.outcome = Outcome::Pending;
        self.press_hold_time = None;
        self.release_time = None;
    }
}
