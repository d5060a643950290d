//! Autoplay driver that plays a chart through the normal input path.

use tunnel_model::{LANE_COUNT, Lane, Note, NoteKind};

use crate::session::PlaySession;

/// Which lanes autoplay handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayMode {
    #[default]
    Off,
    Full,
    /// Only the two deck lanes are automated.
    AssistDecks,
    /// Only the four pad lanes are automated.
    AssistPads,
}

impl AutoplayMode {
    pub fn handles_lane(self, lane: Lane) -> bool {
        match self {
            AutoplayMode::Off => false,
            AutoplayMode::Full => true,
            AutoplayMode::AssistDecks => lane.is_deck(),
            AutoplayMode::AssistPads => !lane.is_deck(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AutoplayEvent {
    time_ms: f64,
    lane: Lane,
    is_press: bool,
}

/// Pre-computed press/release schedule fed to a [`PlaySession`] as game time
/// reaches each event.
pub struct Autoplay {
    events: Vec<AutoplayEvent>,
    current_index: usize,
    lane_states: [bool; LANE_COUNT],
}

impl Autoplay {
    /// How long a tap is held (ms).
    pub const TAP_PRESS_DURATION_MS: f64 = 50.0;

    pub fn new<'a>(mode: AutoplayMode, notes: impl IntoIterator<Item = &'a Note>) -> Self {
        Self {
            events: Self::build_events(mode, notes),
            current_index: 0,
            lane_states: [false; LANE_COUNT],
        }
    }

    fn build_events<'a>(
        mode: AutoplayMode,
        notes: impl IntoIterator<Item = &'a Note>,
    ) -> Vec<AutoplayEvent> {
        let mut events = Vec::new();
        for note in notes {
            if !note.is_well_formed() {
                continue;
            }
            let Some(lane) = note.lane() else {
                continue;
            };
            if !mode.handles_lane(lane) {
                continue;
            }
            let release_ms = match note.kind {
                NoteKind::Tap => note.time + Self::TAP_PRESS_DURATION_MS,
                NoteKind::Hold { duration } => note.time + duration,
            };
            events.push(AutoplayEvent {
                time_ms: note.time,
                lane,
                is_press: true,
            });
            events.push(AutoplayEvent {
                time_ms: release_ms,
                lane,
                is_press: false,
            });
        }
        // Releases first at equal times so back-to-back notes get a fresh press
        events.sort_by(|a, b| {
            a.time_ms
                .total_cmp(&b.time_ms)
                .then(a.is_press.cmp(&b.is_press))
        });
        events
    }

    /// Events not yet fed to a session.
    pub fn remaining(&self) -> usize {
        self.events.len() - self.current_index
    }

    pub fn is_pressed(&self, lane: Lane) -> bool {
        self.lane_states[lane.index()]
    }

    /// Feed every event due at the session's current time. Returns the
    /// number of judgements committed.
    pub fn update(&mut self, session: &mut PlaySession) -> usize {
        if !session.phase().is_playing() {
            return 0;
        }
        let now = session.current_time();
        let mut committed = 0;
        while let Some(event) = self.events.get(self.current_index) {
            if event.time_ms > now {
                break;
            }
            let lane = event.lane;
            let held = &mut self.lane_states[lane.index()];
            if event.is_press {
                if !*held && session.press(lane) {
                    committed += 1;
                }
                *held = true;
            } else {
                if *held && session.release(lane) {
                    committed += 1;
                }
                *held = false;
            }
            self.current_index += 1;
        }
        committed
    }

    /// Rewind to the start of the chart with every lane released.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.lane_states = [false; LANE_COUNT];
    }
}
