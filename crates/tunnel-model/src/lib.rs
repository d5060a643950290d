// Note data model: lanes, note kinds, judgement outcomes

mod lane;
mod note;
mod outcome;

pub use lane::{LANE_COUNT, Lane};
pub use note::{Note, NoteKind, SharedNote, round_ms};
pub use outcome::{AccuracyTier, Outcome};
