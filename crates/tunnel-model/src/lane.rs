use serde::{Deserialize, Serialize};

/// Total number of input lanes (4 pads + 2 decks).
pub const LANE_COUNT: usize = 6;

/// One of the six input zones a note can belong to.
///
/// Pads map to raw lane numbers 0..=3, decks to -1 and -2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Lane {
    DeckLeft,
    DeckRight,
    Pad0,
    Pad1,
    Pad2,
    Pad3,
}

impl Lane {
    /// Returns all lanes in order (decks first, then pads).
    pub fn all() -> &'static [Lane] {
        &[
            Lane::DeckLeft,
            Lane::DeckRight,
            Lane::Pad0,
            Lane::Pad1,
            Lane::Pad2,
            Lane::Pad3,
        ]
    }

    /// Convert from the raw lane number used in beatmaps.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -2 => Some(Lane::DeckLeft),
            -1 => Some(Lane::DeckRight),
            0 => Some(Lane::Pad0),
            1 => Some(Lane::Pad1),
            2 => Some(Lane::Pad2),
            3 => Some(Lane::Pad3),
            _ => None,
        }
    }

    /// Raw lane number as written in beatmaps.
    pub fn raw(self) -> i32 {
        match self {
            Lane::DeckLeft => -2,
            Lane::DeckRight => -1,
            Lane::Pad0 => 0,
            Lane::Pad1 => 1,
            Lane::Pad2 => 2,
            Lane::Pad3 => 3,
        }
    }

    /// Index for per-lane arrays (0..LANE_COUNT).
    pub fn index(self) -> usize {
        (self.raw() + 2) as usize
    }

    pub fn is_deck(self) -> bool {
        matches!(self, Lane::DeckLeft | Lane::DeckRight)
    }
}

impl TryFrom<i32> for Lane {
    type Error = String;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Lane::from_raw(raw).ok_or_else(|| format!("invalid lane number: {raw}"))
    }
}

impl From<Lane> for i32 {
    fn from(lane: Lane) -> i32 {
        lane.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip_for_all_lanes() {
        for &lane in Lane::all() {
            assert_eq!(Lane::from_raw(lane.raw()), Some(lane));
        }
    }

    #[test]
    fn out_of_range_raw_lanes_are_rejected() {
        assert_eq!(Lane::from_raw(-3), None);
        assert_eq!(Lane::from_raw(4), None);
        assert_eq!(Lane::from_raw(i32::MAX), None);
    }

    #[test]
    fn indices_are_dense() {
        let mut seen = [false; LANE_COUNT];
        for &lane in Lane::all() {
            seen[lane.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn deck_lanes() {
        assert!(Lane::DeckLeft.is_deck());
        assert!(Lane::DeckRight.is_deck());
        assert!(!Lane::Pad2.is_deck());
    }
}
