use serde::{Deserialize, Serialize};

/// Accuracy tier of a successful hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    Perfect,
    Great,
    Normal,
}

/// Judgement outcome of a note.
///
/// A note holds exactly one outcome. Anything other than `Pending` is final:
/// judgement code never overwrites a completed outcome. `at` is the rounded
/// game time (ms) at which the outcome was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    #[default]
    Pending,
    /// Tap hit, or hold released inside the release window.
    Hit { at: i64, tier: AccuracyTier },
    /// Tap never pressed before its window closed.
    TapMiss { at: i64 },
    /// Tap pressed before its hit window opened.
    TapTooEarly { at: i64 },
    /// Hold never pressed before its miss timeout.
    HoldMiss { at: i64 },
    /// Hold pressed before its press window opened.
    HoldTooEarly { at: i64 },
    /// Hold released outside the release window, or never released.
    HoldReleaseFail { at: i64 },
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_pending() && !self.is_hit()
    }

    /// Time at which the outcome was recorded, `None` while pending.
    pub fn at(&self) -> Option<i64> {
        match *self {
            Outcome::Pending => None,
            Outcome::Hit { at, .. }
            | Outcome::TapMiss { at }
            | Outcome::TapTooEarly { at }
            | Outcome::HoldMiss { at }
            | Outcome::HoldTooEarly { at }
            | Outcome::HoldReleaseFail { at } => Some(at),
        }
    }

    pub fn tier(&self) -> Option<AccuracyTier> {
        match *self {
            Outcome::Hit { tier, .. } => Some(tier),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Hit { .. } => "hit",
            Outcome::TapMiss { .. } => "tapMiss",
            Outcome::TapTooEarly { .. } => "tapTooEarly",
            Outcome::HoldMiss { .. } => "holdMiss",
            Outcome::HoldTooEarly { .. } => "holdTooEarly",
            Outcome::HoldReleaseFail { .. } => "holdReleaseFail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_has_no_timestamp() {
        assert!(Outcome::Pending.is_pending());
        assert_eq!(Outcome::Pending.at(), None);
        assert!(!Outcome::Pending.is_failure());
    }

    #[test]
    fn failures_are_not_hits() {
        let failures = [
            Outcome::TapMiss { at: 1 },
            Outcome::TapTooEarly { at: 2 },
            Outcome::HoldMiss { at: 3 },
            Outcome::HoldTooEarly { at: 4 },
            Outcome::HoldReleaseFail { at: 5 },
        ];
        for (i, o) in failures.iter().enumerate() {
            assert!(o.is_failure(), "{} should be a failure", o.label());
            assert!(!o.is_hit());
            assert_eq!(o.at(), Some(i as i64 + 1));
        }
    }

    #[test]
    fn hit_carries_tier() {
        let o = Outcome::Hit {
            at: 1080,
            tier: AccuracyTier::Great,
        };
        assert!(o.is_hit());
        assert_eq!(o.tier(), Some(AccuracyTier::Great));
        assert_eq!(o.at(), Some(1080));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Outcome::TapMiss { at: 1260 }).unwrap();
        assert_eq!(json, r#"{"kind":"tapMiss","at":1260}"#);
    }
}
