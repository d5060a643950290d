use serde::{Deserialize, Serialize};

use tunnel_model::AccuracyTier;

use crate::game_config::GameConfig;
use crate::judge::ScoreChange;

/// Life state derived from health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Life {
    Alive,
    Dead,
}

/// Running totals for a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Always within `[0, max_health]`.
    pub health: i32,
    pub miss_count: u32,
    pub perfect_count: u32,
    pub great_count: u32,
    pub normal_count: u32,
}

impl ScoreState {
    pub fn initial(max_health: i32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            health: max_health,
            miss_count: 0,
            perfect_count: 0,
            great_count: 0,
            normal_count: 0,
        }
    }

    /// Successful completions so far.
    pub fn hit_count(&self) -> u32 {
        self.perfect_count + self.great_count + self.normal_count
    }
}

/// Score, combo and health ledger.
///
/// Mutated only through judgement results. Once health reaches 0 the ledger
/// is dead: hits no longer add score, misses are still counted, and health
/// stays clamped at 0.
#[derive(Debug, Clone)]
pub struct ScoreLedger {
    state: ScoreState,
    max_health: i32,
    miss_penalty: i32,
    hit_gain: i32,
}

impl ScoreLedger {
    pub fn new(config: &GameConfig) -> Self {
        let max_health = config.max_health.max(1);
        Self {
            state: ScoreState::initial(max_health),
            max_health,
            miss_penalty: config.miss_health_penalty.max(0),
            hit_gain: config.hit_health_gain.max(0),
        }
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn life(&self) -> Life {
        if self.state.health == 0 {
            Life::Dead
        } else {
            Life::Alive
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life() == Life::Dead
    }

    /// Apply a failure: health penalty, combo reset, miss counted.
    pub fn record_miss(&mut self) -> ScoreState {
        self.state.health = self.state.health.saturating_sub(self.miss_penalty).clamp(0, self.max_health);
        self.state.combo = 0;
        self.state.miss_count = self.state.miss_count.saturating_add(1);
        self.state
    }

    /// Apply a success worth `points`.
    pub fn record_hit(&mut self, points: u32) -> ScoreState {
        if self.is_dead() {
            return self.state;
        }
        self.state.score = self.state.score.saturating_add(u64::from(points));
        self.state.combo = self.state.combo.saturating_add(1);
        self.state.max_combo = self.state.max_combo.max(self.state.combo);
        self.state.health = self.state.health.saturating_add(self.hit_gain).min(self.max_health);
        self.state
    }

    /// Apply the score effect of one judgement.
    pub fn apply(&mut self, change: &ScoreChange) -> ScoreState {
        match *change {
            ScoreChange::None => self.state,
            ScoreChange::Miss => self.record_miss(),
            ScoreChange::Hit { points, tier, .. } => {
                if !self.is_dead() {
                    let counter = match tier {
                        AccuracyTier::Perfect => &mut self.state.perfect_count,
                        AccuracyTier::Great => &mut self.state.great_count,
                        AccuracyTier::Normal => &mut self.state.normal_count,
                    };
                    *counter = counter.saturating_add(1);
                }
                self.record_hit(points)
            }
        }
    }

    /// Restore initial values.
    pub fn reset(&mut self) {
        self.state = ScoreState::initial(self.max_health);
    }
}
