//! Play session: the per-frame orchestrator.
//!
//! The session is the only writer of the note collection and the score
//! ledger. Frame ticks (clock, auto-fail sweep) and discrete input events
//! (press, release) both compute judgements against the current notes and
//! then go through [`PlaySession::commit`], which re-reads the note by id and
//! drops the judgement if the note moved on in the meantime. That keeps at
//! most one outcome per note.

use std::collections::HashMap;
use std::sync::Arc;

use tunnel_model::{Lane, Note, SharedNote};
use tunnel_rule::{
    AutoFail, Judgement, ScoreLedger, ScoreState, TimingStats, process_hold_end, process_hold_start,
    process_tap_hit, sweep, validator,
};
use tunnel_timing::{ClockReconciler, VideoTimeSource, WallClock};

use crate::frame::{FinishReason, FrameSnapshot, PlayPhase, Presenter};
use crate::play_config::PlayConfig;

pub struct PlaySession {
    config: PlayConfig,
    /// Chart as loaded, all pending. Restart goes back to these.
    initial_notes: Vec<SharedNote>,
    notes: Vec<SharedNote>,
    index_by_id: HashMap<String, usize>,
    ledger: ScoreLedger,
    clock: ClockReconciler,
    timing: TimingStats,
    phase: PlayPhase,
    lost_races: u64,
    last_frame_wall_ms: Option<f64>,
}

impl PlaySession {
    /// Build a session over a chart. Any outcome already recorded on the
    /// input notes is cleared. Notes repeating an earlier id are dropped.
    pub fn new(notes: Vec<Note>, mut config: PlayConfig) -> Self {
        config.validate();

        let mut index_by_id = HashMap::with_capacity(notes.len());
        let mut initial_notes: Vec<SharedNote> = Vec::with_capacity(notes.len());
        for mut note in notes {
            if index_by_id.contains_key(&note.id) {
                log::warn!("dropping note with duplicate id {}", note.id);
                continue;
            }
            if !note.is_well_formed() {
                log::warn!("note {} is malformed and will never be judged", note.id);
            }
            note.reset();
            index_by_id.insert(note.id.clone(), initial_notes.len());
            initial_notes.push(Arc::new(note));
        }

        Self {
            ledger: ScoreLedger::new(&config.game),
            clock: ClockReconciler::new(config.clock.clone()),
            notes: initial_notes.clone(),
            initial_notes,
            index_by_id,
            timing: TimingStats::default(),
            phase: PlayPhase::Idle,
            lost_races: 0,
            last_frame_wall_ms: None,
            config,
        }
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    pub fn notes(&self) -> &[SharedNote] {
        &self.notes
    }

    pub fn note(&self, id: &str) -> Option<&SharedNote> {
        self.index_by_id.get(id).map(|&i| &self.notes[i])
    }

    pub fn score(&self) -> ScoreState {
        self.ledger.state()
    }

    pub fn timing_stats(&self) -> TimingStats {
        self.timing
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_ms()
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    /// Judgements dropped because the note had already moved on.
    pub fn lost_races(&self) -> u64 {
        self.lost_races
    }

    /// Video samples the clock rejected.
    pub fn discarded_samples(&self) -> u64 {
        self.clock.discarded_samples()
    }

    fn set_phase(&mut self, phase: PlayPhase) {
        if self.phase != phase {
            log::info!("play phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Idle -> Playing. `wall_now_ms` becomes the clock's baseline.
    pub fn start(&mut self, wall_now_ms: f64) -> bool {
        if self.phase != PlayPhase::Idle {
            return false;
        }
        self.clock.resync(wall_now_ms);
        self.set_phase(PlayPhase::Playing);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != PlayPhase::Playing {
            return false;
        }
        self.set_phase(PlayPhase::Paused);
        true
    }

    /// Paused -> Playing. The paused gap is not counted as game time.
    pub fn resume(&mut self, wall_now_ms: f64) -> bool {
        if self.phase != PlayPhase::Paused {
            return false;
        }
        self.clock.resync(wall_now_ms);
        self.last_frame_wall_ms = None;
        self.set_phase(PlayPhase::Playing);
        true
    }

    /// Clear every outcome, the ledger, the clock and the stats, and play
    /// again from time 0. Allowed from any phase.
    pub fn restart(&mut self, wall_now_ms: f64) {
        self.notes = self.initial_notes.clone();
        self.ledger.reset();
        self.timing.reset();
        self.clock.reset();
        self.clock.resync(wall_now_ms);
        self.lost_races = 0;
        self.last_frame_wall_ms = None;
        log::info!("restarting play session");
        self.set_phase(PlayPhase::Playing);
    }

    fn frame_due(&mut self, wall_now_ms: f64) -> bool {
        let Some(interval) = self.config.frame_interval_ms() else {
            return true;
        };
        match self.last_frame_wall_ms {
            Some(prev) if wall_now_ms - prev < interval => false,
            _ => {
                self.last_frame_wall_ms = Some(wall_now_ms);
                true
            }
        }
    }

    /// Advance one frame: reconcile time, sweep, commit the failures in
    /// note order, and update the phase. `None` when not playing or when
    /// the frame cap skips this call.
    pub fn tick(&mut self, video_sample_ms: Option<f64>, wall_now_ms: f64) -> Option<FrameSnapshot> {
        if !self.phase.is_playing() || !self.frame_due(wall_now_ms) {
            return None;
        }
        let now = self.clock.reconcile(video_sample_ms, wall_now_ms);

        for AutoFail { judgement, .. } in sweep(&self.notes, now, &self.config.game) {
            log::debug!(
                "auto-fail {} ({}) at {:.0}",
                judgement.note.id,
                judgement.note.outcome.label(),
                now
            );
            self.commit(judgement);
        }

        self.check_finished();
        Some(self.snapshot())
    }

    /// Pull time from the video source and wall clock, tick, and publish.
    /// Returns whether a frame was published.
    pub fn run_frame(
        &mut self,
        source: &mut impl VideoTimeSource,
        wall: &impl WallClock,
        presenter: &mut impl Presenter,
    ) -> bool {
        let sample = source.current_time_ms();
        match self.tick(sample, wall.now_ms()) {
            Some(frame) => {
                presenter.present(&frame);
                true
            }
            None => false,
        }
    }

    fn check_finished(&mut self) {
        if self.ledger.is_dead() {
            self.set_phase(PlayPhase::Finished(FinishReason::Dead));
        } else if self
            .notes
            .iter()
            .filter(|n| n.is_well_formed())
            .all(|n| n.is_completed())
        {
            self.set_phase(PlayPhase::Finished(FinishReason::Complete));
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            notes: self.notes.clone(),
            score: self.ledger.state(),
            timing: self.timing,
            current_time_ms: self.clock.current_ms(),
            phase: self.phase,
        }
    }

    /// Judge a press on `lane` at the current time without committing it.
    pub fn judge_press(&self, lane: Lane) -> Option<Judgement> {
        if !self.phase.is_playing() {
            return None;
        }
        let now = self.current_time();
        let game = &self.config.game;
        let note = validator::find_pressable_note(&self.notes, lane, now, game.lead_time_ms, game)?;
        if note.is_tap() {
            process_tap_hit(note, now, game)
        } else {
            process_hold_start(note, now, game)
        }
    }

    /// Judge a release on `lane` at the current time without committing it.
    pub fn judge_release(&self, lane: Lane) -> Option<Judgement> {
        if !self.phase.is_playing() {
            return None;
        }
        let now = self.current_time();
        let note = validator::find_active_hold_note(&self.notes, lane, now)?;
        process_hold_end(note, now, &self.config.game)
    }

    /// Press input. Returns whether a judgement was committed.
    pub fn press(&mut self, lane: Lane) -> bool {
        self.judge_press(lane).is_some_and(|j| self.commit(j))
    }

    /// Release input. Returns whether a judgement was committed.
    pub fn release(&mut self, lane: Lane) -> bool {
        self.judge_release(lane).is_some_and(|j| self.commit(j))
    }

    /// Write a judgement back, unless the note changed since the judgement
    /// was computed.
    ///
    /// The freshest copy must still be active and its press state must be
    /// the one the judgement started from: unpressed for a hold start,
    /// otherwise the same press the judgement carries. On success only that
    /// note's entry is replaced, and the score change goes to the ledger.
    pub fn commit(&mut self, judgement: Judgement) -> bool {
        let Some(&index) = self.index_by_id.get(&judgement.note.id) else {
            log::warn!("judgement for unknown note {}", judgement.note.id);
            return false;
        };
        let fresh = &self.notes[index];
        let expected_press = if judgement.note.is_active() {
            None
        } else {
            judgement.note.press_hold_time
        };
        if !fresh.is_active() || fresh.press_hold_time != expected_press {
            self.lost_races += 1;
            log::debug!(
                "discarding stale judgement for {} ({} already recorded)",
                fresh.id,
                fresh.outcome.label()
            );
            return false;
        }

        let score = self.ledger.apply(&judgement.score_change);
        self.timing.record(&judgement.score_change);
        log::debug!(
            "commit {} {} combo={} health={}",
            judgement.note.id,
            judgement.note.outcome.label(),
            score.combo,
            score.health
        );
        self.notes[index] = Arc::new(judgement.note);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnel_model::Outcome;

    fn session(notes: Vec<Note>) -> PlaySession {
        let mut s = PlaySession::new(notes, PlayConfig::default());
        s.start(0.0);
        s
    }

    /// Advance the clock to `now` through the local fallback.
    fn tick_to(s: &mut PlaySession, now: f64) -> Option<FrameSnapshot> {
        s.tick(None, now)
    }

    #[test]
    fn idle_session_does_not_tick() {
        let mut s = PlaySession::new(vec![Note::tap("a", Lane::Pad0, 100.0)], PlayConfig::default());
        assert_eq!(s.phase(), PlayPhase::Idle);
        assert!(s.tick(None, 16.0).is_none());
        assert!(!s.press(Lane::Pad0));
    }

    #[test]
    fn phase_transitions() {
        let mut s = PlaySession::new(vec![Note::tap("a", Lane::Pad0, 5000.0)], PlayConfig::default());
        assert!(!s.pause());
        assert!(!s.resume(0.0));
        assert!(s.start(0.0));
        assert!(!s.start(0.0));
        assert!(s.pause());
        assert!(s.tick(None, 16.0).is_none());
        assert!(s.resume(16.0));
        assert!(s.phase().is_playing());
    }

    #[test]
    fn press_hits_tap_at_current_time() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 100.0)]);
        tick_to(&mut s, 110.0);
        assert!(s.press(Lane::Pad0));
        let note = s.note("a").unwrap();
        assert_eq!(note.hit_time(), Some(110));
        assert_eq!(s.score().combo, 1);
        assert_eq!(s.score().perfect_count, 1);
        assert_eq!(s.timing_stats().slow_count, 1);
    }

    #[test]
    fn press_without_pressable_note_does_nothing() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 3000.0)]);
        tick_to(&mut s, 100.0);
        assert!(!s.press(Lane::Pad0));
        assert!(!s.press(Lane::Pad1));
        assert_eq!(s.score(), ScoreState::initial(100));
    }

    #[test]
    fn hold_press_and_release() {
        let mut s = session(vec![Note::hold("h", Lane::DeckLeft, 200.0, 500.0)]);
        tick_to(&mut s, 200.0);
        assert!(s.press(Lane::DeckLeft));
        assert!(!s.press(Lane::DeckLeft), "a held hold takes no second press");
        assert_eq!(s.score().combo, 0);
        tick_to(&mut s, 710.0);
        assert!(s.release(Lane::DeckLeft));
        let note = s.note("h").unwrap();
        assert!(note.outcome.is_hit());
        assert_eq!(note.release_time, Some(710));
        assert_eq!(s.score().combo, 1);
    }

    #[test]
    fn unchanged_notes_keep_identity() {
        let mut s = session(vec![
            Note::tap("a", Lane::Pad0, 100.0),
            Note::tap("b", Lane::Pad1, 5000.0),
        ]);
        let before = tick_to(&mut s, 16.0).unwrap();
        let after = tick_to(&mut s, 400.0).unwrap();
        assert!(!Arc::ptr_eq(&before.notes[0], &after.notes[0]));
        assert!(Arc::ptr_eq(&before.notes[1], &after.notes[1]));
        assert_eq!(after.notes[0].outcome, Outcome::TapMiss { at: 400 });
    }

    #[test]
    fn stale_judgement_is_discarded() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 100.0)]);
        tick_to(&mut s, 100.0);
        let first = s.judge_press(Lane::Pad0).unwrap();
        let second = s.judge_press(Lane::Pad0).unwrap();
        assert!(s.commit(first));
        assert!(!s.commit(second));
        assert_eq!(s.lost_races(), 1);
        assert_eq!(s.score().combo, 1);
        assert_eq!(s.score().score, 300);
    }

    #[test]
    fn second_hold_start_is_discarded() {
        let mut s = session(vec![Note::hold("h", Lane::Pad3, 100.0, 400.0)]);
        tick_to(&mut s, 100.0);
        let first = s.judge_press(Lane::Pad3).unwrap();
        tick_to(&mut s, 120.0);
        let second = s.judge_press(Lane::Pad3).unwrap();
        assert!(s.commit(first));
        assert!(!s.commit(second));
        assert_eq!(s.note("h").unwrap().press_hold_time, Some(100));
    }

    #[test]
    fn unknown_note_is_not_committed() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 100.0)]);
        let j = Judgement::failure(&Note::tap("zzz", Lane::Pad0, 100.0), Outcome::TapMiss { at: 1 });
        assert!(!s.commit(j));
        assert_eq!(s.score().miss_count, 0);
    }

    #[test]
    fn death_finishes_session() {
        let notes = (0u32..10)
            .map(|i| Note::tap(format!("n{i}"), Lane::Pad0, 100.0 + f64::from(i)))
            .chain(std::iter::once(Note::tap("late", Lane::Pad1, 9000.0)))
            .collect();
        let mut s = session(notes);
        let frame = tick_to(&mut s, 500.0).unwrap();
        assert_eq!(frame.score.health, 0);
        assert_eq!(frame.phase, PlayPhase::Finished(FinishReason::Dead));
        assert!(tick_to(&mut s, 600.0).is_none());
    }

    #[test]
    fn completion_finishes_session() {
        let mut s = session(vec![
            Note::tap("a", Lane::Pad0, 100.0),
            Note::tap("bad", Lane::Pad0, f64::NAN),
        ]);
        tick_to(&mut s, 100.0);
        s.press(Lane::Pad0);
        let frame = tick_to(&mut s, 116.0).unwrap();
        assert_eq!(frame.phase, PlayPhase::Finished(FinishReason::Complete));
        assert!(s.note("bad").unwrap().is_active());
    }

    #[test]
    fn restart_clears_everything() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 100.0)]);
        tick_to(&mut s, 100.0);
        let first = s.judge_press(Lane::Pad0).unwrap();
        s.press(Lane::Pad0);
        s.commit(first);
        tick_to(&mut s, 500.0);
        s.restart(10_000.0);
        assert!(s.phase().is_playing());
        assert_eq!(s.current_time(), 0.0);
        assert_eq!(s.score(), ScoreState::initial(100));
        assert_eq!(s.lost_races(), 0);
        assert_eq!(s.timing_stats().count(), 0);
        assert!(s.note("a").unwrap().is_active());
        assert_eq!(tick_to(&mut s, 10_016.0).unwrap().current_time_ms, 16.0);
    }

    #[test]
    fn new_clears_preloaded_outcomes() {
        let mut note = Note::tap("a", Lane::Pad0, 100.0);
        note.outcome = Outcome::TapMiss { at: 300 };
        let s = PlaySession::new(vec![note], PlayConfig::default());
        assert!(s.note("a").unwrap().is_active());
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let s = PlaySession::new(
            vec![
                Note::tap("a", Lane::Pad0, 100.0),
                Note::tap("a", Lane::Pad1, 200.0),
            ],
            PlayConfig::default(),
        );
        assert_eq!(s.notes().len(), 1);
        assert_eq!(s.note("a").unwrap().lane, Lane::Pad0.raw());
    }

    #[test]
    fn frame_cap_skips_early_ticks() {
        let config = PlayConfig {
            max_fps: 50,
            ..PlayConfig::default()
        };
        let mut s = PlaySession::new(vec![Note::tap("a", Lane::Pad0, 5000.0)], config);
        s.start(0.0);
        assert!(s.tick(None, 5.0).is_some());
        assert!(s.tick(None, 15.0).is_none());
        assert!(s.tick(None, 25.0).is_some());
        assert_eq!(s.current_time(), 25.0);
    }

    #[test]
    fn run_frame_publishes_to_presenter() {
        let mut s = session(vec![Note::tap("a", Lane::Pad0, 5000.0)]);
        let wall = tunnel_timing::MockWallClock::new();
        let mut source = || None::<f64>;
        let mut published = Vec::new();
        let mut presenter = |f: &FrameSnapshot| published.push(f.current_time_ms);
        wall.set_time(16.0);
        assert!(s.run_frame(&mut source, &wall, &mut presenter));
        wall.set_time(32.0);
        assert!(s.run_frame(&mut source, &wall, &mut presenter));
        assert_eq!(published, vec![16.0, 32.0]);
    }
}
