/// Game controller: owns the state, the running playback and the
/// collaborators, and turns commands and clock ticks into events.
///
/// Per frame the front-end calls, in order:
///   1. `start()` / `submit_move()` for whatever the player pressed
///   2. `tick(dt)` to advance playback
/// and hands the returned events to its presenters.

use std::time::Duration;

use crate::config::TimingConfig;
use crate::domain::pace;
use super::event::GameEvent;
use super::generator::MoveSource;
use super::playback::{Cue, Playback};
use super::record::RecordStore;
use super::round;
use super::state::GameState;

pub struct GameController<M: MoveSource, R: RecordStore> {
    state: GameState,
    playback: Option<Playback>,
    moves: M,
    records: R,
    timing: TimingConfig,
}

impl<M: MoveSource, R: RecordStore> GameController<M, R> {
    pub fn new(moves: M, records: R, timing: TimingConfig) -> Self {
        let best = records.load();
        log::info!("personal best loaded: {best}");
        GameController {
            state: GameState::new(best),
            playback: None,
            moves,
            records,
            timing,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn personal_best_text(&self) -> String {
        format!("Personal best: {}", self.state.personal_best)
    }

    /// Start command. No-op unless the game is idle.
    pub fn start(&mut self) -> bool {
        let (state, started) = round::start(std::mem::take(&mut self.state));
        self.state = state;
        if started {
            log::info!("game started");
            self.next_round();
        }
        started
    }

    /// Player pressed pad `index`. Out-of-phase or out-of-range presses
    /// come back with no events.
    pub fn submit_move(&mut self, index: usize) -> Vec<GameEvent> {
        let (state, events) = round::submit_move(std::mem::take(&mut self.state), index);
        self.state = state;

        for event in &events {
            match *event {
                GameEvent::NewRecord { value } => self.persist(value),
                GameEvent::RoundComplete { length } => {
                    log::debug!("round of {length} cleared");
                    self.next_round();
                }
                GameEvent::Defeat { completed } => {
                    log::info!("game over after {completed} rounds");
                }
                _ => {}
            }
        }
        events
    }

    /// Advance the running playback, if any, by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Vec<GameEvent> {
        let Some(playback) = self.playback.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        match playback.advance(dt) {
            Some(Cue::Reveal { length }) => events.push(GameEvent::LengthRevealed { length }),
            Some(Cue::MoveStart { pad, index }) => events.push(GameEvent::MoveStart { pad, index }),
            Some(Cue::Complete) => {
                self.state = round::finish_playback(std::mem::take(&mut self.state));
                events.push(GameEvent::InputReady);
            }
            None => {}
        }
        if playback.is_finished() {
            self.playback = None;
        }
        events
    }

    /// Abandon the running playback. Pads stay disabled.
    pub fn cancel_playback(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.cancel();
        }
    }

    pub fn is_playing_back(&self) -> bool {
        self.playback.is_some()
    }

    fn next_round(&mut self) {
        // Pacing tier is read before the new pad is appended.
        let pace = pace::inter_move_delay(&self.timing, self.state.sequence.len());
        let next = self.moves.next_move();
        self.state = round::extend(std::mem::take(&mut self.state), next);
        log::debug!("round {} plays at {:?} per pad", self.state.sequence.len(), pace);
        self.playback = Some(Playback::new(&self.state.sequence, pace, &self.timing));
    }

    fn persist(&self, value: u32) {
        if let Err(e) = self.records.save(value) {
            log::warn!("personal best {value} not saved: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pad::Pad;
    use crate::sim::generator::ScriptedMoves;
    use crate::sim::record::FileRecordStore;
    use crate::sim::state::RoundState;

    /// Longer than any single wait on the playback chain.
    const FOREVER: Duration = Duration::from_secs(3600);

    /// Tick until the playback has run out, collecting every event.
    fn play_through<M: MoveSource, R: RecordStore>(game: &mut GameController<M, R>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while game.is_playing_back() {
            events.extend(game.tick(FOREVER));
        }
        events
    }

    fn controller(
        dir: &tempfile::TempDir,
        script: &[Pad],
    ) -> GameController<ScriptedMoves, FileRecordStore> {
        GameController::new(
            ScriptedMoves::new(script),
            FileRecordStore::new(dir.path().join("saved_record.txt")),
            TimingConfig::default(),
        )
    }

    fn move_starts(events: &[GameEvent]) -> Vec<Pad> {
        events.iter().filter_map(|e| match e {
            GameEvent::MoveStart { pad, .. } => Some(*pad),
            _ => None,
        }).collect()
    }

    /// Play back, then echo the whole sequence correctly.
    fn clear_round<M: MoveSource, R: RecordStore>(game: &mut GameController<M, R>) -> Vec<GameEvent> {
        play_through(game);
        let presses: Vec<usize> = game.state().sequence.iter().map(|p| p.index()).collect();
        presses.into_iter().flat_map(|i| game.submit_move(i)).collect()
    }

    #[test]
    fn start_then_echo_sets_and_persists_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Green]);
        assert_eq!(game.personal_best_text(), "Personal best: 0");

        game.start();
        assert_eq!(game.state().round, RoundState::Playing);
        assert_eq!(game.state().sequence, vec![Pad::Green]);

        let played = play_through(&mut game);
        assert_eq!(played.first(), Some(&GameEvent::LengthRevealed { length: 1 }));
        assert_eq!(played.last(), Some(&GameEvent::InputReady));
        assert!(game.state().pads_enabled());

        let events = game.submit_move(2);
        assert!(events.contains(&GameEvent::NewRecord { value: 1 }));
        assert!(events.contains(&GameEvent::RoundComplete { length: 1 }));
        assert_eq!(game.state().personal_best, 1);
        assert_eq!(game.personal_best_text(), "Personal best: 1");

        let saved = std::fs::read_to_string(dir.path().join("saved_record.txt")).unwrap();
        assert_eq!(saved, "1");

        // Next round already queued.
        assert_eq!(game.state().round, RoundState::Playing);
        assert_eq!(game.state().sequence.len(), 2);
        assert!(game.is_playing_back());
    }

    #[test]
    fn start_is_ignored_mid_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Red]);
        assert!(game.start());
        assert!(!game.start());
        assert_eq!(game.state().sequence.len(), 1);
        play_through(&mut game);
        assert!(!game.start());
        assert_eq!(game.state().sequence.len(), 1);
        assert_eq!(game.state().round, RoundState::AwaitingInput);
    }

    #[test]
    fn press_during_playback_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Blue]);
        game.start();
        game.tick(Duration::from_millis(700));
        let before = game.state().clone();

        assert!(game.submit_move(0).is_empty());
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn sequence_grows_by_one_each_round_and_replays_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let script = [Pad::Red, Pad::Yellow, Pad::Blue, Pad::Blue, Pad::Green];
        let mut game = controller(&dir, &script);
        game.start();

        for k in 1..=script.len() {
            assert_eq!(game.state().sequence.len(), k);
            assert_eq!(game.state().sequence, script[..k].to_vec());
            let played = play_through(&mut game);
            assert_eq!(move_starts(&played), script[..k].to_vec());

            let presses: Vec<usize> = game.state().sequence.iter().map(|p| p.index()).collect();
            for i in presses {
                game.submit_move(i);
            }
            assert_eq!(game.state().personal_best as usize, k);
        }
    }

    #[test]
    fn wrong_pad_ends_game_and_allows_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Red, Pad::Yellow, Pad::Blue]);
        game.start();
        clear_round(&mut game);
        clear_round(&mut game);
        play_through(&mut game);
        assert_eq!(game.state().sequence, vec![Pad::Red, Pad::Yellow, Pad::Blue]);

        game.submit_move(1);
        game.submit_move(3);
        let events = game.submit_move(2);
        assert_eq!(events, vec![
            GameEvent::Feedback { pad: Pad::Green, defeat: true },
            GameEvent::Defeat { completed: 2 },
        ]);
        assert_eq!(game.state().round, RoundState::Idle);
        assert!(game.state().sequence.is_empty());
        assert_eq!(game.state().cursor, 0);
        assert!(!game.is_playing_back());
        assert_eq!(game.state().personal_best, 2);

        game.start();
        assert_eq!(game.state().sequence.len(), 1);
    }

    #[test]
    fn record_survives_restart_and_never_decreases() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut game = controller(&dir, &[Pad::Green]);
            game.start();
            clear_round(&mut game);
            clear_round(&mut game);
            clear_round(&mut game);
            assert_eq!(game.state().personal_best, 3);
        }

        let mut game = controller(&dir, &[Pad::Blue]);
        assert_eq!(game.state().personal_best, 3);
        game.start();
        let events = clear_round(&mut game);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::NewRecord { .. })));
        play_through(&mut game);
        game.submit_move(Pad::Red.index());
        assert_eq!(game.state().personal_best, 3);
        assert_eq!(FileRecordStore::new(dir.path().join("saved_record.txt")).load(), 3);
    }

    #[test]
    fn pacing_uses_length_before_new_pad() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Red]);
        game.start();
        for _ in 0..5 {
            clear_round(&mut game);
        }
        // Six pads now, but the round was paced from five: 500 ms tier.
        assert_eq!(game.state().sequence.len(), 6);
        game.tick(Duration::from_millis(500));
        game.tick(Duration::from_millis(600));
        assert!(game.tick(Duration::from_millis(499)).is_empty());
        assert_eq!(
            game.tick(Duration::from_millis(1)),
            vec![GameEvent::MoveStart { pad: Pad::Red, index: 1 }],
        );
    }

    #[test]
    fn stalled_frame_lights_one_pad_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Red, Pad::Blue, Pad::Green]);
        game.start();
        clear_round(&mut game);
        clear_round(&mut game);

        game.tick(Duration::from_millis(500));
        assert_eq!(
            game.tick(Duration::from_millis(600)),
            vec![GameEvent::MoveStart { pad: Pad::Red, index: 0 }],
        );
        assert_eq!(
            game.tick(Duration::from_millis(1300)),
            vec![GameEvent::MoveStart { pad: Pad::Blue, index: 1 }],
        );
        assert!(game.tick(Duration::from_millis(599)).is_empty());
        assert_eq!(
            game.tick(Duration::from_millis(1)),
            vec![GameEvent::MoveStart { pad: Pad::Green, index: 2 }],
        );
    }

    #[test]
    fn failed_save_keeps_record_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = GameController::new(
            ScriptedMoves::new(&[Pad::Yellow]),
            FileRecordStore::new(dir.path().join("missing").join("saved_record.txt")),
            TimingConfig::default(),
        );
        game.start();
        let events = clear_round(&mut game);
        assert!(events.contains(&GameEvent::NewRecord { value: 1 }));
        assert_eq!(game.state().personal_best, 1);
    }

    #[test]
    fn cancel_leaves_pads_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(&dir, &[Pad::Blue]);
        game.start();
        game.cancel_playback();
        assert!(!game.is_playing_back());
        assert!(game.tick(FOREVER).is_empty());
        assert!(!game.state().pads_enabled());
    }
}
