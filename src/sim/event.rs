/// Events emitted by the game core.
/// The presentation layer consumes these for animation/sound.

use crate::domain::pad::Pad;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The new round's length may now be shown.
    LengthRevealed { length: usize },
    /// Playback reached pad `index` of the sequence.
    MoveStart { pad: Pad, index: usize },
    /// Playback finished; pads are live.
    InputReady,
    /// A player press was judged. `defeat` selects the losing effect.
    Feedback { pad: Pad, defeat: bool },
    /// The whole sequence was reproduced.
    RoundComplete { length: usize },
    NewRecord { value: u32 },
    /// Wrong pad. `completed` is how many rounds the game survived.
    Defeat { completed: usize },
}

/// One-way notification surface of the UI collaborator.
/// Every hook defaults to doing nothing.
pub trait Presenter {
    fn on_round_length_revealed(&mut self, _length: usize) {}
    fn on_move_start(&mut self, _pad: Pad, _index: usize) {}
    fn on_input_ready(&mut self) {}
    fn on_feedback(&mut self, _pad: Pad, _defeat: bool) {}
    fn on_round_complete(&mut self, _length: usize) {}
    fn on_new_record(&mut self, _value: u32) {}
    fn on_defeat(&mut self, _completed: usize) {}
}

/// Fan a batch of events out to a presenter, in order.
pub fn present<P: Presenter + ?Sized>(presenter: &mut P, events: &[GameEvent]) {
    for event in events {
        match *event {
            GameEvent::LengthRevealed { length } => presenter.on_round_length_revealed(length),
            GameEvent::MoveStart { pad, index } => presenter.on_move_start(pad, index),
            GameEvent::InputReady => presenter.on_input_ready(),
            GameEvent::Feedback { pad, defeat } => presenter.on_feedback(pad, defeat),
            GameEvent::RoundComplete { length } => presenter.on_round_complete(length),
            GameEvent::NewRecord { value } => presenter.on_new_record(value),
            GameEvent::Defeat { completed } => presenter.on_defeat(completed),
        }
    }
}
