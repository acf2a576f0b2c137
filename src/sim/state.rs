/// GameState: everything the round state machine owns.
///
/// Transitions in `round` take a `GameState` by value and hand back the
/// next one. Nothing else mutates it.
///
/// ## Round lifecycle
///
///   Idle ──start──▶ Playing ──playback done──▶ AwaitingInput
///                     ▲                            │
///                     └──── last pad correct ──────┤
///                                                  │ wrong pad
///   Idle ◀──────────── Defeated ◀──────────────────┘
///
/// `Defeated` only exists for the duration of the reset; observers see
/// the game land back in `Idle`.

use crate::domain::pad::Pad;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RoundState {
    #[default]
    Idle,
    Playing,
    AwaitingInput,
    Defeated,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GameState {
    pub round: RoundState,
    /// Pattern for the current round. Append-only until a defeat.
    pub sequence: Vec<Pad>,
    /// How many pads of `sequence` the player has reproduced this round.
    pub cursor: usize,
    pub personal_best: u32,
}

impl GameState {
    pub fn new(personal_best: u32) -> Self {
        GameState { personal_best, ..GameState::default() }
    }

    /// Start control is live only between games.
    pub fn start_enabled(&self) -> bool {
        self.round == RoundState::Idle
    }

    /// Pads accept presses only while the player is reproducing.
    pub fn pads_enabled(&self) -> bool {
        self.round == RoundState::AwaitingInput
    }

    /// The pad the player must press next, if a press is expected.
    pub fn expected(&self) -> Option<Pad> {
        if self.pads_enabled() {
            self.sequence.get(self.cursor).copied()
        } else {
            None
        }
    }

    pub(crate) fn enter(&mut self, next: RoundState) {
        log::debug!(
            "round {:?} -> {:?} (len {}, cursor {})",
            self.round, next, self.sequence.len(), self.cursor,
        );
        self.round = next;
    }
}
