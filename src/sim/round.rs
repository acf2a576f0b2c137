/// Round state machine: the only code that changes a `GameState`.
///
/// Every transition consumes the state and returns the next one. Calls
/// made in the wrong phase hand the state back untouched, so late or
/// duplicated input (a key queued just before the pads went dark) is
/// harmless.

use crate::domain::pad::Pad;
use super::event::GameEvent;
use super::state::{GameState, RoundState};

/// Start command. Only honored from `Idle`; returns whether it was.
pub fn start(mut state: GameState) -> (GameState, bool) {
    if state.round != RoundState::Idle {
        log::debug!("start ignored in {:?}", state.round);
        return (state, false);
    }
    state.enter(RoundState::Playing);
    (state, true)
}

/// Append the round's new pad and rewind the cursor. Caller has already
/// moved the game to `Playing`.
pub fn extend(mut state: GameState, next: Pad) -> GameState {
    if state.round != RoundState::Playing {
        log::debug!("extend ignored in {:?}", state.round);
        return state;
    }
    state.sequence.push(next);
    state.cursor = 0;
    state
}

/// Playback finished: hand control to the player.
pub fn finish_playback(mut state: GameState) -> GameState {
    if state.round == RoundState::Playing && !state.sequence.is_empty() {
        state.cursor = 0;
        state.enter(RoundState::AwaitingInput);
    }
    state
}

/// Judge one player press (raw pad index).
///
/// On the final correct press the game goes back to `Playing` and the
/// caller is expected to extend the sequence for the next round.
pub fn submit_move(mut state: GameState, index: usize) -> (GameState, Vec<GameEvent>) {
    let mut events = Vec::new();

    let Some(pad) = Pad::from_index(index) else {
        log::debug!("rejected out-of-range pad index {index}");
        return (state, events);
    };
    let Some(expected) = state.expected() else {
        log::debug!("{} press ignored in {:?}", pad.name(), state.round);
        return (state, events);
    };

    if pad != expected {
        events.push(GameEvent::Feedback { pad, defeat: true });
        let completed = state.sequence.len().saturating_sub(1);
        state = defeat(state);
        events.push(GameEvent::Defeat { completed });
        return (state, events);
    }

    events.push(GameEvent::Feedback { pad, defeat: false });

    if state.cursor + 1 < state.sequence.len() {
        state.cursor += 1;
        return (state, events);
    }

    let length = state.sequence.len();
    let length_u32 = u32::try_from(length).unwrap_or(u32::MAX);
    if length_u32 > state.personal_best {
        state.personal_best = length_u32;
        events.push(GameEvent::NewRecord { value: length_u32 });
    }
    state.cursor = 0;
    state.enter(RoundState::Playing);
    events.push(GameEvent::RoundComplete { length });
    (state, events)
}

/// Wrong pad: pass through `Defeated`, wipe the round, land in `Idle`.
fn defeat(mut state: GameState) -> GameState {
    state.enter(RoundState::Defeated);
    state.sequence.clear();
    state.cursor = 0;
    state.enter(RoundState::Idle);
    state
}
