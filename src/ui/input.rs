/// Keyboard input tracker.
///
/// Only fresh presses matter in this game: a pad press is one move, so
/// auto-repeat and release events are dropped. Presses are kept in
/// arrival order because two pads hit inside one frame are two moves.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::pad::Pad;

// ── Key Constants ──

pub const KEYS_START: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

/// Keys per pad, in `Pad::ALL` order: digits, or the QW/AS block that
/// mirrors the on-screen grid.
const KEYS_PAD: [&[KeyCode]; Pad::COUNT] = [
    &[KeyCode::Char('1'), KeyCode::Char('q'), KeyCode::Char('Q')],
    &[KeyCode::Char('2'), KeyCode::Char('w'), KeyCode::Char('W')],
    &[KeyCode::Char('3'), KeyCode::Char('a'), KeyCode::Char('A')],
    &[KeyCode::Char('4'), KeyCode::Char('s'), KeyCode::Char('S')],
];

/// Label printed on each pad.
pub fn pad_key_label(pad: Pad) -> &'static str {
    match pad {
        Pad::Blue   => "1 / Q",
        Pad::Red    => "2 / W",
        Pad::Green  => "3 / A",
        Pad::Yellow => "4 / S",
    }
}

fn pad_for_key(code: KeyCode) -> Option<Pad> {
    Pad::ALL.iter().copied().find(|pad| KEYS_PAD[pad.index()].contains(&code))
}

pub struct InputState {
    /// Keys pressed during the most recent drain_events() call.
    fresh_presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record(key),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal read failed: {e}");
                    break;
                }
            }
        }
    }

    fn record(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            self.fresh_presses.push(key);
        }
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.fresh_presses.iter().any(|k| codes.contains(&k.code))
    }

    /// Pads pressed this frame, in arrival order.
    pub fn pad_presses(&self) -> Vec<Pad> {
        self.fresh_presses.iter()
            .filter(|k| !k.modifiers.contains(KeyModifiers::CONTROL))
            .filter_map(|k| pad_for_key(k.code))
            .collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.fresh_presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
