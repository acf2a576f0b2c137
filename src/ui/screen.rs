/// Screen model: everything the renderer draws, kept current by
/// game events. Holds no game rules.

use std::time::Duration;

use crate::domain::pad::Pad;
use crate::sim::event::Presenter;
use super::lights::PadLights;

const RECORD_MESSAGE: Duration = Duration::from_millis(2500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Welcome,
    Watch,
    YourTurn,
    GameOver { completed: usize },
}

pub struct Screen {
    pub lights: PadLights,
    /// Sequence length as last revealed. Lags the real length during
    /// the prepare delay.
    pub shown_length: usize,
    pub status: Status,
    pub best_text: String,
    pub message: String,
    message_left: Duration,
    flash: Duration,
}

impl Screen {
    pub fn new(flash: Duration, best_text: String) -> Self {
        Screen {
            lights: PadLights::new(),
            shown_length: 0,
            status: Status::Welcome,
            best_text,
            message: String::new(),
            message_left: Duration::ZERO,
            flash,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.lights.tick(dt);
        if !self.message.is_empty() {
            self.message_left = self.message_left.saturating_sub(dt);
            if self.message_left.is_zero() {
                self.message.clear();
            }
        }
    }

    pub fn set_message(&mut self, text: &str, duration: Duration) {
        self.message = text.to_string();
        self.message_left = duration;
    }
}

impl Presenter for Screen {
    fn on_round_length_revealed(&mut self, length: usize) {
        self.shown_length = length;
        self.status = Status::Watch;
    }

    fn on_move_start(&mut self, pad: Pad, _index: usize) {
        self.lights.flash(pad, self.flash);
    }

    fn on_input_ready(&mut self) {
        self.status = Status::YourTurn;
    }

    fn on_feedback(&mut self, pad: Pad, _defeat: bool) {
        self.lights.flash(pad, self.flash);
    }

    fn on_round_complete(&mut self, _length: usize) {
        self.status = Status::Watch;
    }

    fn on_new_record(&mut self, value: u32) {
        self.set_message(&format!("NEW RECORD: {value}"), RECORD_MESSAGE);
    }

    fn on_defeat(&mut self, completed: usize) {
        self.status = Status::GameOver { completed };
    }
}
