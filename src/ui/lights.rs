/// Pad highlights: the on-screen half of a press effect.
///
/// Each pad owns one highlight slot. Lighting a pad that is already lit
/// replaces the running highlight instead of stacking a second one.

use std::time::Duration;

use crate::domain::pad::Pad;

#[derive(Clone, Debug, Default)]
pub struct PadLights {
    remaining: [Option<Duration>; Pad::COUNT],
}

impl PadLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flash(&mut self, pad: Pad, duration: Duration) {
        self.remaining[pad.index()] = Some(duration);
    }

    pub fn tick(&mut self, dt: Duration) {
        for slot in &mut self.remaining {
            *slot = match *slot {
                Some(left) if left > dt => Some(left - dt),
                _ => None,
            };
        }
    }

    pub fn is_lit(&self, pad: Pad) -> bool {
        self.remaining[pad.index()].is_some()
    }
}
