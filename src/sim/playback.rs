/// Playback scheduler: replays a round's sequence as a chain of timed cues.
///
/// Chain for a sequence of `n` pads with gap `pace`, each wait counted
/// from the moment the previous cue fired:
///
///   wait prepare            Reveal { length: n }
///   wait lead_in            MoveStart { 0 }
///   wait pace               MoveStart { i }     (i in 1..n)
///   wait pace               Complete
///
/// Nothing here sleeps. The owner feeds elapsed time through `advance()`
/// and gets back at most one cue per call. After a frame hitch the
/// overdue cue fires and the next wait starts from there, so two pads
/// never light in the same frame.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::TimingConfig;
use crate::domain::pad::Pad;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Reveal { length: usize },
    MoveStart { pad: Pad, index: usize },
    Complete,
}

#[derive(Clone, Copy, Debug)]
struct TimedCue {
    /// Time between the previous cue firing and this one.
    wait: Duration,
    cue: Cue,
}

#[derive(Debug)]
pub struct Playback {
    cues: VecDeque<TimedCue>,
    /// Time since the last cue fired (or since the playback began).
    elapsed: Duration,
}

impl Playback {
    /// `pace` is fixed for the whole playback.
    pub fn new(sequence: &[Pad], pace: Duration, timing: &TimingConfig) -> Self {
        let mut cues = VecDeque::with_capacity(sequence.len() + 2);
        cues.push_back(TimedCue {
            wait: timing.prepare(),
            cue: Cue::Reveal { length: sequence.len() },
        });

        let mut wait = timing.lead_in();
        for (index, &pad) in sequence.iter().enumerate() {
            cues.push_back(TimedCue { wait, cue: Cue::MoveStart { pad, index } });
            wait = pace;
        }
        cues.push_back(TimedCue { wait, cue: Cue::Complete });

        Playback { cues, elapsed: Duration::ZERO }
    }

    /// Move the clock forward and fire the next cue if its wait is over.
    /// Time past the due point is dropped: the following wait starts now.
    pub fn advance(&mut self, dt: Duration) -> Option<Cue> {
        self.elapsed += dt;
        let next = self.cues.front()?;
        if next.wait > self.elapsed {
            return None;
        }
        self.elapsed = Duration::ZERO;
        self.cues.pop_front().map(|timed| timed.cue)
    }

    /// Drop all pending cues. `Complete` will never fire.
    pub fn cancel(&mut self) {
        if !self.cues.is_empty() {
            log::debug!("playback cancelled with {} cues pending", self.cues.len());
        }
        self.cues.clear();
    }

    pub fn is_finished(&self) -> bool {
        self.cues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn playback(seq: &[Pad], pace_ms: u64) -> Playback {
        Playback::new(seq, ms(pace_ms), &TimingConfig::default())
    }

    #[test]
    fn nothing_fires_during_prepare() {
        let mut pb = playback(&[Pad::Red], 600);
        assert_eq!(pb.advance(ms(499)), None);
        assert_eq!(pb.advance(ms(1)), Some(Cue::Reveal { length: 1 }));
    }

    #[test]
    fn full_timeline_for_three_pads() {
        let seq = [Pad::Red, Pad::Yellow, Pad::Blue];
        let mut pb = playback(&seq, 400);

        assert_eq!(pb.advance(ms(500)), Some(Cue::Reveal { length: 3 }));
        assert_eq!(pb.advance(ms(599)), None);
        assert_eq!(pb.advance(ms(1)), Some(Cue::MoveStart { pad: Pad::Red, index: 0 }));
        assert_eq!(pb.advance(ms(399)), None);
        assert_eq!(pb.advance(ms(1)), Some(Cue::MoveStart { pad: Pad::Yellow, index: 1 }));
        assert_eq!(pb.advance(ms(400)), Some(Cue::MoveStart { pad: Pad::Blue, index: 2 }));
        assert!(!pb.is_finished());
        // Last pad still gets its full gap before completion.
        assert_eq!(pb.advance(ms(399)), None);
        assert_eq!(pb.advance(ms(1)), Some(Cue::Complete));
        assert!(pb.is_finished());
        assert_eq!(pb.advance(ms(10_000)), None);
    }

    #[test]
    fn stalled_frame_fires_one_pad_and_restarts_the_gap() {
        let seq = [Pad::Red, Pad::Blue, Pad::Green];
        let mut pb = playback(&seq, 600);
        assert_eq!(pb.advance(ms(500)), Some(Cue::Reveal { length: 3 }));
        assert_eq!(pb.advance(ms(600)), Some(Cue::MoveStart { pad: Pad::Red, index: 0 }));

        // One frame long enough to cover two gaps.
        assert_eq!(pb.advance(ms(1300)), Some(Cue::MoveStart { pad: Pad::Blue, index: 1 }));
        assert_eq!(pb.advance(Duration::ZERO), None);
        assert_eq!(pb.advance(ms(599)), None);
        assert_eq!(pb.advance(ms(1)), Some(Cue::MoveStart { pad: Pad::Green, index: 2 }));
    }

    #[test]
    fn huge_step_releases_cues_one_per_call_in_order() {
        let mut pb = playback(&[Pad::Green, Pad::Green], 600);
        let cues: Vec<Cue> = std::iter::from_fn(|| pb.advance(Duration::from_secs(60))).collect();
        assert_eq!(cues, vec![
            Cue::Reveal { length: 2 },
            Cue::MoveStart { pad: Pad::Green, index: 0 },
            Cue::MoveStart { pad: Pad::Green, index: 1 },
            Cue::Complete,
        ]);
        assert!(pb.is_finished());
    }

    #[test]
    fn cancel_drops_completion() {
        let mut pb = playback(&[Pad::Blue], 600);
        pb.advance(ms(500));
        pb.cancel();
        assert!(pb.is_finished());
        assert_eq!(pb.advance(Duration::from_secs(5)), None);
    }
}
