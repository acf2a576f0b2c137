/// Sequence generator: where each round's new pad comes from.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::domain::pad::Pad;

pub trait MoveSource {
    fn next_move(&mut self) -> Pad;
}

/// Uniform over the four pads, independent of history.
pub struct RandomMoves<R: Rng> {
    rng: R,
}

impl RandomMoves<ThreadRng> {
    pub fn new() -> Self {
        RandomMoves { rng: rand::rng() }
    }
}

impl<R: Rng> RandomMoves<R> {
    #[cfg(test)]
    pub fn with_rng(rng: R) -> Self {
        RandomMoves { rng }
    }
}

impl<R: Rng> MoveSource for RandomMoves<R> {
    fn next_move(&mut self) -> Pad {
        Pad::ALL[self.rng.random_range(0..Pad::COUNT)]
    }
}

/// Hands out a fixed script of pads, then repeats the last one.
#[cfg(test)]
pub struct ScriptedMoves {
    script: std::collections::VecDeque<Pad>,
    last: Pad,
}

#[cfg(test)]
impl ScriptedMoves {
    pub fn new(script: &[Pad]) -> Self {
        ScriptedMoves {
            script: script.iter().copied().collect(),
            last: script.last().copied().unwrap_or(Pad::Blue),
        }
    }
}

#[cfg(test)]
impl MoveSource for ScriptedMoves {
    fn next_move(&mut self) -> Pad {
        self.script.pop_front().unwrap_or(self.last)
    }
}
