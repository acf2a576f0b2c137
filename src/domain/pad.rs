/// Pad: one of the four colored buttons. A move is one pad press.
///
/// The core only ever speaks in pad indices (0-3); colors and names
/// exist for the presentation layer.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Pad {
    Blue = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
}

impl Pad {
    pub const COUNT: usize = 4;

    /// Grid order: top-left, top-right, bottom-left, bottom-right.
    pub const ALL: [Pad; Pad::COUNT] = [Pad::Blue, Pad::Red, Pad::Green, Pad::Yellow];

    /// Map a raw move index to a pad. Anything outside 0-3 is not a move.
    pub fn from_index(index: usize) -> Option<Pad> {
        Pad::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Pad::Blue   => "blue",
            Pad::Red    => "red",
            Pad::Green  => "green",
            Pad::Yellow => "yellow",
        }
    }
}
