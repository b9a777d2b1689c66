/// The flags control some attributes of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefFlags {
    /// Players and monsters cannot cross this line. Note that
    /// if there is no sector on the other side, they can't go through the line
    /// anyway, regardless of the flags
    Blocking = 1,
    /// Monsters cannot cross this line
    BlockMonsters = 1 << 1,
    /// The line has a sector on both sides. Neighbour queries only look
    /// through lines with this flag set.
    TwoSided = 1 << 2,
    /// On the automap, this line appears in red like a normal
    /// solid wall that has nothing on the other side. Activating a mover on
    /// a sector gives its secret away, so the flag is cleared.
    Secret = 1 << 5,
    /// Blocks sound traveling out of this sector through this line
    BlockSound = 1 << 6,
}

impl LineDefFlags {
    pub const fn bits(self) -> u32 {
        self as u32
    }
}
