use serde::{Deserialize, Serialize};

/// Game tics per second
pub const TICRATE: i32 = 35;

/// Mission packs. Some map fixes only apply to one mission.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMission {
    /// Doom (shareware, registered)
    #[default]
    Doom,
    /// Doom II
    Doom2,
    /// TNT mission pack
    PackTnt,
    /// Plutonia mission pack
    PackPlut,
    None,
}
