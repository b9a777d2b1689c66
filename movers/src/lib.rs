//! Sector ceiling movers for a Doom level: lowering and raising ceilings,
//! crushers, and the tagged line specials that start and stop them.
//!
//! A `Level` owns the map, every active mover, and the thinker list that runs
//! them once per tic.

#![allow(clippy::new_without_default)]

mod doom_def;
pub mod env;
mod level;
pub mod pool;
mod thinker;

use std::sync::mpsc::Sender;

use sound_traits::{SfxName, SoundAction};

pub use doom_def::{GameMission, TICRATE};
pub use env::{
    ceiling::{
        CEILSPEED, CRUSH_CLEARANCE, CeilingId, CeilingKind, CeilingMove, ClearanceException,
        ev_ceiling_crush_stop, ev_do_ceiling,
    },
    generic::{GenSpecial, ev_do_gen_ceiling, ev_do_gen_crusher},
    specials::{Direction, cross_special_line, use_special_line},
};
pub use glam;
pub use level::{
    Level,
    flags::LineDefFlags,
    map_data::MapData,
    map_defs::{LineDef, LineId, MapThing, Sector, SectorId},
};
pub use log;
pub use thinker::{Think, Thinker, ThinkerAlloc};

/// The channel movers use to ask the sound server for effects
pub type SndServerTx = Sender<SoundAction<SfxName>>;
