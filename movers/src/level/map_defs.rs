//! The parts of a map that movers read and write.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{env::ceiling::CeilingId, level::flags::LineDefFlags};

/// Index of a sector in `MapData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorId(pub usize);

/// Index of a linedef in `MapData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub usize);

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sector {}", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// A thing standing in a sector, reduced to what plane movement cares about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapThing {
    pub height: f32,
    pub health: i32,
    /// Only shootable things can block a moving plane
    pub shootable: bool,
    /// Items dropped by monsters are destroyed when squashed
    #[serde(default)]
    pub dropped: bool,
}

impl MapThing {
    pub fn new(height: f32, health: i32) -> Self {
        Self {
            height,
            health,
            shootable: true,
            dropped: false,
        }
    }

    /// Doom function name `P_ThingHeightClip`, reduced to the fit check
    pub fn fits(&self, floorheight: f32, ceilingheight: f32) -> bool {
        ceilingheight - floorheight >= self.height
    }
}

#[derive(Default, Clone)]
pub struct Sector {
    /// An incremented "ID" of sorts.
    pub num: u32,
    pub floorheight: f32,
    pub ceilingheight: f32,
    /// Is a tag or index to patch
    pub floorpic: usize,
    /// Is a tag or index to patch
    pub ceilingpic: usize,
    pub lightlevel: i32,
    pub special: i16,
    pub tag: i16,

    /// origin for any sounds played by the sector
    pub sound_origin: Vec2,

    /// Things standing in the sector
    pub things: Vec<MapThing>,

    /// The ceiling mover that currently owns this sector, if any
    pub ceilingdata: Option<CeilingId>,
    pub lines: Vec<LineId>,
}

impl fmt::Debug for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sector")
            .field("num", &self.num)
            .field("floorheight", &self.floorheight)
            .field("ceilingheight", &self.ceilingheight)
            .field("floorpic", &self.floorpic)
            .field("ceilingpic", &self.ceilingpic)
            .field("lightlevel", &self.lightlevel)
            .field("special", &self.special)
            .field("tag", &self.tag)
            .field("ceilingdata", &self.ceilingdata)
            .finish_non_exhaustive()
    }
}

impl Sector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num: u32,
        floorheight: f32,
        ceilingheight: f32,
        floorpic: usize,
        ceilingpic: usize,
        lightlevel: i32,
        special: i16,
        tag: i16,
    ) -> Self {
        Self {
            num,
            floorheight,
            ceilingheight,
            floorpic,
            ceilingpic,
            lightlevel,
            special,
            tag,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineDef {
    pub flags: u32,
    pub special: i16,
    pub tag: i16,
    // Front and back sector.
    pub frontsector: SectorId,
    pub backsector: Option<SectorId>,
}

impl LineDef {
    pub fn is_two_sided(&self) -> bool {
        self.flags & LineDefFlags::TwoSided.bits() != 0
    }

    pub fn is_secret(&self) -> bool {
        self.flags & LineDefFlags::Secret.bits() != 0
    }
}
