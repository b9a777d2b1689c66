//! Generalized ceiling and crusher line specials. The line's special number
//! is a bitfield describing the trigger, speed, target and texture change.
//!
//! Doom source name `p_genlin`

use log::{debug, warn};

use crate::{
    env::{
        ceiling::{CEILSPEED, CRUSH_CLEARANCE, CeilingKind, CeilingMove, free_tagged_sectors, start_ceiling},
        specials::{
            Direction, find_highest_ceiling_surrounding, find_highest_floor_surrounding,
            find_lowest_ceiling_surrounding, find_model_ceiling_sector, find_model_floor_sector,
            find_next_highest_ceiling, find_next_lowest_ceiling,
        },
    },
    level::{
        Level,
        map_defs::{LineId, SectorId},
    },
};

pub const GEN_FLOOR_BASE: u16 = 0x6000;
pub const GEN_CEILING_BASE: u16 = 0x4000;
pub const GEN_STAIRS_BASE: u16 = 0x3000;
pub const GEN_CRUSHER_BASE: u16 = 0x2F80;

const TRIGGER_TYPE: u16 = 0x0007;

const CEILING_SPEED: u16 = 0x0018;
const CEILING_SPEED_SHIFT: u16 = 3;
const CEILING_MODEL: u16 = 0x0020;
const CEILING_DIRECTION: u16 = 0x0040;
const CEILING_TARGET: u16 = 0x0380;
const CEILING_TARGET_SHIFT: u16 = 7;
const CEILING_CHANGE: u16 = 0x0C00;
const CEILING_CHANGE_SHIFT: u16 = 10;
const CEILING_CRUSH: u16 = 0x1000;

const CRUSHER_SPEED: u16 = 0x0018;
const CRUSHER_SPEED_SHIFT: u16 = 3;
const CRUSHER_SILENT: u16 = 0x0040;

/// How a generalized line is set off, and whether it can be used again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenTrigger {
    WalkOnce,
    WalkMany,
    SwitchOnce,
    SwitchMany,
    GunOnce,
    GunMany,
    PushOnce,
    PushMany,
}

impl GenTrigger {
    fn from_bits(value: u16) -> Self {
        match value & TRIGGER_TYPE {
            0 => GenTrigger::WalkOnce,
            1 => GenTrigger::WalkMany,
            2 => GenTrigger::SwitchOnce,
            3 => GenTrigger::SwitchMany,
            4 => GenTrigger::GunOnce,
            5 => GenTrigger::GunMany,
            6 => GenTrigger::PushOnce,
            _ => GenTrigger::PushMany,
        }
    }

    pub const fn repeatable(self) -> bool {
        matches!(
            self,
            GenTrigger::WalkMany | GenTrigger::SwitchMany | GenTrigger::GunMany | GenTrigger::PushMany
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenSpeed {
    Slow,
    Normal,
    Fast,
    Turbo,
}

impl GenSpeed {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => GenSpeed::Slow,
            1 => GenSpeed::Normal,
            2 => GenSpeed::Fast,
            _ => GenSpeed::Turbo,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            GenSpeed::Slow => CEILSPEED,
            GenSpeed::Normal => CEILSPEED * 2.0,
            GenSpeed::Fast => CEILSPEED * 4.0,
            GenSpeed::Turbo => CEILSPEED * 8.0,
        }
    }
}

/// Where a generalized ceiling stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeilingTarget {
    HighestNeighbourCeiling,
    LowestNeighbourCeiling,
    /// Next neighbour ceiling in the direction of travel
    NextNeighbourCeiling,
    HighestNeighbourFloor,
    Floor,
    /// By the shortest upper texture. Textures are not modelled so the
    /// ceiling stays where it is.
    ShortestUpper,
    By24,
    By32,
}

impl CeilingTarget {
    fn from_bits(bits: u16) -> Self {
        match bits & 7 {
            0 => CeilingTarget::HighestNeighbourCeiling,
            1 => CeilingTarget::LowestNeighbourCeiling,
            2 => CeilingTarget::NextNeighbourCeiling,
            3 => CeilingTarget::HighestNeighbourFloor,
            4 => CeilingTarget::Floor,
            5 => CeilingTarget::ShortestUpper,
            6 => CeilingTarget::By24,
            _ => CeilingTarget::By32,
        }
    }

    const fn is_floor(self) -> bool {
        matches!(
            self,
            CeilingTarget::HighestNeighbourFloor | CeilingTarget::Floor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeilingChange {
    None,
    /// Copy the texture and zero the special
    Zero,
    Texture,
    /// Copy the texture and the special
    TextureAndSpecial,
}

impl CeilingChange {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => CeilingChange::None,
            1 => CeilingChange::Zero,
            2 => CeilingChange::Texture,
            _ => CeilingChange::TextureAndSpecial,
        }
    }
}

/// Where the new texture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeModel {
    /// The front sector of the triggering line
    Trigger,
    /// A neighbour at the target height
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenCeilingParams {
    pub trigger: GenTrigger,
    pub speed: GenSpeed,
    pub model: ChangeModel,
    pub direction: Direction,
    pub target: CeilingTarget,
    pub change: CeilingChange,
    pub crush: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenCrusherParams {
    pub trigger: GenTrigger,
    pub speed: GenSpeed,
    pub silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenSpecial {
    Ceiling(GenCeilingParams),
    Crusher(GenCrusherParams),
}

impl GenSpecial {
    /// Decode a line special. `None` if it is not a generalized ceiling or
    /// crusher.
    pub fn decode(special: i16) -> Option<Self> {
        let value = special as u16;
        if value >= GEN_FLOOR_BASE {
            return None;
        }

        if value >= GEN_CEILING_BASE {
            let direction = if value & CEILING_DIRECTION != 0 {
                Direction::Up
            } else {
                Direction::Down
            };
            let model = if value & CEILING_MODEL != 0 {
                ChangeModel::Numeric
            } else {
                ChangeModel::Trigger
            };
            return Some(GenSpecial::Ceiling(GenCeilingParams {
                trigger: GenTrigger::from_bits(value),
                speed: GenSpeed::from_bits((value & CEILING_SPEED) >> CEILING_SPEED_SHIFT),
                model,
                direction,
                target: CeilingTarget::from_bits((value & CEILING_TARGET) >> CEILING_TARGET_SHIFT),
                change: CeilingChange::from_bits((value & CEILING_CHANGE) >> CEILING_CHANGE_SHIFT),
                crush: value & CEILING_CRUSH != 0,
            }));
        }

        if (GEN_CRUSHER_BASE..GEN_STAIRS_BASE).contains(&value) {
            return Some(GenSpecial::Crusher(GenCrusherParams {
                trigger: GenTrigger::from_bits(value),
                speed: GenSpeed::from_bits((value & CRUSHER_SPEED) >> CRUSHER_SPEED_SHIFT),
                silent: value & CRUSHER_SILENT != 0,
            }));
        }

        None
    }

    pub fn trigger(&self) -> GenTrigger {
        match self {
            GenSpecial::Ceiling(params) => params.trigger,
            GenSpecial::Crusher(params) => params.trigger,
        }
    }
}

fn gen_ceiling(line: LineId, sector: SectorId, params: GenCeilingParams, level: &Level) -> CeilingMove {
    let mut ceiling = CeilingMove::new(sector, CeilingKind::GenCeiling, level);
    ceiling.crush = params.crush;
    ceiling.direction = params.direction;
    ceiling.speed = params.speed.speed();

    let map = &level.map_data;
    let sec = map.sector(sector);
    let up = params.direction == Direction::Up;
    let sign = if up { 1.0 } else { -1.0 };
    let target = match params.target {
        CeilingTarget::HighestNeighbourCeiling => find_highest_ceiling_surrounding(map, sector),
        CeilingTarget::LowestNeighbourCeiling => find_lowest_ceiling_surrounding(map, sector),
        CeilingTarget::NextNeighbourCeiling if up => {
            find_next_highest_ceiling(map, sector, sec.ceilingheight)
        }
        CeilingTarget::NextNeighbourCeiling => {
            find_next_lowest_ceiling(map, sector, sec.ceilingheight)
        }
        CeilingTarget::HighestNeighbourFloor => find_highest_floor_surrounding(map, sector),
        CeilingTarget::Floor => sec.floorheight,
        CeilingTarget::ShortestUpper => {
            warn!("Ceiling target by shortest upper texture is not supported, {sector} stays put");
            sec.ceilingheight
        }
        CeilingTarget::By24 => sec.ceilingheight + sign * 24.0,
        CeilingTarget::By32 => sec.ceilingheight + sign * 32.0,
    };
    if up {
        ceiling.topheight = target;
    } else {
        ceiling.bottomheight = target;
    }

    if params.change == CeilingChange::None {
        return ceiling;
    }

    let model = match params.model {
        ChangeModel::Numeric if params.target.is_floor() => {
            find_model_floor_sector(map, sector, target)
        }
        ChangeModel::Numeric => find_model_ceiling_sector(map, sector, target),
        ChangeModel::Trigger => Some(map.line(line).frontsector),
    };
    let Some(model) = model else {
        debug!("No model sector at {target} for {sector}, texture unchanged");
        return ceiling;
    };

    let model = map.sector(model);
    ceiling.texture = model.ceilingpic;
    match params.change {
        CeilingChange::Zero => {
            ceiling.new_special = 0;
            ceiling.kind = CeilingKind::GenCeilingChg0;
        }
        CeilingChange::TextureAndSpecial => {
            ceiling.new_special = model.special;
            ceiling.kind = CeilingKind::GenCeilingChgT;
        }
        CeilingChange::Texture => ceiling.kind = CeilingKind::GenCeilingChg,
        CeilingChange::None => {}
    }
    ceiling
}

/// Start a generalized ceiling in every free sector tagged like `line`.
///
/// Doom function name `EV_DoGenCeiling`
pub fn ev_do_gen_ceiling(line: LineId, params: GenCeilingParams, level: &mut Level) -> bool {
    let mut ret = false;
    for sector in free_tagged_sectors(line, level) {
        let ceiling = gen_ceiling(line, sector, params, level);
        start_ceiling(ceiling, level);
        ret = true;
    }
    ret
}

/// Wake tagged crushers in stasis, then start a generalized crusher in every
/// free sector tagged like `line`.
///
/// Doom function name `EV_DoGenCrusher`
pub fn ev_do_gen_crusher(line: LineId, params: GenCrusherParams, level: &mut Level) -> bool {
    let tag = level.map_data.line(line).tag;
    let mut ret = level.activate_ceiling_in_stasis(tag);

    let kind = if params.silent {
        CeilingKind::GenSilentCrusher
    } else {
        CeilingKind::GenCrusher
    };
    for sector in free_tagged_sectors(line, level) {
        let mut ceiling = CeilingMove::new(sector, kind, level);
        ceiling.crush = true;
        ceiling.direction = Direction::Down;
        ceiling.bottomheight += CRUSH_CLEARANCE;
        ceiling.speed = params.speed.speed();
        ceiling.old_speed = ceiling.speed;
        start_ceiling(ceiling, level);
        ret = true;
    }
    ret
}
