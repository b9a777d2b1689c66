//! Ceiling movement thinker: raise, lower, crusher
//!
//! Doom source name `p_ceilng`

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use sound_traits::SfxName;

use crate::{
    doom_def::GameMission,
    env::{
        lights::{light_by_adjacent_sectors, sector_has_light_special},
        specials::{
            Direction, PlaneKind, PlaneResult, find_highest_ceiling_surrounding,
            find_highest_floor_surrounding, find_lowest_ceiling_surrounding, move_plane,
        },
    },
    level::{
        Level,
        flags::LineDefFlags,
        map_defs::{LineId, SectorId},
    },
    pool::Handle,
    thinker::Think,
};

new_key_type! {
    /// A mover's key in the level's active ceiling registry
    pub struct CeilingId;
}

pub const CEILSPEED: f32 = 1.0;
/// Gap a crusher leaves between itself and the floor
pub const CRUSH_CLEARANCE: f32 = 8.0;
/// Crushers at or above this speed never slow down when blocked
const FAST_CRUSHER_SPEED: f32 = CEILSPEED * 3.0;
/// Speed of a blocked crusher
const CRUSH_SPEED: f32 = CEILSPEED / 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CeilingKind {
    LowerToFloor,
    RaiseToHighest,
    LowerToLowest,
    LowerToMaxFloor,
    LowerAndCrush,
    CrushAndRaise,
    FastCrushAndRaise,
    SilentCrushAndRaise,
    /// Generalized move without a texture change
    GenCeiling,
    /// Generalized move, texture change only
    GenCeilingChg,
    /// Generalized move, texture change and the special zeroed
    GenCeilingChg0,
    /// Generalized move, texture and special copied from the model
    GenCeilingChgT,
    GenCrusher,
    GenSilentCrusher,
}

/// How a mover changes speed when it turns around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedChange {
    Keep,
    /// Back to `CEILSPEED`
    Baseline,
    /// Back to `old_speed`, unless it is a fast crusher
    RestoreSaved,
}

/// What a mover does when it reaches the end of its travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestAction {
    /// Sit at the bound, still registered
    Idle,
    Remove,
    /// Apply the pending texture (and special) then remove
    ChangeAndRemove,
    Reverse { stop_sound: bool, speed: SpeedChange },
}

/// What a mover does when something in the sector is in the way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrushAction {
    Ignore,
    Slow,
    SlowUnlessFast,
}

impl CeilingKind {
    /// Silent crushers never make the moving sound
    pub const fn is_silent(self) -> bool {
        matches!(
            self,
            CeilingKind::SilentCrushAndRaise | CeilingKind::GenSilentCrusher
        )
    }

    /// Starting one of these first wakes movers of the same tag in stasis
    pub const fn resumes_in_stasis(self) -> bool {
        matches!(
            self,
            CeilingKind::CrushAndRaise
                | CeilingKind::FastCrushAndRaise
                | CeilingKind::SilentCrushAndRaise
        )
    }

    /// Only two of the change variants carry a special
    pub const fn changes_special(self) -> bool {
        matches!(self, CeilingKind::GenCeilingChg0 | CeilingKind::GenCeilingChgT)
    }

    pub const fn at_top(self) -> DestAction {
        use CeilingKind::*;
        match self {
            RaiseToHighest | GenCeiling => DestAction::Remove,
            GenCeilingChg | GenCeilingChg0 | GenCeilingChgT => DestAction::ChangeAndRemove,
            SilentCrushAndRaise => DestAction::Reverse {
                stop_sound: true,
                speed: SpeedChange::Keep,
            },
            GenSilentCrusher | GenCrusher | FastCrushAndRaise | CrushAndRaise => {
                DestAction::Reverse {
                    stop_sound: false,
                    speed: SpeedChange::Keep,
                }
            }
            LowerToFloor | LowerToLowest | LowerToMaxFloor | LowerAndCrush => DestAction::Idle,
        }
    }

    pub const fn at_bottom(self) -> DestAction {
        use CeilingKind::*;
        match self {
            GenSilentCrusher | GenCrusher => DestAction::Reverse {
                stop_sound: false,
                speed: SpeedChange::RestoreSaved,
            },
            SilentCrushAndRaise => DestAction::Reverse {
                stop_sound: true,
                speed: SpeedChange::Baseline,
            },
            CrushAndRaise => DestAction::Reverse {
                stop_sound: false,
                speed: SpeedChange::Baseline,
            },
            FastCrushAndRaise => DestAction::Reverse {
                stop_sound: false,
                speed: SpeedChange::Keep,
            },
            GenCeilingChg | GenCeilingChg0 | GenCeilingChgT => DestAction::ChangeAndRemove,
            LowerAndCrush | LowerToFloor | LowerToLowest | LowerToMaxFloor | GenCeiling => {
                DestAction::Remove
            }
            RaiseToHighest => DestAction::Idle,
        }
    }

    pub const fn on_crushed(self) -> CrushAction {
        use CeilingKind::*;
        match self {
            GenSilentCrusher | GenCrusher => CrushAction::SlowUnlessFast,
            SilentCrushAndRaise | CrushAndRaise | LowerAndCrush => CrushAction::Slow,
            _ => CrushAction::Ignore,
        }
    }
}

/// A level where crushers come down flush with the floor. Only honoured when
/// `Level::can_modify` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceException {
    pub mission: GameMission,
    pub map: i32,
}

impl ClearanceException {
    /// Doom II MAP04 has a crusher that must close completely
    pub fn defaults() -> Vec<Self> {
        vec![ClearanceException {
            mission: GameMission::Doom2,
            map: 4,
        }]
    }
}

fn crush_clearance(level: &Level) -> f32 {
    let exempt = level.can_modify
        && level
            .clearance_exceptions
            .iter()
            .any(|e| e.mission == level.game_mission && e.map == level.game_map);
    if exempt { 0.0 } else { CRUSH_CLEARANCE }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingMove {
    pub sector: SectorId,
    pub kind: CeilingKind,
    pub bottomheight: f32,
    pub topheight: f32,
    pub speed: f32,
    /// Nominal speed of a generalized crusher
    pub old_speed: f32,
    pub crush: bool,
    pub direction: Direction,
    /// Direction to resume in after stasis
    pub old_direction: Direction,
    /// ID
    pub tag: i16,
    /// Ceiling texture to apply when a change variant finishes
    pub texture: usize,
    /// Sector special to apply when a change variant finishes
    pub new_special: i16,
    /// Run list entry, `None` while in stasis
    pub(crate) thinker: Option<Handle>,
}

impl CeilingMove {
    /// A mover that sits still at the sector's current heights. The variant
    /// setup fills in the rest.
    pub(crate) fn new(sector: SectorId, kind: CeilingKind, level: &Level) -> Self {
        let sec = level.map_data.sector(sector);
        Self {
            sector,
            kind,
            bottomheight: sec.floorheight,
            topheight: sec.ceilingheight,
            speed: CEILSPEED,
            old_speed: CEILSPEED,
            crush: false,
            direction: Direction::Stasis,
            old_direction: Direction::Stasis,
            tag: sec.tag,
            texture: sec.ceilingpic,
            new_special: sec.special,
            thinker: None,
        }
    }

    /// Set the bounds for one of the fixed variants. Returns `None` for the
    /// generalized variants, which are configured from their line special.
    fn for_kind(sector: SectorId, kind: CeilingKind, level: &Level) -> Option<Self> {
        let mut ceiling = Self::new(sector, kind, level);
        let map = &level.map_data;
        let sec = map.sector(sector);

        match kind {
            CeilingKind::FastCrushAndRaise => {
                ceiling.crush = true;
                ceiling.bottomheight = sec.floorheight + CRUSH_CLEARANCE;
                ceiling.direction = Direction::Down;
                ceiling.speed = CEILSPEED * 2.0;
            }
            CeilingKind::CrushAndRaise | CeilingKind::SilentCrushAndRaise => {
                ceiling.crush = true;
                ceiling.bottomheight = sec.floorheight + crush_clearance(level);
                ceiling.direction = Direction::Down;
            }
            CeilingKind::LowerAndCrush => {
                ceiling.crush = true;
                ceiling.bottomheight = sec.floorheight + crush_clearance(level);
                ceiling.direction = Direction::Down;
            }
            CeilingKind::LowerToFloor => {
                ceiling.direction = Direction::Down;
            }
            CeilingKind::RaiseToHighest => {
                ceiling.topheight = find_highest_ceiling_surrounding(map, sector);
                ceiling.direction = Direction::Up;
            }
            CeilingKind::LowerToLowest => {
                ceiling.bottomheight = find_lowest_ceiling_surrounding(map, sector);
                ceiling.direction = Direction::Down;
            }
            CeilingKind::LowerToMaxFloor => {
                ceiling.bottomheight = find_highest_floor_surrounding(map, sector);
                ceiling.direction = Direction::Down;
            }
            CeilingKind::GenCeiling
            | CeilingKind::GenCeilingChg
            | CeilingKind::GenCeilingChg0
            | CeilingKind::GenCeilingChgT
            | CeilingKind::GenCrusher
            | CeilingKind::GenSilentCrusher => return None,
        }
        Some(ceiling)
    }

    /// Move one tic. Returns `false` once the mover is finished and should be
    /// removed.
    fn advance(&mut self, level: &mut Level) -> bool {
        match self.direction {
            Direction::Stasis => true,
            Direction::Up => {
                let res = move_plane(
                    level,
                    self.sector,
                    self.speed,
                    self.topheight,
                    false,
                    PlaneKind::Ceiling,
                    Direction::Up,
                );
                self.moving_sound(level, self.topheight);
                self.gradual_lighting(level);

                match res {
                    PlaneResult::PastDest => self.reached(self.kind.at_top(), level),
                    PlaneResult::Crushed => {
                        error!("Rising ceiling on {} reported crushed", self.sector);
                        true
                    }
                    PlaneResult::Ok => true,
                }
            }
            Direction::Down => {
                let res = move_plane(
                    level,
                    self.sector,
                    self.speed,
                    self.bottomheight,
                    self.crush,
                    PlaneKind::Ceiling,
                    Direction::Down,
                );
                self.moving_sound(level, self.bottomheight);
                self.gradual_lighting(level);

                match res {
                    PlaneResult::PastDest => self.reached(self.kind.at_bottom(), level),
                    PlaneResult::Crushed if self.crush => {
                        self.crushed();
                        true
                    }
                    PlaneResult::Crushed | PlaneResult::Ok => true,
                }
            }
        }
    }

    /// The grinding sound plays every 8th tic while the ceiling is short of
    /// `dest`
    fn moving_sound(&self, level: &Level, dest: f32) {
        if level.level_time & 7 != 0 || self.kind.is_silent() {
            return;
        }
        if level.map_data.sector(self.sector).ceilingheight != dest {
            level.start_sector_sound(self.sector, SfxName::Stnmov);
        }
    }

    /// Dim the sector as the ceiling closes on the floor
    fn gradual_lighting(&self, level: &mut Level) {
        let sec = level.map_data.sector(self.sector);
        let range = self.topheight - sec.floorheight;
        if range == 0.0 || sector_has_light_special(&level.map_data, self.sector) {
            return;
        }
        let ratio = (sec.ceilingheight - sec.floorheight) / range;
        light_by_adjacent_sectors(&mut level.map_data, self.sector, ratio);
    }

    fn reached(&mut self, action: DestAction, level: &mut Level) -> bool {
        match action {
            DestAction::Idle => true,
            DestAction::Remove => false,
            DestAction::ChangeAndRemove => {
                self.apply_change(level);
                false
            }
            DestAction::Reverse { stop_sound, speed } => {
                if stop_sound {
                    level.start_sector_sound(self.sector, SfxName::Pstop);
                }
                match speed {
                    SpeedChange::Keep => {}
                    SpeedChange::Baseline => self.speed = CEILSPEED,
                    SpeedChange::RestoreSaved => {
                        if self.old_speed < FAST_CRUSHER_SPEED {
                            self.speed = self.old_speed;
                        }
                    }
                }
                self.direction = self.direction.reversed();
                debug!("Ceiling on {} reversed {:?}", self.sector, self.direction);
                true
            }
        }
    }

    fn crushed(&mut self) {
        match self.kind.on_crushed() {
            CrushAction::Ignore => {}
            CrushAction::Slow => self.speed = CRUSH_SPEED,
            CrushAction::SlowUnlessFast => {
                if self.old_speed < FAST_CRUSHER_SPEED {
                    self.speed = CRUSH_SPEED;
                }
            }
        }
    }

    fn apply_change(&self, level: &mut Level) {
        let sector = level.map_data.sector_mut(self.sector);
        if self.kind.changes_special() {
            sector.special = self.new_special;
        }
        sector.ceilingpic = self.texture;
    }
}

impl Think for CeilingMove {
    fn think(this: CeilingId, level: &mut Level) -> bool {
        let Some(mut ceiling) = level.ceiling(this).copied() else {
            #[cfg(feature = "null_check")]
            panic!("Ceiling thinker {this:?} has no ceiling");
            #[cfg(not(feature = "null_check"))]
            return false;
        };
        if level.freeze {
            return true;
        }

        if ceiling.advance(level) {
            if let Some(live) = level.ceiling_mut(this) {
                *live = ceiling;
            }
            return true;
        }

        level.remove_active_ceiling(this);
        false
    }
}

/// Register a configured mover and clear the secret flag on the lines
/// around its sector.
pub(crate) fn start_ceiling(ceiling: CeilingMove, level: &mut Level) -> CeilingId {
    let sector = ceiling.sector;
    let id = level.add_active_ceiling(ceiling);
    let lines = level.map_data.sector(sector).lines.clone();
    for line in lines {
        level.map_data.line_mut(line).flags &= !LineDefFlags::Secret.bits();
    }
    debug!("Started {:?} ceiling {id:?} on {sector}", ceiling.kind);
    id
}

/// Sectors tagged like `line` that are free to take a new mover
pub(crate) fn free_tagged_sectors(line: LineId, level: &Level) -> Vec<SectorId> {
    let tag = level.map_data.line(line).tag;
    level
        .map_data
        .sectors_with_tag(tag)
        .filter(|s| !level.sector_is_active(*s))
        .collect()
}

/// Start a ceiling of `kind` in every free sector tagged like `line`. The
/// crush and raise variants first wake any tagged crushers in stasis.
///
/// Doom function name `EV_DoCeiling`
pub fn ev_do_ceiling(line: LineId, kind: CeilingKind, level: &mut Level) -> bool {
    let mut ret = false;
    if kind.resumes_in_stasis() {
        let tag = level.map_data.line(line).tag;
        ret = level.activate_ceiling_in_stasis(tag);
    }

    for sector in free_tagged_sectors(line, level) {
        let Some(ceiling) = CeilingMove::for_kind(sector, kind, level) else {
            warn!("{kind:?} needs a generalized line special");
            return ret;
        };
        start_ceiling(ceiling, level);
        ret = true;
    }
    ret
}

/// Pause the crushers tagged like `line`.
///
/// Doom function name `EV_CeilingCrushStop`
pub fn ev_ceiling_crush_stop(line: LineId, level: &mut Level) -> bool {
    let tag = level.map_data.line(line).tag;
    level.stop_ceiling(tag)
}
