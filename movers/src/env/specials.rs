//! Plane movement, neighbour queries, and the line specials that start or
//! stop ceiling movers.
//!
//! Doom source name `p_spec`, with `T_MovePlane` from `p_floor`

use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::{
    env::{
        ceiling::{CeilingKind, ev_ceiling_crush_stop, ev_do_ceiling},
        generic::{GenSpecial, GenTrigger, ev_do_gen_ceiling, ev_do_gen_crusher},
    },
    level::{
        Level,
        map_data::MapData,
        map_defs::{LineId, SectorId},
    },
};

/// Which way a plane is travelling. Doom uses `1`, `0`, `-1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Down = -1,
    #[default]
    Stasis = 0,
    Up = 1,
}

impl Direction {
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::Stasis => Direction::Stasis,
        }
    }
}

/// Which surface of a sector to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

/// The result of moving a plane. `PastDest` = stop, `Crushed` = something in
/// the sector is in the way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneResult {
    Ok,
    Crushed,
    PastDest,
}

/// Get the sector on the other side of the line, if it is two sided.
///
/// Doom function name `getNextSector`
pub fn get_next_sector(map: &MapData, line: LineId, sector: SectorId) -> Option<SectorId> {
    let line = map.line(line);
    if !line.is_two_sided() {
        return None;
    }

    if line.frontsector == sector {
        return line.backsector;
    }

    Some(line.frontsector)
}

/// Fold a value over all neighbouring sectors. `None` if there are none.
fn fold_surrounding(
    map: &MapData,
    sec: SectorId,
    value: impl Fn(SectorId) -> f32,
    pick: impl Fn(f32, f32) -> f32,
) -> Option<f32> {
    map.sector(sec)
        .lines
        .iter()
        .filter_map(|line| get_next_sector(map, *line, sec))
        .map(value)
        .reduce(pick)
}

/// Sectors without neighbours answer with their own height.
///
/// Doom function name `P_FindLowestCeilingSurrounding`
pub fn find_lowest_ceiling_surrounding(map: &MapData, sec: SectorId) -> f32 {
    let height = fold_surrounding(map, sec, |s| map.sector(s).ceilingheight, f32::min)
        .unwrap_or(map.sector(sec).ceilingheight);
    debug!("find_lowest_ceiling_surrounding: {height}");
    height
}

/// Doom function name `P_FindHighestCeilingSurrounding`
pub fn find_highest_ceiling_surrounding(map: &MapData, sec: SectorId) -> f32 {
    let height = fold_surrounding(map, sec, |s| map.sector(s).ceilingheight, f32::max)
        .unwrap_or(map.sector(sec).ceilingheight);
    debug!("find_highest_ceiling_surrounding: {height}");
    height
}

/// Includes the sector's own floor, as Doom does.
///
/// Doom function name `P_FindLowestFloorSurrounding`
pub fn find_lowest_floor_surrounding(map: &MapData, sec: SectorId) -> f32 {
    let own = map.sector(sec).floorheight;
    let floor = fold_surrounding(map, sec, |s| map.sector(s).floorheight, f32::min)
        .map_or(own, |f| f.min(own));
    debug!("find_lowest_floor_surrounding: {floor}");
    floor
}

/// Doom function name `P_FindHighestFloorSurrounding`
pub fn find_highest_floor_surrounding(map: &MapData, sec: SectorId) -> f32 {
    let floor = fold_surrounding(map, sec, |s| map.sector(s).floorheight, f32::max)
        .unwrap_or(map.sector(sec).floorheight);
    debug!("find_highest_floor_surrounding: {floor}");
    floor
}

/// Smallest neighbouring ceiling above `current`, or `current` if none.
///
/// Doom function name `P_FindNextHighestCeiling`
pub fn find_next_highest_ceiling(map: &MapData, sec: SectorId, current: f32) -> f32 {
    fold_surrounding(
        map,
        sec,
        |s| map.sector(s).ceilingheight,
        |a, b| match (a > current, b > current) {
            (true, true) => a.min(b),
            (true, false) => a,
            _ => b,
        },
    )
    .filter(|h| *h > current)
    .unwrap_or(current)
}

/// Largest neighbouring ceiling below `current`, or `current` if none.
///
/// Doom function name `P_FindNextLowestCeiling`
pub fn find_next_lowest_ceiling(map: &MapData, sec: SectorId, current: f32) -> f32 {
    fold_surrounding(
        map,
        sec,
        |s| map.sector(s).ceilingheight,
        |a, b| match (a < current, b < current) {
            (true, true) => a.max(b),
            (true, false) => a,
            _ => b,
        },
    )
    .filter(|h| *h < current)
    .unwrap_or(current)
}

/// A neighbouring sector whose ceiling sits at `height`, used as the model
/// for a texture change.
///
/// Doom function name `P_FindModelCeilingSector`
pub fn find_model_ceiling_sector(map: &MapData, sec: SectorId, height: f32) -> Option<SectorId> {
    map.sector(sec)
        .lines
        .iter()
        .filter_map(|line| get_next_sector(map, *line, sec))
        .find(|s| map.sector(*s).ceilingheight == height)
}

/// Doom function name `P_FindModelFloorSector`
pub fn find_model_floor_sector(map: &MapData, sec: SectorId, height: f32) -> Option<SectorId> {
    map.sector(sec)
        .lines
        .iter()
        .filter_map(|line| get_next_sector(map, *line, sec))
        .find(|s| map.sector(*s).floorheight == height)
}

/// Check every thing in the sector still fits. Returns `true` if something
/// is in the way. When `crunch` is set the blockers take damage every 4th tic.
///
/// Doom function name `P_ChangeSector`, with `PIT_ChangeSector` inlined
pub fn change_sector(map: &mut MapData, sector: SectorId, crunch: bool, level_time: u32) -> bool {
    let mut no_fit = false;
    let sector = map.sector_mut(sector);
    let (num, floor, ceiling) = (sector.num, sector.floorheight, sector.ceilingheight);

    sector.things.retain_mut(|thing| {
        if thing.fits(floor, ceiling) {
            return true;
        }

        if thing.health <= 0 {
            // Squashed flat into gibs
            thing.height = 0.0;
            return true;
        }

        // crunch dropped items
        if thing.dropped {
            trace!("Dropped item crunched in sector {num}");
            return false;
        }

        if !thing.shootable {
            // assume it is bloody gibs or something
            return true;
        }

        no_fit = true;

        if crunch && level_time & 3 == 0 {
            debug!("Crushing thing in sector {num}");
            thing.health -= 10;
        }
        true
    });

    no_fit
}

fn plane_height(map: &MapData, sector: SectorId, plane: PlaneKind) -> f32 {
    match plane {
        PlaneKind::Floor => map.sector(sector).floorheight,
        PlaneKind::Ceiling => map.sector(sector).ceilingheight,
    }
}

fn set_plane_height(map: &mut MapData, sector: SectorId, plane: PlaneKind, height: f32) {
    match plane {
        PlaneKind::Floor => map.sector_mut(sector).floorheight = height,
        PlaneKind::Ceiling => map.sector_mut(sector).ceilingheight = height,
    }
}

/// Move a floor or ceiling toward `dest` by at most `speed`. The plane never
/// overshoots `dest`. If things in the sector no longer fit, the move is
/// undone unless `crush` is set, and `Crushed` is returned either way. A
/// rising ceiling can never be blocked.
///
/// Doom function name `T_MovePlane`
pub fn move_plane(
    level: &mut Level,
    sector: SectorId,
    speed: f32,
    dest: f32,
    crush: bool,
    plane: PlaneKind,
    direction: Direction,
) -> PlaneResult {
    let level_time = level.level_time;
    let map = &mut level.map_data;

    let last_pos = plane_height(map, sector, plane);
    trace!("move_plane: {plane:?}: {direction:?}: {last_pos} to {dest} at speed {speed}");

    let past_dest = match direction {
        Direction::Down => last_pos - speed < dest,
        Direction::Up => last_pos + speed > dest,
        Direction::Stasis => {
            error!("Invalid plane direction: {direction:?}");
            return PlaneResult::Ok;
        }
    };

    if past_dest {
        set_plane_height(map, sector, plane, dest);
        if change_sector(map, sector, crush, level_time) {
            set_plane_height(map, sector, plane, last_pos);
            change_sector(map, sector, crush, level_time);
        }
        return PlaneResult::PastDest;
    }

    let step = match direction {
        Direction::Down => -speed,
        _ => speed,
    };
    set_plane_height(map, sector, plane, last_pos + step);
    let no_fit = change_sector(map, sector, crush, level_time);

    // Only a lowering ceiling or a rising floor can squash anything
    let closing = matches!(
        (plane, direction),
        (PlaneKind::Ceiling, Direction::Down) | (PlaneKind::Floor, Direction::Up)
    );
    if no_fit && closing {
        if crush {
            return PlaneResult::Crushed;
        }
        set_plane_height(map, sector, plane, last_pos);
        change_sector(map, sector, crush, level_time);
        return PlaneResult::Crushed;
    }

    PlaneResult::Ok
}

/// How a line special is set off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Walked over
    Cross,
    /// Pressed
    Use,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAction {
    Ceiling(CeilingKind),
    CrushStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpecial {
    pub activation: Activation,
    pub repeatable: bool,
    pub action: SpecialAction,
}

const fn special(activation: Activation, repeatable: bool, action: SpecialAction) -> LineSpecial {
    LineSpecial {
        activation,
        repeatable,
        action,
    }
}

/// The fixed ceiling specials, classic and extended numbering. Specials that
/// also move the floor only report their ceiling half here.
pub fn ceiling_line_special(num: i16) -> Option<LineSpecial> {
    use Activation::{Cross, Use};
    use CeilingKind::*;
    use SpecialAction::{Ceiling, CrushStop};

    let special = match num {
        6 => special(Cross, false, Ceiling(FastCrushAndRaise)),
        25 => special(Cross, false, Ceiling(CrushAndRaise)),
        40 => special(Cross, false, Ceiling(RaiseToHighest)),
        44 => special(Cross, false, Ceiling(LowerAndCrush)),
        57 => special(Cross, false, CrushStop),
        72 => special(Cross, true, Ceiling(LowerAndCrush)),
        73 => special(Cross, true, Ceiling(CrushAndRaise)),
        74 => special(Cross, true, CrushStop),
        77 => special(Cross, true, Ceiling(FastCrushAndRaise)),
        141 => special(Cross, false, Ceiling(SilentCrushAndRaise)),
        145 => special(Cross, false, Ceiling(LowerToFloor)),
        150 => special(Cross, true, Ceiling(SilentCrushAndRaise)),
        151 => special(Cross, true, Ceiling(RaiseToHighest)),
        152 => special(Cross, true, Ceiling(LowerToFloor)),
        199 => special(Cross, false, Ceiling(LowerToLowest)),
        200 => special(Cross, false, Ceiling(LowerToMaxFloor)),
        201 => special(Cross, true, Ceiling(LowerToLowest)),
        202 => special(Cross, true, Ceiling(LowerToMaxFloor)),

        41 => special(Use, false, Ceiling(LowerToFloor)),
        43 => special(Use, true, Ceiling(LowerToFloor)),
        49 => special(Use, false, Ceiling(CrushAndRaise)),
        164 => special(Use, false, Ceiling(FastCrushAndRaise)),
        165 => special(Use, false, Ceiling(SilentCrushAndRaise)),
        166 => special(Use, false, Ceiling(RaiseToHighest)),
        167 => special(Use, false, Ceiling(LowerAndCrush)),
        168 => special(Use, false, CrushStop),
        183 => special(Use, true, Ceiling(FastCrushAndRaise)),
        184 => special(Use, true, Ceiling(CrushAndRaise)),
        185 => special(Use, true, Ceiling(SilentCrushAndRaise)),
        186 => special(Use, true, Ceiling(RaiseToHighest)),
        187 => special(Use, true, Ceiling(LowerAndCrush)),
        188 => special(Use, true, CrushStop),
        203 => special(Use, false, Ceiling(LowerToLowest)),
        204 => special(Use, false, Ceiling(LowerToMaxFloor)),
        205 => special(Use, true, Ceiling(LowerToLowest)),
        206 => special(Use, true, Ceiling(LowerToMaxFloor)),
        _ => return None,
    };
    Some(special)
}

fn run_action(line: LineId, action: SpecialAction, level: &mut Level) -> bool {
    match action {
        SpecialAction::Ceiling(kind) => ev_do_ceiling(line, kind, level),
        SpecialAction::CrushStop => ev_ceiling_crush_stop(line, level),
    }
}

fn run_generalized(line: LineId, special: GenSpecial, level: &mut Level) -> bool {
    match special {
        GenSpecial::Ceiling(params) => ev_do_gen_ceiling(line, params, level),
        GenSpecial::Crusher(params) => ev_do_gen_crusher(line, params, level),
    }
}

/// Trigger the ceiling action on a line which has been walked over. Classic
/// single use lines lose their special whether or not anything moved,
/// generalized ones only when something did.
///
/// Doom function name is `P_CrossSpecialLine`
pub fn cross_special_line(line: LineId, level: &mut Level) -> bool {
    let num = level.map_data.line(line).special;

    if let Some(generalized) = GenSpecial::decode(num) {
        let trigger = generalized.trigger();
        if !matches!(trigger, GenTrigger::WalkOnce | GenTrigger::WalkMany) {
            return false;
        }
        debug!("line-special #{num:#x}: generalized {generalized:?}");
        let ret = run_generalized(line, generalized, level);
        if ret && !trigger.repeatable() {
            level.map_data.line_mut(line).special = 0;
        }
        return ret;
    }

    let Some(special) = ceiling_line_special(num) else {
        return false;
    };
    if special.activation != Activation::Cross {
        return false;
    }
    debug!("line-special #{num}: {:?}", special.action);
    let ret = run_action(line, special.action, level);
    if !special.repeatable {
        level.map_data.line_mut(line).special = 0;
    }
    ret
}

/// Trigger the ceiling action on a line which has been pressed. Single use
/// lines lose their special only if something happened.
///
/// Doom function name is `P_UseSpecialLine`
pub fn use_special_line(line: LineId, level: &mut Level) -> bool {
    let num = level.map_data.line(line).special;

    let (ret, repeatable) = if let Some(generalized) = GenSpecial::decode(num) {
        let trigger = generalized.trigger();
        if !matches!(trigger, GenTrigger::SwitchOnce | GenTrigger::SwitchMany) {
            return false;
        }
        debug!("line-special #{num:#x}: generalized {generalized:?}");
        (
            run_generalized(line, generalized, level),
            trigger.repeatable(),
        )
    } else {
        let Some(special) = ceiling_line_special(num) else {
            return false;
        };
        if special.activation != Activation::Use {
            return false;
        }
        debug!("line-special #{num}: {:?}", special.action);
        (run_action(line, special.action, level), special.repeatable)
    };

    if ret && !repeatable {
        level.map_data.line_mut(line).special = 0;
    }
    ret
}
