//! Doom source name `p_lights`, only the parts a moving ceiling touches

use log::trace;

use crate::{
    env::specials::get_next_sector,
    level::{map_data::MapData, map_defs::SectorId},
};

/// Sector specials that run their own lighting thinker: flickers, blinks,
/// glows and strobes.
///
/// Doom function name `P_SectorHasLightSpecial`
pub fn sector_has_light_special(map: &MapData, sector: SectorId) -> bool {
    matches!(map.sector(sector).special, 1 | 2 | 3 | 4 | 8 | 12 | 13 | 17)
}

/// Doom function name `P_FindMinSurroundingLight`
pub fn find_min_light_surrounding(map: &MapData, sec: SectorId, max: i32) -> i32 {
    map.sector(sec)
        .lines
        .iter()
        .filter_map(|line| get_next_sector(map, *line, sec))
        .map(|s| map.sector(s).lightlevel)
        .fold(max, i32::min)
}

pub fn find_max_light_surrounding(map: &MapData, sec: SectorId, min: i32) -> i32 {
    map.sector(sec)
        .lines
        .iter()
        .filter_map(|line| get_next_sector(map, *line, sec))
        .map(|s| map.sector(s).lightlevel)
        .fold(min, i32::max)
}

/// Blend the sector's light between the darkest and brightest of its
/// neighbours. `ratio` is clamped to `0.0..=1.0`, where `1.0` is the
/// brightest. A sector without neighbours is left alone.
///
/// Doom function name `EV_LightByAdjacentSectors`
pub fn light_by_adjacent_sectors(map: &mut MapData, sector: SectorId, ratio: f32) {
    let min = find_min_light_surrounding(map, sector, i32::MAX);
    let max = find_max_light_surrounding(map, sector, i32::MIN);
    if min > max {
        return;
    }

    let ratio = ratio.clamp(0.0, 1.0);
    let light = min + ((max - min) as f32 * ratio) as i32;
    trace!("light_by_adjacent_sectors: {sector} {ratio} -> {light}");
    map.sector_mut(sector).lightlevel = light;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::map_defs::Sector;

    fn lit_room() -> MapData {
        let mut map = MapData::default();
        let room = map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 160, 0, 0));
        let dark = map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 96, 0, 0));
        let bright = map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 224, 0, 0));
        map.add_line(0, 0, 0, room, Some(dark));
        map.add_line(0, 0, 0, bright, Some(room));
        map
    }

    #[test]
    fn surrounding_light() {
        let map = lit_room();
        assert_eq!(find_min_light_surrounding(&map, SectorId(0), 255), 96);
        assert_eq!(find_max_light_surrounding(&map, SectorId(0), 0), 224);
    }

    #[test]
    fn blend_by_ratio() {
        let mut map = lit_room();
        let room = SectorId(0);

        light_by_adjacent_sectors(&mut map, room, 0.5);
        assert_eq!(map.sector(room).lightlevel, 160);

        light_by_adjacent_sectors(&mut map, room, 0.0);
        assert_eq!(map.sector(room).lightlevel, 96);

        light_by_adjacent_sectors(&mut map, room, 4.0);
        assert_eq!(map.sector(room).lightlevel, 224);
    }

    #[test]
    fn lonely_sector_untouched() {
        let mut map = MapData::default();
        let s = map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 144, 8, 0));
        light_by_adjacent_sectors(&mut map, s, 0.0);
        assert_eq!(map.sector(s).lightlevel, 144);
        assert!(sector_has_light_special(&map, s));
    }
}
