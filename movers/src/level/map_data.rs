//! Sectors and lines of the loaded map, plus the tag lookup used by line
//! specials.

use glam::Vec2;

use crate::level::{
    flags::LineDefFlags,
    map_defs::{LineDef, LineId, MapThing, Sector, SectorId},
};

#[derive(Debug, Default, Clone)]
pub struct MapData {
    name: String,
    sectors: Vec<Sector>,
    linedefs: Vec<LineDef>,
}

impl MapData {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a sector, its `num` is set to its index
    pub fn add_sector(&mut self, mut sector: Sector) -> SectorId {
        let id = SectorId(self.sectors.len());
        sector.num = id.0 as u32;
        sector.lines.clear();
        sector.ceilingdata = None;
        self.sectors.push(sector);
        id
    }

    /// Add a line and link it to the sectors on both sides. A line with a
    /// back sector is always two-sided.
    pub fn add_line(
        &mut self,
        mut flags: u32,
        special: i16,
        tag: i16,
        frontsector: SectorId,
        backsector: Option<SectorId>,
    ) -> LineId {
        let id = LineId(self.linedefs.len());
        if backsector.is_some() {
            flags |= LineDefFlags::TwoSided.bits();
        }
        self.linedefs.push(LineDef {
            flags,
            special,
            tag,
            frontsector,
            backsector,
        });

        self.sectors[frontsector.0].lines.push(id);
        if let Some(back) = backsector.filter(|b| *b != frontsector) {
            self.sectors[back.0].lines.push(id);
        }
        id
    }

    /// Place a thing in a sector
    pub fn add_thing(&mut self, sector: SectorId, thing: MapThing) {
        self.sectors[sector.0].things.push(thing);
    }

    /// Set where sounds from the sector appear to come from
    pub fn set_sound_origin(&mut self, sector: SectorId, origin: Vec2) {
        self.sectors[sector.0].sound_origin = origin;
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn linedefs(&self) -> &[LineDef] {
        &self.linedefs
    }

    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.0]
    }

    pub fn sector_mut(&mut self, id: SectorId) -> &mut Sector {
        &mut self.sectors[id.0]
    }

    pub fn line(&self, id: LineId) -> &LineDef {
        &self.linedefs[id.0]
    }

    pub fn line_mut(&mut self, id: LineId) -> &mut LineDef {
        &mut self.linedefs[id.0]
    }

    /// Every sector carrying `tag`, in map order. The iterator is lazy and
    /// can be cloned to restart from the same position.
    ///
    /// Doom function name `P_FindSectorFromLineTag`
    pub fn sectors_with_tag(&self, tag: i16) -> SectorTagIter<'_> {
        SectorTagIter {
            sectors: &self.sectors,
            tag,
            next: 0,
        }
    }
}

#[derive(Clone)]
pub struct SectorTagIter<'a> {
    sectors: &'a [Sector],
    tag: i16,
    next: usize,
}

impl Iterator for SectorTagIter<'_> {
    type Item = SectorId;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.sectors.len() {
            let i = self.next;
            self.next += 1;
            if self.sectors[i].tag == self.tag {
                return Some(SectorId(i));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::MapData;
    use crate::level::map_defs::{Sector, SectorId};

    #[test]
    fn tag_lookup() {
        let mut map = MapData::new("TEST".to_owned());
        map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 160, 0, 3));
        map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 160, 0, 7));
        map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 160, 0, 3));

        let mut iter = map.sectors_with_tag(3);
        assert_eq!(iter.next(), Some(SectorId(0)));
        let restart = iter.clone();
        assert_eq!(iter.next(), Some(SectorId(2)));
        assert_eq!(iter.next(), None);
        assert_eq!(restart.collect::<Vec<_>>(), vec![SectorId(2)]);

        assert_eq!(map.sectors_with_tag(99).count(), 0);
    }

    #[test]
    fn lines_link_both_sides() {
        let mut map = MapData::default();
        let a = map.add_sector(Sector::new(0, 0.0, 128.0, 0, 0, 160, 0, 0));
        let b = map.add_sector(Sector::new(0, 0.0, 64.0, 0, 0, 160, 0, 0));
        assert_eq!(map.sector(b).num, 1);

        let one_sided = map.add_line(0, 0, 0, a, None);
        let shared = map.add_line(0, 0, 0, a, Some(b));

        assert_eq!(map.sector(a).lines, vec![one_sided, shared]);
        assert_eq!(map.sector(b).lines, vec![shared]);
        assert!(!map.line(one_sided).is_two_sided());
        assert!(map.line(shared).is_two_sided());
    }
}
