//! The data that makes up an entire level, along with the registries of
//! active movers and the run list that drives them.
//!
//! A `Level` exists only while a map is being played. Dropping it, or calling
//! `unload()`, discards every mover with it.

pub mod flags;
pub mod map_data;
pub mod map_defs;

use log::{debug, info, warn};
use slotmap::SlotMap;
use sound_traits::{SfxName, SoundAction};

use crate::{
    SndServerTx,
    doom_def::GameMission,
    env::{
        ceiling::{CeilingId, CeilingMove, ClearanceException},
        specials::Direction,
    },
    thinker::{Think, ThinkerAlloc},
};

use self::{map_data::MapData, map_defs::SectorId};

pub struct Level {
    pub map_data: MapData,
    pub thinkers: ThinkerAlloc,
    /// Every ceiling mover alive in the level, including those in stasis.
    /// Doom name `activeceilings`
    active_ceilings: SlotMap<CeilingId, CeilingMove>,
    pub level_time: u32,
    /// When set, movers keep their state but do not advance
    pub freeze: bool,
    /// Required for map specific fixes
    pub game_mission: GameMission,
    /// Required for map specific fixes
    pub game_map: i32,
    /// False if the map is a replacement for which built-in map fixes must
    /// not be applied
    pub can_modify: bool,
    /// Cases where a crusher stops flush with the floor instead of leaving
    /// a gap
    pub clearance_exceptions: Vec<ClearanceException>,
    /// Provides ability for movers to start a sound
    pub(crate) snd_command: SndServerTx,
}

impl Level {
    /// Set up a level around loaded map data. The clearance exception table
    /// starts with the built-in entries.
    ///
    /// Doom method name is `P_SetupLevel`
    pub fn new(map_data: MapData, snd_command: SndServerTx) -> Self {
        let thinkers = ThinkerAlloc::new(map_data.sectors().len());
        Level {
            map_data,
            thinkers,
            active_ceilings: SlotMap::with_key(),
            level_time: 0,
            freeze: false,
            game_mission: GameMission::default(),
            game_map: 1,
            can_modify: true,
            clearance_exceptions: ClearanceException::defaults(),
            snd_command,
        }
    }

    /// Advance the level by one tic. Doom function name `P_Ticker`
    pub fn ticker(&mut self) {
        self.run_thinkers();
        self.level_time += 1;
    }

    /// Doom function name `P_RunThinkers`
    pub fn run_thinkers(&mut self) {
        let mut current = self.thinkers.first();
        while let Some(handle) = current {
            // A thinker may unlink itself, grab the next one first
            current = self.thinkers.next(handle);
            let Some(thinker) = self.thinkers.get(handle).copied() else {
                continue;
            };
            if !thinker.think(self) {
                self.thinkers.remove(handle);
            }
        }
    }

    pub fn active_ceilings(&self) -> &SlotMap<CeilingId, CeilingMove> {
        &self.active_ceilings
    }

    pub fn ceiling(&self, id: CeilingId) -> Option<&CeilingMove> {
        self.active_ceilings.get(id)
    }

    pub(crate) fn ceiling_mut(&mut self, id: CeilingId) -> Option<&mut CeilingMove> {
        self.active_ceilings.get_mut(id)
    }

    /// The ceiling mover that owns `sector`, if any
    pub fn sector_ceiling(&self, sector: SectorId) -> Option<&CeilingMove> {
        self.map_data
            .sector(sector)
            .ceilingdata
            .and_then(|id| self.active_ceilings.get(id))
    }

    /// Doom function name `P_SectorActive` for ceilings
    pub fn sector_is_active(&self, sector: SectorId) -> bool {
        self.sector_ceiling(sector).is_some()
    }

    /// Register a new mover, give the sector its back-pointer, and schedule
    /// it to run every tic.
    ///
    /// Doom function name `P_AddActiveCeiling`
    pub(crate) fn add_active_ceiling(&mut self, ceiling: CeilingMove) -> CeilingId {
        let sector = ceiling.sector;
        let id = self.active_ceilings.insert(ceiling);
        let thinker = self.thinkers.push(CeilingMove::create_thinker(id));
        if let Some(ceiling) = self.active_ceilings.get_mut(id) {
            ceiling.thinker = Some(thinker);
        }
        self.map_data.sector_mut(sector).ceilingdata = Some(id);
        debug!("Added active ceiling {id:?} on {sector}");
        id
    }

    /// Unlink the mover from the sector, the run list, and the registry, in
    /// that order.
    ///
    /// Doom function name `P_RemoveActiveCeiling`
    pub(crate) fn remove_active_ceiling(&mut self, id: CeilingId) -> Option<CeilingMove> {
        let ceiling = self.active_ceilings.remove(id)?;
        let sector = self.map_data.sector_mut(ceiling.sector);
        if sector.ceilingdata == Some(id) {
            sector.ceilingdata = None;
        }
        if let Some(thinker) = ceiling.thinker {
            self.thinkers.remove(thinker);
        }
        debug!("Removed active ceiling {id:?} from {}", ceiling.sector);
        Some(ceiling)
    }

    /// Put every moving ceiling with `tag` into stasis. The movers stay
    /// registered, but are taken off the run list. Returns `true` if any
    /// mover was paused.
    ///
    /// Doom function name `EV_CeilingCrushStop`
    pub fn stop_ceiling(&mut self, tag: i16) -> bool {
        let mut ret = false;
        for (id, ceiling) in self.active_ceilings.iter_mut() {
            if ceiling.tag != tag || ceiling.direction == Direction::Stasis {
                continue;
            }
            ceiling.old_direction = ceiling.direction;
            ceiling.direction = Direction::Stasis;
            if let Some(thinker) = ceiling.thinker.take() {
                self.thinkers.remove(thinker);
            }
            debug!("Ceiling {id:?} on {} in stasis", ceiling.sector);
            ret = true;
        }
        ret
    }

    /// Restart every ceiling with `tag` that is in stasis, in the direction
    /// it was going. Returns `true` if any mover was resumed.
    ///
    /// Doom function name `P_ActivateInStasisCeiling`
    pub fn activate_ceiling_in_stasis(&mut self, tag: i16) -> bool {
        let mut ret = false;
        for (id, ceiling) in self.active_ceilings.iter_mut() {
            if ceiling.tag != tag || ceiling.direction != Direction::Stasis {
                continue;
            }
            ceiling.direction = ceiling.old_direction;
            let scheduled = ceiling
                .thinker
                .is_some_and(|thinker| self.thinkers.contains(thinker));
            if !scheduled {
                ceiling.thinker = Some(self.thinkers.push(CeilingMove::create_thinker(id)));
            }
            debug!("Ceiling {id:?} on {} resumed {:?}", ceiling.sector, ceiling.direction);
            ret = true;
        }
        ret
    }

    /// Discard every ceiling mover without running any of its finishing
    /// actions. Used when the level is torn down.
    ///
    /// Doom function name `P_RemoveAllActiveCeilings`
    pub fn remove_all_active_ceilings(&mut self) {
        let removed: Vec<CeilingMove> = self.active_ceilings.drain().map(|(_, c)| c).collect();
        for ceiling in &removed {
            self.map_data.sector_mut(ceiling.sector).ceilingdata = None;
            if let Some(thinker) = ceiling.thinker {
                self.thinkers.remove(thinker);
            }
        }
        if !removed.is_empty() {
            info!("Removed {} active ceilings", removed.len());
        }
    }

    /// Tear down everything that runs in the level
    pub fn unload(&mut self) {
        self.remove_all_active_ceilings();
        self.thinkers.clear();
    }

    /// Start a sound at the sector's sound origin
    pub(crate) fn start_sector_sound(&self, sector: SectorId, sfx: SfxName) {
        let sector = self.map_data.sector(sector);
        let origin = sector.sound_origin;
        if let Err(e) = self.snd_command.send(SoundAction::StartSfx {
            uid: sector.num as usize,
            sfx,
            x: origin.x,
            y: origin.y,
        }) {
            warn!("Sound server is gone, dropped {sfx}: {e}");
        }
    }
}
