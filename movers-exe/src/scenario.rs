//! Scenario files: a small map, the things standing in it, and a script of
//! line triggers to replay against it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use movers::{
    ClearanceException, GameMission, Level, LineId, MapData, MapThing, Sector, SectorId,
    SndServerTx, cross_special_line,
    glam::Vec2,
    log::{debug, info},
    use_special_line,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not read scenario {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("scenario has no sectors")]
    NoSectors,
    #[error("{what} {index} refers to missing sector {sector}")]
    UnknownSector {
        what: &'static str,
        index: usize,
        sector: usize,
    },
    #[error("event at tic {tic} refers to missing line {line}")]
    UnknownLine { tic: u32, line: usize },
    #[error("event at tic {tic}: {action:?} needs a line")]
    MissingLine { tic: u32, action: EventAction },
}

fn default_light() -> i32 {
    160
}

fn default_health() -> i32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_map() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectorEntry {
    pub floor: f32,
    pub ceiling: f32,
    #[serde(default)]
    pub floorpic: usize,
    #[serde(default)]
    pub ceilingpic: usize,
    #[serde(default = "default_light")]
    pub light: i32,
    #[serde(default)]
    pub special: i16,
    #[serde(default)]
    pub tag: i16,
    /// Where the sector's sounds come from
    #[serde(default)]
    pub origin: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineEntry {
    pub front: usize,
    #[serde(default)]
    pub back: Option<usize>,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub special: i16,
    #[serde(default)]
    pub tag: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThingEntry {
    pub sector: usize,
    pub height: f32,
    #[serde(default = "default_health")]
    pub health: i32,
    #[serde(default = "default_true")]
    pub shootable: bool,
    #[serde(default)]
    pub dropped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Walk over the line
    Cross,
    /// Press the line
    Use,
    /// Remove every ceiling mover
    StopAll,
    Freeze,
    Thaw,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub tic: u32,
    #[serde(default)]
    pub line: Option<usize>,
    pub action: EventAction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mission: GameMission,
    #[serde(default = "default_map")]
    pub map: i32,
    #[serde(default = "default_true")]
    pub can_modify: bool,
    /// Replaces the built-in table when present
    #[serde(default)]
    pub clearance_exceptions: Option<Vec<ClearanceException>>,
    pub sectors: Vec<SectorEntry>,
    #[serde(default)]
    pub lines: Vec<LineEntry>,
    #[serde(default)]
    pub things: Vec<ThingEntry>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let data = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::parse(&data)?;
        info!(
            "Loaded scenario {:?}: {} sectors, {} lines, {} events",
            scenario.name,
            scenario.sectors.len(),
            scenario.lines.len(),
            scenario.events.len()
        );
        Ok(scenario)
    }

    /// Parse and check every sector and line reference. Events are sorted
    /// by tic, keeping file order within a tic.
    pub fn parse(data: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = toml::from_str(data)?;
        scenario.validate()?;
        scenario.events.sort_by_key(|e| e.tic);
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.sectors.is_empty() {
            return Err(ScenarioError::NoSectors);
        }
        let check_sector = |what, index, sector: usize| {
            if sector < self.sectors.len() {
                Ok(())
            } else {
                Err(ScenarioError::UnknownSector {
                    what,
                    index,
                    sector,
                })
            }
        };

        for (i, line) in self.lines.iter().enumerate() {
            check_sector("line", i, line.front)?;
            if let Some(back) = line.back {
                check_sector("line", i, back)?;
            }
        }
        for (i, thing) in self.things.iter().enumerate() {
            check_sector("thing", i, thing.sector)?;
        }

        for event in &self.events {
            match (event.action, event.line) {
                (EventAction::Cross | EventAction::Use, None) => {
                    return Err(ScenarioError::MissingLine {
                        tic: event.tic,
                        action: event.action,
                    });
                }
                (_, Some(line)) if line >= self.lines.len() => {
                    return Err(ScenarioError::UnknownLine {
                        tic: event.tic,
                        line,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build a fresh level from the scenario map
    pub fn build(&self, snd_tx: SndServerTx) -> Level {
        let mut map = MapData::new(self.name.clone());
        for s in &self.sectors {
            let id = map.add_sector(Sector::new(
                0,
                s.floor,
                s.ceiling,
                s.floorpic,
                s.ceilingpic,
                s.light,
                s.special,
                s.tag,
            ));
            map.set_sound_origin(id, Vec2::from(s.origin));
        }
        for l in &self.lines {
            map.add_line(
                l.flags,
                l.special,
                l.tag,
                SectorId(l.front),
                l.back.map(SectorId),
            );
        }
        for t in &self.things {
            map.add_thing(
                SectorId(t.sector),
                MapThing {
                    height: t.height,
                    health: t.health,
                    shootable: t.shootable,
                    dropped: t.dropped,
                },
            );
        }

        let mut level = Level::new(map, snd_tx);
        level.game_mission = self.mission;
        level.game_map = self.map;
        level.can_modify = self.can_modify;
        if let Some(exceptions) = &self.clearance_exceptions {
            level.clearance_exceptions.clone_from(exceptions);
        }
        level
    }

    /// Events scheduled for `tic`
    pub fn events_at(&self, tic: u32) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.tic == tic)
    }
}

/// Apply one scripted event. Returns `true` if it changed anything.
pub fn run_event(event: &Event, level: &mut Level) -> bool {
    let ret = match (event.action, event.line) {
        (EventAction::Cross, Some(line)) => cross_special_line(LineId(line), level),
        (EventAction::Use, Some(line)) => use_special_line(LineId(line), level),
        (EventAction::Cross | EventAction::Use, None) => false,
        (EventAction::StopAll, _) => {
            let active = !level.active_ceilings().is_empty();
            level.remove_all_active_ceilings();
            active
        }
        (EventAction::Freeze, _) => {
            level.freeze = true;
            true
        }
        (EventAction::Thaw, _) => {
            level.freeze = false;
            true
        }
    };
    debug!("tic {}: {:?} line {:?} -> {ret}", event.tic, event.action, event.line);
    ret
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use movers::{Direction, GameMission};

    use super::{EventAction, Scenario, ScenarioError, run_event};
    use movers::{SectorId, TICRATE};

    const CRUSHER_ROOM: &str = r#"
name = "crusher room"
mission = "Doom2"
map = 4

[[sectors]]
floor = 0.0
ceiling = 128.0

[[sectors]]
floor = 0.0
ceiling = 64.0
tag = 3
origin = [64.0, -32.0]

[[lines]]
front = 0
back = 1

[[lines]]
front = 0
special = 73
tag = 3

[[lines]]
front = 0
special = 74
tag = 3

[[things]]
sector = 1
height = 32.0
dropped = true
shootable = false

[[events]]
tic = 40
line = 2
action = "cross"

[[events]]
tic = 0
line = 1
action = "cross"
"#;

    #[test]
    fn parse_and_build() {
        let scenario = Scenario::parse(CRUSHER_ROOM).unwrap();
        assert_eq!(scenario.name, "crusher room");
        assert_eq!(scenario.mission, GameMission::Doom2);
        assert_eq!(scenario.events[0].tic, 0);
        assert_eq!(scenario.events[1].action, EventAction::Cross);

        let (tx, _rx) = channel();
        let level = scenario.build(tx);
        assert_eq!(level.map_data.sectors().len(), 2);
        assert_eq!(level.map_data.linedefs().len(), 3);
        assert_eq!(level.game_map, 4);
        let crusher = level.map_data.sector(SectorId(1));
        assert_eq!(crusher.sound_origin.x, 64.0);
        assert_eq!(crusher.things.len(), 1);
        assert!(crusher.things[0].dropped);
    }

    #[test]
    fn replay_crusher_and_stop() {
        let scenario = Scenario::parse(CRUSHER_ROOM).unwrap();
        let (tx, _rx) = channel();
        let mut level = scenario.build(tx);

        for tic in 0..TICRATE as u32 * 2 {
            for event in scenario.events_at(tic) {
                assert!(run_event(event, &mut level));
            }
            level.ticker();
        }

        let sector = level.map_data.sector(SectorId(1));
        let mover = level.sector_ceiling(SectorId(1)).unwrap();
        assert_eq!(mover.direction, Direction::Stasis);
        // MAP04 of Doom II lets the crusher close completely
        assert_eq!(mover.bottomheight, 0.0);
        // Paused on tic 40 after 40 steps down
        assert_eq!(sector.ceilingheight, 24.0);
        // The dropped item was destroyed on the way down
        assert!(sector.things.is_empty());
    }

    #[test]
    fn stop_all_and_freeze_events() {
        let data = r#"
[[sectors]]
floor = 0.0
ceiling = 128.0

[[sectors]]
floor = 0.0
ceiling = 128.0
tag = 1

[[lines]]
front = 0
back = 1
special = 43
tag = 1

[[events]]
tic = 0
line = 0
action = "use"

[[events]]
tic = 2
action = "freeze"

[[events]]
tic = 5
action = "thaw"

[[events]]
tic = 6
action = "stop_all"
"#;
        let scenario = Scenario::parse(data).unwrap();
        let (tx, _rx) = channel();
        let mut level = scenario.build(tx);

        for tic in 0..10 {
            for event in scenario.events_at(tic) {
                run_event(event, &mut level);
            }
            level.ticker();
        }
        // Moved on tics 0, 1 and 5
        assert_eq!(level.map_data.sector(SectorId(1)).ceilingheight, 125.0);
        assert!(level.active_ceilings().is_empty());
        assert!(!level.freeze);
        // Switch lines are reusable
        assert_eq!(level.map_data.line(movers::LineId(0)).special, 43);
    }

    #[test]
    fn bad_references() {
        let no_sectors = "sectors = []";
        assert!(matches!(
            Scenario::parse(no_sectors),
            Err(ScenarioError::NoSectors)
        ));

        let bad_line = r#"
[[sectors]]
floor = 0.0
ceiling = 64.0

[[lines]]
front = 0
back = 2
"#;
        assert!(matches!(
            Scenario::parse(bad_line),
            Err(ScenarioError::UnknownSector {
                what: "line",
                index: 0,
                sector: 2
            })
        ));

        let missing_line = r#"
[[sectors]]
floor = 0.0
ceiling = 64.0

[[events]]
tic = 3
action = "use"
"#;
        assert!(matches!(
            Scenario::parse(missing_line),
            Err(ScenarioError::MissingLine { tic: 3, .. })
        ));

        let unknown_line = r#"
[[sectors]]
floor = 0.0
ceiling = 64.0

[[events]]
tic = 3
line = 9
action = "cross"
"#;
        assert!(matches!(
            Scenario::parse(unknown_line),
            Err(ScenarioError::UnknownLine { tic: 3, line: 9 })
        ));

        let unknown_action = r#"
[[sectors]]
floor = 0.0
ceiling = 64.0

[[events]]
tic = 3
action = "explode"
"#;
        assert!(matches!(
            Scenario::parse(unknown_action),
            Err(ScenarioError::Parse(_))
        ));
    }
}
