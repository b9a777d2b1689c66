//! `movesim` loads a scenario map, replays its scripted line triggers, and
//! reports how the ceiling movers behave tic by tic.

mod cli;
mod config;
mod scenario;
mod snd;
mod timestep;

use std::{error::Error, thread, time::Duration};

use cli::*;
use movers::{
    Level, SectorId,
    log::{self, info, warn},
};
use simplelog::TermLogger;
use sound_traits::{SoundAction, SoundServer, SoundServerTic};

use crate::{
    config::UserConfig,
    scenario::{Scenario, run_event},
    snd::LogSnd,
    timestep::TimeStep,
};

const BASE_DIR: &str = "movesim/";

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    // The real level is set once the user config has been merged
    TermLogger::init(
        log::LevelFilter::Trace,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    log::set_max_level(options.verbose.unwrap_or(log::LevelFilter::Info));

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    user_config.write();
    log::set_max_level(user_config.verbose);

    let scenario = Scenario::load(&options.scenario)?;

    let mut snd = LogSnd::new();
    let snd_tx = snd.init()?;
    let snd_thread = thread::spawn(move || {
        loop {
            if !snd.tic() {
                break;
            }
        }
        snd
    });
    info!("Init sound server");

    let mut level = scenario.build(snd_tx.clone());
    let tics = options.tics;
    let report = options.report;
    if let Some(last) = scenario.events.last().filter(|e| e.tic >= tics) {
        warn!("Events after tic {tics} will not run, the last is at {}", last.tic);
    }

    info!("Running {:?} for {tics} tics", scenario.name);
    if options.realtime.unwrap_or(false) {
        let mut timestep = TimeStep::new();
        while level.level_time < tics {
            timestep.run_this(|| {
                if level.level_time < tics {
                    run_tic(&scenario, &mut level, report);
                }
            });
            thread::sleep(Duration::from_millis(1));
        }
        info!("Ran {} tics in real time", timestep.run_tics());
    } else {
        for _ in 0..tics {
            run_tic(&scenario, &mut level, report);
        }
    }

    report_heights(&level);
    level.unload();

    if let Err(e) = snd_tx.send(SoundAction::Shutdown) {
        warn!("Sound server already stopped: {e}");
    }
    match snd_thread.join() {
        Ok(snd) => {
            for (sfx, count) in snd.counts() {
                info!("Sound {sfx} started {count} times");
            }
        }
        Err(_) => warn!("Sound server thread panicked"),
    }
    Ok(())
}

/// Fire the events scheduled for the current tic, then advance the level
fn run_tic(scenario: &Scenario, level: &mut Level, report: u32) {
    let tic = level.level_time;
    for event in scenario.events_at(tic) {
        if !run_event(event, level) {
            info!("tic {tic}: {:?} on line {:?} did nothing", event.action, event.line);
        }
    }
    level.ticker();

    if report != 0 && level.level_time % report == 0 {
        report_heights(level);
    }
}

fn report_heights(level: &Level) {
    for sector in level.map_data.sectors() {
        let state = match level.sector_ceiling(SectorId(sector.num as usize)) {
            Some(c) => format!("{:?} {:?} at {}", c.kind, c.direction, c.speed),
            None => "idle".to_owned(),
        };
        info!(
            "tic {:>5} sector {:>3}: floor {:>7.2} ceiling {:>7.2} light {:>3} {state}",
            level.level_time,
            sector.num,
            sector.floorheight,
            sector.ceilingheight,
            sector.lightlevel,
        );
    }
}
