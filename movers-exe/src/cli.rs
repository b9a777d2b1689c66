use std::path::PathBuf;

use argh::FromArgs;
use movers::log;

/// Replay a scripted set of line triggers against a small map and report how
/// the ceilings move
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// path to the scenario TOML file
    #[argh(option)]
    pub scenario: PathBuf,
    /// number of tics to run, zero uses the user config
    #[argh(option, default = "0")]
    pub tics: u32,
    /// pace the run at 35 tics per second instead of as fast as possible
    #[argh(option)]
    pub realtime: Option<bool>,
    /// print sector heights every n tics, zero uses the user config
    #[argh(option, default = "0")]
    pub report: u32,
}
