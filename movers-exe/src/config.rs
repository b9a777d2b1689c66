//! User configuration options.

use std::{
    fs::{File, OpenOptions, create_dir_all},
    io::{Read, Write},
    path::PathBuf,
};

use dirs::config_dir;
use movers::log::{self, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{BASE_DIR, CLIOptions};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> Option<PathBuf> {
    let Some(mut dir) = config_dir() else {
        warn!(target: LOG_TAG, "Couldn't find the user config dir");
        return None;
    };
    dir.push(BASE_DIR);
    if let Err(e) = create_dir_all(&dir) {
        warn!(target: LOG_TAG, "Couldn't create {dir:?}: {e}");
        return None;
    }
    dir.push("user.toml");
    Some(dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub verbose: log::LevelFilter,
    pub tics: u32,
    pub realtime: bool,
    pub report: u32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            verbose: log::LevelFilter::Info,
            tics: 350,
            realtime: false,
            report: 35,
        }
    }
}

impl UserConfig {
    /// `load` reads the config, recreating it with defaults if it is missing
    /// or unreadable
    pub fn load() -> Self {
        let Some(path) = get_cfg_file() else {
            return UserConfig::default();
        };

        let mut file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) => {
                warn!(target: LOG_TAG, "Couldn't open {path:?}, {e}");
                return UserConfig::default();
            }
        };

        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file);
            }
            if let Ok(data) = toml::from_str(&buf) {
                info!(target: LOG_TAG, "Loaded user config file");
                return data;
            }
            warn!(target: LOG_TAG, "Could not deserialise {path:?} recreating config");
        }
        UserConfig::create_default(&mut file)
    }

    fn create_default(file: &mut File) -> Self {
        let config = UserConfig::default();
        match toml::to_string(&config) {
            Ok(data) => {
                if let Err(e) = file.write_all(data.as_bytes()) {
                    error!(target: LOG_TAG, "Could not write default config: {e}");
                } else {
                    info!(target: LOG_TAG, "Created default user config file");
                }
            }
            Err(e) => error!(target: LOG_TAG, "Could not serialise default config: {e}"),
        }
        config
    }

    pub fn write(&self) {
        let Some(path) = get_cfg_file() else {
            return;
        };
        let data = match toml::to_string_pretty(self) {
            Ok(data) => data,
            Err(e) => {
                error!(target: LOG_TAG, "Could not serialise config: {e}");
                return;
            }
        };
        File::create(&path)
            .and_then(|mut file| file.write_all(data.as_bytes()))
            .unwrap_or_else(|err| error!(target: LOG_TAG, "Could not write config: {err}"));
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if let Some(verbose) = cli.verbose {
            self.verbose = verbose;
        } else {
            cli.verbose = Some(self.verbose);
        }

        if cli.tics != 0 && cli.tics != self.tics {
            self.tics = cli.tics;
        } else {
            cli.tics = self.tics;
        }

        if let Some(f) = cli.realtime {
            if f != self.realtime {
                self.realtime = f;
            }
        } else {
            cli.realtime = Some(self.realtime);
        }

        if cli.report != 0 && cli.report != self.report {
            self.report = cli.report;
        } else {
            cli.report = self.report;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::UserConfig;
    use crate::CLIOptions;
    use movers::log::LevelFilter;

    fn cli() -> CLIOptions {
        CLIOptions {
            verbose: None,
            scenario: PathBuf::from("test.toml"),
            tics: 0,
            realtime: None,
            report: 0,
        }
    }

    #[test]
    fn cli_falls_back_to_config() {
        let mut config = UserConfig::default();
        let mut cli = cli();
        config.sync_cli(&mut cli);
        assert_eq!(cli.verbose, Some(LevelFilter::Info));
        assert_eq!(cli.tics, 350);
        assert_eq!(cli.realtime, Some(false));
        assert_eq!(cli.report, 35);
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = UserConfig::default();
        let mut cli = CLIOptions {
            verbose: Some(LevelFilter::Debug),
            tics: 70,
            realtime: Some(true),
            report: 7,
            ..cli()
        };
        config.sync_cli(&mut cli);
        assert_eq!(config.verbose, LevelFilter::Debug);
        assert_eq!(config.tics, 70);
        assert!(config.realtime);
        assert_eq!(config.report, 7);
    }

    #[test]
    fn parse_config_file() {
        let config: UserConfig =
            toml::from_str("verbose = \"DEBUG\"\ntics = 70\nrealtime = true\nreport = 5\n")
                .unwrap();
        assert_eq!(config.verbose, LevelFilter::Debug);
        assert_eq!(config.tics, 70);
        assert!(toml::from_str::<UserConfig>("tics = 70").is_err());
    }
}
