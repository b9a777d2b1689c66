//! A sound server with no audio device. Every request is logged and counted
//! so the runner can report what the movers asked for.

use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    sync::mpsc::{Receiver, Sender, channel},
};

use movers::log::{debug, info};
use sound_traits::{InitResult, SfxName, SoundAction, SoundServer, SoundServerTic};

pub type SndServerRx = Receiver<SoundAction<SfxName>>;

pub struct LogSnd {
    rx: SndServerRx,
    tx: Sender<SoundAction<SfxName>>,
    volume: i32,
    /// Sector uid to the sound it is currently playing
    playing: HashMap<usize, SfxName>,
    counts: HashMap<SfxName, u32>,
}

impl LogSnd {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            rx,
            tx,
            volume: 100,
            playing: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    /// How many times each effect was started, sorted by name
    pub fn counts(&self) -> Vec<(SfxName, u32)> {
        let mut counts: Vec<_> = self.counts.iter().map(|(s, n)| (*s, *n)).collect();
        counts.sort_by_key(|(s, _)| s.lump_name());
        counts
    }
}

/// Logging never fails
#[derive(Debug)]
pub enum SndError {}

impl Display for SndError {
    fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {}
    }
}

impl Error for SndError {}

impl SoundServer<SfxName, SndError> for LogSnd {
    fn init(&mut self) -> InitResult<SfxName, SndError> {
        Ok(self.tx.clone())
    }

    fn start_sound(&mut self, uid: usize, sfx: SfxName, x: f32, y: f32) {
        debug!("sfx {sfx} from sector {uid} at ({x}, {y})");
        self.playing.insert(uid, sfx);
        *self.counts.entry(sfx).or_default() += 1;
    }

    fn stop_sound(&mut self, uid: usize) {
        self.playing.remove(&uid);
    }

    fn stop_sound_all(&mut self) {
        self.playing.clear();
    }

    fn set_sfx_volume(&mut self, volume: i32) {
        self.volume = volume;
    }

    fn get_sfx_volume(&mut self) -> i32 {
        self.volume
    }

    fn get_rx(&mut self) -> &mut SndServerRx {
        &mut self.rx
    }

    fn shutdown_sound(&mut self) {
        info!("Shutdown sound server");
        self.stop_sound_all();
    }
}

impl SoundServerTic<SfxName, SndError> for LogSnd {}

#[cfg(test)]
mod tests {
    use super::LogSnd;
    use sound_traits::{SfxName, SoundAction, SoundServer, SoundServerTic};

    #[test]
    fn counts_started_sounds() {
        let mut snd = LogSnd::new();
        let tx = snd.init().unwrap();
        for sfx in [SfxName::Stnmov, SfxName::Pstop, SfxName::Stnmov] {
            tx.send(SoundAction::StartSfx {
                uid: 1,
                sfx,
                x: 0.0,
                y: 0.0,
            })
            .unwrap();
        }
        tx.send(SoundAction::Shutdown).unwrap();

        assert!(!snd.drain());
        assert_eq!(snd.counts(), vec![(SfxName::Pstop, 1), (SfxName::Stnmov, 2)]);
        assert!(snd.playing.is_empty());
    }
}
