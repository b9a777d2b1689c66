//! The sound interface used by level movers. Sounds are fire-and-forget: a
//! mover pushes a `SoundAction` down a channel and never looks at a result.

use std::{
    fmt::{self, Debug},
    sync::mpsc::{Receiver, Sender},
    time::Duration,
};

/// `S` is SFX enum, `E` is Errors
pub type InitResult<S, E> = Result<Sender<SoundAction<S>>, E>;

/// The sounds a moving sector can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfxName {
    /// Stone grinding, played while a plane is moving
    Stnmov,
    /// Platform stop, also used by the silent crusher at each end of travel
    Pstop,
}

impl SfxName {
    /// The lump name of the sound, minus the `DS` prefix
    pub const fn lump_name(self) -> &'static str {
        match self {
            SfxName::Stnmov => "stnmov",
            SfxName::Pstop => "pstop",
        }
    }
}

impl fmt::Display for SfxName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lump_name())
    }
}

pub enum SoundAction<S: Debug + Copy> {
    StartSfx {
        /// Objects unique ID or hash. For sectors this is the sector number,
        /// used to track which sector owns which sounds.
        uid: usize,
        /// The Sound effect this object has
        sfx: S,
        /// The world XY coords of the sound origin
        x: f32,
        y: f32,
    },
    StopSfx {
        uid: usize,
    },
    StopSfxAll,
    SfxVolume(i32),
    Shutdown,
}

impl<S: Debug + Copy> Debug for SoundAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartSfx { uid, sfx, x, y } => f
                .debug_struct("StartSfx")
                .field("uid", uid)
                .field("sfx", sfx)
                .field("x", x)
                .field("y", y)
                .finish(),
            Self::StopSfx { uid } => f.debug_struct("StopSfx").field("uid", uid).finish(),
            Self::StopSfxAll => f.write_str("StopSfxAll"),
            Self::SfxVolume(v) => f.debug_tuple("SfxVolume").field(v).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// A sound server implementing `SoundServer` must also implement `SoundServerTic`
/// typically by a one-liner: `impl SoundServerTic<SfxName, E> for Snd {}`
pub trait SoundServer<S, E>
where
    S: Debug + Copy,
    E: std::error::Error,
{
    /// Start up all sound stuff and grab the `Sender` channel for cloning
    fn init(&mut self) -> InitResult<S, E>;

    /// Playback a sound
    fn start_sound(&mut self, uid: usize, sfx: S, x: f32, y: f32);

    /// Stop this sound playback
    fn stop_sound(&mut self, uid: usize);

    fn stop_sound_all(&mut self);

    fn set_sfx_volume(&mut self, volume: i32);

    fn get_sfx_volume(&mut self) -> i32;

    /// Helper function used by the `SoundServerTic` trait
    fn get_rx(&mut self) -> &mut Receiver<SoundAction<S>>;

    /// Stop all sound and release the sound device
    fn shutdown_sound(&mut self);
}

/// Run the `SoundServer`
pub trait SoundServerTic<S, E>
where
    Self: SoundServer<S, E>,
    S: Debug + Copy,
    E: std::error::Error,
{
    /// Act on one queued action. Returns `false` if it was a shutdown.
    fn dispatch(&mut self, sound: SoundAction<S>) -> bool {
        match sound {
            SoundAction::StartSfx { uid, sfx, x, y } => self.start_sound(uid, sfx, x, y),
            SoundAction::StopSfx { uid } => self.stop_sound(uid),
            SoundAction::StopSfxAll => self.stop_sound_all(),
            SoundAction::SfxVolume(v) => self.set_sfx_volume(v),
            SoundAction::Shutdown => {
                self.shutdown_sound();
                return false;
            }
        }
        true
    }

    /// Will be called every period, returns `true` if the server should continue
    /// running, else `false` if it should exit.
    fn tic(&mut self) -> bool {
        match self.get_rx().recv_timeout(Duration::from_micros(500)) {
            Ok(sound) => self.dispatch(sound),
            Err(_) => true,
        }
    }

    /// Process everything currently queued without waiting. Returns `false` if
    /// a shutdown was received, leaving anything queued after it.
    fn drain(&mut self) -> bool {
        while let Ok(sound) = self.get_rx().try_recv() {
            if !self.dispatch(sound) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error,
        fmt::Display,
        sync::mpsc::{Receiver, Sender, channel},
    };

    use crate::{InitResult, SfxName, SoundAction, SoundServer, SoundServerTic};

    #[derive(Debug)]
    enum FxError {}

    impl Error for FxError {}

    impl Display for FxError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&format!("{:?}", self))
        }
    }

    struct Snd {
        rx: Receiver<SoundAction<SfxName>>,
        tx: Sender<SoundAction<SfxName>>,
        started: Vec<(usize, SfxName)>,
        volume: i32,
        shut_down: bool,
    }

    impl Snd {
        fn new() -> Self {
            let (tx, rx) = channel();
            Self {
                rx,
                tx,
                started: Vec::new(),
                volume: 0,
                shut_down: false,
            }
        }
    }

    impl SoundServer<SfxName, FxError> for Snd {
        fn init(&mut self) -> InitResult<SfxName, FxError> {
            Ok(self.tx.clone())
        }

        fn start_sound(&mut self, uid: usize, sfx: SfxName, _x: f32, _y: f32) {
            self.started.push((uid, sfx));
        }

        fn stop_sound(&mut self, uid: usize) {
            self.started.retain(|(u, _)| *u != uid);
        }

        fn stop_sound_all(&mut self) {
            self.started.clear();
        }

        fn set_sfx_volume(&mut self, volume: i32) {
            self.volume = volume;
        }

        fn get_sfx_volume(&mut self) -> i32 {
            self.volume
        }

        fn get_rx(&mut self) -> &mut Receiver<SoundAction<SfxName>> {
            &mut self.rx
        }

        fn shutdown_sound(&mut self) {
            self.shut_down = true;
        }
    }

    impl SoundServerTic<SfxName, FxError> for Snd {}

    #[test]
    fn run_tic() {
        let mut snd = Snd::new();
        let tx = snd.init().unwrap();

        tx.send(SoundAction::StartSfx {
            uid: 3,
            sfx: SfxName::Stnmov,
            x: 0.3,
            y: 0.3,
        })
        .unwrap();
        assert!(snd.tic());
        assert_eq!(snd.started, vec![(3, SfxName::Stnmov)]);

        tx.send(SoundAction::StopSfx { uid: 3 }).unwrap();
        assert!(snd.tic());
        assert!(snd.started.is_empty());

        tx.send(SoundAction::Shutdown).unwrap();
        assert!(!snd.tic());
        assert!(snd.shut_down);
    }

    #[test]
    fn drain_queue() {
        let mut snd = Snd::new();
        let tx = snd.init().unwrap();

        for uid in 0..4 {
            tx.send(SoundAction::StartSfx {
                uid,
                sfx: SfxName::Pstop,
                x: 0.0,
                y: 0.0,
            })
            .unwrap();
        }
        tx.send(SoundAction::SfxVolume(64)).unwrap();
        assert!(snd.drain());
        assert_eq!(snd.started.len(), 4);
        assert_eq!(snd.get_sfx_volume(), 64);
    }

    #[test]
    fn drain_stops_at_shutdown() {
        let mut snd = Snd::new();
        let tx = snd.init().unwrap();

        tx.send(SoundAction::StopSfxAll).unwrap();
        tx.send(SoundAction::Shutdown).unwrap();
        tx.send(SoundAction::SfxVolume(10)).unwrap();
        assert!(!snd.drain());
        assert!(snd.shut_down);
        assert_eq!(snd.get_sfx_volume(), 0);

        // The volume change is still queued
        assert!(snd.tic());
        assert_eq!(snd.get_sfx_volume(), 10);
    }

    #[test]
    fn lump_names() {
        assert_eq!(SfxName::Stnmov.to_string(), "stnmov");
        assert_eq!(SfxName::Pstop.lump_name(), "pstop");
    }
}
