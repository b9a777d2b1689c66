//! Run speed control. It limits progression to the 35 tics per second Doom
//! used.

use std::time::Instant;

use movers::TICRATE;

const MS_PER_UPDATE: f32 = 1000.0 / TICRATE as f32;

#[derive(Debug)]
pub struct TimeStep {
    last_time: Instant,
    lag: f32,
    run_tics: u32,
}

impl TimeStep {
    pub fn new() -> TimeStep {
        TimeStep {
            last_time: Instant::now(),
            lag: 0.0,
            run_tics: 0,
        }
    }

    fn delta(&mut self) -> f32 {
        let current_time = Instant::now();
        let delta = current_time.duration_since(self.last_time).as_micros() as f32 * 0.001;
        self.last_time = current_time;
        delta
    }

    /// Accumulate elapsed time and call `run_this` once for every whole tic
    /// that has passed. Returns the number of tics run.
    pub fn run_this(&mut self, mut run_this: impl FnMut()) -> u32 {
        self.lag += self.delta();
        let mut ran = 0;
        while self.lag >= MS_PER_UPDATE {
            run_this();
            self.lag -= MS_PER_UPDATE;
            self.run_tics += 1;
            ran += 1;
        }
        ran
    }

    pub fn run_tics(&self) -> u32 {
        self.run_tics
    }
}

impl Default for TimeStep {
    // shutup clippy!
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread::sleep, time::Duration};

    use super::TimeStep;

    #[test]
    fn runs_whole_tics_only() {
        let mut step = TimeStep::new();
        assert_eq!(step.run_this(|| {}), 0);

        sleep(Duration::from_millis(100));
        let mut count = 0;
        let ran = step.run_this(|| count += 1);
        assert_eq!(ran, count);
        assert!(ran >= 3);
        assert_eq!(step.run_tics(), ran);
    }
}
