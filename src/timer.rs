use crate::error::{AssessError, AssessResult};
use crate::session::Phase;

/// A countdown measured in whole seconds.
///
/// This is only a counter; something outside decides when a second has
/// passed and calls [`CountdownTimer::tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownTimer {
    duration_seconds: u32,
    remaining_seconds: u32,
    started: bool,
}

impl CountdownTimer {
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            remaining_seconds: duration_seconds,
            started: false,
        }
    }

    pub fn start(&mut self) -> AssessResult<()> {
        if self.started {
            let phase = if self.is_expired() {
                Phase::Completed
            } else {
                Phase::Running
            };
            return Err(AssessError::invalid_state("start", phase));
        }
        if self.duration_seconds == 0 {
            return Err(AssessError::Validation(
                "countdown duration must be positive".to_string(),
            ));
        }
        self.started = true;
        Ok(())
    }

    /// Advance one second. Returns true only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.started || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    /// Apply `ticks` seconds at once. Returns true if the timer expired
    /// during this call.
    pub fn tick_many(&mut self, ticks: u32) -> bool {
        if !self.started || self.remaining_seconds == 0 || ticks == 0 {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(ticks);
        self.remaining_seconds == 0
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.duration_seconds - self.remaining_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.started && self.remaining_seconds == 0
    }
}
