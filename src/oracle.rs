//! Tick-cumulative observations and the time-weighted average tick derived
//! from them.
//!
//! A pool records `tick * seconds` into a running accumulator; the average
//! tick over a window is the accumulator delta divided by the window
//! length. [`ObservationRing`] keeps a bounded history of accumulator
//! checkpoints so that delta can be read for any window the history still
//! covers.

/// Number of checkpoints kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: u64,
    pub tick_cumulative: i64,
}

/// Fixed-capacity ring of tick-cumulative checkpoints.
///
/// Once full, each new checkpoint overwrites the oldest one.
#[derive(Clone, Debug)]
pub struct ObservationRing {
    observations: Vec<Observation>,
    capacity: usize,
    newest: usize,
    // tick in effect since the newest checkpoint
    tick: i32,
}

impl ObservationRing {
    /// Starts a history at `now` with the pool sitting at `tick`.
    pub fn new(capacity: usize, now: u64, tick: i32) -> Self {
        let capacity = capacity.max(1);
        let mut observations = Vec::with_capacity(capacity);
        observations.push(Observation {
            timestamp: now,
            tick_cumulative: 0,
        });

        Self {
            observations,
            capacity,
            newest: 0,
            tick,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Tick in effect since the newest checkpoint.
    pub fn current_tick(&self) -> i32 {
        self.tick
    }

    pub fn newest(&self) -> Observation {
        self.observations[self.newest]
    }

    pub fn oldest(&self) -> Observation {
        if self.observations.len() < self.capacity {
            self.observations[0]
        } else {
            self.observations[(self.newest + 1) % self.capacity]
        }
    }

    /// Records that the pool moved to `tick` at `now`.
    ///
    /// Writes at the newest timestamp only replace the current tick; writes
    /// older than the newest checkpoint are ignored.
    pub fn write(&mut self, now: u64, tick: i32) {
        let last = self.newest();
        if now < last.timestamp {
            return;
        }
        if now == last.timestamp {
            self.tick = tick;
            return;
        }

        let elapsed = (now - last.timestamp) as i64;
        let observation = Observation {
            timestamp: now,
            tick_cumulative: last
                .tick_cumulative
                .saturating_add((self.tick as i64).saturating_mul(elapsed)),
        };

        if self.observations.len() < self.capacity {
            self.observations.push(observation);
            self.newest = self.observations.len() - 1;
        } else {
            self.newest = (self.newest + 1) % self.capacity;
            self.observations[self.newest] = observation;
        }
        self.tick = tick;
    }

    fn chronological(&self) -> impl Iterator<Item = &Observation> {
        let split = if self.observations.len() < self.capacity {
            0
        } else {
            (self.newest + 1) % self.capacity
        };
        self.observations[split..]
            .iter()
            .chain(self.observations[..split].iter())
    }

    /// Tick accumulator value `seconds_ago` before `now`, or `None` when
    /// that instant predates the retained history or `now` predates the
    /// newest checkpoint.
    pub fn observe(&self, now: u64, seconds_ago: u32) -> Option<i64> {
        let newest = self.newest();
        if now < newest.timestamp {
            return None;
        }
        let target = now.checked_sub(seconds_ago as u64)?;

        if target >= newest.timestamp {
            let elapsed = (target - newest.timestamp) as i64;
            return Some(
                newest
                    .tick_cumulative
                    .saturating_add((self.tick as i64).saturating_mul(elapsed)),
            );
        }
        if target < self.oldest().timestamp {
            return None;
        }

        let mut before = self.oldest();
        for observation in self.chronological() {
            if observation.timestamp > target {
                let span = (observation.timestamp - before.timestamp) as i64;
                let segment_tick = (observation.tick_cumulative - before.tick_cumulative) / span;
                let into = (target - before.timestamp) as i64;
                return Some(before.tick_cumulative + segment_tick * into);
            }
            before = *observation;
        }

        // target lies between the newest checkpoint's timestamp and the
        // checkpoint itself, handled above
        Some(before.tick_cumulative)
    }

    /// Average tick over the `lookback` seconds ending at `now`.
    pub fn time_weighted_tick(&self, now: u64, lookback: u32) -> Option<i32> {
        let start = self.observe(now, lookback)?;
        let end = self.observe(now, 0)?;
        twap_from_cumulatives(start, end, lookback)
    }
}

/// Average tick between two accumulator readings `seconds` apart, rounded
/// toward negative infinity.
pub fn twap_from_cumulatives(start: i64, end: i64, seconds: u32) -> Option<i32> {
    if seconds == 0 {
        return None;
    }
    let delta = end.checked_sub(start)?;
    let seconds = seconds as i64;

    let mut average = delta / seconds;
    if delta < 0 && delta % seconds != 0 {
        average -= 1;
    }
    i32::try_from(average).ok()
}
