use crate::hw_def::*;

#[cfg(feature = "defmt")]
use defmt::Format;
use rand::{Rng, RngCore};

/// Source of the current time in seconds, monotonic or wall clock
pub trait Clock {
    /// Seconds since an arbitrary but fixed epoch
    fn now_secs(&mut self) -> u64;
}

/// Bounds between which the fan cleaning interval is drawn
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CleanInterval {
    lower_s: u32,
    upper_s: u32,
}

impl CleanInterval {
    /// `None` if `lower_s` exceeds `upper_s`
    pub const fn new(lower_s: u32, upper_s: u32) -> Option<Self> {
        if lower_s > upper_s {
            None
        } else {
            Some(Self { lower_s, upper_s })
        }
    }

    /// Shortest interval in seconds
    pub fn lower_s(&self) -> u32 {
        self.lower_s
    }

    /// Longest interval in seconds
    pub fn upper_s(&self) -> u32 {
        self.upper_s
    }
}

impl Default for CleanInterval {
    fn default() -> Self {
        Self {
            lower_s: CLEAN_INTERVAL_LOWER_DEFAULT_S,
            upper_s: CLEAN_INTERVAL_UPPER_DEFAULT_S,
        }
    }
}

/// Driver configuration
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I²C address
    pub address: u8,
    /// Bounds for the randomized fan cleaning interval
    pub clean_interval: CleanInterval,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: I2C_ADDR_DEFAULT,
            clean_interval: CleanInterval::default(),
        }
    }
}

impl Config {
    /// Use a non-default I²C address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Use different fan cleaning interval bounds
    pub fn with_clean_interval(mut self, clean_interval: CleanInterval) -> Self {
        self.clean_interval = clean_interval;
        self
    }
}

/// Tracks when the fan was last cleaned and when it is due again.
///
/// The interval is redrawn uniformly from the bounds every time a cleaning
/// starts, so devices installed together do not all clean at once.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CleaningSchedule {
    bounds: CleanInterval,
    interval_s: u32,
    last_clean_s: u64,
}

impl CleaningSchedule {
    pub(crate) fn new<R: RngCore>(bounds: CleanInterval, now_s: u64, rng: &mut R) -> Self {
        let mut schedule = Self {
            bounds,
            interval_s: bounds.lower_s,
            last_clean_s: now_s,
        };
        schedule.restart(now_s, rng);
        schedule
    }

    /// More than the current interval has passed since the last cleaning
    pub fn is_due(&self, now_s: u64) -> bool {
        now_s.saturating_sub(self.last_clean_s) > u64::from(self.interval_s)
    }

    pub(crate) fn restart<R: RngCore>(&mut self, now_s: u64, rng: &mut R) {
        self.interval_s = rng.random_range(self.bounds.lower_s..=self.bounds.upper_s);
        self.last_clean_s = now_s;
    }

    /// Bounds the interval is drawn from
    pub fn bounds(&self) -> CleanInterval {
        self.bounds
    }

    /// Seconds between the last cleaning and the next one
    pub fn interval_s(&self) -> u32 {
        self.interval_s
    }

    /// Clock reading at the last cleaning (or driver construction)
    pub fn last_clean_s(&self) -> u64 {
        self.last_clean_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    #[test]
    fn rejects_inverted_bounds() {
        assert_eq!(CleanInterval::new(10, 9), None);
        assert!(CleanInterval::new(10, 10).is_some());
    }

    #[test]
    fn interval_stays_within_bounds() {
        let bounds = CleanInterval::new(100, 200).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut schedule = CleaningSchedule::new(bounds, 0, &mut rng);
        for now in 0..1000 {
            schedule.restart(now, &mut rng);
            let interval = schedule.interval_s();
            assert!((100..=200).contains(&interval), "{interval}");
            assert_eq!(schedule.last_clean_s(), now);
        }
    }

    #[test]
    fn default_interval_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let schedule = CleaningSchedule::new(CleanInterval::default(), 5, &mut rng);
            assert!(schedule.interval_s() >= 86_400);
            assert!(schedule.interval_s() <= 172_800);
        }
    }

    #[test]
    fn due_only_after_interval() {
        let bounds = CleanInterval::new(60, 60).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let schedule = CleaningSchedule::new(bounds, 1000, &mut rng);
        assert!(!schedule.is_due(1000));
        assert!(!schedule.is_due(1060));
        assert!(schedule.is_due(1061));
        // a clock that went backwards is never due
        assert!(!schedule.is_due(10));
    }

    #[test]
    fn config_builder() {
        let config = Config::default()
            .with_address(0x6C)
            .with_clean_interval(CleanInterval::new(1, 2).unwrap());
        assert_eq!(config.address, 0x6C);
        assert_eq!(config.clean_interval.lower_s(), 1);
        assert_eq!(Config::default().address, I2C_ADDR_DEFAULT);
    }
}
