use std::time::{Duration, Instant};

/// Represents a clock, which can tell the current time and block the
/// current thread for a while
pub trait Clock {
    /// Gets the current time according to this clock
    fn now(&self) -> Instant;

    /// Blocks for the given duration
    fn sleep(&self, duration: Duration);
}

/// The system clock as provided by `std::time::Instant` and `std::thread::sleep`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A test clock which maintains the current time as internal state.
///
/// It only moves when told to: sleeping advances it instantly and every
/// sleep is recorded. Meant as a testing aid for code that takes a
/// [`Clock`], production code should use [`SystemClock`]
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    state: std::sync::Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    offset: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Creates a new clock starting at the current instant
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            state: std::sync::Mutex::new(ManualState::default()),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        self.lock().offset += by;
    }

    /// Returns every duration passed to [`Clock::sleep`] so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.lock().offset
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.offset += duration;
        state.sleeps.push(duration);
    }
}
