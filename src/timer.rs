//! Timing and frame rate logging for the live loop.

use std::{
    fmt::{self, Arguments},
    time::{Duration, Instant},
};

/// Weight of the newest sample in the running average.
const SMOOTHING: f32 = 0.1;

/// Measures how long an operation takes, as an exponential moving average.
///
/// Displaying the timer with `{}` ([`std::fmt::Display`]) prints the total number of samples
/// recorded and their average. Displaying does not reset either.
pub struct Timer {
    name: &'static str,
    avg_ms: Option<f32>,
    samples: u32,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            avg_ms: None,
            samples: 0,
        }
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&mut self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation. The time is recorded when the returned guard is dropped.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    /// Records a measured duration.
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f32() * 1000.0;
        self.avg_ms = Some(match self.avg_ms {
            Some(avg) => avg + (ms - avg) * SMOOTHING,
            None => ms,
        });
        self.samples += 1;
    }

    /// Average duration in milliseconds, or [`None`] if nothing was recorded yet.
    pub fn average_ms(&self) -> Option<f32> {
        self.avg_ms
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.avg_ms {
            Some(avg_ms) => write!(f, "{}: {}x{:.01}ms", self.name, self.samples, avg_ms),
            None => write!(f, "{}: -", self.name),
        }
    }
}

/// Guard returned by [`Timer::start`].
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a mut Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

/// Counts frames and logs the frame rate about once per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Counts a frame. Returns the frame rate if a measurement window just ended.
    pub fn tick(&mut self) -> Option<f32> {
        self.tick_impl(format_args!(""))
    }

    /// Like [`FpsCounter::tick`], but also logs the given timers.
    pub fn tick_with<'a, I>(&mut self, timers: I) -> Option<f32>
    where
        I: IntoIterator<Item = &'a Timer>,
    {
        let timers = timers
            .into_iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        if timers.is_empty() {
            self.tick()
        } else {
            self.tick_impl(format_args!(" ({})", timers.join(", ")))
        }
    }

    fn tick_impl(&mut self, extra: Arguments<'_>) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.start.elapsed();
        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let fps = self.frames as f32 / elapsed.as_secs_f32();
        log::debug!("{}: {:.01} FPS{}", self.name, fps, extra);
        self.frames = 0;
        self.start = Instant::now();
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn moving_average() {
        let mut timer = Timer::new("draw");
        assert_eq!(timer.average_ms(), None);
        assert_eq!(timer.to_string(), "draw: -");

        timer.record(Duration::from_millis(10));
        assert_relative_eq!(timer.average_ms().unwrap(), 10.0, epsilon = 1e-4);
        timer.record(Duration::from_millis(20));
        assert_relative_eq!(timer.average_ms().unwrap(), 11.0, epsilon = 1e-4);
        assert_eq!(timer.to_string(), "draw: 2x11.0ms");
        // displaying keeps the samples
        assert_eq!(timer.to_string(), "draw: 2x11.0ms");
        timer.record(Duration::from_millis(11));
        assert_eq!(timer.to_string(), "draw: 3x11.0ms");
    }

    #[test]
    fn guard_records() {
        let mut timer = Timer::new("t");
        let out = timer.time(|| 7);
        assert_eq!(out, 7);
        assert!(timer.average_ms().is_some());
    }

    #[test]
    fn fps_needs_a_full_window() {
        let mut fps = FpsCounter::new("test");
        assert_eq!(fps.tick(), None);
        assert_eq!(fps.tick_with([&Timer::new("a")]), None);
    }
}
