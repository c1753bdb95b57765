//! Shared utilities

use std::collections::VecDeque;
use std::time::{Duration, Instant};

// ============================================================================
// Frame clock
// ============================================================================

/// Frame timing with a rolling-average fps and an optional frame-rate cap
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
    min_frame: Option<Duration>,
}

impl FrameClock {
    /// `max_fps` of 0 means uncapped
    pub fn new(sample_count: usize, max_fps: u32) -> Self {
        Self::starting_at(Instant::now(), sample_count, max_fps)
    }

    pub fn starting_at(start: Instant, sample_count: usize, max_fps: u32) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: start,
            sample_count,
            min_frame: (max_fps > 0).then(|| Duration::from_secs(1) / max_fps),
        }
    }

    /// Call at the start of each frame. Returns seconds since the last tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
        dt
    }

    /// Average over the sample window
    pub fn average_fps(&self) -> f32 {
        let avg_dt = self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32 * 1000.0
    }

    /// How long to wait at `now` before the next frame may start
    pub fn remaining(&self, now: Instant) -> Duration {
        self.min_frame.map_or(Duration::ZERO, |min| {
            (self.last_frame + min).saturating_duration_since(now)
        })
    }

    /// Sleep off whatever is left of the current frame's budget
    pub fn throttle(&self) {
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

// ============================================================================
// Periodic jobs
// ============================================================================

/// Fixed-interval trigger. The first check fires immediately; afterwards the
/// deadline advances by exactly one interval per firing, so a caller that
/// falls behind catches up with back-to-back firings.
#[derive(Debug, Clone)]
pub struct Periodic {
    interval: Duration,
    next: Instant,
}

impl Periodic {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next: start,
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_frame_clock_rolling_average() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start, 4, 0);
        let mut now = start;
        for _ in 0..10 {
            now += MS * 20;
            let dt = clock.tick_at(now);
            assert!((dt - 0.02).abs() < 1e-4);
        }
        assert!((clock.average_fps() - 50.0).abs() < 0.1);
        assert!((clock.avg_frame_time_ms() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_frame_clock_empty_is_zero() {
        let clock = FrameClock::new(8, 45);
        assert_eq!(clock.average_fps(), 0.0);
    }

    #[test]
    fn test_frame_clock_remaining_budget() {
        let start = Instant::now();
        let clock = FrameClock::starting_at(start, 4, 50);
        assert_eq!(clock.remaining(start), MS * 20);
        assert_eq!(clock.remaining(start + MS * 5), MS * 15);
        assert_eq!(clock.remaining(start + MS * 30), Duration::ZERO);

        let uncapped = FrameClock::starting_at(start, 4, 0);
        assert_eq!(uncapped.remaining(start), Duration::ZERO);
    }

    #[test]
    fn test_periodic_fires_first_then_each_interval() {
        let start = Instant::now();
        let mut job = Periodic::starting_at(start, MS * 100);
        assert!(job.due(start));
        assert!(!job.due(start + MS * 50));
        assert!(job.due(start + MS * 100));
        assert!(!job.due(start + MS * 150));
    }

    #[test]
    fn test_periodic_catches_up() {
        let start = Instant::now();
        let mut job = Periodic::starting_at(start, MS * 10);
        let late = start + MS * 35;
        let fired = (0..10).filter(|_| job.due(late)).count();
        assert_eq!(fired, 4);
    }
}
