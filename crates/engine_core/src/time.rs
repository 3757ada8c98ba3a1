//! Time management for the frame loop.

use std::time::{Duration, Instant};

/// Manages frame timing and delta time calculation.
///
/// By default the simulation is free-running: every frame gets the measured wall
/// clock delta. With a fixed rate set, [`Time::should_fixed_update`] drains an
/// accumulator in constant steps instead.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Optional fixed simulation timestep.
    fixed_timestep: Option<Duration>,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new free-running time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            fixed_timestep: None,
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn update_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        if self.fixed_timestep.is_some() {
            self.accumulator += self.delta;
        }
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Fixed timestep in seconds, if fixed stepping is enabled.
    pub fn fixed_timestep_seconds(&self) -> Option<f32> {
        self.fixed_timestep.map(|d| d.as_secs_f32())
    }

    /// Check if a fixed update should run and consume the time.
    /// Always false while free-running.
    pub fn should_fixed_update(&mut self) -> bool {
        match self.fixed_timestep {
            Some(step) if self.accumulator >= step => {
                self.accumulator -= step;
                true
            }
            _ => false,
        }
    }

    /// Drop any banked fixed steps beyond `max_steps`, so a long stall costs at
    /// most that many steps instead of replaying all of it.
    pub fn limit_backlog(&mut self, max_steps: u32) {
        if let Some(step) = self.fixed_timestep {
            let cap = step * max_steps;
            if self.accumulator > cap {
                log::debug!(
                    "Dropping {:.3}s of fixed-step backlog",
                    (self.accumulator - cap).as_secs_f32()
                );
                self.accumulator = cap;
            }
        }
    }

    /// Restart measuring from now: the gap since the last frame is forgotten
    /// and no fixed steps are owed for it.
    pub fn reset_clock(&mut self) {
        self.reset_clock_at(Instant::now());
    }

    fn reset_clock_at(&mut self, now: Instant) {
        self.last_frame = now;
        self.delta = Duration::ZERO;
        self.accumulator = Duration::ZERO;
    }

    /// Set the fixed timestep rate in Hz; `None` (or a non-positive rate) restores
    /// free-running variable steps.
    pub fn set_fixed_rate(&mut self, hz: Option<f64>) {
        self.fixed_timestep = hz
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .map(|hz| Duration::from_secs_f64(1.0 / hz));
        self.accumulator = Duration::ZERO;
        match (hz, self.fixed_timestep) {
            (_, Some(step)) => log::info!("Fixed timestep {:.4}s", step.as_secs_f64()),
            (Some(hz), None) => log::warn!("Ignoring fixed rate {} Hz, running free", hz),
            (None, None) => log::debug!("Free-running timestep"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_measures_delta_between_frames() {
        let mut time = Time::new();
        let start = time.last_frame;
        time.update_at(start + Duration::from_millis(16));
        time.update_at(start + Duration::from_millis(50));
        assert!((time.delta_seconds() - 0.034).abs() < 1e-6);
    }

    #[test]
    fn free_running_never_requests_fixed_updates() {
        let mut time = Time::new();
        let start = time.last_frame;
        time.update_at(start + Duration::from_secs(1));
        assert!(!time.should_fixed_update());
        assert_eq!(time.fixed_timestep_seconds(), None);
    }

    #[test]
    fn fixed_rate_drains_accumulator_in_whole_steps() {
        let mut time = Time::new();
        time.set_fixed_rate(Some(10.0));
        let start = time.last_frame;
        time.update_at(start + Duration::from_millis(250));
        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 2);
        time.update_at(start + Duration::from_millis(300));
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn reset_clock_forgets_the_gap() {
        let mut time = Time::new();
        time.set_fixed_rate(Some(60.0));
        let start = time.last_frame;
        time.update_at(start + Duration::from_millis(5));
        // Ten seconds pass without frames, then the clock is reset.
        time.reset_clock_at(start + Duration::from_secs(10));
        assert_eq!(time.delta_seconds(), 0.0);
        assert!(!time.should_fixed_update());

        time.update_at(start + Duration::from_millis(10_020));
        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert!(steps <= 2, "{} steps after reset", steps);
        assert!((time.delta_seconds() - 0.020).abs() < 1e-6);
    }

    #[test]
    fn backlog_is_limited_after_a_stall() {
        let mut time = Time::new();
        time.set_fixed_rate(Some(60.0));
        let start = time.last_frame;
        time.update_at(start + Duration::from_secs(10));
        time.limit_backlog(5);
        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 5);
    }

    #[test]
    fn limit_backlog_is_a_no_op_when_free_running() {
        let mut time = Time::new();
        let start = time.last_frame;
        time.update_at(start + Duration::from_secs(3));
        time.limit_backlog(1);
        assert!((time.delta_seconds() - 3.0).abs() < 1e-6);
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn invalid_rate_falls_back_to_free_running() {
        let mut time = Time::new();
        time.set_fixed_rate(Some(0.0));
        assert_eq!(time.fixed_timestep_seconds(), None);
    }
}
