//! Auto-cycle timer: periodic preset changes on their own cadence.
//!
//! Runs independently of the per-frame tick; the event loop polls it with
//! the current time and applies the returned action to the controller.

use std::time::{Duration, Instant};

use crate::controller::VisualizationController;

/// What the auto-cycle timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CycleMode {
    /// Step through the preset table in order
    Sequential,
    /// Activate a randomly generated bundle
    Random,
}

/// Fixed-interval trigger for preset changes
#[derive(Debug, Clone)]
pub struct AutoCycle {
    interval: Duration,
    mode: CycleMode,
    enabled: bool,
    next_due: Instant,
}

impl AutoCycle {
    /// Create an enabled timer whose first firing is one interval after `now`
    pub fn new(interval: Duration, mode: CycleMode, now: Instant) -> Self {
        Self {
            interval,
            mode,
            enabled: true,
            next_due: now + interval,
        }
    }

    /// Returns the mode if the timer fired at `now`
    ///
    /// Missed intervals (e.g. a stalled window) fire once, not repeatedly.
    pub fn poll(&mut self, now: Instant) -> Option<CycleMode> {
        if !self.enabled || now < self.next_due {
            return None;
        }
        self.next_due = now + self.interval;
        Some(self.mode)
    }

    /// Poll and apply the firing to `controller`; returns whether it fired
    pub fn run(&mut self, now: Instant, controller: &mut VisualizationController) -> bool {
        match self.poll(now) {
            Some(CycleMode::Sequential) => {
                log::debug!("Auto-cycle: next preset");
                controller.advance_preset();
                true
            }
            Some(CycleMode::Random) => {
                log::debug!("Auto-cycle: random preset");
                controller.activate_random_preset();
                true
            }
            None => false,
        }
    }

    /// Toggle the timer; re-enabling restarts the interval from `now`
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if enabled && !self.enabled {
            self.next_due = now + self.interval;
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mode(&self) -> CycleMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::PresetTable;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_fires_after_interval() {
        let start = Instant::now();
        let mut cycle = AutoCycle::new(5 * SECOND, CycleMode::Sequential, start);

        assert_eq!(cycle.poll(start), None);
        assert_eq!(cycle.poll(start + 4 * SECOND), None);
        assert_eq!(
            cycle.poll(start + 5 * SECOND),
            Some(CycleMode::Sequential)
        );
        assert_eq!(cycle.poll(start + 6 * SECOND), None);
        assert_eq!(
            cycle.poll(start + 10 * SECOND),
            Some(CycleMode::Sequential)
        );
    }

    #[test]
    fn test_missed_intervals_fire_once() {
        let start = Instant::now();
        let mut cycle = AutoCycle::new(SECOND, CycleMode::Random, start);

        assert_eq!(cycle.poll(start + 30 * SECOND), Some(CycleMode::Random));
        assert_eq!(cycle.poll(start + 30 * SECOND), None);
    }

    #[test]
    fn test_disabled_never_fires() {
        let start = Instant::now();
        let mut cycle = AutoCycle::new(SECOND, CycleMode::Sequential, start);
        cycle.set_enabled(false, start);

        assert!(!cycle.is_enabled());
        assert_eq!(cycle.poll(start + 10 * SECOND), None);

        // Re-enabling restarts the interval
        cycle.set_enabled(true, start + 10 * SECOND);
        assert_eq!(cycle.poll(start + 10 * SECOND), None);
        assert!(cycle.poll(start + 11 * SECOND).is_some());
    }

    #[test]
    fn test_run_advances_controller() {
        let start = Instant::now();
        let mut controller = VisualizationController::new(PresetTable::builtin());
        let mut cycle = AutoCycle::new(2 * SECOND, CycleMode::Sequential, start);

        assert!(!cycle.run(start + SECOND, &mut controller));
        assert_eq!(controller.state().current_preset_index, 0);

        assert!(cycle.run(start + 2 * SECOND, &mut controller));
        assert_eq!(controller.state().current_preset_index, 1);
    }

    #[test]
    fn test_run_random_keeps_mesh_in_sync() {
        let start = Instant::now();
        let mut controller = VisualizationController::new(PresetTable::builtin());
        let generation = controller.mesh_generation();
        let mut cycle = AutoCycle::new(SECOND, CycleMode::Random, start);

        assert!(cycle.run(start + SECOND, &mut controller));
        assert_eq!(controller.mesh_generation(), generation + 1);
        assert_eq!(controller.mesh().segments(), controller.state().segments);
    }
}
