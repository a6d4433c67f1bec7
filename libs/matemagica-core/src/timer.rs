//! Rapid-mode countdown.
//!
//! Pure tick-driven state: whoever owns the periodic task calls
//! [`Countdown::tick`] ten times per second. The budget spans the whole
//! round and is paused while an answer is on screen.

use std::time::Duration;

pub const TICKS_PER_SECOND: u32 = 10;

/// Period of the driving task.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum gap between non-forced alerts (1.2 s).
pub const ALERT_COOLDOWN_TICKS: u64 = 12;

/// Largest single extension (5 s).
pub const MAX_EXTENSION: u32 = 50;

/// Color band of the time bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    /// At least half the budget left.
    Plenty,
    /// Between a quarter and half left.
    Warning,
    /// Under a quarter left.
    Low,
}

impl TimeBand {
    pub fn for_percent(percent: f64) -> Self {
        if percent < 25.0 {
            Self::Low
        } else if percent < 50.0 {
            Self::Warning
        } else {
            Self::Plenty
        }
    }
}

/// What a tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The countdown is stopped or absent; nothing happened.
    Idle,
    Running(TickReport),
    /// Time ran out on this tick.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub remaining: u32,
    pub percent: f64,
    pub band: TimeBand,
    /// Whether an audio alert should fire on this tick.
    pub alert: bool,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    max: u32,
    running: bool,
    band: TimeBand,
    elapsed_ticks: u64,
    last_alert_tick: Option<u64>,
    critical_alert_played: bool,
}

impl Countdown {
    /// New stopped countdown with a full budget.
    pub fn new(max: u32) -> Self {
        Self {
            remaining: max,
            max,
            running: false,
            band: TimeBand::Plenty,
            elapsed_ticks: 0,
            last_alert_tick: None,
            critical_alert_played: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn percent(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.remaining) / f64::from(self.max) * 100.0
    }

    /// Resume ticking. An expired countdown stays stopped.
    pub fn resume(&mut self) {
        self.running = !self.is_expired();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Add up to [`MAX_EXTENSION`] ticks, capped at the budget. Returns the ticks added.
    pub fn extend(&mut self, amount: u32) -> u32 {
        let target = self
            .remaining
            .saturating_add(amount.min(MAX_EXTENSION))
            .min(self.max);
        let added = target - self.remaining;
        self.remaining = target;
        self.band = TimeBand::for_percent(self.percent());
        added
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.elapsed_ticks += 1;
        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.running = false;
            self.last_alert_tick = Some(self.elapsed_ticks);
            return TickOutcome::Expired;
        }

        let percent = self.percent();
        let band = TimeBand::for_percent(percent);
        let mut alert = false;

        if band == TimeBand::Low && self.band != TimeBand::Low && self.cooldown_elapsed() {
            alert = true;
        }
        if percent < 10.0 && !self.critical_alert_played {
            self.critical_alert_played = true;
            alert = true;
        }
        if alert {
            self.last_alert_tick = Some(self.elapsed_ticks);
        }
        self.band = band;

        TickOutcome::Running(TickReport {
            remaining: self.remaining,
            percent,
            band,
            alert,
        })
    }

    fn cooldown_elapsed(&self) -> bool {
        self.last_alert_tick
            .map_or(true, |last| self.elapsed_ticks - last >= ALERT_COOLDOWN_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(max: u32) -> Countdown {
        let mut c = Countdown::new(max);
        c.resume();
        c
    }

    fn alerts(c: &mut Countdown, ticks: u32) -> usize {
        (0..ticks)
            .filter(|_| matches!(c.tick(), TickOutcome::Running(r) if r.alert))
            .count()
    }

    #[test]
    fn test_stopped_countdown_ignores_ticks() {
        let mut c = Countdown::new(150);
        assert_eq!(c.tick(), TickOutcome::Idle);
        assert_eq!(c.remaining(), 150);
    }

    #[test]
    fn test_expires_and_stays_stopped() {
        let mut c = running(3);
        assert!(matches!(c.tick(), TickOutcome::Running(_)));
        assert!(matches!(c.tick(), TickOutcome::Running(_)));
        assert_eq!(c.tick(), TickOutcome::Expired);
        assert_eq!(c.tick(), TickOutcome::Idle);
        c.resume();
        assert!(!c.is_running());
    }

    #[test]
    fn test_bands() {
        assert_eq!(TimeBand::for_percent(100.0), TimeBand::Plenty);
        assert_eq!(TimeBand::for_percent(50.0), TimeBand::Plenty);
        assert_eq!(TimeBand::for_percent(49.9), TimeBand::Warning);
        assert_eq!(TimeBand::for_percent(25.0), TimeBand::Warning);
        assert_eq!(TimeBand::for_percent(24.9), TimeBand::Low);
    }

    #[test]
    fn test_low_crossing_and_critical_alert_fire_once() {
        let mut c = running(100);
        // 100 -> 24 crosses into Low once; 24 -> 9 crosses the critical line.
        assert_eq!(alerts(&mut c, 76), 1);
        assert_eq!(alerts(&mut c, 15), 1);
        assert_eq!(alerts(&mut c, 8), 0);
    }

    #[test]
    fn test_recrossing_respects_cooldown() {
        let mut c = running(100);
        assert_eq!(alerts(&mut c, 76), 1);
        c.extend(2);
        // Back under a quarter two ticks later, inside the cooldown window.
        assert_eq!(alerts(&mut c, 2), 0);
        c.extend(12);
        assert_eq!(alerts(&mut c, 12), 1);
    }

    #[test]
    fn test_extend_is_capped() {
        let mut c = running(150);
        for _ in 0..20 {
            c.tick();
        }
        assert_eq!(c.extend(50), 20);
        assert_eq!(c.remaining(), 150);

        for _ in 0..100 {
            c.tick();
        }
        assert_eq!(c.extend(500), MAX_EXTENSION);
        assert_eq!(c.remaining(), 100);
    }
}
