//! Periodic tick source for the countdown.

use matemagica_core::TICK_INTERVAL;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Owns at most one running interval. Starting replaces the previous one.
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Never resolves while stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_interval() {
        let mut ticker = Ticker::new();
        ticker.start();

        let started = Instant::now();
        for _ in 0..3 {
            ticker.tick().await;
        }
        assert_eq!(started.elapsed(), TICK_INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_fires() {
        let mut ticker = Ticker::new();
        ticker.start();
        ticker.stop();
        assert!(!ticker.is_running());

        let waited = timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_interval() {
        let mut ticker = Ticker::new();
        ticker.start();
        tokio::time::advance(Duration::from_millis(60)).await;
        ticker.start();

        let started = Instant::now();
        ticker.tick().await;
        assert_eq!(started.elapsed(), TICK_INTERVAL);
    }
}
