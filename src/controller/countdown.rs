//! Countdown scheduler
//!
//! A repeating tick source the controller selects on. Unlike a bare
//! `tokio::time::interval`, it can be stopped and restarted, and both
//! transitions are idempotent: `start()` while armed keeps the existing
//! schedule (no duplicate timers), `stop()` while stopped does nothing.
//!
//! `start()` and `stop()` only record state; the underlying interval is
//! built inside `tick()`, so arming and disarming work from plain
//! synchronous code while the timer itself lives on the runtime.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[derive(Debug)]
enum Ticker {
    Stopped,
    /// Armed but not yet polled; the interval is created on first `tick()`
    Armed { first_tick: Instant },
    Running(Interval),
}

/// Repeating tick source with idempotent start/stop.
#[derive(Debug)]
pub struct Countdown {
    granularity: Duration,
    ticker: Ticker,
}

impl Countdown {
    /// Create a stopped countdown ticking at the given granularity.
    pub fn new(granularity: Duration) -> Self {
        Self {
            granularity,
            ticker: Ticker::Stopped,
        }
    }

    /// Tick granularity, the amount each tick subtracts from the countdown.
    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    /// Arm the ticker. No-op if already armed or running.
    ///
    /// The first tick fires one full granularity after this call, so a
    /// fresh countdown is displayed at its full value for one period.
    pub fn start(&mut self) {
        if !matches!(self.ticker, Ticker::Stopped) {
            return;
        }
        self.ticker = Ticker::Armed {
            first_tick: Instant::now() + self.granularity,
        };
    }

    /// Disarm the ticker. No-op if already stopped.
    pub fn stop(&mut self) {
        self.ticker = Ticker::Stopped;
    }

    /// Check whether the ticker is armed.
    pub fn is_running(&self) -> bool {
        !matches!(self.ticker, Ticker::Stopped)
    }

    /// Wait for the next tick. Pending forever while stopped, so this can
    /// sit in a `select!` arm without a busy loop.
    pub async fn tick(&mut self) {
        if let Ticker::Armed { first_tick } = self.ticker {
            let mut ticker = interval_at(first_tick, self.granularity);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            self.ticker = Ticker::Running(ticker);
        }

        match &mut self.ticker {
            Ticker::Running(ticker) => {
                ticker.tick().await;
            }
            _ => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    /// Arming and disarming must work from synchronous code with no
    /// runtime present; only `tick()` touches the timer driver.
    #[test]
    fn start_and_stop_need_no_runtime() {
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.start();
        assert!(countdown.is_running());
        countdown.start();
        countdown.stop();
        assert!(!countdown.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_granularity_once_started() {
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.start();
        assert!(countdown.is_running());

        timeout(Duration::from_secs(2), countdown.tick())
            .await
            .expect("first tick within one granularity");
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_countdown_never_ticks() {
        let mut countdown = Countdown::new(Duration::from_millis(10));
        assert!(!countdown.is_running());

        tokio::select! {
            _ = countdown.tick() => panic!("stopped countdown must not tick"),
            _ = sleep(Duration::from_secs(5)) => {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_existing_ticker() {
        let mut countdown = Countdown::new(Duration::from_secs(10));
        countdown.start();

        // Burn most of the first period, then call start again: the next
        // tick must still arrive on the original schedule, proving the
        // second start did not re-arm the timer.
        sleep(Duration::from_secs(9)).await;
        countdown.start();

        timeout(Duration::from_secs(2), countdown.tick())
            .await
            .expect("tick on the original schedule");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.stop();
        countdown.start();
        countdown.stop();
        countdown.stop();
        assert!(!countdown.is_running());

        tokio::select! {
            _ = countdown.tick() => panic!("stopped countdown must not tick"),
            _ = sleep(Duration::from_secs(3)) => {}
        }
    }
}
