//! Activity controller - the single authority over the activation lifecycle.
//!
//! All state mutation happens inside the controller task: the hotkey
//! adapter, the CLI bootstrap, and any UI marshal onto it through the
//! command queue, and observe it through the watch channel. The run loop is
//! a `select!` over the countdown tick and the queue, so there is exactly
//! one logical thread touching `ActivityState` and no locking.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::countdown::Countdown;
use super::policy::ActionPolicy;
use crate::platform::{IdleGuard, InputDriver};
use crate::state::ActivityState;

/// Reason string attached to the idle-sleep assertion.
const ASSERTION_REASON: &str = "unidle is synthesizing input to keep the session awake";

/// Commands accepted by the controller task.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Flip the active state
    Toggle,
    /// Change the period between actions; zero is ignored
    SetInterval(Duration),
}

/// Cloneable handle for sending commands and observing state snapshots.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    updates: watch::Receiver<ActivityState>,
}

impl ControllerHandle {
    /// Queue a toggle of the active state.
    pub fn toggle(&self) {
        if let Err(e) = self.commands.send(Command::Toggle) {
            warn!("Failed to send toggle command: {}", e);
        }
    }

    /// Queue an interval change.
    pub fn set_interval(&self, interval: Duration) {
        if let Err(e) = self.commands.send(Command::SetInterval(interval)) {
            warn!("Failed to send interval command: {}", e);
        }
    }

    /// Raw command sender, for adapters that outlive this handle.
    pub fn commands(&self) -> mpsc::UnboundedSender<Command> {
        self.commands.clone()
    }

    /// Subscribe to state snapshots.
    pub fn updates(&self) -> watch::Receiver<ActivityState> {
        self.updates.clone()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> ActivityState {
        self.updates.borrow().clone()
    }
}

/// Owns the activity state and drives the countdown, the input driver, and
/// the idle-sleep guard.
pub struct Controller {
    state: ActivityState,
    countdown: Countdown,
    policy: ActionPolicy,
    driver: Box<dyn InputDriver>,
    guard: Box<dyn IdleGuard>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    updates_tx: watch::Sender<ActivityState>,
    /// Keep one receiver alive to prevent channel closure
    _updates_rx: watch::Receiver<ActivityState>,
}

impl Controller {
    /// Create a controller and the handle used to reach it.
    pub fn new(
        interval: Duration,
        granularity: Duration,
        policy: ActionPolicy,
        driver: Box<dyn InputDriver>,
        guard: Box<dyn IdleGuard>,
    ) -> (Self, ControllerHandle) {
        let state = ActivityState::new(interval);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates_rx) = watch::channel(state.clone());

        let handle = ControllerHandle {
            commands: commands_tx,
            updates: updates_rx.clone(),
        };

        let controller = Self {
            state,
            countdown: Countdown::new(granularity),
            policy,
            driver,
            guard,
            commands_rx,
            updates_tx,
            _updates_rx: updates_rx,
        };

        (controller, handle)
    }

    /// Drive the controller until every command sender is dropped.
    pub async fn run(mut self) {
        info!("Starting activity controller");

        loop {
            tokio::select! {
                _ = self.countdown.tick() => self.on_tick(),
                command = self.commands_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                }
            }
        }

        // Process exit path: never leave an assertion behind.
        self.guard.release();
        info!("Activity controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Toggle => self.toggle(),
            Command::SetInterval(interval) => self.set_interval(interval),
        }
    }

    /// Flip the active state, starting or stopping the countdown and the
    /// idle-sleep assertion with it.
    fn toggle(&mut self) {
        self.state.active = !self.state.active;

        if self.state.active {
            self.state.remaining = self.state.interval;
            self.state.action_count = 0;
            self.countdown.start();
            if let Err(e) = self.guard.acquire(ASSERTION_REASON) {
                warn!("Failed to acquire idle-sleep assertion: {}", e);
            }
            info!("Activated: acting every {}s", self.state.interval.as_secs());
        } else {
            self.countdown.stop();
            self.state.remaining = self.state.interval;
            self.guard.release();
            info!("Deactivated after {} actions", self.state.action_count);
        }

        self.notify();
    }

    /// Update the configured interval. Zero is rejected and the prior value
    /// kept; when inactive the displayed countdown updates immediately.
    fn set_interval(&mut self, interval: Duration) {
        if interval.is_zero() {
            warn!("Ignoring non-positive interval");
            return;
        }

        self.state.interval = interval;
        if self.state.active {
            // Keep the countdown invariant: remaining never exceeds the
            // configured interval, even when shrinking it mid-cycle.
            self.state.remaining = self.state.remaining.min(interval);
        } else {
            self.state.remaining = interval;
        }

        info!("Interval set to {}s", interval.as_secs());
        self.notify();
    }

    /// One countdown tick: decrement, and synthesize an action at expiry.
    fn on_tick(&mut self) {
        if !self.state.active {
            return;
        }

        self.state.remaining = self
            .state
            .remaining
            .saturating_sub(self.countdown.granularity());

        if self.state.remaining.is_zero() {
            self.perform_action();
            self.state.remaining = self.state.interval;
        }

        self.notify();
    }

    fn perform_action(&mut self) {
        let action = self.policy.next_action(self.state.direction);

        // Lenient on failure: the OS may decline to synthesize the event
        // (revoked permissions); the action is still counted and the
        // countdown resets either way.
        if let Err(e) = self.driver.perform(&action) {
            warn!("Input synthesis failed: {}", e);
        }

        self.state.action_count += 1;
        self.state.direction = self.state.direction.flipped();
        self.state.last_action_at = Some(Utc::now());
        debug!("Performed action #{}: {:?}", self.state.action_count, action);
    }

    fn notify(&self) {
        if let Err(e) = self.updates_tx.send(self.state.clone()) {
            warn!("Failed to send state update: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformError, PointerAction};
    use crate::state::Direction;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDriver {
        actions: Arc<Mutex<Vec<PointerAction>>>,
        fail: bool,
    }

    impl InputDriver for RecordingDriver {
        fn perform(&mut self, action: &PointerAction) -> Result<(), PlatformError> {
            self.actions.lock().unwrap().push(*action);
            if self.fail {
                Err(PlatformError::Unsupported)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct GuardLog {
        acquires: u32,
        releases: u32,
        held: bool,
    }

    #[derive(Clone, Default)]
    struct RecordingGuard {
        log: Arc<Mutex<GuardLog>>,
    }

    impl IdleGuard for RecordingGuard {
        fn acquire(&mut self, _reason: &str) -> Result<(), PlatformError> {
            let mut log = self.log.lock().unwrap();
            if !log.held {
                log.acquires += 1;
                log.held = true;
            }
            Ok(())
        }

        fn release(&mut self) {
            let mut log = self.log.lock().unwrap();
            if log.held {
                log.releases += 1;
                log.held = false;
            }
        }
    }

    fn controller(
        interval_secs: u64,
        granularity_secs: u64,
    ) -> (Controller, ControllerHandle, RecordingDriver, RecordingGuard) {
        let driver = RecordingDriver::default();
        let guard = RecordingGuard::default();
        let (controller, handle) = Controller::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(granularity_secs),
            ActionPolicy::Nudge,
            Box::new(driver.clone()),
            Box::new(guard.clone()),
        );
        (controller, handle, driver, guard)
    }

    #[test]
    fn set_interval_while_inactive_resets_countdown() {
        let (mut c, _handle, _driver, _guard) = controller(60, 1);
        c.set_interval(Duration::from_secs(25));
        assert_eq!(c.state.interval, Duration::from_secs(25));
        assert_eq!(c.state.remaining, Duration::from_secs(25));
    }

    #[test]
    fn zero_interval_is_ignored() {
        let (mut c, _handle, _driver, _guard) = controller(60, 1);
        c.set_interval(Duration::ZERO);
        assert_eq!(c.state.interval, Duration::from_secs(60));
        assert_eq!(c.state.remaining, Duration::from_secs(60));
    }

    #[test]
    fn shrinking_interval_while_active_clamps_remaining() {
        let (mut c, _handle, _driver, _guard) = controller(60, 1);
        c.toggle();
        for _ in 0..10 {
            c.on_tick();
        }
        assert_eq!(c.state.remaining, Duration::from_secs(50));

        c.set_interval(Duration::from_secs(30));
        assert_eq!(c.state.remaining, Duration::from_secs(30));
        assert!(c.state.remaining <= c.state.interval);
    }

    #[test]
    fn double_toggle_restores_state() {
        let (mut c, _handle, _driver, guard) = controller(60, 1);
        c.toggle();
        assert!(c.state.is_active());
        assert!(c.countdown.is_running());

        c.on_tick();
        assert_eq!(c.state.remaining, Duration::from_secs(59));

        c.toggle();
        assert!(!c.state.is_active());
        assert!(!c.countdown.is_running());
        assert_eq!(c.state.remaining, Duration::from_secs(60));

        let log = guard.log.lock().unwrap();
        assert_eq!(log.acquires, 1);
        assert_eq!(log.releases, 1);
        assert!(!log.held);
    }

    #[test]
    fn actions_fire_on_schedule() {
        // interval=5, granularity=1s: after 5 ticks one action and a fresh
        // countdown; after 12 ticks total, two actions.
        let (mut c, _handle, driver, _guard) = controller(5, 1);
        c.toggle();

        for _ in 0..5 {
            c.on_tick();
        }
        assert_eq!(c.state.action_count(), 1);
        assert_eq!(c.state.remaining, Duration::from_secs(5));

        for _ in 0..7 {
            c.on_tick();
        }
        assert_eq!(c.state.action_count(), 2);
        assert_eq!(driver.actions.lock().unwrap().len(), 2);
    }

    #[test]
    fn exactly_one_action_per_expiry_under_rapid_ticking() {
        let (mut c, _handle, driver, _guard) = controller(1, 1);
        c.toggle();
        for _ in 0..50 {
            c.on_tick();
        }
        assert_eq!(c.state.action_count(), 50);
        assert_eq!(driver.actions.lock().unwrap().len(), 50);
    }

    #[test]
    fn activation_resets_action_count() {
        let (mut c, _handle, _driver, _guard) = controller(1, 1);
        c.toggle();
        for _ in 0..3 {
            c.on_tick();
        }
        assert_eq!(c.state.action_count(), 3);

        c.toggle();
        c.toggle();
        assert_eq!(c.state.action_count(), 0);
    }

    #[test]
    fn nudge_direction_alternates() {
        let (mut c, _handle, driver, _guard) = controller(1, 1);
        c.toggle();
        for _ in 0..4 {
            c.on_tick();
        }

        let actions = driver.actions.lock().unwrap();
        assert_eq!(actions[0], PointerAction::Move { dx: 1.0, dy: 0.0 });
        assert_eq!(actions[1], PointerAction::Move { dx: -1.0, dy: 0.0 });
        assert_eq!(actions[2], PointerAction::Move { dx: 1.0, dy: 0.0 });
        assert_eq!(actions[3], PointerAction::Move { dx: -1.0, dy: 0.0 });
        assert_eq!(c.state.direction, Direction::Right);
    }

    #[test]
    fn driver_failure_still_counts_the_action() {
        let driver = RecordingDriver {
            fail: true,
            ..Default::default()
        };
        let (mut c, _handle) = Controller::new(
            Duration::from_secs(1),
            Duration::from_secs(1),
            ActionPolicy::Nudge,
            Box::new(driver.clone()),
            Box::new(RecordingGuard::default()),
        );

        c.toggle();
        c.on_tick();
        assert_eq!(c.state.action_count(), 1);
        assert_eq!(c.state.remaining, Duration::from_secs(1));
        assert!(c.state.last_action_at.is_some());
    }

    #[test]
    fn stray_tick_while_inactive_changes_nothing() {
        let (mut c, _handle, driver, _guard) = controller(5, 1);
        c.on_tick();
        assert_eq!(c.state.remaining, Duration::from_secs(5));
        assert!(driver.actions.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_drives_actions_through_commands() {
        let (c, handle, driver, guard) = controller(2, 1);
        let task = tokio::spawn(c.run());

        handle.toggle();
        tokio::time::sleep(Duration::from_millis(2100)).await;

        let snapshot = handle.snapshot();
        assert!(snapshot.is_active());
        assert_eq!(snapshot.action_count(), 1);
        assert_eq!(driver.actions.lock().unwrap().len(), 1);

        handle.toggle();
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let snapshot = handle.snapshot();
        assert!(!snapshot.is_active());
        assert_eq!(snapshot.remaining_seconds(), 2);
        assert_eq!(driver.actions.lock().unwrap().len(), 1);
        assert_eq!(guard.log.lock().unwrap().releases, 1);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn watchers_see_countdown_updates() {
        let (c, handle, _driver, _guard) = controller(5, 1);
        let mut updates = handle.updates();
        tokio::spawn(c.run());

        handle.toggle();
        updates.changed().await.unwrap();
        assert!(updates.borrow().is_active());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(handle.snapshot().remaining_seconds(), 4);
    }
}
