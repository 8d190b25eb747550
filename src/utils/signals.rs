//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;

/// Signals that stop the agent.
const SHUTDOWN_SIGNALS: [i32; 2] = [signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT];

/// Wait for the first shutdown signal and return it.
///
/// Returns `None` only if the signal stream ends, which should not happen
/// in practice.
pub async fn shutdown_signal() -> Option<i32> {
    let mut signals = Signals::new(SHUTDOWN_SIGNALS).expect("Failed to create signal handler");
    signals.next().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_signals_cover_term_and_int() {
        assert!(SHUTDOWN_SIGNALS.contains(&signal_hook::consts::SIGTERM));
        assert!(SHUTDOWN_SIGNALS.contains(&signal_hook::consts::SIGINT));
    }
}
