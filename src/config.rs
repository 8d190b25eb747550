//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::controller::ActionPolicy;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "unidle")]
#[command(about = "A state-managed background agent that keeps the system awake by synthesizing mouse input")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Seconds between synthesized actions
    #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Countdown tick granularity in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(10..=60_000))]
    pub tick_ms: u64,

    /// Which pointer event to synthesize at expiry
    #[arg(short, long, value_enum, default_value = "nudge")]
    pub action: ActionPolicy,

    /// Begin in the active state instead of waiting for a toggle
    #[arg(long)]
    pub start_active: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the configured interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Get the tick granularity as a Duration
    pub fn granularity(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
