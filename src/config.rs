//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "chain-timers")]
#[command(about = "A multi-timer scheduler with grouped, chained and scheduled timers")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the persisted timer snapshot
    #[arg(short, long, default_value = "timers.json")]
    pub state_file: PathBuf,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "200")]
    pub tick_ms: u64,

    /// Elapsed time between ticks treated as a wake-up from suspension
    #[arg(long, default_value = "5000")]
    pub suspend_gap_ms: u64,

    /// Delay before writing a changed snapshot, coalescing bursts of changes
    #[arg(long, default_value = "1000")]
    pub persist_debounce_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn suspend_gap(&self) -> Duration {
        Duration::from_millis(self.suspend_gap_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}
