//! Parses the command line arguments of the `elvis-tcp` demo.
//!
//! The demo pushes random bytes through a [`Loopback`] and checks that they
//! come out the other side unchanged. Basic usage for sending a megabyte with
//! logging on:
//!
//! ```cargo run -- --bytes 1000000 --log ./logs```

use crate::{
    logging,
    loopback::{Loopback, LoopbackStats, TransferError},
    tcp::{ConfigError, TcpConfig},
};
use clap::Parser;
use rand::Rng;
use std::{fmt, path::PathBuf, process::ExitCode, time::Duration};
use thiserror::Error as ThisError;

/// Stores the different command line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Sends random bytes through an in-process TCP connection")]
pub struct Args {
    /// Number of random bytes to transfer
    #[arg(short, long, default_value_t = 100_000)]
    pub bytes: usize,
    /// Capacity in bytes of both the outgoing stream and the receive window
    #[arg(short, long, default_value_t = TcpConfig::DEFAULT_CAPACITY)]
    pub capacity: usize,
    /// Largest payload carried by one segment
    #[arg(short, long, default_value_t = TcpConfig::MAX_PAYLOAD_SIZE)]
    pub payload: usize,
    /// Initial retransmission timeout in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    pub rto: u64,
    /// Simulated milliseconds that pass with each step
    #[arg(short, long, default_value_t = 10)]
    pub tick: u64,
    /// Directory to write a JSON event log to. Logging is off without it.
    #[arg(short, long)]
    pub log: Option<PathBuf>,
}

impl Args {
    pub fn config(&self) -> TcpConfig {
        TcpConfig {
            rt_timeout: Duration::from_millis(self.rto),
            recv_capacity: self.capacity,
            send_capacity: self.capacity,
            max_payload_size: self.payload,
            ..Default::default()
        }
    }
}

/// Parses the arguments, runs the transfer, and reports the outcome.
pub fn initialize_from_arguments() -> ExitCode {
    let args = Args::parse();
    if let Some(dir) = &args.log {
        match logging::init_events(dir) {
            Ok(path) => println!("Logging to {}", path.display()),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match transfer(&args) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Sends `args.bytes` random bytes through a fresh [`Loopback`] and checks
/// what arrives.
pub fn transfer(args: &Args) -> Result<Summary, RunError> {
    let mut loopback = Loopback::new(args.config())?;
    let tick = Duration::from_millis(args.tick);

    let mut data = vec![0u8; args.bytes];
    rand::thread_rng().fill(&mut data[..]);

    let mut written = 0;
    let mut received = Vec::with_capacity(data.len());
    let mut steps = 0u64;
    while !loopback.is_finished() {
        if written < data.len() {
            written += loopback.write(&data[written..]);
            if written == data.len() {
                loopback.close();
            }
        } else if steps == 0 {
            // Nothing to send at all
            loopback.close();
        }
        loopback.step(tick)?;
        received.extend(loopback.read());
        steps += 1;
    }

    if let Some(at) = data.iter().zip(&received).position(|(a, b)| a != b) {
        Err(RunError::Corrupted { at })?
    }
    if received.len() != data.len() {
        Err(RunError::Length {
            expected: data.len(),
            actual: received.len(),
        })?
    }
    Ok(Summary {
        bytes: received.len(),
        steps,
        simulated: simulated_time(args.tick, steps),
        stats: loopback.stats(),
    })
}

/// The simulated time `steps` ticks of `tick_ms` milliseconds add up to,
/// saturating instead of wrapping.
fn simulated_time(tick_ms: u64, steps: u64) -> Duration {
    Duration::from_millis(tick_ms.saturating_mul(steps))
}

/// What a finished transfer looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub bytes: usize,
    pub steps: u64,
    pub simulated: Duration,
    pub stats: LoopbackStats,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transferred {} bytes in {} steps ({:?} simulated): {} segments sent, {} retransmitted",
            self.bytes,
            self.steps,
            self.simulated,
            self.stats.segments_sent,
            self.stats.retransmissions,
        )
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("Received data differs from what was sent at byte {at}")]
    Corrupted { at: usize },
    #[error("Expected {expected} bytes but received {actual}")]
    Length { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["elvis-tcp"]).unwrap();
        assert_eq!(args.config(), TcpConfig::default());
        assert_eq!(args.tick, 10);
        assert!(args.log.is_none());
    }

    #[test]
    fn small_transfer() {
        let args = Args::try_parse_from([
            "elvis-tcp",
            "--bytes",
            "5000",
            "--capacity",
            "700",
            "--payload",
            "100",
            "--rto",
            "50",
        ])
        .unwrap();
        let summary = transfer(&args).unwrap();
        assert_eq!(summary.bytes, 5000);
        // Every payload byte crosses in segments of at most 100 bytes
        assert!(summary.stats.segments_sent >= 50);
        assert_eq!(summary.simulated, Duration::from_millis(10 * summary.steps));
    }

    #[test]
    fn simulated_time_saturates() {
        assert_eq!(simulated_time(10, 7), Duration::from_millis(70));
        assert_eq!(simulated_time(1, 1 << 40), Duration::from_millis(1 << 40));
        assert_eq!(simulated_time(u64::MAX, 2), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn empty_transfer() {
        let args = Args::try_parse_from(["elvis-tcp", "--bytes", "0"]).unwrap();
        let summary = transfer(&args).unwrap();
        assert_eq!(summary.bytes, 0);
        assert_eq!(summary.stats.segments_sent, 1);
    }

    #[test]
    fn zero_payload_is_rejected() {
        let args = Args::try_parse_from(["elvis-tcp", "--payload", "0"]).unwrap();
        assert_eq!(
            transfer(&args),
            Err(RunError::Config(ConfigError::ZeroPayload))
        );
    }
}
