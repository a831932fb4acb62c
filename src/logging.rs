//! Structured events for the segments a connection sends and receives.
//!
//! Events are plain [`tracing`] events and go wherever the installed
//! subscriber sends them. [`init_events`] installs a subscriber that writes
//! them to a JSON log file.

use crate::tcp::Segment;
use std::{
    fs::{create_dir_all, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error as ThisError;
use tracing::{event, Level};
use tracing_subscriber::FmtSubscriber;

/// Which way a segment was going when it was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Sent,
    Retransmitted,
    Received,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Retransmitted => "retransmitted",
            Direction::Received => "received",
        }
    }
}

/// Installs a global subscriber that writes every event as JSON to
/// `dir/debug-<yy-mm-dd>.log`, creating the directory if needed. Only the
/// first call in a process can succeed. Returns the path of the log file.
pub fn init_events(dir: &Path) -> Result<PathBuf, LoggingError> {
    create_dir_all(dir).map_err(|source| LoggingError::Open {
        path: dir.to_owned(),
        source,
    })?;
    let path = dir.join(format!(
        "debug-{}.log",
        chrono::offset::Local::now().format("%y-%m-%d")
    ));
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|source| LoggingError::Open {
            path: path.clone(),
            source,
        })?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_writer(Arc::new(file))
        .json()
        .finish();
    // All events from every connection go to the same file
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(path)
}

/// Segment event handler.
/// Captures the following data: direction, seq, ack, syn, fin, wnd, len
pub fn segment_event(direction: Direction, segment: &Segment) {
    let header = &segment.header;
    event!(
        target: "SEGMENT",
        Level::DEBUG,
        direction = direction.as_str(),
        seq = header.seq.raw(),
        ack = header.ctl.ack().then(|| header.ack.raw()),
        syn = header.ctl.syn(),
        fin = header.ctl.fin(),
        wnd = header.wnd,
        len = segment.text.len(),
    );
}

#[derive(Debug, ThisError)]
pub enum LoggingError {
    #[error("Could not open log file {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("A global subscriber has already been set")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}
