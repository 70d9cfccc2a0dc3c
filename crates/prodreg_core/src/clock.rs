//! Transaction-time oracle.
//!
//! Every replica evaluating the same operation must derive the same
//! timestamps, so the registry never reads the wall clock directly. It asks
//! a [`TxClock`] for the time of the current transaction instead.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Errors produced by a [`TxClock`].
#[derive(Debug, Error)]
pub enum ClockError {
    /// The hosting context could not supply a timestamp.
    #[error("{0}")]
    Unavailable(String),

    /// The timestamp cannot be represented as a calendar date.
    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    OutOfRange {
        /// Seconds since the Unix epoch.
        seconds: i64,
        /// Nanosecond part.
        nanos: u32,
    },
}

impl ClockError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// How many fractional-second digits a rendered timestamp carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPrecision {
    /// Whole seconds (`2024-05-01T12:00:00Z`).
    #[default]
    Secs,
    /// Milliseconds (`2024-05-01T12:00:00.250Z`).
    Millis,
    /// Nanoseconds (`2024-05-01T12:00:00.250000000Z`).
    Nanos,
}

impl TimestampPrecision {
    fn seconds_format(self) -> SecondsFormat {
        match self {
            Self::Secs => SecondsFormat::Secs,
            Self::Millis => SecondsFormat::Millis,
            Self::Nanos => SecondsFormat::Nanos,
        }
    }
}

/// A transaction timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxTimestamp {
    seconds: i64,
    nanos: u32,
}

impl TxTimestamp {
    /// Creates a timestamp. Nanoseconds beyond one second carry into `seconds`.
    #[must_use]
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds.saturating_add((nanos / NANOS_PER_SEC) as i64),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Converts a `chrono` UTC datetime.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::new(dt.timestamp(), dt.timestamp_subsec_nanos())
    }

    /// Returns whole seconds since the Unix epoch.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    /// Returns the nanosecond part.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    /// Returns this timestamp advanced by `by`.
    #[must_use]
    pub fn advanced(self, by: Duration) -> Self {
        let secs = i64::try_from(by.as_secs()).unwrap_or(i64::MAX);
        Self::new(
            self.seconds.saturating_add(secs),
            self.nanos + by.subsec_nanos(),
        )
    }

    /// Converts to a `chrono` UTC datetime.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the value has no calendar date.
    pub fn to_datetime(self) -> Result<DateTime<Utc>, ClockError> {
        DateTime::from_timestamp(self.seconds, self.nanos).ok_or(ClockError::OutOfRange {
            seconds: self.seconds,
            nanos: self.nanos,
        })
    }

    /// Renders the timestamp as RFC3339 in UTC at the given precision.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the value has no calendar date.
    pub fn format(self, precision: TimestampPrecision) -> Result<String, ClockError> {
        Ok(self
            .to_datetime()?
            .to_rfc3339_opts(precision.seconds_format(), true))
    }

    /// Renders the timestamp as RFC3339 with whole-second precision.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the value has no calendar date.
    pub fn to_rfc3339(self) -> Result<String, ClockError> {
        self.format(TimestampPrecision::Secs)
    }
}

impl fmt::Display for TxTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Supplies the timestamp of the current transaction.
///
/// Implementations hosted on a replicated platform must return the same
/// value on every node evaluating the same transaction.
pub trait TxClock: Send + Sync {
    /// Returns the current transaction timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosting context cannot supply one.
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError>;
}

impl<T: TxClock + ?Sized> TxClock for &T {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        (**self).tx_timestamp()
    }
}

impl<T: TxClock + ?Sized> TxClock for Arc<T> {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        (**self).tx_timestamp()
    }
}

impl<T: TxClock + ?Sized> TxClock for Box<T> {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        (**self).tx_timestamp()
    }
}

/// Reads the local wall clock.
///
/// Only suitable for single-node use such as the CLI, where there are no
/// other replicas to agree with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TxClock for SystemClock {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        Ok(TxTimestamp::from_datetime(Utc::now()))
    }
}

/// A deterministic clock that returns whatever it was last set to.
///
/// # Example
///
/// ```rust
/// use prodreg_core::{FixedClock, TxClock, TxTimestamp};
/// use std::time::Duration;
///
/// let clock = FixedClock::new(TxTimestamp::new(100, 0));
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.tx_timestamp().unwrap(), TxTimestamp::new(105, 0));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<TxTimestamp>,
}

impl FixedClock {
    /// Creates a clock fixed at `now`.
    #[must_use]
    pub fn new(now: TxTimestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Creates a clock fixed at the given Unix second.
    #[must_use]
    pub fn at_unix(seconds: i64) -> Self {
        Self::new(TxTimestamp::new(seconds, 0))
    }

    /// Returns the current value.
    #[must_use]
    pub fn now(&self) -> TxTimestamp {
        *self.now.lock()
    }

    /// Sets the current value.
    pub fn set(&self, now: TxTimestamp) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.advanced(by);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at_unix(0)
    }
}

impl TxClock for FixedClock {
    fn tx_timestamp(&self) -> Result<TxTimestamp, ClockError> {
        Ok(self.now())
    }
}
