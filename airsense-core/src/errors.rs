//! Error types for calibration resolution and sensor value derivation
//!
//! The error taxonomy mirrors the failure policy of the pipeline:
//!
//! - [`CacheError`] covers the transient category — the calibration source
//!   failed or the cache lock was poisoned. Callers keep serving whatever
//!   was cached before (stale-but-available) and log.
//! - [`TransformError`] covers data-quality problems in externally supplied
//!   calibration records. These degrade a single message (it is forwarded
//!   uncalibrated), never the pipeline.
//!
//! The only fatal condition in the whole core is a failed *initial* cache
//! load at stage construction; it surfaces as a `CacheError` from
//! [`CalibrateStage::new`](crate::pipeline::CalibrateStage::new).

use thiserror_no_std::Error;

/// Result type for calibration cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while loading or querying the calibration cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The calibration source could not deliver the record set.
    #[error("calibration source failure: {0}")]
    Source(String),

    /// A cache lock was poisoned by a panicking thread.
    #[error("calibration cache lock poisoned")]
    LockPoisoned,
}

/// Errors raised while deriving sensor values from a calibration record.
///
/// Calibration data is externally supplied and can contain typos; these
/// errors make bad records an explicit, recoverable outcome instead of an
/// abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The channel's sensor type has no temperature-correction table.
    #[error("unknown sensor type '{sensor_type}' on channel {channel}")]
    UnknownSensorType {
        /// Sensor channel (1-based, as on the board silkscreen).
        channel: u8,
        /// The free-text sensor type from the calibration record.
        sensor_type: String,
    },

    /// The channel's working-electrode sensitivity is zero or non-finite.
    #[error("unusable sensitivity {value} mV/ppb on channel {channel}")]
    InvalidSensitivity {
        /// Sensor channel (1-based).
        channel: u8,
        /// The offending sensitivity value.
        value: f64,
    },
}
