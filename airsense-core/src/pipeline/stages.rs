//! Built-in pipeline stages
//!
//! [`CalibrateStage`] is the core of the pipeline: it resolves the
//! calibration record effective at each message's receive time and derives
//! the calibrated sensor values. [`LogStage`] emits one line per message
//! for operational visibility. Persistence, broadcast and MQTT forwarding
//! implement the same [`Stage`] contract in the composing application.

use std::sync::Arc;

use crate::{
    cache::{CalibrationCache, CalibrationSource},
    errors::CacheError,
    message::Message,
    time::TimeSource,
    transform,
};

use super::{Stage, StageError};

/// Stage that derives calibrated sensor values.
///
/// Owns the [`CalibrationCache`]. For each message it resolves the record
/// whose validity window contains the receive time and applies the
/// transform; the derived values on a message therefore always match the
/// record that was in effect when the sample arrived.
///
/// A message without an effective calibration record passes through
/// unchanged (`sensor_values` stays `None`) — tagging it as uncalibrated
/// is preferable to fabricating zeros, and dropping it is not an option.
pub struct CalibrateStage {
    cache: CalibrationCache,
}

impl CalibrateStage {
    /// Create the stage and prime its cache from `source`.
    ///
    /// Fails if the initial load fails; a pipeline must not come up
    /// without at least an attempt at calibration data.
    pub fn new(
        source: Box<dyn CalibrationSource>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, CacheError> {
        let cache = CalibrationCache::new(source, clock)?;
        log::info!(
            "calibration cache primed with {} devices",
            cache.device_count()?
        );
        Ok(Self { cache })
    }

    /// The stage's calibration cache.
    pub fn cache(&self) -> &CalibrationCache {
        &self.cache
    }
}

impl Stage for CalibrateStage {
    fn process(&self, message: &mut Message) -> Result<(), StageError> {
        match self.cache.resolve(message.sys_id, message.received_time)? {
            Some(cal) => {
                transform::apply(message, &cal)?;
                Ok(())
            }
            // The cache has already logged the miss, rate-limited by its
            // refresh throttle; the message continues uncalibrated.
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "calibrate"
    }
}

/// Stage that logs one info line per message.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStage;

impl LogStage {
    /// Create a log stage.
    pub fn new() -> Self {
        Self
    }
}

impl Stage for LogStage {
    fn process(&self, message: &mut Message) -> Result<(), StageError> {
        log::info!(
            "message: device='{}' sysid={} calibrated={} packet_size={}",
            message.device_id,
            message.sys_id,
            message.is_calibrated(),
            message.packet_size
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
