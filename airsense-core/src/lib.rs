//! Calibration-aware processing core for air quality telemetry
//!
//! Turns raw electrochemical-sensor samples into calibrated gas
//! concentrations and drives them through a composable stage pipeline.
//! Listeners decode transport payloads into [`Message`]s and publish them;
//! the calibrate stage resolves the calibration record in effect at each
//! sample's receive time and derives NO2/O3/NO concentrations with
//! temperature-compensated correction.
//!
//! Key properties:
//! - Calibration selection is time-versioned: a sample is always computed
//!   against the record whose validity window contains its receive time.
//! - Cache refreshes are throttled, so unknown-device bursts cannot
//!   overload the calibration store.
//! - Calibration problems degrade single messages, never the pipeline;
//!   only a failed initial cache load is fatal.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use airsense_core::{
//!     cache::CalibrationSource,
//!     errors::CacheResult,
//!     pipeline::{CalibrateStage, LogStage, Pipeline},
//!     time::SystemClock,
//!     Cal, Message,
//! };
//!
//! /// Production code implements this against the persistence layer.
//! struct StoreBackedCals;
//!
//! impl CalibrationSource for StoreBackedCals {
//!     fn list_all(&self) -> CacheResult<Vec<Cal>> {
//!         Ok(vec![])
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::builder()
//!         .add_stage(CalibrateStage::new(
//!             Box::new(StoreBackedCals),
//!             Arc::new(SystemClock),
//!         )?)
//!         .add_stage(LogStage::new())
//!         .build();
//!
//!     let mut message = Message {
//!         sys_id: 0x1E66_3501,
//!         received_time: 1_581_500_000_000,
//!         ..Message::default()
//!     };
//!     pipeline.publish(&mut message)?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cal;
pub mod cache;
pub mod errors;
pub mod lookup;
pub mod message;
pub mod pipeline;
pub mod time;
pub mod transform;

// Public API
pub use cal::{Cal, ChannelCal};
pub use cache::{CalibrationCache, CalibrationSource};
pub use errors::{CacheError, TransformError};
pub use message::{Message, SensorValues};
pub use pipeline::{CalibrateStage, LogStage, Pipeline, PipelineBuilder, Stage};
pub use time::{SystemClock, TimeSource, Timestamp};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
