//! Calibration record model
//!
//! A [`Cal`] is one calibration snapshot for a device: the electrode zero
//! voltages, gains and sensitivities measured for each of the three
//! electrochemical channels, plus board-level identity. Records are created
//! by the calibration importer, never modified afterwards.
//!
//! A device accumulates records over time. A record is in effect for every
//! sample time at or after its [`Cal::valid_from`], until superseded by the
//! next-newer record for the same system id; the newest record stays in
//! effect indefinitely. Selecting the record for a given sample is the
//! cache's job (see [`cache`](crate::cache)).

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Number of electrochemical channels on the gas front-end.
pub const CHANNEL_COUNT: usize = 3;

/// One calibration snapshot for a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cal {
    /// Storage identifier.
    pub id: i64,
    /// Device identifier the record belongs to.
    pub device_id: String,
    /// Hardware system id (CPU id or similar).
    pub sys_id: u64,
    /// Import batch this record arrived in.
    pub collection_id: String,
    /// Start of the validity window, milliseconds since the Unix epoch.
    pub valid_from: Timestamp,

    /// Analog front-end circuit variant.
    pub circuit_type: String,
    /// AFE board serial number.
    pub afe_serial: String,
    /// AFE board type.
    pub afe_type: String,
    /// When the sensor head was calibrated at the factory.
    pub afe_cal_date: Timestamp,
    /// Temperature sensor offset for the probe at 20 °C.
    pub vt20_offset: f64,

    /// Per-channel electrode parameters, index 0 = channel 1.
    pub channels: [ChannelCal; CHANNEL_COUNT],
}

/// Calibration parameters for one electrochemical channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCal {
    /// Serial number of the sensor mounted on this channel.
    pub serial: String,
    /// Chemical sensor type, e.g. `"NO2-A4"`. Free text from the importer;
    /// selects the temperature-correction table and is *not* validated
    /// against a known set at import time.
    pub sensor_type: String,
    /// Work electrode electronic zero, mV.
    pub we_electronic_zero: i32,
    /// Work electrode zero offset, mV.
    pub we_zero_offset: i32,
    /// Auxiliary electrode electronic zero, mV.
    pub ae_electronic_zero: i32,
    /// Auxiliary electrode zero offset, mV.
    pub ae_zero_offset: i32,
    /// PCB gain, mV/nA.
    pub pcb_gain: f64,
    /// Working electrode sensitivity, mV/ppb.
    pub we_sensitivity: f64,
}
