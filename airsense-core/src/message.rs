//! Message model for one sensor sample
//!
//! A [`Message`] carries everything a device reports in a single packet:
//! board housekeeping, GPS fix, the three electrochemical channel pairs of
//! the gas front-end and the OPC-N3 particulate block. Listeners decode the
//! wire payload into this struct and hand it to the pipeline; persistence
//! and broadcast consume it as JSON downstream, hence the camelCase serde
//! names.
//!
//! Raw fields hold ADC codes exactly as reported. The derived, calibrated
//! quantities live in [`SensorValues`] behind an `Option`: `None` means the
//! transform has not run for this sample, or no calibration record covered
//! its receive time. Keeping the distinction in the type system ensures an
//! uncalibrated sample can never masquerade as a calibrated one.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Number of histogram bins reported by the OPC-N3 particulate counter.
pub const OPC_BIN_COUNT: usize = 24;

/// One sensor sample as decoded from a transport payload.
///
/// Constructed by the listeners (outside this crate), mutated by the
/// pipeline stages: the calibrate stage fills in [`Message::sensor_values`]
/// and may backfill [`Message::device_id`], the persistence stage assigns
/// [`Message::id`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Storage identifier, assigned by the persistence stage. `None` until
    /// the message has been stored.
    pub id: Option<i64>,
    /// Device identifier. May be empty until resolved from calibration data
    /// when the transport does not carry one.
    pub device_id: String,
    /// Hardware system id (CPU id or similar) reported by the board.
    pub sys_id: u64,
    /// Receive time in milliseconds since the Unix epoch.
    pub received_time: Timestamp,
    /// Size of the decoded wire payload in bytes.
    pub packet_size: u32,

    // Board housekeeping
    /// Firmware version string reported by the board.
    pub firmware_version: String,
    /// Uptime in seconds since the board booted.
    pub uptime: u64,
    /// Board-level temperature in degrees Celsius.
    pub board_temp: f64,
    /// Board-level relative humidity in percent.
    pub board_rel_humidity: f64,
    /// Board status bits.
    pub status: u32,

    // GPS
    /// GPS timestamp as reported (hhmmss.ss).
    pub gps_timestamp: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Altitude in meters.
    pub alt: f64,

    // AFE3 gas front-end, raw ADC codes
    /// Work electrode code, channel 1 (NO2 position).
    pub sensor1_work: u32,
    /// Auxiliary electrode code, channel 1.
    pub sensor1_aux: u32,
    /// Work electrode code, channel 2 (O3+NO2 position).
    pub sensor2_work: u32,
    /// Auxiliary electrode code, channel 2.
    pub sensor2_aux: u32,
    /// Work electrode code, channel 3 (NO position).
    pub sensor3_work: u32,
    /// Auxiliary electrode code, channel 3.
    pub sensor3_aux: u32,
    /// AFE temperature sensor code.
    pub afe3_temp_raw: u32,

    // OPC-N3 particulate counter
    /// PM accumulator A as reported by the counter.
    pub opc_pm_a: f64,
    /// PM accumulator B as reported by the counter.
    pub opc_pm_b: f64,
    /// PM accumulator C as reported by the counter.
    pub opc_pm_c: f64,
    /// PM1 mass concentration, µg/m³.
    pub pm1: f64,
    /// PM2.5 mass concentration, µg/m³.
    pub pm25: f64,
    /// PM10 mass concentration, µg/m³.
    pub pm10: f64,
    /// Sample period housekeeping value.
    pub opc_sample_period: u16,
    /// Sample flow rate housekeeping value.
    pub opc_sample_flow_rate: u16,
    /// Counter-internal temperature, raw.
    pub opc_temp: u16,
    /// Counter-internal humidity, raw.
    pub opc_hum: u16,
    /// Fan revolution count.
    pub opc_fan_revcount: u16,
    /// Laser status word.
    pub opc_laser_status: u16,
    /// Non-zero when the counter marks the sample valid.
    pub opc_sample_valid: u8,
    /// Particle size histogram bins.
    pub opc_bins: [u16; OPC_BIN_COUNT],

    /// Calibrated quantities. `None` until the transform has run against a
    /// calibration record whose validity window contains
    /// [`Message::received_time`].
    #[serde(flatten)]
    pub sensor_values: Option<SensorValues>,
}

impl Message {
    /// Whether calibrated sensor values have been derived for this sample.
    pub fn is_calibrated(&self) -> bool {
        self.sensor_values.is_some()
    }
}

/// Calibrated quantities derived from one sample and one calibration record.
///
/// Written in one shot by [`transform::apply`](crate::transform::apply);
/// never updated piecemeal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorValues {
    /// Corrected AFE temperature, °C × 1000.
    pub afe3_temp_value: f64,
    /// NO2 concentration, parts per billion.
    pub no2_ppb: f64,
    /// O3 concentration, parts per billion.
    pub o3_ppb: f64,
    /// NO concentration, parts per billion.
    pub no_ppb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_is_uncalibrated() {
        let msg = Message::default();
        assert!(!msg.is_calibrated());
        assert!(msg.device_id.is_empty());
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let msg = Message {
            device_id: "device-1".into(),
            sys_id: 42,
            received_time: 1_000,
            ..Message::default()
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["deviceId"], "device-1");
        assert_eq!(json["sysId"], 42);
        assert_eq!(json["receivedTime"], 1_000);
        // Derived values are omitted entirely until the transform has run.
        assert!(json.get("no2Ppb").is_none());
    }

    #[test]
    fn sensor_values_round_trip() {
        let msg = Message {
            sys_id: 7,
            sensor_values: Some(SensorValues {
                afe3_temp_value: 21_500.0,
                no2_ppb: 12.5,
                o3_ppb: 30.0,
                no_ppb: 4.25,
            }),
            ..Message::default()
        };

        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
        assert!(back.is_calibrated());
    }
}
