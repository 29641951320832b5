//! Derivation of calibrated sensor values from raw samples
//!
//! This is the computational heart of the pipeline: a pure function from
//! `(raw message, calibration record)` to gas concentrations and corrected
//! AFE temperature. It is deterministic and side-effect free apart from
//! writing the result into the message, and it either succeeds completely
//! or leaves the message untouched — there is no partially derived state.
//!
//! ## Computation
//!
//! 1. Corrected AFE temperature:
//!    `(raw × LSB − vt20_offset + 0.02) × 1000`, in °C × 1000.
//! 2. Per channel, the auxiliary electrode voltage is scaled by the
//!    temperature-dependent factor from the channel's sensor-type curve
//!    (see [`lookup`](crate::lookup)), evaluated at the corrected
//!    temperature in plain °C.
//! 3. Electrode voltages: `raw × LSB × 1000 − (electronic zero + zero
//!    offset)`, in mV.
//! 4. Concentrations: `(work_mV − aux_mV × factor) / sensitivity`, in ppb.
//!    Channel 2 senses O3 and NO2 combined, so the NO2 concentration from
//!    channel 1 is subtracted from its result.
//! 5. An empty device id on the message is backfilled from the calibration
//!    record. Some transports do not expose the device identity, only the
//!    hardware system id.

use crate::{
    cal::Cal,
    errors::TransformError,
    lookup,
    message::{Message, SensorValues},
};

/// ADC scaling factor in volts per code, named "lsb" in the AFE datasheet.
pub const AFE3_LSB_VOLTS: f64 = 0.000_000_596_046_447_8;

/// Convert a raw electrode ADC code to millivolts, removing the channel's
/// electronic zero and zero offset.
pub fn electrode_millivolts(code: u32, electronic_zero: i32, zero_offset: i32) -> f64 {
    f64::from(code) * AFE3_LSB_VOLTS * 1000.0
        - (f64::from(electronic_zero) + f64::from(zero_offset))
}

/// Derive calibrated values for `msg` using `cal`, without mutating `msg`.
///
/// Fails if a channel's sensor type has no correction curve or its
/// sensitivity would poison the division; both indicate a bad calibration
/// record, not a bad sample.
pub fn sensor_values(msg: &Message, cal: &Cal) -> Result<SensorValues, TransformError> {
    let afe3_temp_value =
        (f64::from(msg.afe3_temp_raw) * AFE3_LSB_VOLTS - cal.vt20_offset + 0.02) * 1000.0;
    let temp_c = afe3_temp_value / 1000.0;

    let raw = [
        (msg.sensor1_work, msg.sensor1_aux),
        (msg.sensor2_work, msg.sensor2_aux),
        (msg.sensor3_work, msg.sensor3_aux),
    ];

    let mut ppb = [0.0_f64; 3];
    for (i, ((work, aux), channel)) in raw.iter().zip(cal.channels.iter()).enumerate() {
        let channel_no = i as u8 + 1;

        let table = lookup::correction_table(&channel.sensor_type).ok_or_else(|| {
            TransformError::UnknownSensorType {
                channel: channel_no,
                sensor_type: channel.sensor_type.clone(),
            }
        })?;

        if channel.we_sensitivity == 0.0 || !channel.we_sensitivity.is_finite() {
            return Err(TransformError::InvalidSensitivity {
                channel: channel_no,
                value: channel.we_sensitivity,
            });
        }

        let work_mv =
            electrode_millivolts(*work, channel.we_electronic_zero, channel.we_zero_offset);
        let aux_mv = electrode_millivolts(*aux, channel.ae_electronic_zero, channel.ae_zero_offset)
            * table.factor_at(temp_c);

        ppb[i] = (work_mv - aux_mv) / channel.we_sensitivity;
    }

    Ok(SensorValues {
        afe3_temp_value,
        no2_ppb: ppb[0],
        // Channel 2 reports O3 + NO2 combined
        o3_ppb: ppb[1] - ppb[0],
        no_ppb: ppb[2],
    })
}

/// Derive calibrated values for `msg` in place.
///
/// On success the message carries the derived [`SensorValues`], and an empty
/// device id is filled from the calibration record. On failure the message
/// is left exactly as it was.
pub fn apply(msg: &mut Message, cal: &Cal) -> Result<(), TransformError> {
    let values = sensor_values(msg, cal)?;

    msg.sensor_values = Some(values);
    if msg.device_id.is_empty() {
        msg.device_id = cal.device_id.clone();
    }

    Ok(())
}
