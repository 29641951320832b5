//! Temperature-correction lookup tables for electrochemical gas sensors
//!
//! ## Background
//!
//! The auxiliary electrode of an Alphasense A4/B4 sensor tracks the work
//! electrode's zero-current drift, but the ratio between the two is itself
//! temperature dependent. Alphasense Application Note AAN 803 (Appendix 1)
//! publishes a per-sensor-type factor `n(T)` sampled at reference
//! temperatures from −30 °C to 50 °C in 10 °C steps; the compensated
//! concentration uses `work_mV − n(T) × aux_mV`.
//!
//! ## Table design
//!
//! The full AAN 803 table is included even though the deployed boards only
//! mount three of the sensor types, so that swapping a sensor never requires
//! a code change. Tables are immutable `const` data selected by the
//! free-text sensor type carried in the calibration record; an unknown type
//! is a lookup failure for the caller to handle, not an abort — calibration
//! data is externally supplied and can contain typos.
//!
//! Some types (the O3 series) have no published value at 50 °C, so curves
//! carry 8 or 9 points. Evaluation between points is linear; outside the
//! covered span the nearest edge value is used (extrapolation by clamp).

/// Reference temperatures for the correction curves, °C.
pub const LUT_TEMPERATURES: [f64; 9] = [
    -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0,
];

/// Piecewise-linear aux-electrode correction curve for one sensor type.
///
/// Invariant: `factors` is non-empty and no longer than
/// [`LUT_TEMPERATURES`]; entry `i` is the factor at `LUT_TEMPERATURES[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionTable {
    sensor_type: &'static str,
    factors: &'static [f64],
}

impl CorrectionTable {
    /// The sensor type this curve belongs to, e.g. `"NO2-A4"`.
    pub fn sensor_type(&self) -> &'static str {
        self.sensor_type
    }

    /// Correction factor at `temp_c` degrees Celsius.
    ///
    /// Linear interpolation between reference points; inputs outside the
    /// covered temperature span clamp to the nearest edge value.
    pub fn factor_at(&self, temp_c: f64) -> f64 {
        let temps = &LUT_TEMPERATURES[..self.factors.len()];
        let last = self.factors.len() - 1;

        if temp_c <= temps[0] {
            return self.factors[0];
        }
        if temp_c >= temps[last] {
            return self.factors[last];
        }

        // temps is ascending, so the segment containing temp_c exists
        let mut i = 0;
        while temps[i + 1] < temp_c {
            i += 1;
        }

        let frac = (temp_c - temps[i]) / (temps[i + 1] - temps[i]);
        self.factors[i] + (self.factors[i + 1] - self.factors[i]) * frac
    }
}

/// AAN 803 Appendix 1 correction factors, indexed by sensor type.
const TABLES: &[CorrectionTable] = &[
    CorrectionTable {
        sensor_type: "CO-A4",
        factors: &[1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -0.76, -0.76, -0.76],
    },
    CorrectionTable {
        sensor_type: "CO2-B4",
        factors: &[-1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -3.8, -3.8, -3.8],
    },
    CorrectionTable {
        sensor_type: "NO-A4",
        factors: &[1.48, 1.48, 1.48, 1.48, 1.48, 2.02, 1.72, 1.72, 1.72],
    },
    CorrectionTable {
        sensor_type: "NO-B4",
        factors: &[1.04, 1.04, 1.04, 1.04, 1.04, 1.82, 2.0, 2.0, 2.0],
    },
    CorrectionTable {
        sensor_type: "NO2-A4",
        factors: &[1.09, 1.09, 1.09, 1.09, 1.09, 1.35, 3.0, 3.0, 3.0],
    },
    CorrectionTable {
        sensor_type: "NO2-B4",
        factors: &[0.76, 0.76, 0.76, 0.76, 0.76, 0.68, 0.23, 0.23, 0.23],
    },
    CorrectionTable {
        sensor_type: "SO2-A4",
        factors: &[1.15, 1.15, 1.15, 1.15, 1.15, 1.82, 3.93, 3.93, 3.93],
    },
    CorrectionTable {
        sensor_type: "SO2-B4",
        factors: &[0.96, 0.96, 0.96, 0.96, 0.96, 1.34, 1.10, 1.10, 1.10],
    },
    // No published 50 °C value for the O3 series
    CorrectionTable {
        sensor_type: "O3-A4",
        factors: &[0.75, 0.75, 0.75, 0.75, 1.28, 1.28, 1.28, 1.28],
    },
    CorrectionTable {
        sensor_type: "O3-B4",
        factors: &[0.77, 0.77, 0.77, 0.77, 1.56, 1.56, 1.56, 2.85],
    },
];

/// Look up the correction curve for a sensor type.
///
/// Returns `None` for types without a published AAN 803 row.
pub fn correction_table(sensor_type: &str) -> Option<&'static CorrectionTable> {
    TABLES.iter().find(|t| t.sensor_type == sensor_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_reference_points() {
        let no2 = correction_table("NO2-A4").unwrap();
        assert_eq!(no2.factor_at(-30.0), 1.09);
        assert_eq!(no2.factor_at(20.0), 1.35);
        assert_eq!(no2.factor_at(30.0), 3.0);
    }

    #[test]
    fn interpolation_between_points() {
        let no2 = correction_table("NO2-A4").unwrap();
        // Halfway between 20 °C (1.35) and 30 °C (3.0)
        let mid = no2.factor_at(25.0);
        assert!((mid - 2.175).abs() < 1e-12);

        let no = correction_table("NO-A4").unwrap();
        // Quarter of the way between 10 °C (1.48) and 20 °C (2.02)
        let q = no.factor_at(12.5);
        assert!((q - (1.48 + 0.25 * (2.02 - 1.48))).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_table_domain() {
        let no2 = correction_table("NO2-A4").unwrap();
        assert_eq!(no2.factor_at(-60.0), 1.09);
        assert_eq!(no2.factor_at(80.0), 3.0);
    }

    #[test]
    fn short_tables_clamp_at_their_own_edge() {
        // O3-A4 ends at 40 °C; anything above uses the 40 °C value
        let o3 = correction_table("O3-A4").unwrap();
        assert_eq!(o3.factor_at(40.0), 1.28);
        assert_eq!(o3.factor_at(50.0), 1.28);
        assert_eq!(o3.factor_at(45.0), 1.28);
    }

    #[test]
    fn unknown_sensor_type_is_none() {
        assert!(correction_table("NO2-A42").is_none());
        assert!(correction_table("").is_none());
    }

    #[test]
    fn all_tables_fit_the_temperature_axis() {
        for table in TABLES {
            assert!(!table.factors.is_empty());
            assert!(table.factors.len() <= LUT_TEMPERATURES.len());
        }
    }
}
