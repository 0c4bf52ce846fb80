use serde::{Deserialize, Serialize};

/// Value written into the positional floats once a fix has been consumed.
///
/// The original firmware stored the all-ones integer pattern into the float
/// fields, which the compiler converts to 4294967295.0; sinks treat anything
/// in that region as "no fix yet".
pub const POSITION_SENTINEL: f32 = u32::MAX as f32;

/// Three-axis inertial sample, one producer commit cycle.
///
/// All six components belong to the same cycle; completion is signalled by
/// the Z-acceleration frame, the last scalar the sensor board emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InertialRecord {
    /// Bus tick of the commit frame.
    pub tickstamp: u64,
    /// Body-frame acceleration, g.
    pub accel_g: [f32; 3],
    /// Body-frame angular rate, milli-rps.
    pub gyro_mrps: [f32; 3],
}

impl InertialRecord {
    pub const fn new() -> Self {
        Self {
            tickstamp: 0,
            accel_g: [0.0; 3],
            gyro_mrps: [0.0; 3],
        }
    }
}

/// Barometric sample; altitude is recomputed from pressure at every commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BarometricRecord {
    /// Bus tick of the commit frame.
    pub tickstamp: u64,
    /// Static pressure, hPa.
    pub pressure_hpa: f32,
    /// Sensor temperature, degrees Celsius.
    pub temperature_c: f32,
    /// ISA altitude derived from pressure, metres.
    pub altitude_m: f32,
}

impl BarometricRecord {
    pub const fn new() -> Self {
        Self {
            tickstamp: 0,
            pressure_hpa: 0.0,
            temperature_c: 0.0,
            altitude_m: 0.0,
        }
    }
}

/// GNSS sample; committed when the satellite count arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionalRecord {
    /// Bus tick of the commit frame.
    pub tickstamp: u64,
    /// Horizontal dilution of precision, metres.
    pub hdop_m: f32,
    /// Latitude, degrees.
    pub lat_deg: f32,
    /// Longitude, degrees.
    pub lon_deg: f32,
    /// GNSS altitude, whole metres.
    pub altitude_m: i32,
    /// Tracked satellite count.
    pub sats: u8,
}

impl PositionalRecord {
    pub const fn new() -> Self {
        Self {
            tickstamp: 0,
            hdop_m: 0.0,
            lat_deg: 0.0,
            lon_deg: 0.0,
            altitude_m: 0,
            sats: 0,
        }
    }

    /// Reset the measurement fields after a sink consumed the fix.
    ///
    /// Only called on successful dispatch; a rejected record keeps its data
    /// so the next cycle can overwrite or retry it.
    pub fn reset(&mut self) {
        self.hdop_m = POSITION_SENTINEL;
        self.lat_deg = POSITION_SENTINEL;
        self.lon_deg = POSITION_SENTINEL;
        self.altitude_m = 0;
        self.sats = 0;
    }
}

/// A completed record travelling to the radio task.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryRecord {
    Inertial(InertialRecord),
    Barometric(BarometricRecord),
    Positional(PositionalRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_reset_applies_sentinels() {
        let mut rec = PositionalRecord {
            tickstamp: 42,
            hdop_m: 1.5,
            lat_deg: 46.5,
            lon_deg: 6.6,
            altitude_m: 455,
            sats: 9,
        };
        rec.reset();
        assert_eq!(rec.hdop_m, POSITION_SENTINEL);
        assert_eq!(rec.lat_deg, POSITION_SENTINEL);
        assert_eq!(rec.lon_deg, POSITION_SENTINEL);
        assert_eq!(rec.altitude_m, 0);
        assert_eq!(rec.sats, 0);
        // The cycle stamp is bookkeeping, not measurement data.
        assert_eq!(rec.tickstamp, 42);
    }
}
