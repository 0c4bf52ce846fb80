use crate::bus::{BusFrame, MeasurementTag};
use crate::convert;
use crate::estimate::VehicleEstimate;
use crate::records::{BarometricRecord, InertialRecord, PositionalRecord};

/// Rebuilds per-sensor records out of individually tagged scalar frames.
///
/// Scalars for one logical record arrive interleaved with frames for other
/// records; each is written into its slot as it arrives, and the partial
/// record is marked complete when its commit tag shows up. Commit tags are
/// the last scalar each sensor board emits in one sample period:
/// Z-acceleration (inertial), temperature (barometric), satellite count
/// (positional).
///
/// Fragments arriving out of order within a cycle still commit; slots left
/// over from the previous cycle are knowingly re-dispatched. The recorder
/// keeps the raw stream for post-flight reconstruction, so this loss of
/// fidelity is accepted rather than detected.
pub struct Reassembler {
    inertial: InertialRecord,
    barometric: BarometricRecord,
    positional: PositionalRecord,
    inertial_ready: bool,
    barometric_ready: bool,
    positional_ready: bool,
    own_state_machine: bool,
}

impl Reassembler {
    /// `own_state_machine` suppresses incoming flight-phase frames; the
    /// locally hosted phase machine owns the state byte instead.
    pub fn new(own_state_machine: bool) -> Self {
        let mut barometric = BarometricRecord::new();
        // Sensible default until the first temperature frame lands.
        barometric.temperature_c = 20.0;
        Self {
            inertial: InertialRecord::new(),
            barometric,
            positional: PositionalRecord::new(),
            inertial_ready: false,
            barometric_ready: false,
            positional_ready: false,
            own_state_machine,
        }
    }

    /// Consume one frame: store the scalar, flag completion on commit tags,
    /// and route estimate/state scalars straight to the publisher.
    pub fn ingest(&mut self, frame: BusFrame, estimate: &VehicleEstimate) {
        let Some(tag) = MeasurementTag::from_raw(frame.tag) else {
            // Unknown producers are allowed on the bus; skip silently.
            return;
        };
        let raw = frame.payload_i32();

        match tag {
            MeasurementTag::Pressure => {
                self.barometric.pressure_hpa = convert::pressure_hpa(raw);
            }
            MeasurementTag::Temperature => {
                self.barometric.temperature_c = convert::temperature_c(raw);
                self.barometric.tickstamp = frame.timestamp as u64;
                self.barometric_ready = true;
            }
            MeasurementTag::AccelX => {
                self.inertial.accel_g[0] = convert::accel_g(raw);
            }
            MeasurementTag::AccelY => {
                self.inertial.accel_g[1] = convert::accel_g(raw);
            }
            MeasurementTag::AccelZ => {
                self.inertial.accel_g[2] = convert::accel_g(raw);
                self.inertial.tickstamp = frame.timestamp as u64;
                self.inertial_ready = true;
            }
            MeasurementTag::GyroX => {
                self.inertial.gyro_mrps[0] = convert::gyro_mrps(raw);
            }
            MeasurementTag::GyroY => {
                self.inertial.gyro_mrps[1] = convert::gyro_mrps(raw);
            }
            MeasurementTag::GyroZ => {
                self.inertial.gyro_mrps[2] = convert::gyro_mrps(raw);
            }
            MeasurementTag::GpsHdop => {
                self.positional.hdop_m = convert::hdop_m(raw);
            }
            MeasurementTag::GpsLat => {
                self.positional.lat_deg = convert::coordinate_deg(raw);
            }
            MeasurementTag::GpsLong => {
                self.positional.lon_deg = convert::coordinate_deg(raw);
            }
            MeasurementTag::GpsAlt => {
                self.positional.altitude_m = convert::gnss_altitude_m(raw);
            }
            MeasurementTag::GpsSats => {
                self.positional.sats = raw as u8;
                self.positional.tickstamp = frame.timestamp as u64;
                self.positional_ready = true;
            }
            MeasurementTag::State => {
                if !self.own_state_machine {
                    estimate.set_state(raw as u8);
                }
            }
            MeasurementTag::KalmanZ => {
                estimate.set_filtered_altitude(convert::estimate_m(raw));
            }
            MeasurementTag::KalmanVz => {
                estimate.set_filtered_velocity(convert::estimate_m(raw));
            }
        }
    }

    pub fn inertial_ready(&self) -> bool {
        self.inertial_ready
    }

    pub fn barometric_ready(&self) -> bool {
        self.barometric_ready
    }

    pub fn positional_ready(&self) -> bool {
        self.positional_ready
    }

    /// Copy of the current inertial partial record.
    pub fn inertial(&self) -> InertialRecord {
        self.inertial
    }

    pub fn barometric(&self) -> BarometricRecord {
        self.barometric
    }

    pub fn positional(&self) -> PositionalRecord {
        self.positional
    }

    /// Settle an inertial dispatch. Accepted records clear the completion
    /// flag; rejected ones stay flagged so the next pass retries.
    pub fn settle_inertial(&mut self, accepted: bool) {
        if accepted {
            self.inertial_ready = false;
        }
    }

    /// Settle a barometric dispatch; same retry contract as inertial.
    /// Components are rewritten every cycle, so the slots are not cleared.
    pub fn settle_barometric(&mut self, accepted: bool) {
        if accepted {
            self.barometric_ready = false;
        }
    }

    /// Settle a positional dispatch. Acceptance additionally resets the
    /// partial record to its sentinel values so a consumer can tell a fresh
    /// fix from a stale one.
    pub fn settle_positional(&mut self, accepted: bool) {
        if accepted {
            self.positional.reset();
            self.positional_ready = false;
        }
    }
}

#[cfg(test)]
mod tests;
