use crate::datacells::DataCell;
use portable_atomic::{AtomicU8, Ordering};

/// Process-wide store for the vehicle's best current estimate.
///
/// Written by the aggregation task (directly from bus frames, or via the
/// estimator sink) and by the local flight-phase machine when one is
/// configured. Every other task only reads. Reads are atomic per scalar; no
/// snapshot across scalars is guaranteed.
pub struct VehicleEstimate {
    state: AtomicU8,
    filtered_altitude: DataCell<f32>,
    filtered_velocity: DataCell<f32>,
    calibration_offset: DataCell<f32>,
}

impl VehicleEstimate {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
            filtered_altitude: DataCell::new(0.0),
            filtered_velocity: DataCell::new(0.0),
            calibration_offset: DataCell::new(0.0),
        }
    }

    /// Filtered altitude above the calibrated ground reference, metres.
    pub fn altitude(&self) -> f32 {
        self.filtered_altitude.read() - self.calibration_offset.read()
    }

    /// Filtered vertical velocity, m/s, positive up.
    pub fn velocity(&self) -> f32 {
        self.filtered_velocity.read()
    }

    /// Current flight-phase byte.
    pub fn state(&self) -> u8 {
        self.state.load(Ordering::Relaxed)
    }

    /// Record the ground reference so `altitude` reads above-ground level.
    /// Called once during pad calibration.
    pub fn calibrate(&self, ground_altitude_m: f32) {
        self.calibration_offset.update(ground_altitude_m);
    }

    pub(crate) fn set_state(&self, code: u8) {
        self.state.store(code, Ordering::Relaxed);
    }

    pub(crate) fn set_filtered_altitude(&self, metres: f32) {
        self.filtered_altitude.update(metres);
    }

    pub(crate) fn set_filtered_velocity(&self, metres_per_sec: f32) {
        self.filtered_velocity.update(metres_per_sec);
    }
}

impl Default for VehicleEstimate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altitude_subtracts_calibration_offset() {
        let est = VehicleEstimate::new();
        est.set_filtered_altitude(455.0);
        est.calibrate(400.0);
        assert_eq!(est.altitude(), 55.0);
    }

    #[test]
    fn state_defaults_to_zero() {
        let est = VehicleEstimate::new();
        assert_eq!(est.state(), 0);
        est.set_state(3);
        assert_eq!(est.state(), 3);
    }
}
