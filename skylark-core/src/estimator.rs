use crate::records::{BarometricRecord, InertialRecord, PositionalRecord};

/// Downstream state estimator, fed one completed record at a time.
///
/// The estimator itself lives outside the aggregation core; this is the seam
/// the estimator sink talks through. `feed_*` returns false when the sample
/// was not absorbed, in which case the caller retries on its next pass.
pub trait Estimator {
    fn feed_inertial(&mut self, record: &InertialRecord) -> bool;
    fn feed_barometric(&mut self, record: &BarometricRecord) -> bool;
    fn feed_positional(&mut self, record: &PositionalRecord) -> bool;

    /// Current altitude estimate, metres MSL.
    fn altitude(&self) -> f32;
    /// Current vertical velocity estimate, m/s.
    fn velocity(&self) -> f32;
}

/// Bus tick rate of the frame timestamps, Hz.
const BUS_TICK_HZ: f32 = 1000.0;

/// Constant-velocity vertical filter over barometric / GNSS altitude.
///
/// Reference estimator for the estimator sink mode and the SITL harness.
/// Inertial samples are accepted but not used; altitude measurements drive
/// both the altitude and velocity states.
pub struct VerticalKalman {
    z: f32,
    v: f32,
    p_zz: f32,
    p_vv: f32,
    p_zv: f32,
    r_alt: f32,
    q_accel: f32,
    last_tickstamp: Option<u64>,
}

impl VerticalKalman {
    pub fn new(initial_alt: f32) -> Self {
        Self {
            z: initial_alt,
            v: 0.0,
            p_zz: 1.0,
            p_vv: 1.0,
            p_zv: 0.0,
            r_alt: 2.0,
            q_accel: 0.1,
            last_tickstamp: None,
        }
    }

    fn step(&mut self, tickstamp: u64, measured_z: f32) {
        let dt = match self.last_tickstamp {
            Some(last) if tickstamp > last => (tickstamp - last) as f32 / BUS_TICK_HZ,
            _ => 0.01,
        };
        self.last_tickstamp = Some(tickstamp);

        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;

        self.z += self.v * dt;
        self.p_zz += dt * (2.0 * self.p_zv + dt * self.p_vv) + 0.25 * dt4 * self.q_accel;
        self.p_zv += dt * self.p_vv + 0.5 * dt3 * self.q_accel;
        self.p_vv += dt2 * self.q_accel;

        let innovation = measured_z - self.z;
        let s = self.p_zz + self.r_alt;
        let k_z = self.p_zz / s;
        let k_v = self.p_zv / s;

        self.z += k_z * innovation;
        self.v += k_v * innovation;

        self.p_zz -= k_z * self.p_zz;
        self.p_zv -= k_z * self.p_zv;
        self.p_vv -= k_v * self.p_zv;
    }
}

impl Estimator for VerticalKalman {
    fn feed_inertial(&mut self, _record: &InertialRecord) -> bool {
        // The vertical filter has no acceleration input; the sample is
        // considered absorbed so the aggregator clears its flag.
        true
    }

    fn feed_barometric(&mut self, record: &BarometricRecord) -> bool {
        self.step(record.tickstamp, record.altitude_m);
        true
    }

    fn feed_positional(&mut self, record: &PositionalRecord) -> bool {
        self.step(record.tickstamp, record.altitude_m as f32);
        true
    }

    fn altitude(&self) -> f32 {
        self.z
    }

    fn velocity(&self) -> f32 {
        self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baro_at(tickstamp: u64, altitude_m: f32) -> BarometricRecord {
        BarometricRecord {
            tickstamp,
            pressure_hpa: 1000.0,
            temperature_c: 15.0,
            altitude_m,
        }
    }

    #[test]
    fn converges_to_static_altitude() {
        let mut kf = VerticalKalman::new(0.0);
        for i in 1..2000u64 {
            kf.feed_barometric(&baro_at(i * 10, 120.0));
        }
        assert!((kf.altitude() - 120.0).abs() < 1.0);
        assert!(kf.velocity().abs() < 0.5);
    }

    #[test]
    fn tracks_constant_climb() {
        let mut kf = VerticalKalman::new(0.0);
        // 50 m/s climb sampled at 100 Hz.
        for i in 1..1500u64 {
            let t_s = i as f32 * 0.01;
            kf.feed_barometric(&baro_at(i * 10, 50.0 * t_s));
        }
        assert!((kf.velocity() - 50.0).abs() < 5.0);
    }
}
