use crate::estimate::VehicleEstimate;

/// Altitude gain (m) required before descent-side triggers arm.
/// Prevents a noisy pad sitting just above ground from firing anything.
pub const MIN_SAFETY_ALTITUDE_M: f32 = 5.0;

/// Vertical velocity (m/s) that counts as a launch indication.
pub const LAUNCH_VELOCITY_THRESHOLD_MS: f32 = 1.0;

/// Vertical acceleration (g) that counts as a launch indication.
pub const LAUNCH_ACCEL_THRESHOLD_G: f32 = 2.0;

/// Altitude drop below peak (m) that counts towards apogee detection.
pub const APOGEE_DROP_M: f32 = 3.0;

/// Flight phase byte as carried in the vehicle state snapshot.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlightPhase {
    /// Waiting for a stable ground reference.
    Calibration = 0,
    /// On the pad, armed for launch detection.
    Pad = 1,
    /// Motor burning.
    Boost = 2,
    /// Motor out, still ascending on momentum.
    Coast = 3,
    /// Peak reached.
    Apogee = 4,
    /// Under parachute.
    Descent = 5,
    /// Back on the ground.
    Touchdown = 6,
}

impl FlightPhase {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Locally hosted flight phase machine.
///
/// Only active in builds that own the state byte themselves (in which case
/// incoming state frames are suppressed at the reassembler). Transitions are
/// debounced against single bad samples; inputs are the published filtered
/// altitude / velocity plus an optional vertical acceleration.
pub struct FlightPhaseMachine {
    pub phase: FlightPhase,
    pub ground_level_m: Option<f32>,
    pub max_altitude_m: f32,
    pub safety_armed: bool,
    launch_count: u8,
    burnout_count: u8,
    apogee_count: u8,
    last_velocity_ms: f32,
}

impl FlightPhaseMachine {
    pub const fn new() -> Self {
        Self {
            phase: FlightPhase::Calibration,
            ground_level_m: None,
            max_altitude_m: 0.0,
            safety_armed: false,
            launch_count: 0,
            burnout_count: 0,
            apogee_count: 0,
            last_velocity_ms: 0.0,
        }
    }

    /// Fix the ground reference and move to the pad.
    pub fn set_ground_reference(&mut self, altitude_m: f32) {
        self.ground_level_m = Some(altitude_m);
        self.phase = FlightPhase::Pad;
    }

    /// Advance the machine one step from the published estimate and push the
    /// resulting phase byte back into it.
    pub fn advance(&mut self, estimate: &VehicleEstimate, accel_z_g: f32) -> FlightPhase {
        let phase = self.update(estimate.altitude(), estimate.velocity(), accel_z_g);
        estimate.set_state(phase.code());
        phase
    }

    /// Transition logic on one sample. `altitude_m` is above ground once the
    /// reference is set; `accel_z_g` may be zero when no inertial source is
    /// wired locally, leaving the velocity trigger in charge.
    pub fn update(&mut self, altitude_m: f32, velocity_ms: f32, accel_z_g: f32) -> FlightPhase {
        if altitude_m > self.max_altitude_m {
            self.max_altitude_m = altitude_m;
        }

        if !self.safety_armed && self.ground_level_m.is_some() && altitude_m > MIN_SAFETY_ALTITUDE_M
        {
            self.safety_armed = true;
        }

        match self.phase {
            FlightPhase::Calibration => {}
            FlightPhase::Pad => {
                let velocity_trigger = velocity_ms > LAUNCH_VELOCITY_THRESHOLD_MS;
                let accel_trigger = accel_z_g > LAUNCH_ACCEL_THRESHOLD_G;
                if velocity_trigger || accel_trigger {
                    self.launch_count += 1;
                    if self.launch_count > 1 {
                        self.phase = FlightPhase::Boost;
                    }
                } else {
                    self.launch_count = 0;
                }
            }
            FlightPhase::Boost => {
                let velocity_drop = velocity_ms < self.last_velocity_ms - 0.1;
                let low_accel = accel_z_g < 0.5;
                if velocity_drop || low_accel {
                    self.burnout_count += 1;
                    if self.burnout_count > 10 {
                        self.phase = FlightPhase::Coast;
                    }
                } else {
                    self.burnout_count = 0;
                }
            }
            FlightPhase::Coast => {
                if self.safety_armed {
                    if altitude_m < self.max_altitude_m - APOGEE_DROP_M {
                        self.apogee_count += 1;
                        if self.apogee_count > 10 {
                            self.phase = FlightPhase::Apogee;
                        }
                    } else if altitude_m >= self.max_altitude_m {
                        self.apogee_count = 0;
                    }
                }
            }
            FlightPhase::Apogee => {
                self.phase = FlightPhase::Descent;
            }
            _ => {}
        }

        self.last_velocity_ms = velocity_ms;
        self.phase
    }
}

impl Default for FlightPhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
