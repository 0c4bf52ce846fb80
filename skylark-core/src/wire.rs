use serde::{Deserialize, Serialize};

use crate::records::TelemetryRecord;

/// Encoded size ceiling for one downlink packet.
pub const MAX_DOWNLINK_LEN: usize = 96;

/// Packet transmitted from the vehicle to the ground station.
///
/// Both ends must use the same definition — postcard serialization is not
/// self-describing, so field order and types have to match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownlinkPacket {
    /// Kernel tick at packet assembly.
    pub tickstamp: u64,
    /// The completed record that triggered this packet.
    pub record: TelemetryRecord,
    /// Filtered altitude above ground at assembly time, metres.
    pub altitude_m: f32,
    /// Filtered vertical velocity at assembly time, m/s.
    pub velocity_ms: f32,
    /// Current flight-phase byte.
    pub phase: u8,
}

impl DownlinkPacket {
    pub fn encode<'buf>(&self, buf: &'buf mut [u8]) -> Result<&'buf [u8], postcard::Error> {
        let used = postcard::to_slice(self, buf)?;
        Ok(used)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InertialRecord;

    #[test]
    fn packet_survives_the_wire() {
        let packet = DownlinkPacket {
            tickstamp: 123_456,
            record: TelemetryRecord::Inertial(InertialRecord {
                tickstamp: 123_400,
                accel_g: [0.1, 0.2, 9.8],
                gyro_mrps: [1.0, 2.0, 3.0],
            }),
            altitude_m: 1523.5,
            velocity_ms: -12.25,
            phase: 5,
        };

        let mut buf = [0u8; MAX_DOWNLINK_LEN];
        let encoded = packet.encode(&mut buf).unwrap();
        assert!(encoded.len() <= MAX_DOWNLINK_LEN);
        assert_eq!(DownlinkPacket::decode(encoded).unwrap(), packet);
    }
}
