use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;

use crate::estimate::VehicleEstimate;
use crate::records::TelemetryRecord;
use crate::wire::{DownlinkPacket, MAX_DOWNLINK_LEN};

/// Depth of the `radio_in` queue carrying completed records to the radio
/// task. Sized for roughly one sensor cycle of headroom per record class.
pub const RADIO_QUEUE_DEPTH: usize = 16;

/// The radio framer rejected a payload (transmit buffer unavailable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramerError;

/// External radio framing layer.
///
/// Owns the physical transmit path; the radio task only hands it fully
/// encoded payloads while holding the transmit-buffer guard.
pub trait RadioFramer {
    fn enqueue(&mut self, payload: &[u8]) -> Result<(), FramerError>;
}

/// Status-indicator events, consumed by the blinker task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedSignal {
    /// Downlink payload handed to the framer (green flash).
    TxOk,
    /// Framer rejected the payload (red flash).
    TxFail,
    /// Inbound radio traffic (blue flash). Reserved: the downlink-only
    /// build never emits it.
    RxActivity,
}

/// Radio task body: drain `radio_in`, stamp each record with the current
/// estimate, and push it through the framer under the transmit-buffer guard.
///
/// The guard is taken with an infinite wait and released before the next
/// queue receive; acquire-send-release never leaves this task. Framer
/// rejections are terminal for the packet — backpressure is handled one
/// stage earlier, at the queue — and only surface on the status LED.
pub async fn downlink_task<M, F, const LED_N: usize>(
    radio_in: Receiver<'_, M, TelemetryRecord, RADIO_QUEUE_DEPTH>,
    radio_tx_buf: &Mutex<M, ()>,
    estimate: &VehicleEstimate,
    mut framer: F,
    led: Sender<'_, M, LedSignal, LED_N>,
) -> !
where
    M: RawMutex,
    F: RadioFramer,
{
    let mut buf = [0u8; MAX_DOWNLINK_LEN];
    loop {
        let record = radio_in.receive().await;
        let packet = assemble(record, estimate);
        let signal = match packet.encode(&mut buf) {
            Ok(payload) => {
                let _guard = radio_tx_buf.lock().await;
                match framer.enqueue(payload) {
                    Ok(()) => LedSignal::TxOk,
                    Err(FramerError) => LedSignal::TxFail,
                }
            }
            // A record that cannot encode into the fixed buffer is dropped;
            // nothing downstream could transmit it either.
            Err(_) => LedSignal::TxFail,
        };
        let _ = led.try_send(signal);
    }
}

/// Stamp a completed record with the vehicle's current best estimate.
pub fn assemble(record: TelemetryRecord, estimate: &VehicleEstimate) -> DownlinkPacket {
    DownlinkPacket {
        tickstamp: Instant::now().as_ticks(),
        record,
        altitude_m: estimate.altitude(),
        velocity_ms: estimate.velocity(),
        phase: estimate.state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BarometricRecord, TelemetryRecord};

    #[test]
    fn assemble_snapshots_the_estimate() {
        let est = VehicleEstimate::new();
        est.set_filtered_altitude(850.0);
        est.set_filtered_velocity(-20.0);
        est.set_state(5);

        let packet = assemble(
            TelemetryRecord::Barometric(BarometricRecord::new()),
            &est,
        );
        assert_eq!(packet.altitude_m, 850.0);
        assert_eq!(packet.velocity_ms, -20.0);
        assert_eq!(packet.phase, 5);
    }
}
