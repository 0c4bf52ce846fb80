use embassy_stm32::can::bxcan::Id;
use embassy_stm32::can::Can;
use embassy_stm32::peripherals::CAN1;
use embassy_time::Instant;

use skylark_core::{BusFrame, FrameSource};

/// Byte offset of the measurement tag inside the CAN data field. Producers
/// pack the little-endian payload first, then the tag byte.
const TAG_OFFSET: usize = 4;
/// Minimum data length for a well-formed measurement frame.
const MIN_DLC: usize = 5;

/// Drains the bxCAN receive FIFO into the aggregation engine.
///
/// The peripheral's interrupt handler feeds the FIFO; this adapter only ever
/// polls it, so the aggregation task never blocks on the bus. Malformed
/// frames (short DLC, remote frames) are skipped here and never reach the
/// reassembler.
pub struct CanFrameSource<'d> {
    can: Can<'d, CAN1>,
    staged: Option<BusFrame>,
}

impl<'d> CanFrameSource<'d> {
    pub fn new(can: Can<'d, CAN1>) -> Self {
        Self { can, staged: None }
    }
}

impl<'d> FrameSource for CanFrameSource<'d> {
    fn pending(&mut self) -> bool {
        while self.staged.is_none() {
            match self.can.try_read() {
                Ok(envelope) => self.staged = decode(&envelope.frame),
                Err(_) => break,
            }
        }
        self.staged.is_some()
    }

    fn pop(&mut self) -> BusFrame {
        self.staged.take().unwrap_or_default()
    }
}

fn decode(frame: &embassy_stm32::can::bxcan::Frame) -> Option<BusFrame> {
    let data = frame.data()?;
    if data.len() < MIN_DLC {
        return None;
    }
    let id_bus = match frame.id() {
        Id::Standard(id) => id.as_raw() as u32,
        Id::Extended(id) => id.as_raw(),
    };
    let payload = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    Some(BusFrame {
        id_bus,
        timestamp: Instant::now().as_ticks() as u32,
        tag: data[TAG_OFFSET],
        payload,
    })
}
