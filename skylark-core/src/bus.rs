use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;

/// One scalar measurement as delivered by the bus peripheral.
///
/// Created by the receive path, consumed exactly once by the aggregation
/// task, never mutated in between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFrame {
    /// Raw bus arbitration identifier. Opaque to the aggregator.
    pub id_bus: u32,
    /// Kernel tick count at reception.
    pub timestamp: u32,
    /// Measurement kind, see [`MeasurementTag`].
    pub tag: u8,
    /// Raw payload. Every producer on this bus transmits signed integers,
    /// so conversions reinterpret this as `i32`.
    pub payload: u32,
}

impl BusFrame {
    pub const fn new(id_bus: u32, timestamp: u32, tag: MeasurementTag, payload: u32) -> Self {
        Self {
            id_bus,
            timestamp,
            tag: tag as u8,
            payload,
        }
    }

    /// The payload in its transport representation.
    pub fn payload_i32(&self) -> i32 {
        self.payload as i32
    }
}

/// Closed set of measurement kinds carried on the sensor bus.
///
/// The discriminants are the wire tag values and are stable; remote producers
/// may ship newer tags, which the aggregator drops without comment.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementTag {
    /// Barometric pressure, centi-Pascal.
    Pressure = 0,
    /// Board temperature, degrees Celsius.
    Temperature = 1,
    /// Body-frame acceleration, milli-g.
    AccelX = 2,
    AccelY = 3,
    AccelZ = 4,
    /// Body-frame angular rate, milli-rps.
    GyroX = 5,
    GyroY = 6,
    GyroZ = 7,
    /// Horizontal dilution of precision, millimetres.
    GpsHdop = 8,
    /// Latitude / longitude, micro-degrees.
    GpsLat = 9,
    GpsLong = 10,
    /// GNSS altitude, centimetres.
    GpsAlt = 11,
    /// Tracked satellite count.
    GpsSats = 12,
    /// Flight-phase byte broadcast by the avionics master.
    State = 13,
    /// Filtered altitude estimate, millimetres.
    KalmanZ = 14,
    /// Filtered vertical velocity estimate, millimetres per second.
    KalmanVz = 15,
}

impl MeasurementTag {
    /// Decode a wire tag. Unknown values are not an error; callers skip them.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Pressure,
            1 => Self::Temperature,
            2 => Self::AccelX,
            3 => Self::AccelY,
            4 => Self::AccelZ,
            5 => Self::GyroX,
            6 => Self::GyroY,
            7 => Self::GyroZ,
            8 => Self::GpsHdop,
            9 => Self::GpsLat,
            10 => Self::GpsLong,
            11 => Self::GpsAlt,
            12 => Self::GpsSats,
            13 => Self::State,
            14 => Self::KalmanZ,
            15 => Self::KalmanVz,
            _ => return None,
        })
    }
}

/// Non-blocking view of the hardware frame queue.
///
/// `pop` may only be called after `pending` returned true. A violating caller
/// gets a zeroed frame back rather than blocking or reading uninitialised
/// memory, so the aggregation loop stays total either way.
pub trait FrameSource {
    /// Cheap check for queued frames. No side effects beyond staging.
    fn pending(&mut self) -> bool;
    /// Take the oldest queued frame.
    fn pop(&mut self) -> BusFrame;
}

/// Adapts an embassy channel receiver to the [`FrameSource`] contract.
///
/// The receive interrupt owns the sender half; this wrapper stages at most
/// one frame so `pending` stays side-effect free from the caller's view.
pub struct QueueFrameSource<'ch, M: RawMutex, const N: usize> {
    rx: Receiver<'ch, M, BusFrame, N>,
    staged: Option<BusFrame>,
}

impl<'ch, M: RawMutex, const N: usize> QueueFrameSource<'ch, M, N> {
    pub fn new(rx: Receiver<'ch, M, BusFrame, N>) -> Self {
        Self { rx, staged: None }
    }
}

impl<'ch, M: RawMutex, const N: usize> FrameSource for QueueFrameSource<'ch, M, N> {
    fn pending(&mut self) -> bool {
        if self.staged.is_none() {
            self.staged = self.rx.try_receive().ok();
        }
        self.staged.is_some()
    }

    fn pop(&mut self) -> BusFrame {
        self.staged.take().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;

    #[test]
    fn tag_round_trip_is_closed() {
        for raw in 0u8..=15 {
            let tag = MeasurementTag::from_raw(raw).unwrap();
            assert_eq!(tag as u8, raw);
        }
        assert!(MeasurementTag::from_raw(16).is_none());
        assert!(MeasurementTag::from_raw(0xEE).is_none());
    }

    #[test]
    fn payload_reinterpreted_as_signed() {
        let frame = BusFrame::new(0x100, 0, MeasurementTag::AccelX, (-2000i32) as u32);
        assert_eq!(frame.payload_i32(), -2000);
    }

    #[test]
    fn queue_source_drains_in_order() {
        let chan: Channel<CriticalSectionRawMutex, BusFrame, 8> = Channel::new();
        for i in 0..3u32 {
            chan.try_send(BusFrame::new(i, i, MeasurementTag::Pressure, i))
                .unwrap();
        }
        let mut source = QueueFrameSource::new(chan.receiver());
        let mut seen = 0;
        while source.pending() {
            assert_eq!(source.pop().id_bus, seen);
            seen += 1;
        }
        assert_eq!(seen, 3);
    }

    #[test]
    fn pop_without_pending_returns_zeroed_frame() {
        let chan: Channel<CriticalSectionRawMutex, BusFrame, 8> = Channel::new();
        let mut source = QueueFrameSource::new(chan.receiver());
        assert_eq!(source.pop(), BusFrame::default());
    }
}
