use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;

use crate::estimate::VehicleEstimate;
use crate::estimator::Estimator;
use crate::radio::RADIO_QUEUE_DEPTH;
use crate::records::{BarometricRecord, InertialRecord, PositionalRecord, TelemetryRecord};
use crate::ring::{SampleRing, BARO_RING_DEPTH, INERTIAL_RING_DEPTH};

/// Latitude magnitude above which a positional fix is considered pre-fix
/// garbage and rejected by the estimator sink.
pub const LATITUDE_SANITY_DEG: f32 = 1000.0;

/// Downstream consumer of completed records.
///
/// Exactly one variant is wired up at init. The return value is the
/// backpressure signal: `false` means the record was not absorbed and the
/// reassembler keeps it flagged for the next pass.
pub trait RecordSink {
    fn accept_inertial(&mut self, record: InertialRecord) -> bool;
    fn accept_barometric(&mut self, record: BarometricRecord) -> bool;
    fn accept_positional(&mut self, record: PositionalRecord) -> bool;
}

/// Routes completed records onto the radio queue.
///
/// `try_send` is the only interaction; a full queue answers the
/// backpressure contract without blocking the aggregation task.
pub struct TelemetrySink<'ch, M: RawMutex> {
    queue: Sender<'ch, M, TelemetryRecord, RADIO_QUEUE_DEPTH>,
}

impl<'ch, M: RawMutex> TelemetrySink<'ch, M> {
    pub fn new(queue: Sender<'ch, M, TelemetryRecord, RADIO_QUEUE_DEPTH>) -> Self {
        Self { queue }
    }
}

impl<'ch, M: RawMutex> RecordSink for TelemetrySink<'ch, M> {
    fn accept_inertial(&mut self, record: InertialRecord) -> bool {
        self.queue.try_send(TelemetryRecord::Inertial(record)).is_ok()
    }

    fn accept_barometric(&mut self, record: BarometricRecord) -> bool {
        self.queue
            .try_send(TelemetryRecord::Barometric(record))
            .is_ok()
    }

    fn accept_positional(&mut self, record: PositionalRecord) -> bool {
        self.queue
            .try_send(TelemetryRecord::Positional(record))
            .is_ok()
    }
}

/// Feeds completed records into the on-board estimator and republishes its
/// filtered altitude / velocity.
pub struct EstimatorSink<'a, E: Estimator> {
    estimator: E,
    estimate: &'a VehicleEstimate,
}

impl<'a, E: Estimator> EstimatorSink<'a, E> {
    pub fn new(estimator: E, estimate: &'a VehicleEstimate) -> Self {
        Self {
            estimator,
            estimate,
        }
    }

    fn republish(&self) {
        self.estimate
            .set_filtered_altitude(self.estimator.altitude());
        self.estimate
            .set_filtered_velocity(self.estimator.velocity());
    }
}

impl<'a, E: Estimator> RecordSink for EstimatorSink<'a, E> {
    fn accept_inertial(&mut self, record: InertialRecord) -> bool {
        let absorbed = self.estimator.feed_inertial(&record);
        if absorbed {
            self.republish();
        }
        absorbed
    }

    fn accept_barometric(&mut self, record: BarometricRecord) -> bool {
        let absorbed = self.estimator.feed_barometric(&record);
        if absorbed {
            self.republish();
        }
        absorbed
    }

    fn accept_positional(&mut self, record: PositionalRecord) -> bool {
        // Receivers without a fix emit wildly out-of-range coordinates;
        // feeding those to the filter would poison the state.
        if libm::fabsf(record.lat_deg) >= LATITUDE_SANITY_DEG {
            return false;
        }
        let absorbed = self.estimator.feed_positional(&record);
        if absorbed {
            self.republish();
        }
        absorbed
    }
}

/// Fallback sink: overwrite rings readable by any task.
pub struct BufferSink<'a> {
    inertial_ring: &'a SampleRing<InertialRecord, INERTIAL_RING_DEPTH>,
    barometric_ring: &'a SampleRing<BarometricRecord, BARO_RING_DEPTH>,
}

impl<'a> BufferSink<'a> {
    pub fn new(
        inertial_ring: &'a SampleRing<InertialRecord, INERTIAL_RING_DEPTH>,
        barometric_ring: &'a SampleRing<BarometricRecord, BARO_RING_DEPTH>,
    ) -> Self {
        Self {
            inertial_ring,
            barometric_ring,
        }
    }
}

impl<'a> RecordSink for BufferSink<'a> {
    fn accept_inertial(&mut self, record: InertialRecord) -> bool {
        self.inertial_ring.push(record);
        true
    }

    fn accept_barometric(&mut self, record: BarometricRecord) -> bool {
        self.barometric_ring.push(record);
        // Long-standing quirk inherited from the flight-proven firmware: the
        // buffered barometric path stores the record but reports it as not
        // accepted, so the reassembler re-commits it on the next cycle. Kept
        // deliberately; see DESIGN.md before "fixing".
        false
    }

    fn accept_positional(&mut self, _record: PositionalRecord) -> bool {
        // No positional ring exists; the fix is retained upstream.
        false
    }
}
