use embassy_time::{Duration, Timer};

use crate::bus::FrameSource;
use crate::convert;
use crate::estimate::VehicleEstimate;
use crate::reassembler::Reassembler;
use crate::recorder::{BlockWriter, FrameRecorder};
use crate::records::{BarometricRecord, InertialRecord};
use crate::ring::{SampleRing, BARO_RING_DEPTH, INERTIAL_RING_DEPTH};
use crate::sink::RecordSink;

/// Startup delay before the first pass, letting peer tasks come up.
pub const STARTUP_GRACE: Duration = Duration::from_millis(500);
/// Sleep between aggregation passes.
pub const PASS_PERIOD: Duration = Duration::from_millis(10);

/// Single-owner home of the cross-task aggregation state.
///
/// Built once at init and handed to the aggregation task; other tasks obtain
/// scalar accessors against it. Keeping the rings and the publisher together
/// here (rather than as free statics) makes the single-writer rule visible
/// in the signatures.
pub struct AggregationContext {
    pub estimate: VehicleEstimate,
    pub inertial_ring: SampleRing<InertialRecord, INERTIAL_RING_DEPTH>,
    pub barometric_ring: SampleRing<BarometricRecord, BARO_RING_DEPTH>,
}

impl AggregationContext {
    pub fn new() -> Self {
        Self {
            estimate: VehicleEstimate::new(),
            inertial_ring: SampleRing::new(),
            barometric_ring: SampleRing::new(),
        }
    }
}

impl Default for AggregationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The aggregation engine: drains the frame queue, reassembles records, and
/// dispatches completed ones to the configured sink.
///
/// The engine never blocks on a sink — every sink interaction is a
/// non-blocking call answering `accepted` — and never raises an error
/// upward; rejected records simply stay flagged and retry next pass.
pub struct Aggregator<'ctx, S: RecordSink, W: BlockWriter> {
    ctx: &'ctx AggregationContext,
    reassembler: Reassembler,
    sink: S,
    recorder: Option<FrameRecorder<W>>,
}

impl<'ctx, S: RecordSink, W: BlockWriter> Aggregator<'ctx, S, W> {
    /// `recorder` is `None` when the build leaves the on-board recorder out.
    pub fn new(
        ctx: &'ctx AggregationContext,
        sink: S,
        recorder: Option<FrameRecorder<W>>,
        own_state_machine: bool,
    ) -> Self {
        Self {
            ctx,
            reassembler: Reassembler::new(own_state_machine),
            sink,
            recorder,
        }
    }

    /// One aggregation pass: drain the queue, then dispatch every record
    /// class whose commit tag arrived. Synchronous so it can be driven
    /// directly by tests and by the SITL harness.
    pub fn pass(&mut self, source: &mut impl FrameSource) {
        while source.pending() {
            let frame = source.pop();
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.record(&frame);
            }
            self.reassembler.ingest(frame, &self.ctx.estimate);
        }

        if self.reassembler.positional_ready() {
            let accepted = self.sink.accept_positional(self.reassembler.positional());
            self.reassembler.settle_positional(accepted);
        }

        if self.reassembler.barometric_ready() {
            let mut record = self.reassembler.barometric();
            // The derived altitude is never trusted from a previous cycle.
            record.altitude_m = convert::altitude_from_pressure(record.pressure_hpa);
            let accepted = self.sink.accept_barometric(record);
            self.reassembler.settle_barometric(accepted);
        }

        if self.reassembler.inertial_ready() {
            let accepted = self.sink.accept_inertial(self.reassembler.inertial());
            self.reassembler.settle_inertial(accepted);
        }
    }

    /// Read-only view of the reassembly state, for diagnostics and tests.
    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// Cooperative task body. Holds no lock across either sleep.
    pub async fn run(mut self, mut source: impl FrameSource) -> ! {
        Timer::after(STARTUP_GRACE).await;
        log::debug!("aggregation engine entering steady state");
        loop {
            self.pass(&mut source);
            Timer::after(PASS_PERIOD).await;
        }
    }
}
