// lib.rs
#![cfg_attr(not(test), no_std)]

pub mod aggregator;
pub mod bus;
pub mod convert;
pub mod datacells;
pub mod estimate;
pub mod estimator;
pub mod radio;
pub mod reassembler;
pub mod recorder;
pub mod records;
pub mod ring;
pub mod sink;
pub mod state_machine;
pub mod wire;

pub use aggregator::{AggregationContext, Aggregator, PASS_PERIOD, STARTUP_GRACE};
pub use bus::{BusFrame, FrameSource, MeasurementTag, QueueFrameSource};
pub use estimate::VehicleEstimate;
pub use estimator::{Estimator, VerticalKalman};
pub use radio::{downlink_task, FramerError, LedSignal, RadioFramer, RADIO_QUEUE_DEPTH};
pub use reassembler::Reassembler;
pub use recorder::{BlockWriter, FrameRecorder, LineBuffer, NullWriter};
pub use records::{BarometricRecord, InertialRecord, PositionalRecord, TelemetryRecord};
pub use ring::{SampleRing, BARO_RING_DEPTH, INERTIAL_RING_DEPTH};
pub use sink::{BufferSink, EstimatorSink, RecordSink, TelemetrySink};
pub use state_machine::{FlightPhase, FlightPhaseMachine};
pub use wire::DownlinkPacket;
