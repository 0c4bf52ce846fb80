//! Flies the aggregation engine through a synthetic boost-coast-descent
//! profile on the host. The engine runs exactly as on the board: frames go
//! through a queue adapter into the reassembler, completed records land in
//! the diagnostic rings, and the locally hosted phase machine consumes the
//! published estimate. Raw frames are teed to `sitl-flight.tsv`.

use std::fmt::Write as _;
use std::io::Write as _;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use skylark_core::{
    AggregationContext, Aggregator, BlockWriter, BufferSink, BusFrame, FlightPhase,
    FlightPhaseMachine, FrameRecorder, MeasurementTag, QueueFrameSource,
};

/// Simulation step, seconds. Matches the 100 Hz sensor cycle on the bus.
const DT_S: f32 = 0.01;
/// Motor burn time, seconds.
const BURN_S: f32 = 3.0;
/// Motor acceleration during burn, m/s^2 (net of gravity).
const BURN_ACCEL: f32 = 80.0;
const GRAVITY: f32 = 9.81;
/// Terminal descent rate under parachute, m/s.
const CHUTE_RATE: f32 = 15.0;

static FRAMES: Channel<CriticalSectionRawMutex, BusFrame, 64> = Channel::new();

struct FileWriter(std::fs::File);

impl BlockWriter for FileWriter {
    fn append(&mut self, bytes: &[u8]) {
        let _ = self.0.write_all(bytes);
    }
}

fn push(tick: u32, tag: MeasurementTag, payload: i32) {
    let _ = FRAMES.try_send(BusFrame::new(0x100, tick, tag, payload as u32));
}

/// One sensor cycle worth of frames for the simulated truth, interleaved
/// the way the real boards emit them: commit tags last per class.
fn emit_cycle(tick: u32, step: u32, alt_m: f32, vel_ms: f32, accel_g: f32) {
    push(tick, MeasurementTag::AccelX, 20);
    push(tick, MeasurementTag::AccelY, -15);
    push(tick, MeasurementTag::GyroX, 40);
    push(tick, MeasurementTag::GyroY, -25);
    push(tick, MeasurementTag::GyroZ, 10);
    push(tick, MeasurementTag::AccelZ, (accel_g * 1000.0) as i32);

    let pressure_hpa = 1013.25 * libm::powf(1.0 - alt_m / 44330.0, 5.255);
    push(tick, MeasurementTag::Pressure, (pressure_hpa * 100.0) as i32);
    push(tick, MeasurementTag::Temperature, 20);

    // The estimator board broadcasts its filtered solution on the same bus.
    push(tick, MeasurementTag::KalmanZ, (alt_m * 1000.0) as i32);
    push(tick, MeasurementTag::KalmanVz, (vel_ms * 1000.0) as i32);

    // GNSS at 1 Hz.
    if step % 100 == 0 {
        push(tick, MeasurementTag::GpsHdop, 1200);
        push(tick, MeasurementTag::GpsLat, 46_518_000);
        push(tick, MeasurementTag::GpsLong, 6_566_000);
        push(tick, MeasurementTag::GpsAlt, (alt_m * 100.0) as i32);
        push(tick, MeasurementTag::GpsSats, 9);
    }
}

fn main() {
    env_logger::init();

    let ctx = AggregationContext::new();
    let sink = BufferSink::new(&ctx.inertial_ring, &ctx.barometric_ring);
    let file = std::fs::File::create("sitl-flight.tsv").expect("create recorder output");
    let recorder = Some(FrameRecorder::new(FileWriter(file)));

    // Buffer sink plus a locally hosted phase machine: the configuration
    // the board flies when no radio and no estimator are fitted.
    let mut agg = Aggregator::new(&ctx, sink, recorder, true);
    let mut source = QueueFrameSource::new(FRAMES.receiver());

    let mut fsm = FlightPhaseMachine::new();
    fsm.set_ground_reference(0.0);
    ctx.estimate.calibrate(0.0);

    println!("SITL flight starting: {}s burn at {:.0} m/s^2", BURN_S, BURN_ACCEL);

    let mut alt = 0.0f32;
    let mut vel = 0.0f32;
    let mut step = 0u32;
    let mut last_phase = fsm.phase;

    loop {
        step += 1;
        let t_s = step as f32 * DT_S;
        let tick = (t_s * 1000.0) as u32;

        // Truth propagation.
        let accel_ms2 = if t_s < BURN_S {
            BURN_ACCEL
        } else if vel > 0.0 {
            -GRAVITY
        } else {
            // Under parachute: relax towards the terminal rate.
            (-CHUTE_RATE - vel) / 2.0
        };
        vel += accel_ms2 * DT_S;
        alt = (alt + vel * DT_S).max(0.0);

        let accel_g = accel_ms2 / GRAVITY + 1.0;
        emit_cycle(tick, step, alt, vel, accel_g);

        agg.pass(&mut source);
        let phase = fsm.advance(&ctx.estimate, accel_g);

        if phase != last_phase {
            println!("\nPHASE CHANGE: {last_phase:?} -> {phase:?} at t={t_s:.1}s");
            last_phase = phase;
        }

        if step % 50 == 0 {
            let mut line = String::new();
            let _ = write!(
                line,
                "\rt={:6.1}s alt={:7.1}m vel={:6.1}m/s phase={:?}    ",
                t_s,
                ctx.estimate.altitude(),
                ctx.estimate.velocity(),
                phase
            );
            print!("{line}");
            let _ = std::io::stdout().flush();
        }

        if phase == FlightPhase::Descent && alt <= 0.0 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_micros(500));
    }

    println!(
        "\nTouchdown after {} samples; inertial ring seq={}, baro ring seq={}",
        step,
        ctx.inertial_ring.seq(),
        ctx.barometric_ring.seq()
    );
    log::info!("recorder output written to sitl-flight.tsv");
}
