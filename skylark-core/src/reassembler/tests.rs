use crate::bus::{BusFrame, MeasurementTag};
use crate::estimate::VehicleEstimate;
use crate::records::POSITION_SENTINEL;
use crate::reassembler::Reassembler;

fn frame(tag: MeasurementTag, payload: i32) -> BusFrame {
    BusFrame::new(0x80, 100, tag, payload as u32)
}

#[test]
fn inertial_commits_on_accel_z() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::AccelX, 1000), &est);
    r.ingest(frame(MeasurementTag::AccelY, -2000), &est);
    assert!(!r.inertial_ready());

    r.ingest(frame(MeasurementTag::AccelZ, 500), &est);
    assert!(r.inertial_ready());

    let rec = r.inertial();
    assert_eq!(rec.accel_g, [1.0, -2.0, 0.5]);
    assert_eq!(rec.tickstamp, 100);
}

#[test]
fn gyro_frames_never_commit() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);
    for tag in [
        MeasurementTag::GyroX,
        MeasurementTag::GyroY,
        MeasurementTag::GyroZ,
    ] {
        r.ingest(frame(tag, 750), &est);
    }
    assert!(!r.inertial_ready());
    assert_eq!(r.inertial().gyro_mrps, [750.0, 750.0, 750.0]);
}

#[test]
fn barometric_commits_on_temperature() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::Pressure, 10_132_500), &est);
    assert!(!r.barometric_ready());

    r.ingest(frame(MeasurementTag::Temperature, 20), &est);
    assert!(r.barometric_ready());

    let rec = r.barometric();
    assert_eq!(rec.pressure_hpa, 101_325.0);
    assert_eq!(rec.temperature_c, 20.0);
}

#[test]
fn temperature_defaults_until_first_frame() {
    let r = Reassembler::new(false);
    assert_eq!(r.barometric().temperature_c, 20.0);
}

#[test]
fn positional_commits_on_sat_count() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::GpsHdop, 1500), &est);
    r.ingest(frame(MeasurementTag::GpsLat, 46_518_000), &est);
    r.ingest(frame(MeasurementTag::GpsLong, 6_566_000), &est);
    r.ingest(frame(MeasurementTag::GpsAlt, 45_500), &est);
    assert!(!r.positional_ready());

    r.ingest(frame(MeasurementTag::GpsSats, 9), &est);
    assert!(r.positional_ready());

    let rec = r.positional();
    assert_eq!(rec.hdop_m, 1.5);
    assert_eq!(rec.lat_deg, 46.518);
    assert_eq!(rec.lon_deg, 6.566);
    assert_eq!(rec.altitude_m, 455);
    assert_eq!(rec.sats, 9);
}

#[test]
fn out_of_order_fragments_still_commit() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    // Commit tag first: the record completes with whatever the other slots
    // held, here the zero-initialised previous cycle.
    r.ingest(frame(MeasurementTag::AccelZ, 500), &est);
    assert!(r.inertial_ready());
    assert_eq!(r.inertial().accel_g, [0.0, 0.0, 0.5]);

    // Late fragments land in the already-committed partial record.
    r.ingest(frame(MeasurementTag::AccelX, 1000), &est);
    assert_eq!(r.inertial().accel_g, [1.0, 0.0, 0.5]);
}

#[test]
fn missing_scalars_redispatch_previous_values() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::AccelX, 1000), &est);
    r.ingest(frame(MeasurementTag::AccelZ, 500), &est);
    r.settle_inertial(true);

    // Next cycle loses the X axis; the stale 1.0 g survives.
    r.ingest(frame(MeasurementTag::AccelZ, 750), &est);
    assert!(r.inertial_ready());
    assert_eq!(r.inertial().accel_g, [1.0, 0.0, 0.75]);
}

#[test]
fn unknown_tags_are_inert() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);
    let before_inertial = r.inertial();
    let before_baro = r.barometric();
    let before_pos = r.positional();

    r.ingest(
        BusFrame {
            id_bus: 0x80,
            timestamp: 5,
            tag: 0xEE,
            payload: 0xDEAD_BEEF,
        },
        &est,
    );

    assert!(!r.inertial_ready() && !r.barometric_ready() && !r.positional_ready());
    assert_eq!(r.inertial(), before_inertial);
    assert_eq!(r.barometric(), before_baro);
    assert_eq!(r.positional(), before_pos);
    assert_eq!(est.state(), 0);
}

#[test]
fn state_frame_updates_publisher() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);
    r.ingest(frame(MeasurementTag::State, 4), &est);
    assert_eq!(est.state(), 4);
}

#[test]
fn state_frame_suppressed_with_local_phase_machine() {
    let est = VehicleEstimate::new();
    est.set_state(2);
    let mut r = Reassembler::new(true);
    r.ingest(frame(MeasurementTag::State, 7), &est);
    assert_eq!(est.state(), 2);
}

#[test]
fn estimate_frames_feed_publisher() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);
    r.ingest(frame(MeasurementTag::KalmanZ, 1_250_000), &est);
    r.ingest(frame(MeasurementTag::KalmanVz, -3_500), &est);
    assert_eq!(est.altitude(), 1250.0);
    assert_eq!(est.velocity(), -3.5);
    // No record class completes from estimate scalars.
    assert!(!r.inertial_ready() && !r.barometric_ready() && !r.positional_ready());
}

#[test]
fn accepted_positional_resets_to_sentinels() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::GpsLat, 46_518_000), &est);
    r.ingest(frame(MeasurementTag::GpsSats, 9), &est);
    r.settle_positional(true);

    let rec = r.positional();
    assert!(!r.positional_ready());
    assert_eq!(rec.hdop_m, POSITION_SENTINEL);
    assert_eq!(rec.lat_deg, POSITION_SENTINEL);
    assert_eq!(rec.lon_deg, POSITION_SENTINEL);
    assert_eq!(rec.altitude_m, 0);
    assert_eq!(rec.sats, 0);
}

#[test]
fn rejected_positional_keeps_data_and_flag() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);

    r.ingest(frame(MeasurementTag::GpsLat, 46_518_000), &est);
    r.ingest(frame(MeasurementTag::GpsSats, 9), &est);
    r.settle_positional(false);

    assert!(r.positional_ready());
    assert_eq!(r.positional().lat_deg, 46.518);
}

#[test]
fn rejected_inertial_keeps_flag_set() {
    let est = VehicleEstimate::new();
    let mut r = Reassembler::new(false);
    r.ingest(frame(MeasurementTag::AccelZ, 500), &est);
    r.settle_inertial(false);
    assert!(r.inertial_ready());
    r.settle_inertial(true);
    assert!(!r.inertial_ready());
}
