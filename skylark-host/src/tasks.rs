use embassy_futures::select::{select, Either};
use embassy_stm32::can::Can;
use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::{CAN1, SPI2};
use embassy_stm32::spi::Spi;
use embassy_time::{Duration, Timer};

use skylark_core::{
    downlink_task, AggregationContext, Aggregator, FrameRecorder, LedSignal,
};

#[cfg(feature = "own-state-machine")]
use skylark_core::FlightPhaseMachine;
#[cfg(feature = "sink-buffer")]
use skylark_core::BufferSink;
#[cfg(feature = "sink-estimator")]
use skylark_core::{EstimatorSink, VerticalKalman};
#[cfg(feature = "sink-telemetry")]
use skylark_core::TelemetrySink;

use crate::can::CanFrameSource;
use crate::channels::{LED_CHANNEL, RADIO_IN, RADIO_TX_BUF};
use crate::framer::UartFramer;
use crate::led::RgbLed;
use crate::sd_card::{self, SdAppend};

/// Heartbeat toggle period for the status indicator.
const HEARTBEAT_PERIOD: Duration = Duration::from_millis(100);
/// How long an event flash stays on before the LED goes dark again.
const FLASH_PERIOD: Duration = Duration::from_millis(20);
/// Reserved housekeeping cadence.
const HOUSEKEEPING_PERIOD: Duration = Duration::from_millis(1000);

/// Status task: brings up the filesystem once, then splits its time between
/// the red heartbeat and event flashes requested by the radio path.
#[embassy_executor::task]
pub async fn status_task(
    mut led: RgbLed,
    sd_spi: Spi<'static, SPI2, NoDma, NoDma>,
    sd_cs: Output<'static, AnyPin>,
) -> ! {
    // Filesystem comes up exactly once, before the first blink.
    sd_card::init(sd_spi, sd_cs);

    let mut heartbeat_on = false;
    loop {
        match select(Timer::after(HEARTBEAT_PERIOD), LED_CHANNEL.receive()).await {
            Either::First(()) => {
                heartbeat_on = !heartbeat_on;
                if heartbeat_on {
                    led.set_rgb(50, 0, 0);
                } else {
                    led.off();
                }
            }
            Either::Second(signal) => {
                match signal {
                    LedSignal::TxOk => led.set_rgb(0, 50, 0),
                    LedSignal::TxFail => led.set_rgb(50, 0, 0),
                    LedSignal::RxActivity => led.set_rgb(0, 0, 50),
                }
                Timer::after(FLASH_PERIOD).await;
                led.off();
                heartbeat_on = false;
            }
        }
    }
}

/// The aggregation engine on its cooperative slot. The sink variant is fixed
/// at build time; all three share the one dispatch path inside the engine.
#[embassy_executor::task]
pub async fn aggregator_task(ctx: &'static AggregationContext, can: Can<'static, CAN1>) -> ! {
    let source = CanFrameSource::new(can);

    #[cfg(feature = "recorder")]
    let recorder = Some(FrameRecorder::new(SdAppend));
    #[cfg(not(feature = "recorder"))]
    let recorder: Option<FrameRecorder<SdAppend>> = None;

    let own_state = cfg!(feature = "own-state-machine");

    #[cfg(feature = "sink-telemetry")]
    {
        let sink = TelemetrySink::new(RADIO_IN.sender());
        Aggregator::new(ctx, sink, recorder, own_state).run(source).await
    }
    #[cfg(feature = "sink-estimator")]
    {
        let sink = EstimatorSink::new(VerticalKalman::new(0.0), &ctx.estimate);
        Aggregator::new(ctx, sink, recorder, own_state).run(source).await
    }
    #[cfg(feature = "sink-buffer")]
    {
        let sink = BufferSink::new(&ctx.inertial_ring, &ctx.barometric_ring);
        Aggregator::new(ctx, sink, recorder, own_state).run(source).await
    }
}

/// Radio downlink on its own slot; the body lives in the core crate.
#[embassy_executor::task]
pub async fn radio_task(ctx: &'static AggregationContext, framer: UartFramer) -> ! {
    downlink_task(
        RADIO_IN.receiver(),
        &RADIO_TX_BUF,
        &ctx.estimate,
        framer,
        LED_CHANNEL.sender(),
    )
    .await
}

/// First reserved housekeeping slot. Hosts the local flight-phase machine
/// when the build owns the state byte; otherwise idles at low rate.
#[embassy_executor::task]
pub async fn task_s1(ctx: &'static AggregationContext) -> ! {
    #[cfg(feature = "own-state-machine")]
    {
        let mut fsm = FlightPhaseMachine::new();

        // Let the filtered estimate settle before taking the pad reference.
        Timer::after(Duration::from_secs(5)).await;
        let ground = ctx.estimate.altitude();
        ctx.estimate.calibrate(ground);
        fsm.set_ground_reference(0.0);
        crate::info!("Phase machine armed, ground reference {} m", ground);

        loop {
            fsm.advance(&ctx.estimate, 0.0);
            Timer::after(Duration::from_millis(100)).await;
        }
    }

    #[cfg(not(feature = "own-state-machine"))]
    {
        let _ = ctx;
        loop {
            Timer::after(HOUSEKEEPING_PERIOD).await;
        }
    }
}

/// Second reserved housekeeping slot.
#[embassy_executor::task]
pub async fn task_s2() -> ! {
    loop {
        Timer::after(HOUSEKEEPING_PERIOD).await;
    }
}
