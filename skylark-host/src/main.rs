#![no_std]
#![no_main]

mod can;
mod channels;
mod framer;
mod led;
mod macros;
mod sd_card;
mod tasks;

use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::can::bxcan::filter::Mask32;
use embassy_stm32::can::bxcan::Fifo;
use embassy_stm32::can::{self, Can};
use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{Level, Output, Pin, Speed};
use embassy_stm32::peripherals;
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{Config as UsartConfig, UartTx};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use skylark_core::AggregationContext;

#[cfg(any(
    all(feature = "sink-telemetry", feature = "sink-estimator"),
    all(feature = "sink-telemetry", feature = "sink-buffer"),
    all(feature = "sink-estimator", feature = "sink-buffer"),
))]
compile_error!(
    "Sink modes are mutually exclusive: pick one of sink-telemetry, sink-estimator, sink-buffer"
);

#[cfg(not(any(
    feature = "sink-telemetry",
    feature = "sink-estimator",
    feature = "sink-buffer"
)))]
compile_error!("No sink selected: pick one of sink-telemetry, sink-estimator, sink-buffer");

bind_interrupts!(struct Irqs {
    CAN1_TX => can::TxInterruptHandler<peripherals::CAN1>;
    CAN1_RX0 => can::Rx0InterruptHandler<peripherals::CAN1>;
    CAN1_RX1 => can::Rx1InterruptHandler<peripherals::CAN1>;
    CAN1_SCE => can::SceInterruptHandler<peripherals::CAN1>;
});

static CONTEXT: StaticCell<AggregationContext> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_stm32::init(Default::default());
    crate::info!("Skylark host board starting");

    // Single-owner aggregation state, leaked once for the task set.
    let ctx: &'static AggregationContext = CONTEXT.init(AggregationContext::new());

    // CAN1 @ 250 kbit/s with an accept-all filter; the sensor boards tag
    // every frame and the reassembler drops what it does not know.
    let mut can = Can::new(p.CAN1, p.PA11, p.PA12, Irqs);
    can.as_mut()
        .modify_filters()
        .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    can.set_bitrate(250_000);
    can.enable().await;

    // Radio modem on USART2, transmit-only from this board.
    let mut usart_config = UsartConfig::default();
    usart_config.baudrate = 115_200;
    let radio_tx = UartTx::new(p.USART2, p.PA2, NoDma, usart_config).unwrap();

    // SD card on SPI2, conservative clock for long leads to the card slot.
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(8_000_000);
    let sd_spi = Spi::new(p.SPI2, p.PB13, p.PB15, p.PB14, NoDma, NoDma, spi_config);
    let sd_cs = Output::new(p.PB12.degrade(), Level::High, Speed::VeryHigh);

    // RGB status indicator.
    let led = led::RgbLed::new(
        Output::new(p.PB3.degrade(), Level::Low, Speed::Low),
        Output::new(p.PB4.degrade(), Level::Low, Speed::Low),
        Output::new(p.PB5.degrade(), Level::Low, Speed::Low),
    );

    // The fixed task set: status blinker, aggregation engine, radio
    // downlink, and two reserved housekeeping slots. Same priority, one
    // executor; nothing is created after init.
    spawner
        .spawn(tasks::status_task(led, sd_spi, sd_cs))
        .unwrap();
    spawner.spawn(tasks::aggregator_task(ctx, can)).unwrap();
    spawner
        .spawn(tasks::radio_task(ctx, framer::UartFramer::new(radio_tx)))
        .unwrap();
    spawner.spawn(tasks::task_s1(ctx)).unwrap();
    spawner.spawn(tasks::task_s2()).unwrap();
}
