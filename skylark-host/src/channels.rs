use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;

use skylark_core::{LedSignal, TelemetryRecord, RADIO_QUEUE_DEPTH};

/// Module to contain the global asynchronous channels, so every cross-task
/// hand-off is declared in one place. The CAN receive FIFO is not here: the
/// peripheral driver owns that queue and the aggregation task drains it
/// through its frame-source adapter.

/// Completed records travelling to the radio task (`radio_in`).
pub static RADIO_IN: Channel<CriticalSectionRawMutex, TelemetryRecord, RADIO_QUEUE_DEPTH> =
    Channel::new();

/// Guard over the radio transmit buffer. Taken with an infinite wait, only
/// ever inside the radio task, released before the next queue receive.
pub static RADIO_TX_BUF: Mutex<CriticalSectionRawMutex, ()> = Mutex::new(());

/// Status-indicator events for the blinker task. Small on purpose: a missed
/// flash is preferable to a caller blocking on the LED.
pub static LED_CHANNEL: Channel<CriticalSectionRawMutex, LedSignal, 4> = Channel::new();
