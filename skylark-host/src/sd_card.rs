use core::cell::RefCell;

use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::SPI2;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{Mode, RawFile, SdCard, TimeSource, Timestamp, VolumeIdx, VolumeManager};

use skylark_core::BlockWriter;

use crate::{error, info};

/// Recorder output file, tab-separated raw frames.
const LOG_FILE_NAME: &str = "FLIGHT.TSV";

type SdSpi = ExclusiveDevice<Spi<'static, SPI2, NoDma, NoDma>, Output<'static, AnyPin>, Delay>;
type SdManager = VolumeManager<SdCard<SdSpi, Delay>, FlightClock, 4, 4, 1>;

/// The flight computer has no RTC; files get a fixed build-era stamp.
struct FlightClock;

impl TimeSource for FlightClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 55,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

struct SdState {
    mgr: SdManager,
    file: RawFile,
}

/// Filesystem state behind a blocking lock. Only the aggregation task writes
/// (single-writer rule for the storage medium); the lock exists for the
/// one-shot init hand-off from the blinker task.
static STORAGE: Mutex<CriticalSectionRawMutex, RefCell<Option<SdState>>> =
    Mutex::new(RefCell::new(None));

/// One-shot filesystem bring-up, called from the status task before its
/// first blink. Failure leaves the recorder as a no-op: the recorder is
/// best-effort by contract and the flight continues without it.
pub fn init(spi: Spi<'static, SPI2, NoDma, NoDma>, cs: Output<'static, AnyPin>) {
    let spi_dev = ExclusiveDevice::new(spi, cs, Delay);
    let card = SdCard::new(spi_dev, Delay);
    let mut mgr: SdManager = VolumeManager::new(card, FlightClock);

    let volume = match mgr.open_raw_volume(VolumeIdx(0)) {
        Ok(v) => v,
        Err(e) => {
            error!("SD volume open failed: {:?}", defmt::Debug2Format(&e));
            return;
        }
    };
    let root = match mgr.open_root_dir(volume) {
        Ok(d) => d,
        Err(e) => {
            error!("SD root open failed: {:?}", defmt::Debug2Format(&e));
            return;
        }
    };
    let file = match mgr.open_file_in_dir(root, LOG_FILE_NAME, Mode::ReadWriteCreateOrAppend) {
        Ok(f) => f,
        Err(e) => {
            error!("SD log file open failed: {:?}", defmt::Debug2Format(&e));
            return;
        }
    };

    STORAGE.lock(|slot| {
        slot.borrow_mut().replace(SdState { mgr, file });
    });
    info!("SD recorder ready: {}", LOG_FILE_NAME);
}

/// The aggregation task's handle onto the recorder file.
///
/// Append is blocking and swallows failures; the aggregator does not
/// distinguish success from failure and continues either way.
pub struct SdAppend;

impl BlockWriter for SdAppend {
    fn append(&mut self, bytes: &[u8]) {
        STORAGE.lock(|slot| {
            if let Some(state) = slot.borrow_mut().as_mut() {
                let _ = state.mgr.write(state.file, bytes);
            }
        });
    }
}
