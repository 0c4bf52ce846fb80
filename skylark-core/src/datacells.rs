use core::cell::Cell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;
use portable_atomic::{AtomicU32, Ordering};

/// Single-writer, many-reader cell for sharing `Copy` scalars between tasks.
///
/// Reads and writes are atomic at the cell level; no snapshot across several
/// cells is guaranteed. This is the storage primitive behind the vehicle
/// estimate publisher and the diagnostic sample rings.
pub struct DataCell<T: Copy> {
    storage: Mutex<CriticalSectionRawMutex, Cell<T>>,
    last_updated: AtomicU32,
}

impl<T: Copy> DataCell<T> {
    /// Create a new cell with an initial value.
    pub const fn new(init: T) -> Self {
        Self {
            storage: Mutex::new(Cell::new(init)),
            last_updated: AtomicU32::new(0),
        }
    }

    /// Replace the stored value and stamp the update tick.
    pub fn update(&self, data: T) {
        self.storage.lock(|cell| {
            cell.set(data);
        });
        let now = Instant::now().as_ticks() as u32;
        self.last_updated.store(now, Ordering::Relaxed);
    }

    /// Kernel tick of the most recent `update`.
    pub fn last_updated(&self) -> u32 {
        self.last_updated.load(Ordering::Relaxed)
    }

    /// Fetch the latest value.
    pub fn read(&self) -> T {
        self.storage.lock(|cell| cell.get())
    }
}
