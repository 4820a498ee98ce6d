use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;

use crate::capture::Resolution;

/// Outbound frame size shared by the send and receive loops
///
/// The value is a `Copy` pair replaced as a whole under the lock, so a
/// reader always gets a width and height that were written together.
#[derive(Debug, Clone)]
pub struct SharedResolution {
    inner: Arc<ParkingMutex<Resolution>>,
}

impl SharedResolution {
    pub fn new(initial: Resolution) -> Self {
        Self {
            inner: Arc::new(ParkingMutex::new(initial)),
        }
    }

    pub fn snapshot(&self) -> Resolution {
        *self.inner.lock()
    }

    /// Swap in a new size, returning the previous one
    pub fn replace(&self, size: Resolution) -> Resolution {
        std::mem::replace(&mut *self.inner.lock(), size)
    }
}
