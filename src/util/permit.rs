//! Binary hand-off permits
//!
//! A `Permit<T>` is a binary semaphore that owns the resource it guards.
//! Acquiring it moves the value out and blocks while another task holds it;
//! releasing it moves the value back and wakes one waiter. Possession of the
//! value is therefore the proof of exclusive access, and no two tasks can
//! touch the guarded buffer at the same time.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Binary permit carrying the guarded value while available
#[derive(Debug)]
pub struct Permit<T> {
    cell: Mutex<Option<T>>,
    released: Condvar,
}

impl<T> Permit<T> {
    /// Create an available permit holding `value`
    pub fn new(value: T) -> Self {
        Self {
            cell: Mutex::new(Some(value)),
            released: Condvar::new(),
        }
    }

    /// Block until the permit is available, then take the value
    pub fn acquire(&self) -> T {
        let mut cell = self.lock();
        loop {
            if let Some(value) = cell.take() {
                return value;
            }
            cell = self
                .released
                .wait(cell)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take the value if the permit is available right now
    ///
    /// Pipeline stages always block in `acquire`. This exists so tests can
    /// drive the hand-off by hand.
    #[doc(hidden)]
    pub fn try_acquire(&self) -> Option<T> {
        self.lock().take()
    }

    /// Return the value and wake one waiter
    ///
    /// # Panics
    /// Panics if the permit is already available (released twice).
    pub fn release(&self, value: T) {
        let mut cell = self.lock();
        assert!(cell.is_none(), "permit released while available");
        *cell = Some(value);
        drop(cell);
        self.released.notify_one();
    }

    /// Whether the permit can be acquired without blocking
    pub fn is_available(&self) -> bool {
        self.lock().is_some()
    }

    /// Consume the permit, returning the value if it was available
    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_release_cycle() {
        let permit = Permit::new(vec![1u32, 2, 3]);
        assert!(permit.is_available());

        let mut value = permit.acquire();
        assert!(!permit.is_available());
        assert!(permit.try_acquire().is_none());

        value.push(4);
        permit.release(value);
        assert_eq!(permit.acquire(), vec![1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "permit released while available")]
    fn test_double_release_panics() {
        let permit = Permit::new(0u8);
        permit.release(1);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let permit = Arc::new(Permit::new(7u32));
        let held = permit.acquire();
        let acquired = Arc::new(AtomicBool::new(false));

        let handle = {
            let permit = Arc::clone(&permit);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let value = permit.acquire();
                acquired.store(true, Ordering::SeqCst);
                value
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));

        permit.release(held + 1);
        assert_eq!(handle.join().unwrap(), 8);
        assert!(acquired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_into_inner() {
        let permit = Permit::new(String::from("slot"));
        assert_eq!(permit.into_inner().as_deref(), Some("slot"));

        let permit = Permit::new(1u8);
        let _held = permit.acquire();
        assert_eq!(permit.into_inner(), None);
    }
}
