// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
The single lock guarding a [crate::Registry].

Registration is rare and lookup is a handful of loads, so a reader/writer spinlock
is enough.  Blocking mutexes are not available on the wasm main thread, which is the
other reason this is not `std::sync::RwLock`.

Critical sections must stay short: callers clone an `Arc` out and release.  Sink writes
never happen while the lock is held.
*/

use std::cell::UnsafeCell;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

const UNLOCKED: u8 = 0;
//up to 254 concurrent readers, or one writer holding u8::MAX
const WRITER: u8 = u8::MAX;

pub(crate) struct Spinlock<T> {
    data: UnsafeCell<T>,
    state: AtomicU8,
}

// SAFETY: access to `data` is mediated by `state`; shared readers only get `&T`.
unsafe impl<T: Send> Send for Spinlock<T> {}
unsafe impl<T: Send + Sync> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub(crate) const fn new(data: T) -> Self {
        Spinlock {
            data: UnsafeCell::new(data),
            state: AtomicU8::new(UNLOCKED),
        }
    }

    fn acquire_write(&self) {
        while self
            .state
            .compare_exchange_weak(UNLOCKED, WRITER, Acquire, Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
    }

    fn acquire_read(&self) {
        while self
            .state
            .fetch_update(Acquire, Relaxed, |readers| {
                (readers < WRITER - 1).then_some(readers + 1)
            })
            .is_err()
        {
            std::hint::spin_loop();
        }
    }

    /// Runs `f` with exclusive access.
    pub(crate) fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.acquire_write();
        let _unlock = Unlock {
            state: &self.state,
            writer: true,
        };
        // SAFETY: we hold the writer state, nobody else can observe `data`.
        f(unsafe { &mut *self.data.get() })
    }

    /// Runs `f` with shared access.
    pub(crate) fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.acquire_read();
        let _unlock = Unlock {
            state: &self.state,
            writer: false,
        };
        // SAFETY: we hold a reader slot, so there is no writer.
        f(unsafe { &*self.data.get() })
    }
}

/// Releases the lock state on drop, so a panicking closure cannot wedge the registry.
struct Unlock<'a> {
    state: &'a AtomicU8,
    writer: bool,
}

impl Drop for Unlock<'_> {
    fn drop(&mut self) {
        if self.writer {
            self.state.store(UNLOCKED, Release);
        } else {
            self.state.fetch_sub(1, Release);
        }
    }
}
