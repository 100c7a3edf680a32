//! # One-shot Broadcast Signal
//!
//! A [`Signal`] starts unfired and is fired at most once. Any number of observers may wait
//! on it, before or after it fires, from async code ([`Signal::fired`]) or from plain OS
//! threads ([`Signal::wait_blocking`]). Once fired it stays fired.
//!
//! The tomb fires its `dying` and `dead` signals under its own phase check, so a signal is
//! never fired twice.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tokio::sync::Notify;

/// A cloneable, fire-once broadcast event.
#[derive(Clone, Debug)]
pub struct Signal {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    fired: Mutex<bool>,
    cond: Condvar,
    notify: Notify,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Shared::default()),
        }
    }

    /// Fires the signal, waking every waiter.
    pub(crate) fn fire(&self) {
        let mut fired = self.inner.fired.lock();
        debug_assert!(!*fired, "signal fired twice");
        *fired = true;
        drop(fired);

        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
    }

    /// Returns whether the signal has fired. Never blocks.
    pub fn is_fired(&self) -> bool {
        *self.inner.fired.lock()
    }

    /// Completes once the signal has fired.
    ///
    /// Safe to call any number of times; returns immediately after the signal fired.
    pub async fn fired(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent `fire` can't be missed.
            notified.as_mut().enable();
            if self.is_fired() {
                return;
            }
            notified.await;
        }
    }

    /// Blocks the current thread until the signal has fired.
    ///
    /// Must not be called from within an async task; use [`Signal::fired`] there.
    pub fn wait_blocking(&self) {
        let mut fired = self.inner.fired.lock();
        while !*fired {
            self.inner.cond.wait(&mut fired);
        }
    }
}
