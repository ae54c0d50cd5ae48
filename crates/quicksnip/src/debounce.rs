//! Timer-based coalescing of bursts of events.
//!
//! A [`Debouncer`] owns a worker thread that waits for triggers. The first
//! trigger opens a quiet window; each further trigger restarts it. When the
//! window elapses with no new trigger, the action runs exactly once.
//!
//! ```text
//! trigger  x  x x      x               (x = trigger)
//! window   |--|-|------|------|
//! action                      *         (fires once, window after the last x)
//! ```
//!
//! Dropping the debouncer stops the worker without running a pending action.
//! Owners that must not lose work (the usage tracker) flush explicitly first.

use crate::error::Result;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

enum Signal {
    Trigger,
    Stop,
}

/// Cloneable handle that can trigger a debouncer from any thread.
#[derive(Clone)]
pub struct Trigger {
    tx: Sender<Signal>,
}

impl Trigger {
    /// No-op once the debouncer is gone.
    pub fn fire(&self) {
        let _ = self.tx.send(Signal::Trigger);
    }
}

pub struct Debouncer {
    tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn spawn<F>(name: &str, window: Duration, mut action: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Signal>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut pending = false;
                loop {
                    let signal = if pending {
                        rx.recv_timeout(window)
                    } else {
                        rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
                    };
                    match signal {
                        Ok(Signal::Trigger) => pending = true,
                        Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            pending = false;
                            action();
                        }
                    }
                }
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(Signal::Trigger);
    }

    pub fn trigger_handle(&self) -> Trigger {
        Trigger {
            tx: self.tx.clone(),
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(handle) = self.handle.take() {
            // The action may hold the last owner; never join ourselves.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn wait_for(count: &AtomicUsize, expected: usize, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if count.load(Ordering::SeqCst) == expected {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        count.load(Ordering::SeqCst) == expected
    }

    #[test]
    fn test_burst_fires_once() {
        let (count, action) = counter();
        let debouncer = Debouncer::spawn("test-debounce", Duration::from_millis(50), action).unwrap();
        for _ in 0..10 {
            debouncer.trigger();
        }
        assert!(wait_for(&count, 1, Duration::from_secs(2)));
        thread::sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_separate_bursts_fire_separately() {
        let (count, action) = counter();
        let debouncer = Debouncer::spawn("test-debounce", Duration::from_millis(30), action).unwrap();
        debouncer.trigger();
        assert!(wait_for(&count, 1, Duration::from_secs(2)));
        debouncer.trigger_handle().fire();
        assert!(wait_for(&count, 2, Duration::from_secs(2)));
    }

    #[test]
    fn test_nothing_fires_without_trigger() {
        let (count, action) = counter();
        let _debouncer = Debouncer::spawn("test-debounce", Duration::from_millis(10), action).unwrap();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_discards_pending() {
        let (count, action) = counter();
        let debouncer = Debouncer::spawn("test-debounce", Duration::from_millis(200), action).unwrap();
        debouncer.trigger();
        drop(debouncer);
        thread::sleep(Duration::from_millis(250));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_trigger_after_drop_is_harmless() {
        let (_count, action) = counter();
        let debouncer = Debouncer::spawn("test-debounce", Duration::from_millis(10), action).unwrap();
        let trigger = debouncer.trigger_handle();
        drop(debouncer);
        trigger.fire();
    }
}
