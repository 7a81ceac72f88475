use std::sync::atomic::{AtomicU64, Ordering};

/// Global cap on how many requests the swarm may start.
///
/// Users reserve a slot before each invocation; once the cap is reached
/// reservations fail and users retire. Shutdown itself is left to the
/// collector so the last reserved requests are still recorded.
#[derive(Debug)]
pub(crate) struct RequestLimiter {
    limit: u64,
    counter: AtomicU64,
}

impl RequestLimiter {
    pub(crate) const fn new(limit: u64) -> Self {
        Self {
            limit,
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn try_reserve(&self) -> bool {
        loop {
            let current = self.counter.load(Ordering::Relaxed);
            if current >= self.limit {
                return false;
            }
            let Some(next) = current.checked_add(1) else {
                return false;
            };
            if self
                .counter
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    pub(crate) fn reserved(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
