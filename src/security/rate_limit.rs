//! Sliding-window rate limiting keyed by client IP.
//!
//! Two independent instances exist at runtime: a broad per-request throttle
//! applied to everything, and a stricter one applied only to the form
//! endpoint. They never share counters.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-IP sliding window of request timestamps.
///
/// The window is pruned lazily on every check, so an entry never holds more
/// than `limit` timestamps younger than `window`. Check-and-record happens
/// under one lock acquisition, which keeps admission linearizable per key.
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Vec<Instant>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    /// Admit or deny a request from `ip`. Denials record nothing.
    pub fn allow(&self, ip: IpAddr) -> bool {
        self.allow_at(ip, Instant::now())
    }

    pub fn allow_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let times = windows.entry(ip).or_default();
        times.retain(|t| now.duration_since(*t) < self.window);

        if times.len() >= self.limit {
            return false;
        }
        times.push(now);
        true
    }

    /// Drop identities with no activity inside the window. Called from the
    /// gatekeeper's opportunistic housekeeping pass, never on a timer.
    pub fn prune_idle(&self) {
        self.prune_idle_at(Instant::now());
    }

    pub fn prune_idle_at(&self, now: Instant) {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.retain(|_, times| {
            times.retain(|t| now.duration_since(*t) < self.window);
            !times.is_empty()
        });
    }

    #[cfg(test)]
    fn tracked_identities(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}
