// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A per-remote token bucket guarding the HTTP surface: one bucket per source IP,
//! created lazily on first contact.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(capacity: f64) -> Self {
        Self { tokens: capacity, last_refill: Instant::now() }
    }
}

pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
}

/// Outcome of a rate-limit check, carrying the headers the HTTP layer attaches.
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub retry_after_secs: u32,
}

impl RateLimiter {
    pub fn new(requests_per_sec: u32) -> Self {
        let capacity = requests_per_sec.max(1) as f64;
        Self { capacity, refill_per_sec: capacity, buckets: Mutex::new(HashMap::new()) }
    }

    pub fn check(&self, remote: IpAddr) -> Decision {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(remote).or_insert_with(|| Bucket::new(self.capacity));

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Decision {
                allowed: true,
                limit: self.capacity as u32,
                remaining: bucket.tokens as u32,
                retry_after_secs: 0,
            }
        } else {
            Decision { allowed: false, limit: self.capacity as u32, remaining: 0, retry_after_secs: 1 }
        }
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
