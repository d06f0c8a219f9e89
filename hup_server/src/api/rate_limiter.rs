//! Sliding-window rate limiter for WebSocket message handling.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Per-connection message rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Burst protection: 10 messages per second.
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Sustained protection: 120 messages per minute.
    pub fn sustained() -> Self {
        Self::new(120, Duration::from_secs(60))
    }

    /// Record one request; returns false once the window is full.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}
