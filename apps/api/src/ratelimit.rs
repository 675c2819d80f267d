//! Fixed-window rate limiting, one counter per logical endpoint group.
//!
//! A request arriving after the window's quota is exhausted fails fast with
//! the seconds remaining until the window resets; nothing queues.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::errors::AppError;

struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Process-wide call counter over a fixed time window.
pub struct FixedWindowLimiter {
    max_calls: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    pub fn new(max_calls: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            max_calls,
            window,
            clock,
            state: Mutex::new(WindowState {
                window_start,
                count: 0,
            }),
        }
    }

    /// Records one call. Returns `RateLimited` when the window's quota is
    /// already spent.
    pub fn try_acquire(&self) -> Result<(), AppError> {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("rate limiter lock poisoned");

        let elapsed = now.duration_since(state.window_start);
        if elapsed >= self.window {
            state.window_start = now;
            state.count = 0;
        }

        if state.count >= self.max_calls {
            let remaining = self.window.saturating_sub(now.duration_since(state.window_start));
            return Err(AppError::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        state.count += 1;
        Ok(())
    }
}

/// One limiter per endpoint group: job search and optimization are budgeted
/// independently.
pub struct RateLimits {
    pub search: FixedWindowLimiter,
    pub optimize: FixedWindowLimiter,
}

impl RateLimits {
    pub fn new(
        search_limit: u32,
        optimize_limit: u32,
        window: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            search: FixedWindowLimiter::new(search_limit, window, clock.clone()),
            optimize: FixedWindowLimiter::new(optimize_limit, window, clock),
        }
    }
}
