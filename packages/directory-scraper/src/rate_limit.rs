//! Request pacing.
//!
//! Two limiters, both process-lifetime only:
//!
//! - [`RequestPacer`] keeps a fixed minimum gap between the end of one
//!   request and the start of the next (page fetching).
//! - [`RequestWindow`] caps the number of requests per rolling window and
//!   also keeps a minimum gap between any two requests (rewrite calls).
//!
//! Both are owned by whoever issues the requests and take `&self`; the
//! interior lock is never held across an await.
//!
//! These are plain `tokio::time` code rather than `governor` quotas, which
//! only space requests from their start and have no safety margin on the
//! window.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

/// Fixed spacing measured from the end of the previous request.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: Mutex::new(None),
        }
    }

    /// Time still to wait before the next request may start.
    pub fn remaining(&self) -> Duration {
        let last = *self
            .last_finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match last {
            Some(finished) => self.min_interval.saturating_sub(finished.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep `max(0, min_interval - elapsed_since_last)`.
    pub async fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            debug!(wait_ms = remaining.as_millis() as u64, "Pacing before next request");
            sleep(remaining).await;
        }
    }

    /// Record that a request just finished.
    pub fn finish(&self) {
        *self
            .last_finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
    }
}

/// Limits for [`RequestWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    /// Length of the counting window
    pub window: Duration,

    /// Requests allowed per window
    pub max_requests: u32,

    /// Extra wait added once the window is exhausted
    pub safety_margin: Duration,

    /// Minimum gap between any two requests
    pub min_spacing: Duration,
}

#[derive(Debug)]
struct WindowState {
    count: u32,
    window_start: Instant,
    last_request: Option<Instant>,
}

/// Rolling-window request budget with minimum spacing.
#[derive(Debug)]
pub struct RequestWindow {
    limits: WindowLimits,
    state: Mutex<WindowState>,
}

impl RequestWindow {
    pub fn new(limits: WindowLimits) -> Self {
        Self {
            limits,
            state: Mutex::new(WindowState {
                count: 0,
                window_start: Instant::now(),
                last_request: None,
            }),
        }
    }

    pub fn limits(&self) -> WindowLimits {
        self.limits
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut WindowState) -> R) -> R {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    /// Wait until one more request fits the budget, then count it.
    pub async fn acquire(&self) {
        let limits = self.limits;

        // Window budget
        let window_wait = self.with_state(|state| {
            let elapsed = state.window_start.elapsed();
            if elapsed >= limits.window {
                state.window_start = Instant::now();
                state.count = 0;
                return None;
            }
            (state.count >= limits.max_requests)
                .then(|| limits.window - elapsed + limits.safety_margin)
        });

        if let Some(wait) = window_wait {
            debug!(
                wait_ms = wait.as_millis() as u64,
                max_requests = limits.max_requests,
                "Request window exhausted, waiting for reset"
            );
            sleep(wait).await;
            self.with_state(|state| {
                state.window_start = Instant::now();
                state.count = 0;
            });
        }

        // Minimum spacing
        let spacing_wait = self.with_state(|state| {
            state
                .last_request
                .map(|last| limits.min_spacing.saturating_sub(last.elapsed()))
                .filter(|wait| !wait.is_zero())
        });
        if let Some(wait) = spacing_wait {
            sleep(wait).await;
        }

        self.with_state(|state| {
            state.count += 1;
            state.last_request = Some(Instant::now());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pacer_waits_from_end_of_previous_request() {
        let pacer = RequestPacer::new(Duration::from_millis(1500));
        let start = Instant::now();

        // First request goes immediately
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(1));

        // Request takes 500ms
        sleep(Duration::from_millis(500)).await;
        pacer.finish();

        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert!(start.elapsed() < Duration::from_millis(2010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_no_wait_when_interval_already_passed() {
        let pacer = RequestPacer::new(Duration::from_millis(100));
        pacer.finish();
        sleep(Duration::from_millis(250)).await;

        assert_eq!(pacer.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_never_exceeds_budget() {
        let limits = WindowLimits {
            window: Duration::from_secs(60),
            max_requests: 5,
            safety_margin: Duration::from_secs(1),
            min_spacing: Duration::ZERO,
        };
        let limiter = RequestWindow::new(limits);
        let start = Instant::now();
        let mut issued = Vec::new();

        for _ in 0..11 {
            limiter.acquire().await;
            issued.push(Instant::now());
        }

        // Two full windows had to elapse
        assert!(start.elapsed() >= Duration::from_secs(120));

        // Any max_requests+1 consecutive requests span more than a window
        for pair in issued.windows(limits.max_requests as usize + 1) {
            let span = pair[pair.len() - 1] - pair[0];
            assert!(span >= limits.window, "window violated: {:?}", span);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_enforces_min_spacing() {
        let limiter = RequestWindow::new(WindowLimits {
            window: Duration::from_secs(60),
            max_requests: 55,
            safety_margin: Duration::from_secs(2),
            min_spacing: Duration::from_secs(1),
        });
        let start = Instant::now();

        for _ in 0..4 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
