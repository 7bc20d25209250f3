use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Rolling-window request limiter shared by every caller of one client
///
/// At most `max_requests` grants are handed out in any `window`. Waiters hold
/// the lock while sleeping, so admission is FIFO in lock acquisition order
/// (tokio's mutex is fair).
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_window(requests_per_minute, WINDOW)
    }

    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1) as usize,
            window,
            granted: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
        }
    }

    /// Wait until a request may be sent, then record it
    pub async fn acquire(&self) {
        let mut granted = self.granted.lock().await;

        loop {
            let now = Instant::now();
            while granted
                .front()
                .is_some_and(|&t| now.duration_since(t) >= self.window)
            {
                granted.pop_front();
            }

            if granted.len() < self.max_requests {
                granted.push_back(now);
                return;
            }

            // Re-evaluated after the sleep; never granted on a stale snapshot
            let oldest = granted[0];
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                in_window = granted.len(),
                "Rate limit reached, waiting"
            );
            sleep(wait).await;
        }
    }

    /// Grants still inside the current window
    ///
    /// Shares the lock a waiting `acquire` sleeps on, so under contention this
    /// can itself wait up to one window.
    pub async fn in_flight(&self) -> usize {
        let granted = self.granted.lock().await;
        let now = Instant::now();
        granted
            .iter()
            .filter(|&&t| now.duration_since(t) < self.window)
            .count()
    }
}
