use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A politeness clock shared by every crawl that targets the same origin
pub type SharedClock = Arc<Mutex<PolitenessClock>>;

/// Tracks request spacing for a single site
///
/// The first request of a site's run goes out immediately; every later one
/// waits until `delay` has elapsed since the previous request.
#[derive(Debug, Clone)]
pub struct PolitenessClock {
    /// Minimum gap between two requests to the site
    pub delay: Duration,

    /// Timestamp of the last request to this site
    pub last_request_time: Option<Instant>,

    /// Number of requests made to this site in the current crawl
    pub request_count: u32,
}

impl PolitenessClock {
    /// Creates a clock using the larger of the robots.txt crawl delay and the
    /// configured minimum
    pub fn new(crawl_delay_millis: u64, minimum_delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(crawl_delay_millis.max(minimum_delay_ms)),
            last_request_time: None,
            request_count: 0,
        }
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.delay {
            Some(self.delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was made to this site
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Sleeps until the next request is permitted, then records it
    pub async fn wait_turn(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }
}

/// Politeness clocks for a whole run, keyed by origin (`scheme://host[:port]`)
///
/// Seeds on the same origin crawl concurrently but share one clock, so their
/// requests are spaced against each other as well as against themselves.
#[derive(Debug, Clone, Default)]
pub struct PolitenessRegistry {
    clocks: Arc<Mutex<HashMap<String, SharedClock>>>,
}

impl PolitenessRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the clock for `origin`, creating it on first use
    ///
    /// # Arguments
    ///
    /// * `origin` - The origin every request through the clock goes to
    /// * `crawl_delay_millis` - The crawl delay from the origin's robots.txt
    /// * `minimum_delay_ms` - The configured floor for the delay
    ///
    /// # Returns
    ///
    /// The shared clock. When the clock already exists, its delay is raised to
    /// the larger of the current and requested delays; it never shrinks.
    pub async fn clock_for(
        &self,
        origin: &str,
        crawl_delay_millis: u64,
        minimum_delay_ms: u64,
    ) -> SharedClock {
        let requested = PolitenessClock::new(crawl_delay_millis, minimum_delay_ms);

        let clock = {
            let mut clocks = self.clocks.lock().await;
            Arc::clone(
                clocks
                    .entry(origin.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(requested.clone()))),
            )
        };

        {
            let mut shared = clock.lock().await;
            if requested.delay > shared.delay {
                shared.delay = requested.delay;
            }
        }

        clock
    }
}
