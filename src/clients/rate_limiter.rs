use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{sleep_until, Instant},
};

// Stand-in for an admission instant beyond what `Instant` can represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, thiserror::Error)]
pub enum RateLimiterError {
    #[error("invalid rate limit: {0} requests per second")]
    InvalidRate(f64),
}

/// Token bucket admitting one request every `1 / requests_per_second` seconds.
///
/// The bucket holds a single token, so idle periods never build up a burst. A single instance is
/// shared by the beacon and execution clients, making it the only admission point for upstream
/// traffic.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    // Earliest instant at which the next request may be dispatched.
    next_admission: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Result<Self, RateLimiterError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(RateLimiterError::InvalidRate(requests_per_second));
        }

        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .map_err(|_| RateLimiterError::InvalidRate(requests_per_second))?;

        Ok(Self {
            interval,
            next_admission: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a token is available and consumes it.
    ///
    /// Cancel safe: dropping the returned future while it waits releases the queue position
    /// without consuming a token.
    pub async fn acquire(&self) {
        let mut next_admission = self.next_admission.lock().await;
        let now = Instant::now();

        let admitted_at = match *next_admission {
            Some(at) if at > now => {
                sleep_until(at).await;

                at
            }
            _ => now,
        };

        *next_admission = Some(
            admitted_at
                .checked_add(self.interval)
                .unwrap_or_else(|| admitted_at + FAR_FUTURE),
        );
    }
}
