//! Fixed-window request limiting per client IP for the public contact forms.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Windows kept before expired ones are swept.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_hits: u32,
    period: Duration,
}

impl RateLimiter {
    pub fn new(max_hits: u32, period: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_hits,
            period,
        }
    }

    /// Counts a hit for `key`. `Err` carries the seconds until the window resets.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            let period = self.period;
            windows.retain(|_, w| now.duration_since(w.started) < period);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(window.started) >= self.period {
            *window = Window {
                started: now,
                hits: 0,
            };
        }

        window.hits += 1;
        if window.hits > self.max_hits {
            let remaining = self.period.saturating_sub(now.duration_since(window.started));
            return Err(remaining.as_secs().max(1));
        }
        Ok(())
    }
}

/// The peer address. The first `x-forwarded-for` hop wins only when the
/// proxy in front is trusted, since clients can set the header freely.
pub fn client_ip(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn limit_contact_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request, state.config.trust_proxy);
    if let Err(retry_after_secs) = state.contact_limiter.check(&ip) {
        warn!("Contact form rate limit hit by {ip}");
        return Err(AppError::TooManyRequests { retry_after_secs });
    }
    Ok(next.run(request).await)
}
