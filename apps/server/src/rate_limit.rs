use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::ErrorBody;

type TierMap = DashMap<&'static str, (TierConfig, DashMap<IpAddr, VecDeque<Instant>>)>;

/// Limits for a single named tier.
#[derive(Debug, Clone, Copy)]
pub struct TierConfig {
    /// Maximum requests allowed within the sliding window.
    pub max_requests: u32,
    /// Duration of the sliding window.
    pub window: Duration,
}

/// In-memory per-IP sliding-window rate limiter.
///
/// Each tier ("public", "booking", ...) carries its own config and tracking
/// map keyed by client IP, holding recent request timestamps.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tiers: Arc<TierMap>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            tiers: Arc::new(DashMap::new()),
        }
    }

    pub fn add_tier(&self, name: &'static str, config: TierConfig) {
        self.tiers.insert(name, (config, DashMap::new()));
    }

    /// Returns `Ok(())` when the request is allowed, `Err(retry_after_secs)`
    /// when the tier's budget for this IP is exhausted.
    pub fn check(&self, tier: &'static str, ip: IpAddr) -> Result<(), u64> {
        let tier_entry = self.tiers.get(tier).expect("unknown rate limit tier");
        let (config, ip_map) = tier_entry.value();
        let now = Instant::now();

        let mut recent = ip_map.entry(ip).or_default();
        while let Some(front) = recent.front() {
            if now.duration_since(*front) >= config.window {
                recent.pop_front();
            } else {
                break;
            }
        }

        if recent.len() >= config.max_requests as usize {
            let oldest = recent.front().copied().unwrap_or(now);
            let retry_after = (oldest + config.window)
                .saturating_duration_since(now)
                .as_secs()
                .max(1);
            return Err(retry_after);
        }

        recent.push_back(now);
        Ok(())
    }

    /// Drop IPs whose newest timestamp is older than 2x the tier window.
    /// Run periodically from a background task.
    pub fn cleanup(&self) {
        let now = Instant::now();
        for tier_entry in self.tiers.iter() {
            let (config, ip_map) = tier_entry.value();
            let cutoff = config.window * 2;
            ip_map.retain(|_ip, timestamps| {
                timestamps
                    .back()
                    .is_some_and(|t| now.duration_since(*t) < cutoff)
            });
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Client IP from X-Forwarded-For (reverse proxy) or the socket address.
pub fn extract_client_ip(req: &Request) -> IpAddr {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return ip;
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

fn too_many_requests(retry_after: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("Retry-After", retry_after.to_string())],
        Json(ErrorBody::new(format!(
            "Too many requests. Try again in {retry_after} seconds"
        ))),
    )
        .into_response()
}

async fn limit_by(
    limiter: RateLimiter,
    tier: &'static str,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_client_ip(&req);
    limiter.check(tier, ip).map_err(too_many_requests)?;
    Ok(next.run(req).await)
}

// ── Middleware functions (one per tier) ──

/// Public read-only endpoints (60 req/min).
pub async fn rate_limit_public(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    limit_by(limiter, "public", req, next).await
}

/// Booking creation (5 req/5min, strictest).
pub async fn rate_limit_booking(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    limit_by(limiter, "booking", req, next).await
}

/// Contact form and review submission (3 req/10min).
pub async fn rate_limit_contact(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    limit_by(limiter, "contact", req, next).await
}

/// Admin dashboard endpoints (120 req/min).
pub async fn rate_limit_admin(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    limit_by(limiter, "admin", req, next).await
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread::sleep;

    fn test_ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn limiter(max: u32, window: Duration) -> RateLimiter {
        let l = RateLimiter::new();
        l.add_tier(
            "test",
            TierConfig {
                max_requests: max,
                window,
            },
        );
        l
    }

    #[test]
    fn test_allows_under_limit() {
        let l = limiter(3, Duration::from_secs(60));
        let ip = test_ip(1);
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_ok());
    }

    #[test]
    fn test_rejects_over_limit() {
        let l = limiter(2, Duration::from_secs(60));
        let ip = test_ip(1);
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_err());
    }

    #[test]
    fn test_retry_after_is_bounded_by_window() {
        let l = limiter(1, Duration::from_secs(60));
        let ip = test_ip(1);
        l.check("test", ip).unwrap();
        let retry_after = l.check("test", ip).unwrap_err();
        assert!((1..=60).contains(&retry_after));
    }

    #[test]
    fn test_ips_tracked_independently() {
        let l = limiter(1, Duration::from_secs(60));
        assert!(l.check("test", test_ip(1)).is_ok());
        assert!(l.check("test", test_ip(1)).is_err());
        assert!(l.check("test", test_ip(2)).is_ok());
    }

    #[test]
    fn test_tiers_tracked_independently() {
        let l = limiter(1, Duration::from_secs(60));
        l.add_tier(
            "other",
            TierConfig {
                max_requests: 1,
                window: Duration::from_secs(60),
            },
        );
        let ip = test_ip(1);
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_err());
        assert!(l.check("other", ip).is_ok());
    }

    #[test]
    fn test_window_expiry_allows_again() {
        let l = limiter(1, Duration::from_millis(80));
        let ip = test_ip(1);
        assert!(l.check("test", ip).is_ok());
        assert!(l.check("test", ip).is_err());

        sleep(Duration::from_millis(120));

        assert!(l.check("test", ip).is_ok());
    }

    #[test]
    fn test_cleanup_removes_stale_ips() {
        let l = limiter(10, Duration::from_millis(40));
        let ip = test_ip(1);
        l.check("test", ip).unwrap();

        sleep(Duration::from_millis(100)); // past 2x window
        l.cleanup();

        assert!(l.check("test", ip).is_ok());
    }

    #[test]
    fn test_cleanup_keeps_active_ips() {
        let l = limiter(2, Duration::from_secs(60));
        let ip = test_ip(1);
        l.check("test", ip).unwrap();

        l.cleanup();

        l.check("test", ip).unwrap();
        assert!(l.check("test", ip).is_err()); // both requests still counted
    }
}
