//! Custom tracing layer that texts ERROR-level events to the operator.
//!
//! - Rate limiting: at most 1 message per `MIN_INTERVAL`
//! - Deduplication: identical error texts are suppressed for `DEDUP_WINDOW`
//! - Non-blocking: the HTTP send is spawned onto the Tokio runtime

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::notify::SmsConfig;

/// Minimum interval between alert texts (prevents spam on cascading errors).
const MIN_INTERVAL: Duration = Duration::from_secs(10);
/// Window during which identical error hashes are suppressed.
const DEDUP_WINDOW: Duration = Duration::from_secs(60);

/// A `tracing` layer that forwards ERROR events to the operator by SMS.
pub struct SmsAlertLayer {
    sms: SmsConfig,
    http: reqwest::Client,
    state: Mutex<AlertState>,
}

struct AlertState {
    last_sent: Instant,
    /// (hash, inserted_at) of recently sent error texts.
    recent: Vec<(u64, Instant)>,
}

impl SmsAlertLayer {
    pub fn new(sms: SmsConfig) -> Self {
        Self {
            sms,
            http: reqwest::Client::new(),
            state: Mutex::new(AlertState {
                last_sent: Instant::now() - MIN_INTERVAL, // allow first message immediately
                recent: Vec::new(),
            }),
        }
    }

    fn should_send(&self, hash: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();

        state
            .recent
            .retain(|(_, ts)| now.duration_since(*ts) < DEDUP_WINDOW);

        let is_dup = state.recent.iter().any(|(h, _)| *h == hash);
        let too_soon = now.duration_since(state.last_sent) < MIN_INTERVAL;
        if is_dup || too_soon {
            return false;
        }
        state.last_sent = now;
        state.recent.push((hash, now));
        true
    }
}

impl<S: Subscriber> Layer<S> for SmsAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = visitor.message();

        let hash = {
            let mut h = DefaultHasher::new();
            message.hash(&mut h);
            h.finish()
        };
        if !self.should_send(hash) {
            return;
        }

        let target = event.metadata().target();
        let now_utc = chrono::Utc::now().format("%H:%M:%S UTC");
        let text = format!("[millies-server error] {message} ({target}, {now_utc})");

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.sms.account_sid
        );
        let client = self.http.clone();
        let sms = self.sms.clone();

        tokio::spawn(async move {
            let _ = client
                .post(&url)
                .basic_auth(&sms.account_sid, Some(&sms.auth_token))
                .form(&[
                    ("To", sms.to.as_str()),
                    ("From", sms.from.as_str()),
                    ("Body", text.as_str()),
                ])
                .send()
                .await;
        });
    }
}

// ── Field visitor ──

/// Collects the `message` field plus any structured fields from an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl MessageVisitor {
    fn message(&self) -> String {
        if self.fields.is_empty() {
            return self.message.clone();
        }
        let extras: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if self.message.is_empty() {
            extras.join(", ")
        } else {
            format!("{} ({})", self.message, extras.join(", "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let val = format!("{:?}", value);
        if field.name() == "message" {
            self.message = val;
        } else {
            self.fields.push((field.name().to_string(), val));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn make_layer() -> SmsAlertLayer {
        SmsAlertLayer::new(SmsConfig {
            account_sid: "ACfake".into(),
            auth_token: "fake".into(),
            from: "+10000000000".into(),
            to: "+19999999999".into(),
        })
    }

    #[test]
    fn test_first_alert_allowed() {
        let layer = make_layer();
        assert!(layer.should_send(111));
    }

    #[test]
    fn test_rate_limit_suppresses_second() {
        let layer = make_layer();
        assert!(layer.should_send(111));
        // Different hash but within the rate-limit interval.
        assert!(!layer.should_send(222));
    }

    #[test]
    fn test_dedup_same_message() {
        let layer = make_layer();
        assert!(layer.should_send(111));
        {
            let mut s = layer.state.lock().unwrap();
            s.last_sent = Instant::now() - MIN_INTERVAL;
        }
        assert!(!layer.should_send(111));
    }

    #[test]
    fn test_different_errors_sent_after_interval() {
        let layer = make_layer();
        assert!(layer.should_send(111));
        {
            let mut s = layer.state.lock().unwrap();
            s.last_sent = Instant::now() - MIN_INTERVAL;
        }
        assert!(layer.should_send(222));
    }

    #[test]
    fn test_dedup_expires_after_window() {
        let layer = make_layer();
        assert!(layer.should_send(111));
        {
            let mut s = layer.state.lock().unwrap();
            s.last_sent = Instant::now() - MIN_INTERVAL;
            s.recent.clear();
            s.recent
                .push((111, Instant::now() - DEDUP_WINDOW - Duration::from_secs(1)));
        }
        assert!(layer.should_send(111));
    }

    #[test]
    fn test_visitor_message_only() {
        let mut v = MessageVisitor::default();
        v.message = "Something failed".into();
        assert_eq!(v.message(), "Something failed");
    }

    #[test]
    fn test_visitor_message_with_fields() {
        let mut v = MessageVisitor::default();
        v.message = "DB error".into();
        v.fields.push(("booking_id".into(), "42".into()));
        assert_eq!(v.message(), "DB error (booking_id=42)");
    }

    #[test]
    fn test_visitor_fields_only() {
        let v = MessageVisitor {
            message: String::new(),
            fields: vec![("error".into(), "timeout".into())],
        };
        assert_eq!(v.message(), "error=timeout");
    }
}
