//! Best-effort email/SMS relay for new bookings and contact inquiries.
//!
//! Every send is fire-and-forget: spawned onto the runtime, failures logged
//! and swallowed. Nothing here may block or fail a booking.

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

/// What the operator needs to see about a fresh booking request.
#[derive(Debug, Clone)]
pub struct NewBookingAlert {
    pub booking_id: i64,
    pub service_name: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub start_local: String,
    pub pet_count: u32,
    pub total_cents: i64,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    email: Option<EmailConfig>,
    sms: Option<SmsConfig>,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

fn dollars(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, (cents % 100).abs())
}

impl Notifier {
    /// Reads the optional notifier env vars. Either channel may be absent;
    /// a fully unconfigured notifier is valid and does nothing.
    pub fn from_env() -> Self {
        let email = match (
            std::env::var("EMAIL_API_KEY"),
            std::env::var("NOTIFY_EMAIL_FROM"),
            std::env::var("NOTIFY_EMAIL_TO"),
        ) {
            (Ok(api_key), Ok(from), Ok(to)) => Some(EmailConfig { api_key, from, to }),
            _ => None,
        };
        let sms = match (
            std::env::var("TWILIO_ACCOUNT_SID"),
            std::env::var("TWILIO_AUTH_TOKEN"),
            std::env::var("TWILIO_FROM_NUMBER"),
            std::env::var("NOTIFY_SMS_TO"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from), Ok(to)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from,
                to,
            }),
            _ => None,
        };

        if email.is_none() && sms.is_none() {
            tracing::warn!("no notifier configured — booking alerts will only be logged");
        }

        Self {
            http: reqwest::Client::new(),
            email,
            sms,
        }
    }

    /// Alert the operator about a new booking. Returns immediately; sends
    /// run on their own task.
    pub fn spawn_new_booking(&self, alert: NewBookingAlert) {
        let subject = format!("New booking request #{}", alert.booking_id);
        let body = format!(
            "{} — {}\nWhen: {}\nPets: {}\nEstimated total: {}\nContact: {} / {}\nNotes: {}",
            alert.customer_name,
            alert.service_name,
            alert.start_local,
            alert.pet_count,
            dollars(alert.total_cents),
            alert.email,
            alert.phone,
            alert.notes,
        );
        let sms = format!(
            "New booking: {} for {} on {} ({})",
            alert.customer_name,
            alert.service_name,
            alert.start_local,
            dollars(alert.total_cents),
        );
        self.spawn_all(subject, body, sms);
    }

    /// Relay a contact-form inquiry.
    pub fn spawn_inquiry(&self, name: String, email: String, message: String) {
        let subject = format!("New inquiry from {name}");
        let body = format!("Name: {name}\nEmail: {email}\n\n{message}");
        let mut preview = message;
        preview.truncate(300);
        let sms = format!("New inquiry: {name} <{email}>\n{preview}");
        self.spawn_all(subject, body, sms);
    }

    fn spawn_all(&self, subject: String, body: String, sms_body: String) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Some(cfg) = &this.email {
                if let Err(e) = this.send_email(cfg, &subject, &body).await {
                    tracing::error!("email notification failed: {e}");
                }
            }
            if let Some(cfg) = &this.sms {
                if let Err(e) = this.send_sms(cfg, &sms_body).await {
                    tracing::error!("sms notification failed: {e}");
                }
            }
            if this.email.is_none() && this.sms.is_none() {
                tracing::info!("notification (unconfigured): {subject}");
            }
        });
    }

    async fn send_email(&self, cfg: &EmailConfig, subject: &str, text: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .post("https://api.resend.com/emails")
            .bearer_auth(&cfg.api_key)
            .json(&EmailPayload {
                from: &cfg.from,
                to: &cfg.to,
                subject,
                text,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("email API error: {status} - {detail}");
        }
        Ok(())
    }

    async fn send_sms(&self, cfg: &SmsConfig, body: &str) -> anyhow::Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            cfg.account_sid
        );
        let resp = self
            .http
            .post(&url)
            .basic_auth(&cfg.account_sid, Some(&cfg.auth_token))
            .form(&[("To", cfg.to.as_str()), ("From", cfg.from.as_str()), ("Body", body)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("Twilio API error: {status} - {detail}");
        }
        Ok(())
    }
}
