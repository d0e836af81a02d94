//! Best-effort outbound mail via the SendGrid v3 API.
//!
//! Delivery is strictly fire-and-forget: callers spawn the send and the
//! request that triggered it succeeds regardless of the outcome. When no
//! API key is configured the mailer is disabled and sends are skipped.

use reqwest::Client;
use serde_json::json;

/// SendGrid v3 mail-send endpoint.
const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Outbound mail configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SendGrid API key. `None` disables outbound mail entirely.
    pub sendgrid_api_key: Option<String>,
    /// Verified sender address.
    pub from_address: String,
}

impl MailConfig {
    /// Load mail configuration from environment variables.
    ///
    /// | Env Var            | Default                |
    /// |--------------------|------------------------|
    /// | `SENDGRID_API_KEY` | unset (mail disabled)  |
    /// | `MAIL_FROM`        | `noreply@cpms.local`   |
    pub fn from_env() -> Self {
        Self {
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@cpms.local".into()),
        }
    }
}

/// Thin SendGrid client. Cheap to clone; holds a pooled HTTP client.
pub struct Mailer {
    client: Client,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Notify a supervisor that a group requested to join their proposal.
    ///
    /// Callers must treat this as best-effort: spawn it and log failures,
    /// never propagate them.
    pub async fn send_join_request_notification(
        &self,
        to_email: &str,
        proposal_title: &str,
        group_info: &str,
    ) -> Result<(), reqwest::Error> {
        let Some(api_key) = &self.config.sendgrid_api_key else {
            tracing::debug!(to = %to_email, "Mail delivery disabled, skipping join-request email");
            return Ok(());
        };

        let html = format!(
            "<h2>New Join Request</h2>\
             <p>A group has requested to join your proposal: <strong>{proposal_title}</strong>.</p>\
             <p>Group Info: {group_info}</p>\
             <p>Please review the request in your dashboard.</p>"
        );

        let body = json!({
            "personalizations": [{ "to": [{ "email": to_email }] }],
            "from": { "email": self.config.from_address },
            "subject": "New Join Request for Your Proposal",
            "content": [{ "type": "text/html", "value": html }],
        });

        self.client
            .post(SENDGRID_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
