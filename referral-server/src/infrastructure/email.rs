use async_trait::async_trait;
use serde_json::json;

use crate::domain::error::DomainError;

/// Everything needed to render and address one referral invitation.
#[derive(Debug, Clone)]
pub struct ReferralInvite {
    pub to: String,
    pub username: String,
    pub code: i64,
    pub link: String,
    pub link_label: String,
}

/// Outbound referral mail. Callers dispatch on a detached task and never wait
/// for a delivery outcome.
#[async_trait]
pub trait ReferralMailer: Send + Sync {
    async fn send_referral_code(&self, invite: &ReferralInvite) -> Result<(), DomainError>;
}

pub fn render_referral_email(invite: &ReferralInvite) -> String {
    format!(
        concat!(
            "<div>",
            "<h1>Hello, {username}! Your referral code for registration:</h1>",
            "<h2>{code}</h2>",
            "<h3><a href=\"{link}\">{label}</a></h3>",
            "</div>"
        ),
        username = invite.username,
        code = invite.code,
        link = invite.link,
        label = invite.link_label,
    )
}

/// Mailer backed by an HTTP mail-provider API.
#[derive(Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(http: reqwest::Client, api_url: String, api_key: String, from: String) -> Self {
        Self {
            http,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl ReferralMailer for HttpMailer {
    async fn send_referral_code(&self, invite: &ReferralInvite) -> Result<(), DomainError> {
        let body = json!({
            "from": self.from,
            "to": invite.to,
            "subject": "Your referral code",
            "html": render_referral_email(invite),
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("mail provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "mail provider responded with {}",
                response.status()
            )));
        }
        Ok(())
    }
}
