use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MailConfig;
use crate::credential::errors::MailerError;
use crate::credential::models::MailMessage;
use crate::credential::ports::Mailer;
use crate::outbound::mail::messages::SendMailRequest;

#[derive(Debug, Error)]
pub enum HttpMailerError {
    #[error("Failed to reach mail relay: {0}")]
    Transport(String),

    #[error("Mail relay rejected message: {0}")]
    Rejected(String),
}

impl From<HttpMailerError> for MailerError {
    fn from(err: HttpMailerError) -> Self {
        MailerError::DeliveryFailed(err.to_string())
    }
}

/// Delivers mail by posting JSON to a relay's `/email` endpoint.
pub struct HttpMailer {
    http_client: reqwest::Client,
    endpoint: String,
    sender: String,
}

impl HttpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built
    pub fn new(config: &MailConfig) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        tracing::info!(relay = %config.base_url, "Mail relay client initialized");

        Ok(Self {
            http_client,
            endpoint: format!("{}/email", config.base_url.trim_end_matches('/')),
            sender: config.sender.clone(),
        })
    }

    async fn post(&self, request: &SendMailRequest) -> Result<(), HttpMailerError> {
        self.http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| HttpMailerError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| HttpMailerError::Rejected(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        let request = SendMailRequest::new(&self.sender, message);

        self.post(&request).await.map_err(|e| {
            tracing::error!(
                mail_subject = %message.subject,
                recipients = request.to.len(),
                error = %e,
                "Mail delivery failed"
            );
            MailerError::from(e)
        })?;

        tracing::debug!(mail_subject = %message.subject, "Mail handed to relay");
        Ok(())
    }
}
