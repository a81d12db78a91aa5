use serde::Serialize;

use crate::credential::models::MailMessage;

/// Wire body posted to the mail relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub payload: serde_json::Value,
}

impl SendMailRequest {
    pub fn new(sender: &str, message: &MailMessage) -> Self {
        Self {
            from: sender.to_string(),
            to: message
                .recipients
                .iter()
                .map(|r| r.as_str().to_string())
                .collect(),
            subject: message.subject.clone(),
            payload: message.payload.clone(),
        }
    }
}
