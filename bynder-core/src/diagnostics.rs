//! Connectivity check for the configured API user

use std::fmt;

use serde::Serialize;

use crate::client::RemoteAssetClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Info,
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub message: String,
}

impl StatusMessage {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Ask the API who we are and report whether that user is usable
pub async fn check_api_user(client: &dyn RemoteAssetClient) -> StatusMessage {
    match client.current_user().await {
        Ok(user) if user.active => StatusMessage::new(Severity::Ok, "User used for API is active."),
        Ok(_) => StatusMessage::new(Severity::Warning, "Current user is not an admin."),
        Err(e) => StatusMessage::new(Severity::Error, e.to_string()),
    }
}
