use serde::Deserialize;

use super::trimmed;
use crate::error::ApiError;

const DEFAULT_SUBJECT: &str = "General Inquiry";

/// 联系表单
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
}

impl ContactInput {
    pub fn validate(self) -> Result<ContactMessage, ApiError> {
        match (trimmed(self.name), trimmed(self.email), trimmed(self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email: email.to_lowercase(),
                message,
                subject: trimmed(self.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
                phone: trimmed(self.phone),
                organization: trimmed(self.organization),
            }),
            _ => Err(ApiError::bad_request(
                "Name, email, and message are required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_defaults_and_email_is_lowercased() {
        let msg = ContactInput {
            name: Some("Asha".into()),
            email: Some(" ASHA@Example.com".into()),
            message: Some(" Hello ".into()),
            subject: Some("  ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(msg.email, "asha@example.com");
        assert_eq!(msg.message, "Hello");
        assert_eq!(msg.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn message_is_required() {
        let err = ContactInput {
            name: Some("Asha".into()),
            email: Some("asha@example.com".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Name, email, and message are required");
    }
}
