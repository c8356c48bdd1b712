use serde::Deserialize;

use super::trimmed;
use crate::error::ApiError;

/// 注册请求
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
}

/// 校验通过的注册信息，密码尚未哈希
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
}

impl Registration {
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let password = self.password.filter(|p| !p.is_empty());
        match (
            trimmed(self.email),
            password,
            trimmed(self.first_name),
            trimmed(self.last_name),
        ) {
            (Some(email), Some(password), Some(first_name), Some(last_name)) => Ok(NewUser {
                email,
                password,
                first_name,
                last_name,
                phone: trimmed(self.phone),
                organization: trimmed(self.organization),
            }),
            _ => Err(ApiError::bad_request("Missing required fields")),
        }
    }
}

/// 登录请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// 返回 `(email, password)`
    pub fn validate(self) -> Result<(String, String), ApiError> {
        match (trimmed(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::bad_request("Email and password required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_requires_core_fields() {
        let reg: Registration = serde_json::from_value(serde_json::json!({
            "email": "  ada@example.org ",
            "password": "hunter2",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phone": "",
        }))
        .unwrap();

        let user = reg.validate().unwrap();
        assert_eq!(user.email, "ada@example.org");
        assert_eq!(user.first_name, "Ada");
        assert!(user.phone.is_none());
        assert!(user.organization.is_none());

        let missing: Registration =
            serde_json::from_value(serde_json::json!({ "email": "a@b.c", "password": "x" })).unwrap();
        let err = missing.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn credentials_require_both_fields() {
        let creds = Credentials {
            email: Some("a@b.c".into()),
            password: Some(String::new()),
        };
        assert!(creds.validate().is_err());

        let creds = Credentials {
            email: Some(" a@b.c".into()),
            password: Some(" secret ".into()),
        };
        assert_eq!(
            creds.validate().unwrap(),
            ("a@b.c".to_string(), " secret ".to_string())
        );
    }
}
