use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{content::Role, error::Result};

/// 令牌有效期
const TOKEN_TTL: Duration = Duration::days(7);

/// 令牌中携带的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// 从当前时间起算 7 天有效
    pub fn new(id: Uuid, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            role,
            iat: now.timestamp(),
            exp: (now + TOKEN_TTL).timestamp(),
        }
    }
}

/// HS256 签名密钥
#[derive(Clone)]
pub struct Keys(Arc<KeysInner>);

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self(Arc::new(KeysInner {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.0.encoding)?;
        Ok(token)
    }

    /// 校验签名和有效期
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.0.decoding, &self.0.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let keys = Keys::new(b"test-secret");
        let claims = Claims::new(Uuid::new_v4(), "ada@example.org", Role::Editor);
        let token = keys.sign(&claims).unwrap();

        assert_eq!(keys.verify(&token).unwrap(), claims);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL.num_seconds());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.org", Role::User);
        let token = Keys::new(b"one").sign(&claims).unwrap();
        assert!(Keys::new(b"two").verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = Keys::new(b"test-secret");
        let mut claims = Claims::new(Uuid::new_v4(), "ada@example.org", Role::User);
        claims.iat -= TOKEN_TTL.num_seconds() * 2;
        claims.exp = claims.iat + 60;
        let token = keys.sign(&claims).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
