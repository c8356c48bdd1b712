use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{Claims, Keys};
use crate::error::{ApiError, Error};

/// 解析 `Authorization: Bearer <token>` 头
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    (scheme == "Bearer" && !token.is_empty()).then_some(token)
}

fn claims_of<S>(parts: &Parts, state: &S) -> Option<Claims>
where
    Keys: FromRef<S>,
{
    let token = bearer_token(parts)?;
    Keys::from_ref(state).verify(token).ok()
}

/// 已登录用户，缺少或无效的令牌返回 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    Keys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        claims_of(parts, state)
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthorized.into())
    }
}

/// 编辑部成员（管理员或编辑），其他角色返回 403
#[derive(Debug, Clone)]
pub struct Staff(pub Claims);

impl<S> FromRequestParts<S> for Staff
where
    Keys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if claims.role.is_staff() {
            Ok(Staff(claims))
        } else {
            Err(ApiError::Forbidden("Forbidden").into())
        }
    }
}

/// 可选登录，令牌缺失或无效时为 `None`
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    Keys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(claims_of(parts, state)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn parses_bearer_scheme_only() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
