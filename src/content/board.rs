use serde::Deserialize;

use super::trimmed;
use crate::error::ApiError;

/// 新增编委会成员的请求体
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub affiliation: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub title: String,
    pub affiliation: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub order_index: i32,
}

impl MemberInput {
    pub fn validate(self) -> Result<NewMember, ApiError> {
        match (
            trimmed(self.name),
            trimmed(self.title),
            trimmed(self.affiliation),
        ) {
            (Some(name), Some(title), Some(affiliation)) => Ok(NewMember {
                name,
                title,
                affiliation,
                email: trimmed(self.email).map(|e| e.to_lowercase()),
                photo_url: trimmed(self.photo_url),
                bio: trimmed(self.bio),
                order_index: self.order_index.unwrap_or(0),
            }),
            _ => Err(ApiError::bad_request(
                "Name, title, and affiliation are required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_member() {
        let input: MemberInput = serde_json::from_value(serde_json::json!({
            "name": " Dr. Meera ",
            "title": "Chief Editor",
            "affiliation": "University of Pune",
            "email": " Meera@Example.ORG ",
            "photoUrl": "",
        }))
        .unwrap();

        let member = input.validate().unwrap();
        assert_eq!(member.name, "Dr. Meera");
        assert_eq!(member.email.as_deref(), Some("meera@example.org"));
        assert!(member.photo_url.is_none());
        assert_eq!(member.order_index, 0);
    }

    #[test]
    fn affiliation_is_required() {
        let input = MemberInput {
            name: Some("A".into()),
            title: Some("B".into()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
