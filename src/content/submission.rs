use super::trimmed;
use crate::error::ApiError;

/// 按逗号拆分关键词，去除空白和空项
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// 投稿表单中的文本字段，按表单字段名逐个填充
#[derive(Debug, Default)]
pub struct SubmissionFields {
    title: Option<String>,
    summary: Option<String>,
    keywords: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_affiliation: Option<String>,
    mobile_number: Option<String>,
}

/// 校验通过的投稿信息
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_affiliation: String,
    pub mobile_number: Option<String>,
}

impl SubmissionFields {
    /// 记录一个表单字段，未知字段忽略
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "abstract" => &mut self.summary,
            "keywords" => &mut self.keywords,
            "authorName" => &mut self.author_name,
            "authorEmail" => &mut self.author_email,
            "authorAffiliation" => &mut self.author_affiliation,
            "mobileNumber" => &mut self.mobile_number,
            _ => return,
        };
        *slot = Some(value);
    }

    /// 标题、作者姓名、作者邮箱和稿件文件为必填
    pub fn validate(self, has_file: bool) -> Result<Submission, ApiError> {
        match (
            trimmed(self.title),
            trimmed(self.author_name),
            trimmed(self.author_email),
        ) {
            (Some(title), Some(author_name), Some(author_email)) if has_file => Ok(Submission {
                title,
                summary: trimmed(self.summary).unwrap_or_default(),
                keywords: parse_keywords(self.keywords.as_deref().unwrap_or_default()),
                author_name,
                author_email,
                author_affiliation: trimmed(self.author_affiliation).unwrap_or_default(),
                mobile_number: trimmed(self.mobile_number),
            }),
            _ => Err(ApiError::bad_request("Missing required fields")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SubmissionFields {
        let mut fields = SubmissionFields::default();
        fields.set("title", " On Rivers ".into());
        fields.set("abstract", "A study.".into());
        fields.set("keywords", "water, , poetry ,rivers,".into());
        fields.set("authorName", "R. Tagore".into());
        fields.set("authorEmail", "r@example.org".into());
        fields.set("unrelated", "ignored".into());
        fields
    }

    #[test]
    fn keywords_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(parse_keywords("a, b ,,c , "), vec!["a", "b", "c"]);
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ,").is_empty());
    }

    #[test]
    fn validates_complete_submission() {
        let submission = filled().validate(true).unwrap();
        assert_eq!(submission.title, "On Rivers");
        assert_eq!(submission.keywords, vec!["water", "poetry", "rivers"]);
        assert_eq!(submission.author_affiliation, "");
        assert!(submission.mobile_number.is_none());
    }

    #[test]
    fn file_is_required() {
        assert!(filled().validate(false).is_err());
    }

    #[test]
    fn blank_title_is_missing() {
        let mut fields = filled();
        fields.set("title", "   ".into());
        assert_eq!(
            fields.validate(true).unwrap_err().to_string(),
            "Missing required fields"
        );
    }
}
