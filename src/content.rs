mod account;
mod board;
mod contact;
mod status;
mod submission;

pub use self::{
    account::{Credentials, NewUser, Registration},
    board::{MemberInput, NewMember},
    contact::{ContactInput, ContactMessage},
    status::{ArticleStatus, Role},
    submission::{Submission, SubmissionFields, parse_keywords},
};

/// 去除首尾空白，空串视为缺失
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
