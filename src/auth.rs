mod extract;
mod password;
mod token;

pub use self::{
    extract::{AuthUser, MaybeAuthUser, Staff, bearer_token},
    password::{hash_password, verify_password},
    token::{Claims, Keys},
};
