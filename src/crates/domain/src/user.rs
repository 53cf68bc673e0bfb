use super::value::{UserId, UserRef};

/// 用户
///
/// 邮箱唯一，是所有参与度操作对外使用的用户标识。
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,       // 用户唯一标识符
    pub email: String,    // 用户电子邮件地址，唯一
}

impl User {
    pub fn new(id: UserId, email: &str) -> Self {
        User {
            id,
            email: String::from(email),
        }
    }

    pub fn matches(&self, user: &UserRef) -> bool {
        match user {
            UserRef::Id(id) => self.id == *id,
            UserRef::Email(email) => self.email == *email,
        }
    }
}
