use std::fmt::{self, Display};

// Helper macro to define aggregate ID newtypes and common trait impls
macro_rules! define_id {
    ($name:ident $(, $extra:ident)*) => {
        #[derive(Debug, Clone, Copy, PartialEq $(, $extra)*)]
        pub struct $name(i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// 排序视图需要按 id 升序打破平局，所以歌曲和用户 id 都要求全序
define_id!(SongId, Eq, Hash, PartialOrd, Ord);
define_id!(UserId, Eq, Hash, PartialOrd, Ord);
define_id!(ArtistId, Eq, Hash);
define_id!(AlbumId, Eq, Hash);

/// 调用方引用用户的方式：内部 id 或者对外使用的邮箱
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    Id(UserId),
    Email(String),
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        UserRef::Id(id)
    }
}

impl From<&str> for UserRef {
    fn from(email: &str) -> Self {
        UserRef::Email(email.to_string())
    }
}

impl From<String> for UserRef {
    fn from(email: String) -> Self {
        UserRef::Email(email)
    }
}

impl Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "id={}", id),
            UserRef::Email(email) => write!(f, "email={}", email),
        }
    }
}
