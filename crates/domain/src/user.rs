use derive_more::{Deref, Display};

use crate::{CreateError, Name, ReadError, UpdateError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn get_users(&self) -> Result<Vec<User>, ReadError>;
    async fn create_user(
        &self,
        username: Name,
        email: String,
        password: String,
        role: Role,
    ) -> Result<User, CreateError>;
    async fn replace_user(&self, user: User) -> Result<User, UpdateError>;

    async fn validate_username(&self, username: &str, id: &UserID) -> Result<Name, ValidationError> {
        match Name::new(username) {
            Ok(username) => match self.get_users().await {
                Ok(users) => {
                    if users.iter().all(|u| {
                        u.id == *id
                            || !u
                                .username
                                .as_str()
                                .eq_ignore_ascii_case(username.as_str())
                    }) {
                        Ok(username)
                    } else {
                        Err(ValidationError::Conflict("username".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_users(&self) -> Result<Vec<User>, ReadError>;
    async fn create_user(
        &self,
        username: Name,
        email: String,
        password: String,
        role: Role,
    ) -> Result<User, CreateError>;
    async fn replace_user(&self, user: User) -> Result<User, UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub username: Name,
    pub email: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserID(String);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Parses a role name, falling back to [`Role::User`] for unknown names.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}
