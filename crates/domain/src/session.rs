use crate::{CreateError, DeleteError, Name, ReadError, UpdateError, User, ValidationError};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn login(&self, username: &str, password: &str) -> Result<User, ReadError>;
    async fn register(
        &self,
        username: Name,
        email: String,
        password: String,
    ) -> Result<User, CreateError>;
    async fn get_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
    async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), UpdateError>;
    async fn request_password_reset(&self, email: String) -> Result<(), UpdateError>;
    async fn reset_password(&self, token: String, new_password: String)
    -> Result<(), UpdateError>;

    fn validate_password(&self, password: &str) -> Result<String, ValidationError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::Other(
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters").into(),
            ));
        }
        Ok(password.to_string())
    }

    fn validate_email(&self, email: &str) -> Result<String, ValidationError> {
        let email = email.trim();
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(email.to_string())
            }
            _ => Err(ValidationError::Other("Invalid email address".into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn login(&self, username: &str, password: &str) -> Result<User, ReadError>;
    async fn register(
        &self,
        username: Name,
        email: String,
        password: String,
    ) -> Result<User, CreateError>;
    async fn initialize_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
    async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), UpdateError>;
    async fn request_password_reset(&self, email: String) -> Result<(), UpdateError>;
    async fn reset_password(&self, token: String, new_password: String)
    -> Result<(), UpdateError>;
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    struct Session;

    impl SessionService for Session {
        async fn login(&self, _: &str, _: &str) -> Result<User, ReadError> {
            Err(ReadError::NotFound)
        }

        async fn register(&self, _: Name, _: String, _: String) -> Result<User, CreateError> {
            Err(CreateError::Conflict)
        }

        async fn get_session(&self) -> Result<User, ReadError> {
            Err(ReadError::NotFound)
        }

        async fn delete_session(&self) -> Result<(), DeleteError> {
            Ok(())
        }

        async fn change_password(&self, _: String, _: String) -> Result<(), UpdateError> {
            Ok(())
        }

        async fn request_password_reset(&self, _: String) -> Result<(), UpdateError> {
            Ok(())
        }

        async fn reset_password(&self, _: String, _: String) -> Result<(), UpdateError> {
            Ok(())
        }
    }

    #[rstest]
    #[case("secret", true)]
    #[case("correct horse", true)]
    #[case("12345", false)]
    #[case("", false)]
    fn test_validate_password(#[case] password: &str, #[case] valid: bool) {
        assert_eq!(Session.validate_password(password).is_ok(), valid);
    }

    #[rstest]
    #[case("alice@example.org", Some("alice@example.org"))]
    #[case("  bob@example.org ", Some("bob@example.org"))]
    #[case("alice", None)]
    #[case("@example.org", None)]
    #[case("alice@", None)]
    #[case("a@b@c", None)]
    fn test_validate_email(#[case] email: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            Session.validate_email(email).ok().as_deref(),
            expected
        );
    }
}
