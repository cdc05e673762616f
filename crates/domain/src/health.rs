use crate::ReadError;

#[allow(async_fn_in_trait)]
pub trait HealthService {
    async fn get_health(&self) -> Result<Health, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait HealthRepository {
    async fn read_health(&self) -> Result<Health, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

impl Health {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ok", true)]
    #[case("OK", true)]
    #[case("degraded", false)]
    fn test_health_is_ok(#[case] status: &str, #[case] expected: bool) {
        assert_eq!(
            Health {
                status: status.to_string()
            }
            .is_ok(),
            expected
        );
    }
}
