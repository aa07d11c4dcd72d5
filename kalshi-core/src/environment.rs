//! Target environments for the Kalshi API

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KalshiError;

/// Production API host
pub const PRODUCTION_BASE_URL: &str = "https://api.elections.kalshi.com";
/// Demo (paper trading) API host
pub const DEMO_BASE_URL: &str = "https://demo-api.kalshi.co";

/// Path prefix shared by every REST endpoint
pub const API_PREFIX: &str = "/trade-api/v2";

/// Which Kalshi deployment a client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Demo,
}

impl Environment {
    /// Base URL (scheme and host only; paths carry the `/trade-api/v2` prefix)
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Demo => DEMO_BASE_URL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Demo => "demo",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Environment {
    type Err = KalshiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "demo" => Ok(Environment::Demo),
            _ => Err(KalshiError::validation(format!(
                "Environment must be 'production' or 'demo', got: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!("demo".parse::<Environment>().unwrap(), Environment::Demo);
        assert_eq!(
            " Production ".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);

        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(matches!(err, KalshiError::Validation(_)));
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(Environment::default(), Environment::Production);
        assert_eq!(Environment::Demo.base_url(), "https://demo-api.kalshi.co");
        assert!(!Environment::Production.base_url().ends_with('/'));
    }
}
