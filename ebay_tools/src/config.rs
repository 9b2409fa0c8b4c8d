use std::{fmt, fmt::Display, str::FromStr};

use elp_common::Secret;

pub const SANDBOX_API_HOST: &str = "api.sandbox.ebay.com";
pub const PRODUCTION_API_HOST: &str = "api.ebay.com";

/// eBay runs two fully isolated API environments with separate credential sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EbayEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl EbayEnvironment {
    pub fn api_host(&self) -> &'static str {
        match self {
            EbayEnvironment::Sandbox => SANDBOX_API_HOST,
            EbayEnvironment::Production => PRODUCTION_API_HOST,
        }
    }
}

impl Display for EbayEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EbayEnvironment::Sandbox => write!(f, "sandbox"),
            EbayEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for EbayEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(EbayEnvironment::Sandbox),
            "production" => Ok(EbayEnvironment::Production),
            other => Err(format!("'{other}' is not a valid eBay environment. Use 'sandbox' or 'production'.")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EbayApiConfig {
    pub environment: EbayEnvironment,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,
}

impl EbayApiConfig {
    pub fn new(
        environment: EbayEnvironment,
        client_id: String,
        client_secret: Secret<String>,
        refresh_token: Secret<String>,
    ) -> Self {
        Self { environment, client_id, client_secret, refresh_token }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("https://{}{path}", self.environment.api_host())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn environment_parsing() {
        assert_eq!("sandbox".parse::<EbayEnvironment>().unwrap(), EbayEnvironment::Sandbox);
        assert_eq!(" Production ".parse::<EbayEnvironment>().unwrap(), EbayEnvironment::Production);
        assert!("prod".parse::<EbayEnvironment>().is_err());
    }

    #[test]
    fn urls_follow_the_environment() {
        let mut config = EbayApiConfig::default();
        assert_eq!(config.api_url("/sell/fulfillment/v1/order"), "https://api.sandbox.ebay.com/sell/fulfillment/v1/order");
        config.environment = EbayEnvironment::Production;
        assert_eq!(config.api_url("/sell/fulfillment/v1/order"), "https://api.ebay.com/sell/fulfillment/v1/order");
    }
}
