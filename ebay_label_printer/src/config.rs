use std::{env, path::PathBuf, time::Duration};

use ebay_tools::{EbayApiConfig, EbayEnvironment};
use elp_common::{parse_boolean_flag, Secret};
use fulfillment_engine::PrinterTarget;
use thiserror::Error;

const DEFAULT_CUPS_SERVER_URI: &str = "192.168.8.194";
const DEFAULT_PRINTER_NAME: &str = "default";
const DEFAULT_POLLING_INTERVAL_SECS: u64 = 300;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {var}: {detail}")]
    InvalidValue { var: &'static str, detail: String },
}

/// Everything the process needs, resolved and validated before any component
/// starts. Reading the environment is the only side effect.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ebay: EbayApiConfig,
    pub printer: PrinterTarget,
    pub poll_interval: Duration,
    pub dry_run: bool,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|var| env::var(var).ok())
    }

    fn try_from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let client_id = required(&lookup, "EBAY_CLIENT_ID")?;
        let client_secret = Secret::new(required(&lookup, "EBAY_CLIENT_SECRET")?);
        let refresh_token = Secret::new(required(&lookup, "EBAY_REFRESH_TOKEN")?);
        let environment = match lookup("EBAY_ENVIRONMENT") {
            None => EbayEnvironment::Sandbox,
            Some(s) => s
                .parse::<EbayEnvironment>()
                .map_err(|detail| ConfigError::InvalidValue { var: "EBAY_ENVIRONMENT", detail })?,
        };
        let poll_interval = match lookup("POLLING_INTERVAL") {
            None => Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
            Some(s) => {
                let seconds = s.trim().parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                    var: "POLLING_INTERVAL",
                    detail: e.to_string(),
                })?;
                if seconds <= 0 {
                    return Err(ConfigError::InvalidValue {
                        var: "POLLING_INTERVAL",
                        detail: format!("must be positive, got {seconds}"),
                    });
                }
                Duration::from_secs(seconds as u64)
            },
        };
        let printer = PrinterTarget {
            server_uri: lookup("CUPS_SERVER_URI").unwrap_or_else(|| DEFAULT_CUPS_SERVER_URI.to_string()),
            printer_name: lookup("PRINTER_NAME").unwrap_or_else(|| DEFAULT_PRINTER_NAME.to_string()),
        };
        let dry_run = parse_boolean_flag(lookup("DRY_RUN"), false);
        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        Ok(Self {
            ebay: EbayApiConfig::new(environment, client_id, client_secret, refresh_token),
            printer,
            poll_interval,
            dry_run,
            data_dir,
        })
    }
}

fn required<F: Fn(&str) -> Option<String>>(lookup: &F, var: &'static str) -> Result<String, ConfigError> {
    lookup(var).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::MissingVar(var))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("EBAY_CLIENT_ID", "client".to_string()),
            ("EBAY_CLIENT_SECRET", "secret".to_string()),
            ("EBAY_REFRESH_TOKEN", "token".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::try_from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn minimal_environment_gets_the_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.ebay.environment, EbayEnvironment::Sandbox);
        assert_eq!(config.ebay.client_id, "client");
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.printer.printer_name, "default");
        assert!(!config.dry_run);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn missing_credentials_fail_loudly() {
        let mut env = base_env();
        env.remove("EBAY_REFRESH_TOKEN");
        match load(&env) {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, "EBAY_REFRESH_TOKEN"),
            other => panic!("expected MissingVar, got {other:?}"),
        }
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let mut env = base_env();
        env.insert("EBAY_CLIENT_ID", "   ".to_string());
        assert!(matches!(load(&env), Err(ConfigError::MissingVar("EBAY_CLIENT_ID"))));
    }

    #[test]
    fn non_positive_polling_intervals_are_rejected() {
        let mut env = base_env();
        env.insert("POLLING_INTERVAL", "0".to_string());
        assert!(matches!(load(&env), Err(ConfigError::InvalidValue { var: "POLLING_INTERVAL", .. })));
        env.insert("POLLING_INTERVAL", "-30".to_string());
        assert!(matches!(load(&env), Err(ConfigError::InvalidValue { var: "POLLING_INTERVAL", .. })));
    }

    #[test]
    fn full_environment_is_honored() {
        let mut env = base_env();
        env.insert("EBAY_ENVIRONMENT", "production".to_string());
        env.insert("POLLING_INTERVAL", "60".to_string());
        env.insert("CUPS_SERVER_URI", "printhost.local".to_string());
        env.insert("PRINTER_NAME", "labelwriter".to_string());
        env.insert("DRY_RUN", "true".to_string());
        env.insert("DATA_DIR", "/var/lib/elp".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.ebay.environment, EbayEnvironment::Production);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.printer.server_uri, "printhost.local");
        assert_eq!(config.printer.printer_name, "labelwriter");
        assert!(config.dry_run);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/elp"));
    }

    #[test]
    fn unknown_environments_are_rejected() {
        let mut env = base_env();
        env.insert("EBAY_ENVIRONMENT", "staging".to_string());
        assert!(matches!(load(&env), Err(ConfigError::InvalidValue { var: "EBAY_ENVIRONMENT", .. })));
    }
}
