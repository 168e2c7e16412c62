//! Application settings loaded via OrthoConfig.
//!
//! Every field is optional. Missing upstream credentials switch the matching
//! adapter to its unconfigured or fixture variant instead of failing startup.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_STRIPE_ENDPOINT: &str = "https://api.stripe.com/";
const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 20;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid {field} URL {value:?}: {source}")]
    Endpoint {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Process configuration, read from `MASSEURPRO_*` environment variables,
/// configuration files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MASSEURPRO")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps state in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_endpoint: Option<String>,
    /// Timeout for a single generative-AI call, in seconds.
    #[ortho_config(default = 30)]
    pub ai_timeout_secs: u64,
    pub stripe_secret_key: Option<String>,
    pub stripe_gold_price_id: Option<String>,
    pub stripe_platinum_price_id: Option<String>,
    pub stripe_endpoint: Option<String>,
    /// Identity Toolkit web API key. Without it development accounts are used.
    pub firebase_api_key: Option<String>,
    pub identity_endpoint: Option<String>,
    /// Timeout for payment and identity calls, in seconds.
    #[ortho_config(default = 20)]
    pub upstream_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            db_max_connections: None,
            gemini_api_key: None,
            gemini_model: None,
            gemini_endpoint: None,
            ai_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            stripe_secret_key: None,
            stripe_gold_price_id: None,
            stripe_platinum_price_id: None,
            stripe_endpoint: None,
            firebase_api_key: None,
            identity_endpoint: None,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

fn endpoint(field: &'static str, value: Option<&str>, default: &str) -> Result<Url, SettingsError> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    Url::parse(raw).map_err(|source| SettingsError::Endpoint {
        field,
        value: raw.to_owned(),
        source,
    })
}

fn secret(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppSettings {
    /// Parsed listen address.
    ///
    /// # Examples
    /// ```
    /// use masseurpro::settings::AppSettings;
    ///
    /// let settings = AppSettings::default();
    /// assert_eq!(settings.bind_addr().unwrap().port(), 8080);
    /// ```
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        secret(self.database_url.as_ref())
    }

    pub fn gemini_api_key(&self) -> Option<&str> {
        secret(self.gemini_api_key.as_ref())
    }

    pub fn gemini_model(&self) -> &str {
        secret(self.gemini_model.as_ref()).unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn gemini_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "gemini_endpoint",
            self.gemini_endpoint.as_deref(),
            DEFAULT_GEMINI_ENDPOINT,
        )
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    pub fn stripe_secret_key(&self) -> Option<&str> {
        secret(self.stripe_secret_key.as_ref())
    }

    pub fn stripe_gold_price_id(&self) -> Option<&str> {
        secret(self.stripe_gold_price_id.as_ref())
    }

    pub fn stripe_platinum_price_id(&self) -> Option<&str> {
        secret(self.stripe_platinum_price_id.as_ref())
    }

    pub fn stripe_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "stripe_endpoint",
            self.stripe_endpoint.as_deref(),
            DEFAULT_STRIPE_ENDPOINT,
        )
    }

    pub fn firebase_api_key(&self) -> Option<&str> {
        secret(self.firebase_api_key.as_ref())
    }

    pub fn identity_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            "identity_endpoint",
            self.identity_endpoint.as_deref(),
            DEFAULT_IDENTITY_ENDPOINT,
        )
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "MASSEURPRO_BIND_ADDR",
        "MASSEURPRO_DATABASE_URL",
        "MASSEURPRO_GEMINI_API_KEY",
        "MASSEURPRO_GEMINI_MODEL",
        "MASSEURPRO_AI_TIMEOUT_SECS",
        "MASSEURPRO_UPSTREAM_TIMEOUT_SECS",
        "MASSEURPRO_STRIPE_SECRET_KEY",
        "MASSEURPRO_FIREBASE_API_KEY",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("masseurpro")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.gemini_api_key().is_none());
        assert_eq!(settings.gemini_model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(settings.ai_timeout(), Duration::from_secs(30));
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(20));
        assert_eq!(
            settings.stripe_endpoint().expect("url").as_str(),
            DEFAULT_STRIPE_ENDPOINT
        );
        assert!(settings.firebase_api_key().is_none());
    }

    #[rstest]
    fn loaded_defaults_match_the_programmatic_default() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let loaded = load_from_empty_args();
        let built = AppSettings::default();
        assert_eq!(loaded.ai_timeout(), built.ai_timeout());
        assert_eq!(loaded.upstream_timeout(), built.upstream_timeout());
        assert_eq!(
            loaded.bind_addr().expect("loaded"),
            built.bind_addr().expect("built")
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MASSEURPRO_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "MASSEURPRO_DATABASE_URL",
                Some("postgres://localhost/masseurpro".to_owned()),
            ),
            ("MASSEURPRO_GEMINI_API_KEY", Some("g-key".to_owned())),
            ("MASSEURPRO_GEMINI_MODEL", Some("gemini-pro".to_owned())),
            ("MASSEURPRO_AI_TIMEOUT_SECS", Some("5".to_owned())),
            ("MASSEURPRO_STRIPE_SECRET_KEY", Some("   ".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/masseurpro")
        );
        assert_eq!(settings.gemini_api_key(), Some("g-key"));
        assert_eq!(settings.gemini_model(), "gemini-pro");
        assert_eq!(settings.ai_timeout(), Duration::from_secs(5));
        assert!(settings.stripe_secret_key().is_none(), "blank keys count as unset");
    }

    #[rstest]
    fn malformed_values_are_reported() {
        let settings = AppSettings {
            bind_addr: Some("not an address".to_owned()),
            identity_endpoint: Some("::nope".to_owned()),
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.identity_endpoint(),
            Err(SettingsError::Endpoint {
                field: "identity_endpoint",
                ..
            })
        ));
    }
}
