use std::collections::HashMap;

use anyhow::Result;
use config::{Config, Environment};
use serde::{Deserialize, Deserializer};

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_LDAP_TIMEOUT_SECS, DEFAULT_LOG_LEVEL};
use crate::error::{CoreError, CoreResult};

/// Run configuration.
///
/// Keys mirror the environment variable names (`CARDDAV_USERNAME` becomes
/// `carddav_username`), so the same names work in `carddav2ldap.toml`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub carddav_base_discovery_url: String,
    pub carddav_username: String,
    pub carddav_password: String,
    pub carddav_ssl_verify: bool,

    pub ldap_server: String,
    pub ldap_user: String,
    pub ldap_password: String,
    pub ldap_base_dn: String,
    pub ldap_timeout_secs: u64,

    pub import_photos: bool,

    #[serde(default, deserialize_with = "comma_list")]
    pub email_domain_whitelist: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub email_domain_blacklist: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub category_whitelist: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub category_blacklist: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub addressbook_whitelist: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub addressbook_blacklist: Vec<String>,

    pub log_level: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("carddav_base_discovery_url", &self.carddav_base_discovery_url)
            .field("carddav_username", &self.carddav_username)
            .field("carddav_ssl_verify", &self.carddav_ssl_verify)
            .field("ldap_server", &self.ldap_server)
            .field("ldap_user", &self.ldap_user)
            .field("ldap_base_dn", &self.ldap_base_dn)
            .field("ldap_timeout_secs", &self.ldap_timeout_secs)
            .field("import_photos", &self.import_photos)
            .field("email_domain_whitelist", &self.email_domain_whitelist)
            .field("email_domain_blacklist", &self.email_domain_blacklist)
            .field("category_whitelist", &self.category_whitelist)
            .field("category_blacklist", &self.category_blacklist)
            .field("addressbook_whitelist", &self.addressbook_whitelist)
            .field("addressbook_blacklist", &self.addressbook_blacklist)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `carddav2ldap.toml` and environment variables into a `Settings`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if a required key is missing, deserialization fails
    /// or the resulting settings are invalid.
    pub fn load() -> Result<Self> {
        Self::build(Self::environment())
    }

    /// ## Summary
    /// Builds settings from an explicit variable map instead of the process
    /// environment. Keys use the environment spelling (`LDAP_SERVER`).
    ///
    /// ## Errors
    /// Same as [`Settings::load`].
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(Self::environment().source(Some(vars)))
    }

    /// Every variable stays a string here; typed fields convert on
    /// deserialization, so a password such as `007` is kept verbatim.
    fn environment() -> Environment {
        Environment::default().ignore_empty(true)
    }

    fn build(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("carddav_ssl_verify", true)?
            .set_default("ldap_timeout_secs", DEFAULT_LDAP_TIMEOUT_SECS)?
            .set_default("import_photos", false)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            // Environment overrides the file
            .add_source(environment)
            .build()?
            .try_deserialize::<Self>()
            .map_err(|e| CoreError::ConfigError(e.to_string()))?;

        settings.validate()?;

        Ok(settings)
    }

    /// ## Summary
    /// Checks the values that deserialization alone cannot.
    ///
    /// ## Errors
    /// Returns a [`CoreError`] naming the offending key.
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("CARDDAV_BASE_DISCOVERY_URL", &self.carddav_base_discovery_url),
            ("CARDDAV_USERNAME", &self.carddav_username),
            ("CARDDAV_PASSWORD", &self.carddav_password),
            ("LDAP_SERVER", &self.ldap_server),
            ("LDAP_USER", &self.ldap_user),
            ("LDAP_PASSWORD", &self.ldap_password),
            ("LDAP_BASE_DN", &self.ldap_base_dn),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::MissingSetting(key));
            }
        }

        if !self.ldap_server.starts_with("ldap://") && !self.ldap_server.starts_with("ldaps://") {
            return Err(CoreError::InvalidSetting {
                key: "LDAP_SERVER",
                message: format!("expected an ldap:// or ldaps:// URL, got {}", self.ldap_server),
            });
        }

        if !self.ldap_base_dn.contains('=') {
            return Err(CoreError::InvalidSetting {
                key: "LDAP_BASE_DN",
                message: format!("not a distinguished name: {}", self.ldap_base_dn),
            });
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListValue {
    Joined(String),
    Items(Vec<String>),
}

/// Accepts a TOML array or a comma-separated string such as
/// `EMAIL_DOMAIN_BLACKLIST=spam.example, junk.example`.
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match ListValue::deserialize(deserializer)? {
        ListValue::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        ListValue::Items(items) => items,
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
