/// Name of the optional configuration file read from the working directory.
pub const CONFIG_FILE_NAME: &str = "carddav2ldap.toml";

pub const APP_NAME: &str = "carddav2ldap";
pub const USER_AGENT: &str = const_str::concat!(APP_NAME, "/", env!("CARGO_PKG_VERSION"));

/// Display name used when a vCard carries neither FN nor N.
pub const UNKNOWN_CONTACT: &str = "Unknown Contact";

/// Surname placeholder for entries whose name yields no usable surname.
pub const SURNAME_PLACEHOLDER: &str = "N/A";

pub const DEFAULT_LDAP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
