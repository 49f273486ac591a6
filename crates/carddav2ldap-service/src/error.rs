use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] carddav2ldap_rfc::error::RfcError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("LDAP error: {0}")]
    LdapError(#[from] ldap3::LdapError),

    #[error("Invalid URL: {0}")]
    UrlError(String),

    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
