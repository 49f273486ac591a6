use thiserror::Error;

/// Application-level errors (run orchestration)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] carddav2ldap_service::error::ServiceError),

    #[error("CardDAV discovery failed: {0}")]
    Discovery(#[source] carddav2ldap_service::error::ServiceError),

    #[error("LDAP connection failed: {0}")]
    LdapConnect(#[source] carddav2ldap_service::error::ServiceError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
