use thiserror::Error;

/// RFC parsing and validation errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("vCard parse error: {0}")]
    VCard(#[from] crate::vcard::ParseError),

    #[error("DAV parse error: {0}")]
    Dav(#[from] crate::dav::ParseError),
}
