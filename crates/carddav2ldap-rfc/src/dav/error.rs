//! Multistatus parse errors.

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("undecodable text: {0}")]
    Encoding(String),

    #[error("unknown entity &{0};")]
    UnknownEntity(String),

    /// The document root is not the named DAV element.
    #[error("expected a <{0}> document")]
    UnexpectedRoot(&'static str),
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for ParseError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::Encoding(err.to_string())
    }
}
