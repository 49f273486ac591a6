use std::fmt;

pub type ParseResult<T> = Result<T, ParseError>;

/// A vCard document that could not be read.
///
/// `line` counts logical lines, after unfolding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No `:` between the property head and its value, or a bad name.
    MalformedLine,
    InvalidParameter,
    /// `BEGIN:VCARD` without a matching `END:VCARD`.
    Unterminated,
    /// `BEGIN` inside an open card.
    Nested,
    UnsupportedVersion,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedLine => "malformed content line",
            Self::InvalidParameter => "invalid parameter",
            Self::Unterminated => "unterminated vCard",
            Self::Nested => "nested component",
            Self::UnsupportedVersion => "unsupported version",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_line_and_kind() {
        let err = ParseError::new(ParseErrorKind::Unterminated, 3, "missing END:VCARD");
        assert_eq!(
            err.to_string(),
            "line 3: unterminated vCard: missing END:VCARD"
        );
    }
}
