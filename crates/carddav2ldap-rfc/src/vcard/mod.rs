//! vCard 2.1, 3.0 and 4.0 reading (RFC 2426, RFC 6350).
//!
//! Properties keep their raw value; [`Property`] decides how to split and
//! unescape it when asked.
//!
//! ```rust
//! use carddav2ldap_rfc::vcard::parse;
//!
//! let cards = parse("BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n").unwrap();
//! assert_eq!(cards[0].formatted_name().as_deref(), Some("John Doe"));
//! ```

mod card;
mod error;
mod escape;
mod line;
mod parser;
mod property;
mod structured;

pub use card::{VCard, Version};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use escape::{split_unescaped, unescape};
pub use line::{LogicalLines, parse_property};
pub use parser::parse;
pub use property::{Parameter, Property};
pub use structured::{Address, Organization, StructuredName};
