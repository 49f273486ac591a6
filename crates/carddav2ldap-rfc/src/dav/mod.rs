//! `WebDAV` / `CardDAV` client-side XML.
//!
//! Request bodies for the two PROPFIND calls a sync run makes, and a
//! parser for the `207 Multi-Status` responses they return. Parsing uses
//! the `quick-xml` crate.

mod error;
mod multistatus;
mod namespace;
mod propfind;

pub use error::{ParseError, ParseResult};
pub use multistatus::{DavResponse, parse_multistatus};
pub use namespace::{CARDDAV_NS, DAV_NS};
pub use propfind::{ADDRESS_DATA_PROPFIND, DISCOVERY_PROPFIND};
