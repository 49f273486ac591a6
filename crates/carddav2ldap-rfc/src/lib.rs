//! Wire formats consumed by carddav2ldap.
//!
//! - [`vcard`] - vCard 3.0/4.0 parsing (RFC 2426, RFC 6350)
//! - [`dav`] - `WebDAV` multistatus parsing and `CardDAV` PROPFIND bodies (RFC 4918, RFC 6352)

pub mod dav;
pub mod error;
pub mod vcard;
